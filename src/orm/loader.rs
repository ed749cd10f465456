//! Load model definitions from a JSON file (an array of model definitions).

use crate::error::OrmError;
use crate::orm::{Db, ModelDef};
use std::path::Path;

pub async fn load_models(path: impl AsRef<Path>) -> Result<Vec<ModelDef>, OrmError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| OrmError::Load(format!("{}: {}", path.display(), e)))?;
    let defs: Vec<ModelDef> =
        serde_json::from_str(&raw).map_err(|e| OrmError::Load(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), count = defs.len(), "models loaded");
    Ok(defs)
}

/// Load, define and sync every model in the file. Returns the defined model names.
pub async fn define_from_path(db: &Db, path: impl AsRef<Path>) -> Result<Vec<String>, OrmError> {
    let defs = load_models(path).await?;
    let mut names = Vec::with_capacity(defs.len());
    for def in defs {
        let model = db.define(def)?;
        db.sync(&model.name).await?;
        names.push(model.name.clone());
    }
    Ok(names)
}
