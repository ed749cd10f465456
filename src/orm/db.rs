//! Database handle: SQLite pool plus the registry of defined models.

use crate::error::OrmError;
use crate::orm::{migration, validate, Model, ModelDef};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Shared handle; cloning is cheap and every clone sees the same models.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
    models: Arc<RwLock<HashMap<String, Arc<Model>>>>,
}

impl Db {
    /// Open a pool for `url` (e.g. `sqlite://app.db`, `sqlite::memory:`), creating the file if missing.
    /// In-memory databases get a single connection that never idles out, otherwise each
    /// connection would see its own empty database.
    pub async fn connect(url: &str) -> Result<Self, OrmError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(DEFAULT_MAX_CONNECTIONS)
        };
        let pool = pool_options.connect_with(options).await?;
        tracing::info!(url = %url, in_memory, "connected");
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Db {
            pool,
            models: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Validate and register a model. A model with the same name is replaced; a name that
    /// differs from an existing one only by ASCII case is rejected, since SQLite table names
    /// are case-insensitive.
    pub fn define(&self, def: ModelDef) -> Result<Arc<Model>, OrmError> {
        validate(&def)?;
        let model = Arc::new(Model::from_def(def));
        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = models
            .keys()
            .find(|k| **k != model.name && k.eq_ignore_ascii_case(&model.name))
        {
            return Err(OrmError::NameConflict {
                name: model.name.clone(),
                existing: existing.clone(),
            });
        }
        if models.insert(model.name.clone(), model.clone()).is_some() {
            tracing::info!(model = %model.name, "model redefined");
        } else {
            tracing::info!(model = %model.name, fields = model.fields.len(), "model defined");
        }
        Ok(model)
    }

    pub fn model(&self, name: &str) -> Option<Arc<Model>> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// All defined models, sorted by name.
    pub fn models(&self) -> Vec<Arc<Model>> {
        let mut out: Vec<Arc<Model>> = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn require(&self, name: &str) -> Result<Arc<Model>, OrmError> {
        self.model(name).ok_or_else(|| OrmError::UnknownModel(name.to_string()))
    }

    /// Create the model's table if it does not exist.
    pub async fn sync(&self, name: &str) -> Result<(), OrmError> {
        let model = self.require(name)?;
        migration::create_table(&self.pool, &model).await?;
        tracing::info!(model = %name, "synced");
        Ok(())
    }

    pub async fn sync_all(&self) -> Result<(), OrmError> {
        for model in self.models() {
            migration::create_table(&self.pool, &model).await?;
        }
        tracing::info!("all models synced");
        Ok(())
    }

    /// Drop the model's table (the model stays defined).
    pub async fn drop(&self, name: &str) -> Result<(), OrmError> {
        let model = self.require(name)?;
        migration::drop_table(&self.pool, &model).await?;
        tracing::info!(model = %name, "dropped");
        Ok(())
    }

    pub async fn drop_all(&self) -> Result<(), OrmError> {
        for model in self.models() {
            migration::drop_table(&self.pool, &model).await?;
        }
        tracing::info!("all models dropped");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::FieldType;

    #[tokio::test]
    async fn define_sync_and_drop() {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        db.define(ModelDef::new("baz").field("name", FieldType::Text)).unwrap();
        db.define(ModelDef::new("alpha")).unwrap();
        let names: Vec<_> = db.models().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, vec!["alpha", "baz"]);

        db.sync("baz").await.unwrap();
        sqlx::query("INSERT INTO \"baz\" (\"name\") VALUES ('x')")
            .execute(db.pool())
            .await
            .unwrap();

        db.drop_all().await.unwrap();
        assert!(sqlx::query("SELECT 1 FROM \"baz\"").execute(db.pool()).await.is_err());
        db.close().await;
    }

    #[tokio::test]
    async fn unknown_model_cannot_sync() {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        assert!(matches!(db.sync("nope").await, Err(OrmError::UnknownModel(_))));
        assert!(db.model("nope").is_none());
    }

    #[tokio::test]
    async fn redefine_replaces_model() {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        db.define(ModelDef::new("baz").field("name", FieldType::Text)).unwrap();
        db.define(ModelDef::new("baz").field("title", FieldType::Text)).unwrap();
        let model = db.model("baz").unwrap();
        assert!(model.field("name").is_none());
        assert!(model.field("title").is_some());
    }

    #[tokio::test]
    async fn names_differing_only_in_case_conflict() {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        db.define(ModelDef::new("baz").field("name", FieldType::Text)).unwrap();
        db.sync("baz").await.unwrap();

        let err = db.define(ModelDef::new("Baz").field("title", FieldType::Text)).unwrap_err();
        assert!(matches!(err, OrmError::NameConflict { ref existing, .. } if existing == "baz"));
        assert!(db.model("Baz").is_none());
        assert!(matches!(db.sync("Baz").await, Err(OrmError::UnknownModel(_))));
        assert!(matches!(db.drop("Baz").await, Err(OrmError::UnknownModel(_))));
        assert!(db.model("baz").unwrap().field("name").is_some());
    }

    #[tokio::test]
    async fn poisoned_registry_still_serves_models() {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        db.define(ModelDef::new("baz")).unwrap();
        let models = db.models.clone();
        let _ = std::thread::spawn(move || {
            let _guard = models.write().unwrap();
            panic!("poison the registry");
        })
        .join();
        assert!(db.models.is_poisoned());
        assert!(db.model("baz").is_some());
        assert_eq!(db.models().len(), 1);
        db.define(ModelDef::new("alpha")).unwrap();
        assert_eq!(db.models().len(), 2);
    }

    #[tokio::test]
    async fn invalid_definition_is_not_registered() {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        assert!(db.define(ModelDef::new("bad name")).is_err());
        assert!(db.models().is_empty());
    }
}
