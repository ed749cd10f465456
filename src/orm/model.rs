//! Validated model: definition flattened for runtime use.

use crate::orm::{FieldDef, FieldType, ModelDef};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    pub fields: Vec<FieldDef>,
    field_index: HashMap<String, usize>,
}

impl Model {
    /// Build from a definition that already passed `validate`.
    pub(crate) fn from_def(def: ModelDef) -> Self {
        let field_index = def
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Model {
            name: def.name,
            fields: def.fields,
            field_index,
        }
    }

    /// Table backing this model.
    pub fn table(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// Fields clients may read, filter on and write.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.server_only)
    }

    pub fn is_server_only(&self, name: &str) -> bool {
        self.field(name).map(|f| f.server_only).unwrap_or(false)
    }

    /// Soft-delete flag column, when the model has a boolean field with the configured name.
    pub fn soft_delete_column<'a>(&self, configured: Option<&'a str>) -> Option<&'a str> {
        let name = configured?;
        match self.field(name) {
            Some(f) if f.type_ == FieldType::Boolean => Some(name),
            _ => None,
        }
    }
}
