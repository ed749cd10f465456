//! Model definition types, as declared in code or loaded from JSON.

use serde::{Deserialize, Serialize};

/// Name of the implicit integer primary key every model carries.
pub const ID_FIELD: &str = "id";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "string")]
    Text,
    Integer,
    Number,
    Boolean,
    Date,
    Object,
}

impl FieldType {
    /// Declared SQLite column type.
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Date | FieldType::Object => "TEXT",
            FieldType::Integer => "INTEGER",
            FieldType::Number => "REAL",
            FieldType::Boolean => "BOOLEAN",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Object => "object",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    /// Never serialized to clients and never writable by them.
    #[serde(default, alias = "serverOnly")]
    pub server_only: bool,
    #[serde(default)]
    pub required: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, type_: FieldType) -> Self {
        FieldDef {
            name: name.into(),
            type_,
            server_only: false,
            required: false,
        }
    }

    pub fn server_only(mut self) -> Self {
        self.server_only = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        ModelDef {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, type_: FieldType) -> Self {
        self.fields.push(FieldDef::new(name, type_));
        self
    }

    pub fn server_only_field(mut self, name: impl Into<String>, type_: FieldType) -> Self {
        self.fields.push(FieldDef::new(name, type_).server_only());
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}
