//! Model definition validation: identifier safety and field uniqueness.

use crate::error::OrmError;
use crate::orm::{ModelDef, ID_FIELD};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern compiles"))
}

/// Names end up quoted inside SQL and inside URL paths, so only plain identifiers are accepted.
pub fn is_identifier(name: &str) -> bool {
    identifier_re().is_match(name)
}

pub fn validate(def: &ModelDef) -> Result<(), OrmError> {
    if !is_identifier(&def.name) {
        return Err(OrmError::InvalidName {
            kind: "model",
            name: def.name.clone(),
        });
    }

    let mut seen = HashSet::new();
    for f in &def.fields {
        if !is_identifier(&f.name) {
            return Err(OrmError::InvalidName {
                kind: "field",
                name: f.name.clone(),
            });
        }
        // SQLite column names are case-insensitive.
        if f.name.eq_ignore_ascii_case(ID_FIELD) {
            return Err(OrmError::ReservedField {
                model: def.name.clone(),
                field: f.name.clone(),
            });
        }
        if !seen.insert(f.name.to_ascii_lowercase()) {
            return Err(OrmError::DuplicateField {
                model: def.name.clone(),
                field: f.name.clone(),
            });
        }
    }

    Ok(())
}
