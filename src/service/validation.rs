//! Request body validation: turn a JSON object into typed column assignments.

use crate::error::AppError;
use crate::orm::{FieldDef, Model, ID_FIELD};
use crate::sql::{Assignment, BindValue};
use serde_json::{Map, Value};

/// How a body is applied to a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// POST: supplied fields only, required fields must be present.
    Create,
    /// PUT: every writable field is written; missing ones are cleared.
    Replace,
    /// PATCH: supplied fields only.
    Patch,
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate `body` against the model and return the columns to write.
    /// `id`, unknown keys and server-only fields are ignored.
    pub fn assignments(
        model: &Model,
        body: &Map<String, Value>,
        mode: WriteMode,
    ) -> Result<Vec<Assignment>, AppError> {
        for key in body.keys() {
            if key == ID_FIELD {
                continue;
            }
            match model.field(key) {
                None => tracing::debug!(model = %model.name, field = %key, "ignoring unknown field"),
                Some(f) if f.server_only => {
                    tracing::warn!(model = %model.name, field = %key, "ignoring client write to server-only field")
                }
                Some(_) => {}
            }
        }

        let mut out = Vec::new();
        for f in model.visible_fields() {
            let supplied = body.get(&f.name);
            let value = match supplied {
                Some(v) => coerce(f, v)?,
                None if mode == WriteMode::Replace => BindValue::Null,
                None => {
                    if mode == WriteMode::Create && f.required {
                        return Err(required(f));
                    }
                    continue;
                }
            };
            if f.required && value == BindValue::Null {
                return Err(required(f));
            }
            out.push(Assignment {
                column: f.name.clone(),
                value,
            });
        }
        Ok(out)
    }
}

fn coerce(f: &FieldDef, v: &Value) -> Result<BindValue, AppError> {
    BindValue::from_json(f.type_, v).map_err(|e| {
        AppError::Validation(format!("{} must be of type {}", f.name, e.expected.as_str()))
    })
}

fn required(f: &FieldDef) -> AppError {
    AppError::Validation(format!("{} is required", f.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::{FieldDef, FieldType, ModelDef};
    use serde_json::json;

    fn user() -> Model {
        Model::from_def(
            ModelDef::new("user")
                .with_field(FieldDef::new("name", FieldType::Text).required())
                .field("email", FieldType::Text)
                .field("age", FieldType::Integer)
                .server_only_field("deleted", FieldType::Boolean),
        )
    }

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn columns(a: &[Assignment]) -> Vec<&str> {
        a.iter().map(|a| a.column.as_str()).collect()
    }

    #[test]
    fn create_takes_supplied_fields_and_drops_the_rest() {
        let body = obj(json!({ "id": 99, "name": "todd", "deleted": true, "extra": 1 }));
        let a = RequestValidator::assignments(&user(), &body, WriteMode::Create).unwrap();
        assert_eq!(columns(&a), vec!["name"]);
        assert_eq!(a[0].value, BindValue::Text("todd".into()));
    }

    #[test]
    fn create_requires_required_fields() {
        let body = obj(json!({ "email": "t@t.com" }));
        let err = RequestValidator::assignments(&user(), &body, WriteMode::Create).unwrap_err();
        assert_eq!(err.to_string(), "validation: name is required");
    }

    #[test]
    fn replace_clears_missing_fields() {
        let body = obj(json!({ "name": "baz wee" }));
        let a = RequestValidator::assignments(&user(), &body, WriteMode::Replace).unwrap();
        assert_eq!(columns(&a), vec!["name", "email", "age"]);
        assert_eq!(a[1].value, BindValue::Null);
        assert_eq!(a[2].value, BindValue::Null);
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let body = obj(json!({ "age": "41" }));
        let a = RequestValidator::assignments(&user(), &body, WriteMode::Patch).unwrap();
        assert_eq!(a, vec![Assignment { column: "age".into(), value: BindValue::Integer(41) }]);

        let body = obj(json!({ "name": null }));
        assert!(RequestValidator::assignments(&user(), &body, WriteMode::Patch).is_err());
    }

    #[test]
    fn type_mismatch_names_field_and_type() {
        let body = obj(json!({ "name": "x", "age": "old" }));
        let err = RequestValidator::assignments(&user(), &body, WriteMode::Create).unwrap_err();
        assert_eq!(err.to_string(), "validation: age must be of type integer");
    }
}
