//! Client-facing representation of a row: server-only fields removed, `_links.self` added.

use crate::orm::{Model, ID_FIELD};
use serde::Serialize;
use serde_json::Value;

pub const LINKS_KEY: &str = "_links";

#[derive(Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_: SelfLink,
}

#[derive(Serialize)]
pub struct SelfLink {
    #[serde(rename = "type")]
    pub type_: String,
    pub href: String,
}

/// Canonical path of one resource, e.g. `/api/baz/3`.
pub fn resource_href(api_base: &str, model: &str, id: &Value) -> String {
    let id = match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{}/{}/{}", api_base.trim_end_matches('/'), model, id)
}

pub fn links(api_base: &str, model: &Model, id: &Value) -> Links {
    Links {
        self_: SelfLink {
            type_: model.name.clone(),
            href: resource_href(api_base, &model.name, id),
        },
    }
}

/// Shape a raw row (as returned by `CrudService`) for the client.
pub fn represent(model: &Model, api_base: &str, row: Value) -> Value {
    let Value::Object(mut map) = row else {
        return row;
    };
    for f in model.fields.iter().filter(|f| f.server_only) {
        map.remove(&f.name);
    }
    let id = map.get(ID_FIELD).cloned().unwrap_or(Value::Null);
    let links = serde_json::to_value(links(api_base, model, &id)).unwrap_or(Value::Null);
    map.insert(LINKS_KEY.to_string(), links);
    Value::Object(map)
}

pub fn represent_many(model: &Model, api_base: &str, rows: Vec<Value>) -> Vec<Value> {
    rows.into_iter().map(|r| represent(model, api_base, r)).collect()
}
