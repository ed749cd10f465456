//! Resource CRUD handlers: list, create, read, replace (PUT), update (PATCH), delete.

use crate::access::Operation;
use crate::error::AppError;
use crate::orm::Model;
use crate::representation::{represent, represent_many};
use crate::service::{CrudService, RequestValidator, WriteMode};
use crate::sql::BindValue;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Ids are integers; anything else cannot name a row, so it is a 404 rather than a 400.
fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse::<i64>()
        .map_err(|_| AppError::NotFound(format!("invalid id '{}'", id_str)))
}

/// Malformed JSON and a missing content type come back in the usual error body.
fn body_to_map(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    let Json(value) = payload?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

struct ListParams {
    filters: Vec<(String, BindValue)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

fn parse_paging(key: &str, v: &str) -> Result<u32, AppError> {
    v.parse()
        .map_err(|_| AppError::BadRequest(format!("{} must be a non-negative integer", key)))
}

/// Split query params into paging and exact-match filters on visible fields.
fn list_params(model: &Model, params: HashMap<String, String>) -> Result<ListParams, AppError> {
    let mut out = ListParams {
        filters: Vec::new(),
        limit: None,
        offset: None,
    };
    for (k, v) in params {
        if k == "limit" {
            out.limit = Some(parse_paging(&k, &v)?);
            continue;
        }
        if k == "offset" {
            out.offset = Some(parse_paging(&k, &v)?);
            continue;
        }
        match model.field(&k) {
            Some(f) if !f.server_only => {
                let val = BindValue::from_query(f.type_, &v).map_err(|e| {
                    AppError::BadRequest(format!("{} must be of type {}", k, e.expected.as_str()))
                })?;
                out.filters.push((k, val));
            }
            _ => tracing::debug!(model = %model.name, param = %k, "ignoring query param"),
        }
    }
    // Deterministic bind order regardless of HashMap iteration.
    out.filters.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let model = state.model(&resource)?;
    state.authorize(Operation::List, &model, None, &headers).await?;
    let p = list_params(&model, params)?;
    let rows = CrudService::list(
        state.db.pool(),
        &model,
        &p.filters,
        p.limit,
        p.offset,
        state.soft_delete_column(&model),
    )
    .await?;
    Ok((StatusCode::OK, Json(represent_many(&model, &state.options.api_base, rows))))
}

pub async fn create(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let model = state.model(&resource)?;
    state.authorize(Operation::Create, &model, None, &headers).await?;
    let body = body_to_map(body)?;
    let assignments = RequestValidator::assignments(&model, &body, WriteMode::Create)?;
    let row = CrudService::create(state.db.pool(), &model, &assignments).await?;
    Ok((StatusCode::CREATED, Json(represent(&model, &state.options.api_base, row))))
}

pub async fn read(
    State(state): State<AppState>,
    Path((resource, id_str)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let model = state.model(&resource)?;
    let id = parse_id(&id_str)?;
    state.authorize(Operation::Read, &model, Some(id), &headers).await?;
    let row = CrudService::read(state.db.pool(), &model, id, state.soft_delete_column(&model))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", resource, id_str)))?;
    Ok((StatusCode::OK, Json(represent(&model, &state.options.api_base, row))))
}

async fn write(
    state: AppState,
    resource: String,
    id_str: String,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
    mode: WriteMode,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let model = state.model(&resource)?;
    let id = parse_id(&id_str)?;
    let operation = match mode {
        WriteMode::Patch => Operation::Update,
        _ => Operation::Replace,
    };
    state.authorize(operation, &model, Some(id), &headers).await?;
    let body = body_to_map(body)?;
    let assignments = RequestValidator::assignments(&model, &body, mode)?;
    let row = CrudService::update(
        state.db.pool(),
        &model,
        id,
        &assignments,
        state.soft_delete_column(&model),
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("{} {}", resource, id_str)))?;
    Ok((StatusCode::OK, Json(represent(&model, &state.options.api_base, row))))
}

/// PUT: every writable field is replaced; fields missing from the body are cleared.
pub async fn replace(
    State(state): State<AppState>,
    Path((resource, id_str)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    write(state, resource, id_str, headers, body, WriteMode::Replace).await
}

/// PATCH: only supplied fields change.
pub async fn update(
    State(state): State<AppState>,
    Path((resource, id_str)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    write(state, resource, id_str, headers, body, WriteMode::Patch).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path((resource, id_str)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let model = state.model(&resource)?;
    let id = parse_id(&id_str)?;
    state.authorize(Operation::Delete, &model, Some(id), &headers).await?;
    let removed = CrudService::delete(state.db.pool(), &model, id, state.soft_delete_column(&model)).await?;
    if !removed {
        return Err(AppError::NotFound(format!("{} {}", resource, id_str)));
    }
    Ok(StatusCode::NO_CONTENT)
}
