//! Generic CRUD execution against SQLite.

use crate::error::AppError;
use crate::orm::{FieldType, Model, ID_FIELD};
use crate::sql::{bind_params, delete, insert, select_by_id, select_list, soft_delete, update, Assignment, BindValue, QueryBuf};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

pub struct CrudService;

impl CrudService {
    /// List rows with optional exact-match filters, limit (capped at 1000) and offset, ordered by id.
    pub async fn list(
        pool: &SqlitePool,
        model: &Model,
        filters: &[(String, BindValue)],
        limit: Option<u32>,
        offset: Option<u32>,
        soft_delete: Option<&str>,
    ) -> Result<Vec<Value>, AppError> {
        let q = select_list(model, filters, limit, offset, soft_delete);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_params(sqlx::query(&q.sql), &q.params).fetch_all(pool).await?;
        rows.iter().map(|r| row_to_json(model, r)).collect()
    }

    /// Fetch one row by id. Returns JSON object or None.
    pub async fn read(
        pool: &SqlitePool,
        model: &Model,
        id: i64,
        soft_delete: Option<&str>,
    ) -> Result<Option<Value>, AppError> {
        let mut conn = pool.acquire().await?;
        Self::read_on(&mut conn, model, id, soft_delete).await
    }

    /// Insert one row and return it as stored.
    pub async fn create(pool: &SqlitePool, model: &Model, assignments: &[Assignment]) -> Result<Value, AppError> {
        let q = insert(model, assignments);
        let mut tx = pool.begin().await?;
        let id = Self::execute(&mut tx, &q).await?.last_insert_rowid();
        let row = Self::read_on(&mut tx, model, id, None)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tx.commit().await?;
        tracing::debug!(model = %model.name, id, "created");
        Ok(row)
    }

    /// Apply assignments to one live row. Returns the updated row, or None when the id is unknown.
    pub async fn update(
        pool: &SqlitePool,
        model: &Model,
        id: i64,
        assignments: &[Assignment],
        soft_delete: Option<&str>,
    ) -> Result<Option<Value>, AppError> {
        let mut tx = pool.begin().await?;
        if let Some(q) = update(model, id, assignments, soft_delete) {
            if Self::execute(&mut tx, &q).await?.rows_affected() == 0 {
                return Ok(None);
            }
        }
        let row = Self::read_on(&mut tx, model, id, soft_delete).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Delete one row by id; with a soft-delete column the flag is raised instead.
    /// Returns false when there was no live row with that id.
    pub async fn delete(
        pool: &SqlitePool,
        model: &Model,
        id: i64,
        soft_delete_column: Option<&str>,
    ) -> Result<bool, AppError> {
        let q = match soft_delete_column {
            Some(col) => soft_delete(model, id, col),
            None => delete(model, id),
        };
        let mut conn = pool.acquire().await?;
        let affected = Self::execute(&mut conn, &q).await?.rows_affected();
        Ok(affected > 0)
    }

    async fn read_on(
        conn: &mut SqliteConnection,
        model: &Model,
        id: i64,
        soft_delete: Option<&str>,
    ) -> Result<Option<Value>, AppError> {
        let q = select_by_id(model, id, soft_delete);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(|r| row_to_json(model, &r)).transpose()
    }

    async fn execute(
        conn: &mut SqliteConnection,
        q: &QueryBuf,
    ) -> Result<sqlx::sqlite::SqliteQueryResult, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let result = bind_params(sqlx::query(&q.sql), &q.params)
            .execute(&mut *conn)
            .await?;
        Ok(result)
    }
}

/// Decode a row into a JSON object using the model's field types. Includes server-only fields.
fn row_to_json(model: &Model, row: &SqliteRow) -> Result<Value, AppError> {
    let mut map = Map::new();
    let id: i64 = row.try_get(ID_FIELD)?;
    map.insert(ID_FIELD.to_string(), Value::from(id));
    for f in &model.fields {
        map.insert(f.name.clone(), cell_to_value(row, &f.name, f.type_)?);
    }
    Ok(Value::Object(map))
}

fn cell_to_value(row: &SqliteRow, name: &str, field_type: FieldType) -> Result<Value, AppError> {
    let v = match field_type {
        FieldType::Text | FieldType::Date => row.try_get::<Option<String>, _>(name)?.map(Value::String),
        FieldType::Integer => row.try_get::<Option<i64>, _>(name)?.map(Value::from),
        FieldType::Number => row
            .try_get::<Option<f64>, _>(name)?
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        FieldType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
        FieldType::Object => row
            .try_get::<Option<String>, _>(name)?
            .map(|s| serde_json::from_str(&s).unwrap_or(Value::String(s))),
    };
    Ok(v.unwrap_or(Value::Null))
}
