//! Table DDL for models: CREATE TABLE IF NOT EXISTS and DROP TABLE IF EXISTS.
//! Existing tables are left as they are; columns added to a model later are not migrated.

use crate::error::OrmError;
use crate::orm::{Model, ID_FIELD};
use crate::sql::quoted;
use sqlx::SqlitePool;

pub fn create_table_sql(model: &Model) -> String {
    let mut col_defs = vec![format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted(ID_FIELD))];
    for f in &model.fields {
        col_defs.push(format!("{} {}", quoted(&f.name), f.type_.sql_type()));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quoted(model.table()),
        col_defs.join(", ")
    )
}

pub fn drop_table_sql(model: &Model) -> String {
    format!("DROP TABLE IF EXISTS {}", quoted(model.table()))
}

pub async fn create_table(pool: &SqlitePool, model: &Model) -> Result<(), OrmError> {
    let sql = create_table_sql(model);
    tracing::debug!(sql = %sql, "ddl");
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

pub async fn drop_table(pool: &SqlitePool, model: &Model) -> Result<(), OrmError> {
    let sql = drop_table_sql(model);
    tracing::debug!(sql = %sql, "ddl");
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}
