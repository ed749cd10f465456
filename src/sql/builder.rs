//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a model.

use crate::orm::{Model, ID_FIELD};
use crate::sql::BindValue;

/// Hard cap on list page size.
pub const MAX_LIMIT: u32 = 1000;

/// Quote identifier for SQLite (safe: names are validated when the model is defined).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) {
        self.params.push(v);
    }
}

/// One column set by INSERT/UPDATE.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: BindValue,
}

/// Every column, id first, in declaration order.
fn select_column_list(model: &Model) -> String {
    std::iter::once(ID_FIELD)
        .chain(model.fields.iter().map(|f| f.name.as_str()))
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rows whose soft-delete flag is unset.
fn live_clause(soft_delete: &str) -> String {
    let col = quoted(soft_delete);
    format!("({} IS NULL OR {} = 0)", col, col)
}

/// SELECT by primary key. Soft-deleted rows are excluded when `soft_delete` is set.
pub fn select_by_id(model: &Model, id: i64, soft_delete: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = vec![format!("{} = ?", quoted(ID_FIELD))];
    q.push_param(BindValue::Integer(id));
    if let Some(col) = soft_delete {
        where_parts.push(live_clause(col));
    }
    q.sql = format!(
        "SELECT {} FROM {} WHERE {}",
        select_column_list(model),
        quoted(model.table()),
        where_parts.join(" AND ")
    );
    q
}

/// SELECT list with exact-match filters, ORDER BY id, optional LIMIT/OFFSET.
/// Filters naming columns the model does not have are skipped.
pub fn select_list(
    model: &Model,
    filters: &[(String, BindValue)],
    limit: Option<u32>,
    offset: Option<u32>,
    soft_delete: Option<&str>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if model.field(col).is_none() {
            continue;
        }
        if *val == BindValue::Null {
            where_parts.push(format!("{} IS NULL", quoted(col)));
        } else {
            q.push_param(val.clone());
            where_parts.push(format!("{} = ?", quoted(col)));
        }
    }
    if let Some(col) = soft_delete {
        where_parts.push(live_clause(col));
    }

    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let order_clause = format!(" ORDER BY {}", quoted(ID_FIELD));
    // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
    let limit_clause = match (limit, offset) {
        (Some(n), _) => format!(" LIMIT {}", n.min(MAX_LIMIT)),
        (None, Some(_)) => " LIMIT -1".to_string(),
        (None, None) => String::new(),
    };
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}{}",
        select_column_list(model),
        quoted(model.table()),
        where_clause,
        order_clause,
        limit_clause,
        offset_clause
    );
    q
}

/// INSERT of the given assignments; no assignments inserts a row of defaults.
pub fn insert(model: &Model, assignments: &[Assignment]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(model.table());
    if assignments.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES", table);
        return q;
    }
    let mut cols = Vec::with_capacity(assignments.len());
    let mut placeholders = Vec::with_capacity(assignments.len());
    for a in assignments {
        cols.push(quoted(&a.column));
        placeholders.push("?");
        q.push_param(a.value.clone());
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by id: SET only the given assignments. None when there is nothing to set.
pub fn update(model: &Model, id: i64, assignments: &[Assignment], soft_delete: Option<&str>) -> Option<QueryBuf> {
    if assignments.is_empty() {
        return None;
    }
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(assignments.len());
    for a in assignments {
        sets.push(format!("{} = ?", quoted(&a.column)));
        q.push_param(a.value.clone());
    }
    let mut where_parts = vec![format!("{} = ?", quoted(ID_FIELD))];
    q.push_param(BindValue::Integer(id));
    if let Some(col) = soft_delete {
        where_parts.push(live_clause(col));
    }
    q.sql = format!(
        "UPDATE {} SET {} WHERE {}",
        quoted(model.table()),
        sets.join(", "),
        where_parts.join(" AND ")
    );
    Some(q)
}

/// DELETE by id.
pub fn delete(model: &Model, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(BindValue::Integer(id));
    q.sql = format!("DELETE FROM {} WHERE {} = ?", quoted(model.table()), quoted(ID_FIELD));
    q
}

/// Soft delete by id: raise the flag on a row that is still live.
pub fn soft_delete(model: &Model, id: i64, column: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(BindValue::Bool(true));
    q.push_param(BindValue::Integer(id));
    q.sql = format!(
        "UPDATE {} SET {} = ? WHERE {} = ? AND {}",
        quoted(model.table()),
        quoted(column),
        quoted(ID_FIELD),
        live_clause(column)
    );
    q
}
