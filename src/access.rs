//! Per-request authorization hook for resource operations.

use async_trait::async_trait;
use axum::http::HeaderMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Create,
    Replace,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Replace => "replace",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is being asked for: operation, resource (model name), id for item routes, and request headers.
#[derive(Clone, Copy, Debug)]
pub struct AccessRequest<'a> {
    pub operation: Operation,
    pub resource: &'a str,
    pub id: Option<i64>,
    pub headers: &'a HeaderMap,
}

#[async_trait]
pub trait AccessControl: Send + Sync {
    async fn allow(&self, request: &AccessRequest<'_>) -> bool;
}

/// Allows everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

#[async_trait]
impl AccessControl for AllowAll {
    async fn allow(&self, _request: &AccessRequest<'_>) -> bool {
        true
    }
}

/// Read-only access: list and read pass, writes are denied.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadOnly;

#[async_trait]
impl AccessControl for ReadOnly {
    async fn allow(&self, request: &AccessRequest<'_>) -> bool {
        matches!(request.operation, Operation::List | Operation::Read)
    }
}
