//! Shared application state for all routes. Models are looked up per request, so models
//! defined after the router is built are served too.

use crate::access::{AccessControl, AccessRequest, AllowAll, Operation};
use crate::error::AppError;
use crate::options::RestormifyOptions;
use crate::orm::{Db, Model};
use axum::http::HeaderMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub options: Arc<RestormifyOptions>,
    pub access: Arc<dyn AccessControl>,
}

impl AppState {
    pub fn new(db: Db, options: RestormifyOptions) -> Self {
        AppState {
            db,
            options: Arc::new(options),
            access: Arc::new(AllowAll),
        }
    }

    pub fn with_access(mut self, access: impl AccessControl + 'static) -> Self {
        self.access = Arc::new(access);
        self
    }

    /// Model for a path segment; unknown names are a 404.
    pub fn model(&self, resource: &str) -> Result<Arc<Model>, AppError> {
        self.db
            .model(resource)
            .ok_or_else(|| AppError::NotFound(resource.to_string()))
    }

    pub fn soft_delete_column<'a>(&'a self, model: &Model) -> Option<&'a str> {
        model.soft_delete_column(self.options.deleted_column.as_deref())
    }

    pub async fn authorize(
        &self,
        operation: Operation,
        model: &Model,
        id: Option<i64>,
        headers: &HeaderMap,
    ) -> Result<(), AppError> {
        let request = AccessRequest {
            operation,
            resource: &model.name,
            id,
            headers,
        };
        if self.access.allow(&request).await {
            Ok(())
        } else {
            tracing::warn!(operation = %operation, resource = %model.name, ?id, "access denied");
            Err(AppError::Forbidden(format!("{} {}", operation, model.name)))
        }
    }
}
