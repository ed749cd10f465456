//! Resource CRUD routes. The model is resolved from the path segment on every request,
//! so one set of parameterized routes serves every model defined on the `Db`.

use crate::handlers::resource::{create, delete as delete_handler, list, read, replace, update};
use crate::options::RestormifyOptions;
use crate::orm::Db;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Routes relative to the API base: `/:resource` and `/:resource/:id`.
pub fn resource_routes(state: AppState) -> Router {
    let body_limit = state.options.body_limit;
    Router::new()
        .route("/:resource", get(list).post(create))
        .route("/:resource/", get(list).post(create))
        .route(
            "/:resource/:id",
            get(read).put(replace).patch(update).delete(delete_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
        .with_state(state)
}

/// Bind every model on `db` under the configured API base (default `/api`).
pub fn restormify(db: Db, options: RestormifyOptions) -> Router {
    restormify_with_state(AppState::new(db, options))
}

/// Same as [`restormify`] with a prepared state (e.g. one carrying an access hook).
pub fn restormify_with_state(state: AppState) -> Router {
    let api_base = state.options.api_base.clone();
    tracing::info!(api_base = %api_base, models = state.db.models().len(), "binding resource routes");
    let routes = resource_routes(state);
    if api_base.is_empty() {
        routes
    } else {
        Router::new().nest(&api_base, routes)
    }
}
