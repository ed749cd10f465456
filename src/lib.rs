//! restormify: REST CRUD endpoints generated from runtime model definitions.
//!
//! Define models on a [`Db`], hand it to [`restormify`], and every model is served under
//! `/api/<model>` with list, read, create, replace (PUT), update (PATCH) and delete.
//! Fields marked `server_only` never leave the server, and every resource carries a
//! `_links.self` pointer to its canonical URL.

pub mod access;
pub mod error;
pub mod handlers;
pub mod options;
pub mod orm;
pub mod representation;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use access::{AccessControl, AccessRequest, AllowAll, Operation, ReadOnly};
pub use error::{AppError, OrmError, SettingsError};
pub use options::{RestormifyOptions, ServerSettings};
pub use orm::{define_from_path, load_models, Db, FieldDef, FieldType, Model, ModelDef};
pub use representation::{represent, resource_href};
pub use routes::{common_routes, resource_routes, restormify, restormify_with_state};
pub use service::{CrudService, RequestValidator, WriteMode};
pub use state::AppState;
