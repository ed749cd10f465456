pub mod types;
pub mod validator;
pub mod model;
pub mod migration;
pub mod db;
pub mod loader;

pub use types::*;
pub use validator::*;
pub use model::*;
pub use db::*;
pub use loader::*;
