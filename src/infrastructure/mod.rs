// Infrastructure - Database access and request-scoped viewer context

pub mod middleware;
pub mod sqlite_database;
pub mod viewer;

pub use sqlite_database::Database;
pub use viewer::viewer::{Principal, ViewerContext};
