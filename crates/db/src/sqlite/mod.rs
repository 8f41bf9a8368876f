//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod messages;
pub mod pool;
pub mod users;

pub use pool::SqliteDb;
