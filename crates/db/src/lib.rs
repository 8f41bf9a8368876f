//! lobby-db – Datenbank-Abstraktion
//!
//! Repository-Pattern fuer die beiden externen Speicher des Chats:
//! den Nachrichten-Speicher (`MessageRepository`) und den Login-Speicher
//! (`UserRepository`). Die einzige Implementierung ist `SqliteDb`.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{DatabaseConfig, DbResult, MessageRepository, UserRepository};
pub use sqlite::SqliteDb;
