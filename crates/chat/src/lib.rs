//! lobby-chat – Chat-Verlauf und Login
//!
//! Dieses Crate implementiert:
//! - ChatService: Nachrichten speichern, Verlauf laden, loeschen
//! - LoginService: Nickname-Registrierung fuer den HTTP-Login
//!
//! Beide Dienste sind duenne Huellen um die Repository-Traits aus
//! `lobby-db`; sie bereinigen Eingaben und wandeln Datensaetze in
//! Domain-Typen um.
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use lobby_chat::{ChatService, LoginService};
//! use lobby_db::SqliteDb;
//!
//! #[tokio::main]
//! async fn main() {
//!     let db = Arc::new(SqliteDb::in_memory().await.unwrap());
//!
//!     let chat = ChatService::neu(db.clone());
//!     let login = LoginService::neu(db);
//! }
//! ```

pub mod error;
pub mod login;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{ChatError, ChatResult};
pub use login::LoginService;
pub use service::ChatService;
pub use types::{Benutzer, ChatNachricht};
