//! lobby-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die von allen anderen
//! Lobby-Crates gemeinsam genutzt werden: ID-Newtypes und die
//! Fehler-Taxonomie des Presence-Kerns.

pub mod error;
pub mod text;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{LobbyError, Result};
pub use text::bereinigen;
pub use types::{ConnectionId, MessageId};
