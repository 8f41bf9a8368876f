//! Datenbankmodelle fuer Lobby
//!
//! Reine Datensaetze, getrennt von den Domain-Typen im Chat-Crate.

use chrono::{DateTime, Utc};
use lobby_core::MessageId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Nachrichten
// ---------------------------------------------------------------------------

/// Nachrichten-Datensatz aus der Datenbank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NachrichtRecord {
    pub id: MessageId,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Anlegen einer neuen Nachricht
#[derive(Debug, Clone)]
pub struct NeueNachricht<'a> {
    pub username: &'a str,
    pub text: &'a str,
}

// ---------------------------------------------------------------------------
// Login-Benutzer
// ---------------------------------------------------------------------------

/// Rang fuer neu angelegte Benutzer
pub const STANDARD_RANG: &str = "Spieler";

/// Benutzer-Datensatz aus dem Login-Speicher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub nickname: String,
    pub rank: String,
}
