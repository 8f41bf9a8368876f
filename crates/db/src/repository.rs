//! Repository-Trait-Definitionen
//!
//! Entkoppelt die Chat-Logik von der konkreten Datenbank. Fehler werden an
//! den Aufrufer gemeldet und nie intern wiederholt.

use lobby_core::MessageId;

use crate::error::DbError;
use crate::models::{BenutzerRecord, NachrichtRecord, NeueNachricht};

/// Result-Typ fuer alle Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://lobby.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://lobby.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Nachrichten-Speicher
#[allow(async_fn_in_trait)]
pub trait MessageRepository: Send + Sync {
    /// Speichert eine Nachricht und gibt den vollstaendigen Datensatz zurueck
    async fn append(&self, data: NeueNachricht<'_>) -> DbResult<NachrichtRecord>;

    /// Die neuesten `limit` Nachrichten, aelteste zuerst
    async fn recent(&self, limit: i64) -> DbResult<Vec<NachrichtRecord>>;

    /// Loescht eine Nachricht; `false` wenn sie nicht existierte
    async fn delete_one(&self, id: MessageId) -> DbResult<bool>;

    /// Loescht alle Nachrichten und gibt die Anzahl zurueck
    async fn delete_all(&self) -> DbResult<u64>;
}

/// Login-Speicher (unabhaengig von der Live-Presence)
#[allow(async_fn_in_trait)]
pub trait UserRepository: Send + Sync {
    /// Registriert den Nickname falls noetig und gibt den Datensatz zurueck
    ///
    /// Idempotent: wiederholte Aufrufe aendern den Rang nicht.
    async fn upsert(&self, nickname: &str) -> DbResult<BenutzerRecord>;

    /// Laedt einen Benutzer anhand des Nicknames
    async fn get_by_nickname(&self, nickname: &str) -> DbResult<Option<BenutzerRecord>>;
}
