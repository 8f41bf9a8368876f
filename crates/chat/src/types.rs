//! Oeffentliche Typen fuer den Chat-Service

use chrono::{DateTime, Utc};
use lobby_core::MessageId;
use lobby_db::models::{BenutzerRecord, NachrichtRecord};
use serde::{Deserialize, Serialize};

/// Eine Chat-Nachricht (Domain-Typ, nicht DB-Record)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatNachricht {
    pub id: MessageId,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<NachrichtRecord> for ChatNachricht {
    fn from(record: NachrichtRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            text: record.text,
            created_at: record.created_at,
        }
    }
}

/// Ein angemeldeter Benutzer aus dem Login-Speicher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benutzer {
    pub nickname: String,
    pub rank: String,
}

impl From<BenutzerRecord> for Benutzer {
    fn from(record: BenutzerRecord) -> Self {
        Self {
            nickname: record.nickname,
            rank: record.rank,
        }
    }
}
