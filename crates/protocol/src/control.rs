//! Control-Protokoll (TCP)
//!
//! Definiert alle Nachrichten die ueber die persistente Verbindung zwischen
//! Client und Server ausgetauscht werden.
//!
//! ## Design
//! - Jede Nachricht hat eine `request_id: u32`. Antworten an den Ausloeser
//!   tragen dessen `request_id`, Server-Pushes (Broadcasts) tragen `0`.
//! - JSON-Serialisierung via serde
//! - Ein geschlossenes Tagged Enum fuer beide Richtungen

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer Error-Responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InternalError,
    InvalidRequest,
    NotFound,
    ServerFull,
}

// ---------------------------------------------------------------------------
// Presence-Nachrichten (Client -> Server)
// ---------------------------------------------------------------------------

/// Beitritt mit gewuenschtem Anzeigenamen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub username: String,
}

/// Eigenen Anzeigenamen aendern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    pub username: String,
}

// ---------------------------------------------------------------------------
// Presence-Nachrichten (Server -> Client)
// ---------------------------------------------------------------------------

/// Bestaetigter Name und Rolle einer Verbindung
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedEvent {
    /// Endgueltiger Name (ggf. mit `#n`-Suffix)
    pub username: String,
    pub is_moderator: bool,
}

/// Begruendung einer Ablehnung (NameRejected / RenameDenied)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionEvent {
    pub reason: String,
}

/// Sortierte Liste aller Online-Namen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceList {
    /// Steigt mit jeder Aenderung; aeltere Listen koennen verworfen werden
    pub revision: u64,
    pub names: Vec<String>,
}

// ---------------------------------------------------------------------------
// Gruppen-Nachrichten
// ---------------------------------------------------------------------------

/// Vollstaendiger Gruppenzustand (an den Beitretenden)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStateEvent {
    pub name: String,
    pub avatar_url: String,
    /// Reservierter Moderator-Name, damit Clients ihn kennzeichnen koennen
    pub moderator_name: String,
}

/// Teilweise Aenderung des Gruppenzustands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStateChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Gruppe umbenennen (nur Moderator)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRenameRequest {
    pub name: String,
}

/// Gruppen-Avatar setzen (nur Moderator, leer = entfernen)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAvatarRequest {
    #[serde(default)]
    pub avatar_url: String,
}

// ---------------------------------------------------------------------------
// Admin-Nachrichten
// ---------------------------------------------------------------------------

/// Moderator-Rolle eines anderen Users umschalten
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPromoteRequest {
    pub username: String,
}

/// Anderen User zwangsweise umbenennen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRenameRequest {
    pub old_username: String,
    pub new_username: String,
}

// ---------------------------------------------------------------------------
// Chat-Nachrichten
// ---------------------------------------------------------------------------

/// Nachricht senden (`/clear` leert den Chat wenn der Absender Moderator ist)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSendRequest {
    pub text: String,
}

/// Einzelne Nachricht loeschen (nur Moderator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDeleteRequest {
    pub id: String,
}

/// Gespeicherte Chat-Nachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageInfo {
    pub id: String,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Nachrichten-Verlauf (aelteste zuerst)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    pub messages: Vec<ChatMessageInfo>,
}

// ---------------------------------------------------------------------------
// Keepalive
// ---------------------------------------------------------------------------

/// Ping (Client -> Server oder Server -> Client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingMessage {
    /// Unix-Timestamp in Millisekunden fuer RTT-Messung
    pub timestamp_ms: u64,
}

/// Pong-Antwort (spiegelt Timestamp zurueck)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongMessage {
    pub echo_timestamp_ms: u64,
    pub server_timestamp_ms: u64,
}

/// Fehler-Antwort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Haupt-Enum
// ---------------------------------------------------------------------------

/// Alle moeglichen Control-Nachrichten (typsicher via Tagged Enum)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlPayload {
    // Presence (Client -> Server)
    Join(JoinRequest),
    Rename(RenameRequest),

    // Presence (Server -> Client)
    Accepted(AcceptedEvent),
    NameRejected(RejectionEvent),
    RenameDenied(RejectionEvent),
    PresenceChanged(PresenceList),

    // Gruppe
    GroupRename(GroupRenameRequest),
    GroupAvatar(GroupAvatarRequest),
    GroupState(GroupStateEvent),
    GroupStateChanged(GroupStateChange),

    // Admin
    AdminPromote(AdminPromoteRequest),
    AdminRename(AdminRenameRequest),

    // Chat
    ChatSend(ChatSendRequest),
    ChatDelete(ChatDeleteRequest),
    ChatClear,
    ChatHistory(ChatHistory),
    MessagePosted(ChatMessageInfo),
    MessageDeleted(ChatDeleteRequest),
    ChatCleared,

    // Keepalive
    Ping(PingMessage),
    Pong(PongMessage),

    // Fehler
    Error(ErrorResponse),
}

impl ControlPayload {
    /// Gibt true zurueck wenn die Nachricht nur vom Server gesendet wird
    ///
    /// Solche Payloads von einem Client sind ein Protokollfehler.
    pub fn ist_server_nachricht(&self) -> bool {
        matches!(
            self,
            Self::Accepted(_)
                | Self::NameRejected(_)
                | Self::RenameDenied(_)
                | Self::PresenceChanged(_)
                | Self::GroupState(_)
                | Self::GroupStateChanged(_)
                | Self::ChatHistory(_)
                | Self::MessagePosted(_)
                | Self::MessageDeleted(_)
                | Self::ChatCleared
                | Self::Error(_)
        )
    }
}

/// Umschlag fuer alle Control-Nachrichten
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    /// Nachrichten-ID fuer Request/Response-Zuordnung (0 = Server-Push)
    #[serde(default)]
    pub request_id: u32,
    /// Inhalt der Nachricht
    #[serde(flatten)]
    pub payload: ControlPayload,
}

impl ControlMessage {
    /// Erstellt eine neue Control-Nachricht
    pub fn new(request_id: u32, payload: ControlPayload) -> Self {
        Self {
            request_id,
            payload,
        }
    }

    /// Erstellt einen Server-Push (request_id 0)
    pub fn push(payload: ControlPayload) -> Self {
        Self::new(0, payload)
    }

    /// Erstellt eine Ping-Nachricht
    pub fn ping(request_id: u32, timestamp_ms: u64) -> Self {
        Self::new(
            request_id,
            ControlPayload::Ping(PingMessage { timestamp_ms }),
        )
    }

    /// Erstellt eine Pong-Antwort
    pub fn pong(request_id: u32, echo_timestamp_ms: u64, server_timestamp_ms: u64) -> Self {
        Self::new(
            request_id,
            ControlPayload::Pong(PongMessage {
                echo_timestamp_ms,
                server_timestamp_ms,
            }),
        )
    }

    /// Erstellt eine Fehler-Antwort
    pub fn error(request_id: u32, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(
            request_id,
            ControlPayload::Error(ErrorResponse {
                code,
                message: message.into(),
            }),
        )
    }

    /// Serialisiert die Nachricht als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert eine Nachricht aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_aus_client_json() {
        let json = r#"{"request_id":7,"type":"join","username":"Alice"}"#;
        let msg = ControlMessage::from_json(json).unwrap();
        assert_eq!(msg.request_id, 7);
        match msg.payload {
            ControlPayload::Join(j) => assert_eq!(j.username, "Alice"),
            andere => panic!("Erwartet Join-Payload, erhalten: {andere:?}"),
        }
    }

    #[test]
    fn request_id_ist_optional() {
        let msg = ControlMessage::from_json(r#"{"type":"chat_clear"}"#).unwrap();
        assert_eq!(msg.request_id, 0);
        assert!(matches!(msg.payload, ControlPayload::ChatClear));
    }

    #[test]
    fn admin_rename_feldnamen() {
        let json = r#"{"type":"admin_rename","old_username":"Bob","new_username":"Robert"}"#;
        let msg = ControlMessage::from_json(json).unwrap();
        if let ControlPayload::AdminRename(r) = msg.payload {
            assert_eq!(r.old_username, "Bob");
            assert_eq!(r.new_username, "Robert");
        } else {
            panic!("Erwartet AdminRename-Payload");
        }
    }

    #[test]
    fn group_state_change_laesst_leere_felder_weg() {
        let msg = ControlMessage::push(ControlPayload::GroupStateChanged(GroupStateChange {
            name: Some("Neue Gruppe".into()),
            avatar_url: None,
        }));
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"group_state_changed""#));
        assert!(json.contains(r#""name":"Neue Gruppe""#));
        assert!(!json.contains("avatar_url"));
    }

    #[test]
    fn presence_changed_serialisierung() {
        let msg = ControlMessage::push(ControlPayload::PresenceChanged(PresenceList {
            revision: 3,
            names: vec!["Alice".into(), "Bob".into()],
        }));
        let decoded = ControlMessage::from_json(&msg.to_json().unwrap()).unwrap();
        assert_eq!(decoded.request_id, 0);
        if let ControlPayload::PresenceChanged(p) = decoded.payload {
            assert_eq!(p.revision, 3);
            assert_eq!(p.names, vec!["Alice", "Bob"]);
        } else {
            panic!("Erwartet PresenceChanged-Payload");
        }
    }

    #[test]
    fn error_response_serialisierung() {
        let msg = ControlMessage::error(42, ErrorCode::NotFound, "Nachricht nicht gefunden");
        let decoded = ControlMessage::from_json(&msg.to_json().unwrap()).unwrap();
        assert_eq!(decoded.request_id, 42);
        if let ControlPayload::Error(e) = decoded.payload {
            assert_eq!(e.code, ErrorCode::NotFound);
            assert_eq!(e.message, "Nachricht nicht gefunden");
        } else {
            panic!("Erwartet Error-Payload");
        }
    }

    #[test]
    fn unbekannter_typ_wird_abgelehnt() {
        assert!(ControlMessage::from_json(r#"{"type":"voice_init"}"#).is_err());
    }

    #[test]
    fn server_nachrichten_erkennung() {
        assert!(ControlPayload::ChatCleared.ist_server_nachricht());
        assert!(ControlPayload::Accepted(AcceptedEvent {
            username: "x".into(),
            is_moderator: false
        })
        .ist_server_nachricht());
        assert!(!ControlPayload::ChatClear.ist_server_nachricht());
        assert!(!ControlPayload::Join(JoinRequest {
            username: "x".into()
        })
        .ist_server_nachricht());
    }
}
