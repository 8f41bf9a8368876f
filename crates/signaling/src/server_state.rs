//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt alle geteilten Services und Zustands-Manager als Arc-Referenzen,
//! die sicher zwischen tokio-Tasks geteilt werden koennen.

use lobby_chat::ChatService;
use lobby_db::MessageRepository;
use std::sync::Arc;

use crate::broadcast::EventBroadcaster;
use crate::presence::PresenceCoordinator;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Maximale gleichzeitige Verbindungen
    pub max_clients: u32,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            max_clients: 512,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState<R: MessageRepository + 'static> {
    /// Server-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Presence-Kern (Namen, Moderator-Rolle, Gruppe)
    pub presence: PresenceCoordinator,
    /// Chat-Service (Nachrichten speichern, Verlauf, Loeschen)
    pub chat_service: Arc<ChatService<R>>,
    /// Event-Broadcaster (Nachrichten an Clients senden)
    pub broadcaster: EventBroadcaster,
}

impl<R: MessageRepository + 'static> SignalingState<R> {
    /// Erstellt einen neuen SignalingState
    pub fn neu(
        config: SignalingConfig,
        presence: PresenceCoordinator,
        chat_service: Arc<ChatService<R>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            presence,
            chat_service,
            broadcaster: EventBroadcaster::neu(),
        })
    }
}
