//! Event-Broadcaster – Sendet Events an einzelne oder alle Verbindungen
//!
//! Der EventBroadcaster verwaltet die Send-Queues aller offenen
//! Verbindungen. Der Presence-Kern entscheidet nur, *was* an *wen* geht;
//! hier wird es eingereiht.
//!
//! ## Zustellung
//! - An eine Verbindung: `an_verbindung_senden`
//! - An alle Verbindungen: `an_alle_senden`
//! - Eine komplette Entscheidung: `zustellen`

use dashmap::DashMap;
use lobby_core::ConnectionId;
use lobby_protocol::control::ControlMessage;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::presence::{Entscheidung, Ziel};

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub connection_id: ConnectionId,
    pub tx: mpsc::Sender<ControlMessage>,
}

impl ClientSender {
    /// Sendet eine Nachricht nicht-blockierend an den Client
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, nachricht: ControlMessage) -> bool {
        match self.tx.try_send(nachricht) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(connection_id = %self.connection_id, "Send-Queue voll – Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(connection_id = %self.connection_id, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Event-Broadcaster fuer alle offenen Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct EventBroadcaster {
    clients: Arc<DashMap<ConnectionId, ClientSender>>,
}

impl EventBroadcaster {
    /// Erstellt einen neuen EventBroadcaster
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die `ClientConnection` liest aus dieser Queue und sendet via TCP.
    pub fn client_registrieren(&self, connection_id: ConnectionId) -> mpsc::Receiver<ControlMessage> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        self.clients
            .insert(connection_id, ClientSender { connection_id, tx });
        tracing::debug!(connection_id = %connection_id, "Client im Broadcaster registriert");
        rx
    }

    /// Entfernt eine Verbindung aus dem Broadcaster
    pub fn client_entfernen(&self, connection_id: &ConnectionId) {
        if self.clients.remove(connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Client aus Broadcaster entfernt");
        }
    }

    /// Sendet eine Nachricht an eine einzelne Verbindung
    ///
    /// Gibt `true` zurueck wenn die Verbindung gefunden und die Nachricht eingereiht wurde.
    pub fn an_verbindung_senden(&self, connection_id: &ConnectionId, nachricht: ControlMessage) -> bool {
        match self.clients.get(connection_id) {
            Some(sender) => sender.senden(nachricht),
            None => {
                tracing::debug!(connection_id = %connection_id, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    /// Sendet eine Nachricht an alle offenen Verbindungen
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn an_alle_senden(&self, nachricht: ControlMessage) -> usize {
        let mut gesendet = 0;
        self.clients.iter().for_each(|entry| {
            if entry.value().senden(nachricht.clone()) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Stellt alle Zustellungen einer Entscheidung in Reihenfolge zu
    pub fn zustellen(&self, entscheidung: Entscheidung) {
        for zustellung in entscheidung.zustellungen {
            let nachricht = ControlMessage::push(zustellung.payload);
            match zustellung.ziel {
                Ziel::Verbindung(id) => {
                    self.an_verbindung_senden(&id, nachricht);
                }
                Ziel::Alle => {
                    self.an_alle_senden(nachricht);
                }
            }
        }
    }

    /// Gibt die Anzahl der registrierten Verbindungen zurueck
    pub fn client_anzahl(&self) -> usize {
        self.clients.len()
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, connection_id: &ConnectionId) -> bool {
        self.clients.contains_key(connection_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::{PresenceConfig, PresenceCoordinator};
    use lobby_protocol::control::ControlPayload;

    fn test_nachricht(id: u32) -> ControlMessage {
        ControlMessage::ping(id, 12345)
    }

    #[tokio::test]
    async fn client_registrieren_und_senden() {
        let broadcaster = EventBroadcaster::neu();
        let id = ConnectionId::new();

        let mut rx = broadcaster.client_registrieren(id);
        assert!(broadcaster.ist_registriert(&id));

        assert!(broadcaster.an_verbindung_senden(&id, test_nachricht(1)));

        let empfangen = rx.try_recv().expect("Nachricht muss vorhanden sein");
        assert_eq!(empfangen.request_id, 1);
    }

    #[tokio::test]
    async fn an_alle_senden() {
        let broadcaster = EventBroadcaster::neu();

        let mut receivers: Vec<_> = (0..5)
            .map(|_| broadcaster.client_registrieren(ConnectionId::new()))
            .collect();

        assert_eq!(broadcaster.an_alle_senden(test_nachricht(99)), 5);
        for rx in &mut receivers {
            assert!(rx.try_recv().is_ok());
        }
    }

    #[test]
    fn client_entfernen() {
        let broadcaster = EventBroadcaster::neu();
        let id = ConnectionId::new();

        let _rx = broadcaster.client_registrieren(id);
        broadcaster.client_entfernen(&id);

        assert!(!broadcaster.ist_registriert(&id));
        assert!(!broadcaster.an_verbindung_senden(&id, test_nachricht(1)));
        assert_eq!(broadcaster.client_anzahl(), 0);
    }

    #[test]
    fn volle_queue_verwirft_nachricht() {
        let broadcaster = EventBroadcaster::neu();
        let id = ConnectionId::new();
        let _rx = broadcaster.client_registrieren(id);

        for i in 0..SEND_QUEUE_GROESSE as u32 {
            assert!(broadcaster.an_verbindung_senden(&id, test_nachricht(i)));
        }
        assert!(!broadcaster.an_verbindung_senden(&id, test_nachricht(0)));
    }

    #[tokio::test]
    async fn entscheidung_wird_in_reihenfolge_zugestellt() {
        let broadcaster = EventBroadcaster::neu();
        let presence = PresenceCoordinator::neu(PresenceConfig::default());
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        let mut rx_a = broadcaster.client_registrieren(a);
        let mut rx_b = broadcaster.client_registrieren(b);

        broadcaster.zustellen(presence.beitreten(a, "Alice"));

        let typen: Vec<_> = std::iter::from_fn(|| rx_a.try_recv().ok())
            .map(|m| m.payload)
            .collect();
        assert!(matches!(typen[0], ControlPayload::Accepted(_)));
        assert!(matches!(typen[1], ControlPayload::GroupState(_)));
        assert!(matches!(typen[2], ControlPayload::PresenceChanged(_)));
        assert_eq!(typen.len(), 3);

        let bei_b = rx_b.try_recv().expect("Namensliste an alle");
        assert!(matches!(bei_b.payload, ControlPayload::PresenceChanged(_)));
        assert!(rx_b.try_recv().is_err());
    }
}
