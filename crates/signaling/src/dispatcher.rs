//! Message-Dispatcher – Routet ControlMessages an die richtigen Handler
//!
//! Der Dispatcher empfaengt ControlMessages von einer ClientConnection,
//! bestimmt den richtigen Handler und gibt eine eventuelle direkte
//! Antwort zurueck.
//!
//! ## Zustandspruefung
//! Ob eine Verbindung anonym oder benannt ist, prueft der Presence-Kern.
//! Nachrichten im falschen Zustand werden dort still verworfen.

use lobby_core::ConnectionId;
use lobby_db::MessageRepository;
use lobby_protocol::control::{ControlMessage, ControlPayload, ErrorCode};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::handlers::{admin_handler, chat_handler, group_handler, presence_handler};
use crate::server_state::SignalingState;

/// Dispatcher-Kontext – Informationen ueber die aktuelle Verbindung
#[derive(Debug, Clone)]
pub struct DispatcherContext {
    /// Vom Server vergebene Verbindungs-ID
    pub connection_id: ConnectionId,
    /// Peer-Adresse (nur fuer Logs)
    pub peer_addr: SocketAddr,
}

/// Zentraler Message-Dispatcher
pub struct MessageDispatcher<R: MessageRepository + 'static> {
    state: Arc<SignalingState<R>>,
}

impl<R: MessageRepository + 'static> MessageDispatcher<R> {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<SignalingState<R>>) -> Self {
        Self { state }
    }

    /// Verarbeitet eine eingehende ControlMessage
    ///
    /// Gibt `None` zurueck wenn keine direkte Antwort gesendet werden soll.
    pub async fn dispatch(
        &self,
        message: ControlMessage,
        ctx: &DispatcherContext,
    ) -> Option<ControlMessage> {
        let request_id = message.request_id;
        let conn = ctx.connection_id;

        match message.payload {
            // -------------------------------------------------------------------
            // Keepalive
            // -------------------------------------------------------------------
            ControlPayload::Ping(ping) => Some(ControlMessage::pong(
                request_id,
                ping.timestamp_ms,
                jetzt_ms(),
            )),

            ControlPayload::Pong(_) => {
                tracing::trace!(connection_id = %conn, "Pong empfangen");
                None
            }

            // -------------------------------------------------------------------
            // Presence
            // -------------------------------------------------------------------
            ControlPayload::Join(req) => {
                presence_handler::handle_join(req, conn, &self.state).await;
                None
            }

            ControlPayload::Rename(req) => {
                presence_handler::handle_rename(req, conn, &self.state);
                None
            }

            // -------------------------------------------------------------------
            // Gruppe
            // -------------------------------------------------------------------
            ControlPayload::GroupRename(req) => {
                group_handler::handle_group_rename(req, conn, &self.state);
                None
            }

            ControlPayload::GroupAvatar(req) => {
                group_handler::handle_group_avatar(req, conn, &self.state);
                None
            }

            // -------------------------------------------------------------------
            // Admin
            // -------------------------------------------------------------------
            ControlPayload::AdminPromote(req) => {
                admin_handler::handle_admin_promote(req, conn, &self.state);
                None
            }

            ControlPayload::AdminRename(req) => {
                admin_handler::handle_admin_rename(req, conn, &self.state);
                None
            }

            // -------------------------------------------------------------------
            // Chat
            // -------------------------------------------------------------------
            ControlPayload::ChatSend(req) => {
                chat_handler::handle_chat_send(req, conn, &self.state).await;
                None
            }

            ControlPayload::ChatDelete(req) => {
                chat_handler::handle_chat_delete(req, request_id, conn, &self.state).await
            }

            ControlPayload::ChatClear => {
                chat_handler::handle_chat_clear(conn, &self.state).await;
                None
            }

            // -------------------------------------------------------------------
            // Nur Server -> Client
            // -------------------------------------------------------------------
            payload => {
                debug_assert!(payload.ist_server_nachricht());
                tracing::debug!(connection_id = %conn, peer = %ctx.peer_addr, "Server-Nachricht vom Client empfangen");
                Some(ControlMessage::error(
                    request_id,
                    ErrorCode::InvalidRequest,
                    "Diese Nachricht wird nur vom Server gesendet",
                ))
            }
        }
    }
}

/// Aktuelle Unix-Zeit in Millisekunden
pub(crate) fn jetzt_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
