//! Presence-Handler – Beitritt, Umbenennung, Trennung

use lobby_core::ConnectionId;
use lobby_db::MessageRepository;
use lobby_protocol::control::{
    ChatHistory, ControlMessage, ControlPayload, JoinRequest, RenameRequest,
};
use std::sync::Arc;

use crate::handlers::chat_handler::nachricht_info;
use crate::server_state::SignalingState;

/// Beitritt mit Anzeigenamen; der Beitretende bekommt zuletzt den Verlauf
pub async fn handle_join<R>(
    request: JoinRequest,
    connection_id: ConnectionId,
    state: &Arc<SignalingState<R>>,
) where
    R: MessageRepository + 'static,
{
    let entscheidung = state.presence.beitreten(connection_id, &request.username);
    let verlauf = entscheidung.verlauf_senden;
    state.broadcaster.zustellen(entscheidung);

    if verlauf {
        verlauf_senden(connection_id, state).await;
    }
}

/// Laedt den Verlauf und sendet ihn an eine Verbindung
///
/// Ein Fehler des Nachrichten-Speichers ergibt einen leeren Verlauf.
async fn verlauf_senden<R>(connection_id: ConnectionId, state: &Arc<SignalingState<R>>)
where
    R: MessageRepository + 'static,
{
    let limit = state.presence.config().verlauf_limit;
    let messages = match state.chat_service.verlauf_laden(limit).await {
        Ok(nachrichten) => nachrichten.into_iter().map(nachricht_info).collect(),
        Err(e) => {
            tracing::error!(
                connection_id = %connection_id,
                fehler = %e,
                "Verlauf konnte nicht geladen werden"
            );
            Vec::new()
        }
    };

    state.broadcaster.an_verbindung_senden(
        &connection_id,
        ControlMessage::push(ControlPayload::ChatHistory(ChatHistory { messages })),
    );
}

/// Eigenen Namen aendern
pub fn handle_rename<R>(
    request: RenameRequest,
    connection_id: ConnectionId,
    state: &Arc<SignalingState<R>>,
) where
    R: MessageRepository + 'static,
{
    let entscheidung = state.presence.umbenennen(connection_id, &request.username);
    state.broadcaster.zustellen(entscheidung);
}

/// Aufraeumen beim Verbindungsende
///
/// Die Verbindung wird zuerst aus dem Broadcaster entfernt, damit sie die
/// eigene Austrittsmeldung nicht mehr eingereiht bekommt.
pub fn handle_disconnect<R>(connection_id: ConnectionId, state: &Arc<SignalingState<R>>)
where
    R: MessageRepository + 'static,
{
    state.broadcaster.client_entfernen(&connection_id);
    let entscheidung = state.presence.trennen(connection_id);
    state.broadcaster.zustellen(entscheidung);
}
