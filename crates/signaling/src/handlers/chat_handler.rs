//! Chat-Handler – Nachrichten senden, loeschen, Chat leeren
//!
//! Routet Chat-Nachrichten ueber den ChatService und verteilt das
//! Ergebnis an alle Verbindungen. Fehler des Nachrichten-Speichers werden
//! geloggt; es wird dann nichts verteilt.

use lobby_chat::{ChatError, ChatNachricht};
use lobby_core::ConnectionId;
use lobby_db::MessageRepository;
use lobby_protocol::control::{
    ChatDeleteRequest, ChatMessageInfo, ChatSendRequest, ControlMessage, ControlPayload, ErrorCode,
};
use std::sync::Arc;

use crate::server_state::SignalingState;

/// Chat-Befehl zum Leeren des Verlaufs (nur Moderator)
const CLEAR_BEFEHL: &str = "/clear";

/// Wandelt eine gespeicherte Nachricht in das Protokollformat
pub(crate) fn nachricht_info(nachricht: ChatNachricht) -> ChatMessageInfo {
    ChatMessageInfo {
        id: nachricht.id.to_string(),
        username: nachricht.username,
        text: nachricht.text,
        created_at: nachricht.created_at,
    }
}

/// Verarbeitet eine Chat-Nachricht
///
/// Anonyme Verbindungen werden ignoriert. `/clear` von einem Moderator
/// leert den Chat statt gespeichert zu werden.
pub async fn handle_chat_send<R>(
    request: ChatSendRequest,
    connection_id: ConnectionId,
    state: &Arc<SignalingState<R>>,
) where
    R: MessageRepository + 'static,
{
    let Some(username) = state.presence.anzeigename(connection_id) else {
        tracing::debug!(connection_id = %connection_id, "Chat von anonymer Verbindung ignoriert");
        return;
    };

    if request.text.trim() == CLEAR_BEFEHL && state.presence.ist_moderator(connection_id) {
        chat_leeren(connection_id, state).await;
        return;
    }

    match state
        .chat_service
        .nachricht_senden(&username, &request.text)
        .await
    {
        Ok(nachricht) => {
            tracing::debug!(
                connection_id = %connection_id,
                message_id = %nachricht.id,
                "Chat-Nachricht gesendet"
            );
            state.broadcaster.an_alle_senden(ControlMessage::push(
                ControlPayload::MessagePosted(nachricht_info(nachricht)),
            ));
        }
        Err(ChatError::UngueltigeEingabe(_)) => {}
        Err(e) => {
            tracing::error!(
                connection_id = %connection_id,
                fehler = %e,
                "Nachricht konnte nicht gespeichert werden"
            );
        }
    }
}

/// Loescht eine einzelne Nachricht (nur Moderator)
///
/// Eine unbekannte ID wird dem Absender als `NotFound` gemeldet.
pub async fn handle_chat_delete<R>(
    request: ChatDeleteRequest,
    request_id: u32,
    connection_id: ConnectionId,
    state: &Arc<SignalingState<R>>,
) -> Option<ControlMessage>
where
    R: MessageRepository + 'static,
{
    if let Err(e) = state.presence.autorisieren(connection_id) {
        tracing::debug!(connection_id = %connection_id, fehler = %e, "Loeschen verweigert");
        return None;
    }

    match state.chat_service.nachricht_loeschen(&request.id).await {
        Ok(id) => {
            state.broadcaster.an_alle_senden(ControlMessage::push(
                ControlPayload::MessageDeleted(ChatDeleteRequest { id: id.to_string() }),
            ));
            None
        }
        Err(ChatError::NachrichtNichtGefunden(id)) => Some(ControlMessage::error(
            request_id,
            ErrorCode::NotFound,
            format!("Nachricht nicht gefunden: {id}"),
        )),
        Err(e) => {
            tracing::error!(
                connection_id = %connection_id,
                fehler = %e,
                "Nachricht konnte nicht geloescht werden"
            );
            None
        }
    }
}

/// Leert den gesamten Chat (nur Moderator)
pub async fn handle_chat_clear<R>(connection_id: ConnectionId, state: &Arc<SignalingState<R>>)
where
    R: MessageRepository + 'static,
{
    if let Err(e) = state.presence.autorisieren(connection_id) {
        tracing::debug!(connection_id = %connection_id, fehler = %e, "Chat leeren verweigert");
        return;
    }
    chat_leeren(connection_id, state).await;
}

async fn chat_leeren<R>(connection_id: ConnectionId, state: &Arc<SignalingState<R>>)
where
    R: MessageRepository + 'static,
{
    match state.chat_service.alle_loeschen().await {
        Ok(_) => {
            state
                .broadcaster
                .an_alle_senden(ControlMessage::push(ControlPayload::ChatCleared));
        }
        Err(e) => {
            tracing::error!(
                connection_id = %connection_id,
                fehler = %e,
                "Chat konnte nicht geleert werden"
            );
        }
    }
}
