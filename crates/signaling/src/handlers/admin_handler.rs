//! Admin-Handler – Befoerdern und Umbenennen anderer Teilnehmer
//!
//! Ohne Moderator-Rolle bleiben beide Aktionen wirkungslos.

use lobby_core::ConnectionId;
use lobby_db::MessageRepository;
use lobby_protocol::control::{AdminPromoteRequest, AdminRenameRequest};
use std::sync::Arc;

use crate::server_state::SignalingState;

pub fn handle_admin_promote<R>(
    request: AdminPromoteRequest,
    connection_id: ConnectionId,
    state: &Arc<SignalingState<R>>,
) where
    R: MessageRepository + 'static,
{
    let entscheidung = state.presence.befoerdern(connection_id, &request.username);
    state.broadcaster.zustellen(entscheidung);
}

pub fn handle_admin_rename<R>(
    request: AdminRenameRequest,
    connection_id: ConnectionId,
    state: &Arc<SignalingState<R>>,
) where
    R: MessageRepository + 'static,
{
    let entscheidung = state.presence.admin_umbenennen(
        connection_id,
        &request.old_username,
        &request.new_username,
    );
    state.broadcaster.zustellen(entscheidung);
}
