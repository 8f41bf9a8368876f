//! Gruppen-Handler – Name und Avatar der Gruppe

use lobby_core::ConnectionId;
use lobby_db::MessageRepository;
use lobby_protocol::control::{GroupAvatarRequest, GroupRenameRequest};
use std::sync::Arc;

use crate::server_state::SignalingState;

pub fn handle_group_rename<R>(
    request: GroupRenameRequest,
    connection_id: ConnectionId,
    state: &Arc<SignalingState<R>>,
) where
    R: MessageRepository + 'static,
{
    let entscheidung = state.presence.gruppenname_setzen(connection_id, &request.name);
    state.broadcaster.zustellen(entscheidung);
}

pub fn handle_group_avatar<R>(
    request: GroupAvatarRequest,
    connection_id: ConnectionId,
    state: &Arc<SignalingState<R>>,
) where
    R: MessageRepository + 'static,
{
    let entscheidung = state
        .presence
        .gruppenavatar_setzen(connection_id, &request.avatar_url);
    state.broadcaster.zustellen(entscheidung);
}
