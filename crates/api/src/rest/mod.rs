//! REST-Interface fuer Lobby

pub mod handlers;
pub mod routes;
pub mod server;

use std::sync::Arc;

use lobby_chat::LoginService;
use lobby_db::SqliteDb;
use lobby_signaling::PresenceCoordinator;

/// Axum-State fuer den REST-Server
#[derive(Clone)]
pub struct ApiState {
    pub login: Arc<LoginService<SqliteDb>>,
    pub presence: PresenceCoordinator,
}

impl ApiState {
    pub fn neu(login: Arc<LoginService<SqliteDb>>, presence: PresenceCoordinator) -> Self {
        Self { login, presence }
    }
}

pub use server::{RestServer, RestServerKonfig};
