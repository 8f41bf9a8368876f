//! REST-Handler fuer Benutzer-Endpunkte

use axum::{extract::State, response::Json};
use lobby_chat::Benutzer;
use lobby_protocol::control::PresenceList;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::rest::ApiState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub nickname: String,
}

/// POST /api/users/login – Nickname registrieren oder laden
pub async fn post_login(
    State(state): State<ApiState>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<Benutzer>> {
    let benutzer = state.login.anmelden(&body.nickname).await?;
    Ok(Json(benutzer))
}

/// GET /api/users/online – aktuelle Namensliste
pub async fn get_online(State(state): State<ApiState>) -> Json<PresenceList> {
    Json(state.presence.namen())
}
