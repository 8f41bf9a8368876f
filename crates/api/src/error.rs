//! Fehlertypen fuer die REST-API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use lobby_chat::ChatError;
use serde_json::json;
use thiserror::Error;

/// Alle moeglichen Fehler im API-Crate
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Dienst-Fehler: {0}")]
    Dienst(String),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::UngueltigeEingabe(msg) => Self::UngueltigeEingabe(msg),
            andere => Self::Dienst(andere.to_string()),
        }
    }
}

impl ApiError {
    /// HTTP-Statuscode fuer REST-Fehler
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::UngueltigeEingabe(_) => StatusCode::BAD_REQUEST,
            Self::Dienst(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(fehler = %self, "REST-Anfrage fehlgeschlagen");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
