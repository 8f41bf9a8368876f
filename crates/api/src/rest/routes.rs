//! Route-Definitionen fuer die REST-API

use axum::{
    routing::{get, post},
    Router,
};

use crate::rest::{handlers, ApiState};

/// Erstellt den vollstaendigen Router (ohne Layer)
pub fn api_router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Benutzer
        .route("/api/users/login", post(handlers::users::post_login))
        .route("/api/users/online", get(handlers::users::get_online))
}
