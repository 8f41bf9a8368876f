//! lobby-api – REST-Schnittstelle
//!
//! Kleine HTTP-API neben dem TCP-Protokoll:
//! - `POST /api/users/login` – Nickname im Login-Speicher registrieren
//! - `GET /api/users/online` – aktuelle Namensliste des Presence-Kerns
//! - `GET /health` – Health-Check

pub mod error;
pub mod rest;

pub use error::{ApiError, ApiResult};
pub use rest::{ApiState, RestServer, RestServerKonfig};
