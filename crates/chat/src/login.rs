//! LoginService – Nickname-Registrierung fuer den HTTP-Login
//!
//! Der Login-Speicher ist unabhaengig von der Live-Presence: ein
//! erfolgreicher Login reserviert keinen Anzeigenamen.

use std::sync::Arc;

use lobby_core::bereinigen;
use lobby_db::UserRepository;

use crate::{
    error::{ChatError, ChatResult},
    types::Benutzer,
};

/// Maximale Laenge eines Nicknames in Zeichen
pub const MAX_NICKNAME_LAENGE: usize = 32;

pub struct LoginService<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> LoginService<R> {
    pub fn neu(repo: Arc<R>) -> Arc<Self> {
        Arc::new(Self { repo })
    }

    /// Registriert den Nickname falls noetig und liefert den Benutzer
    pub async fn anmelden(&self, nickname: &str) -> ChatResult<Benutzer> {
        let nickname = bereinigen(nickname, MAX_NICKNAME_LAENGE);
        if nickname.is_empty() {
            return Err(ChatError::UngueltigeEingabe(
                "Nickname darf nicht leer sein".into(),
            ));
        }

        let record = self.repo.upsert(&nickname).await?;
        tracing::info!(nickname = %record.nickname, rank = %record.rank, "Benutzer angemeldet");
        Ok(record.into())
    }
}
