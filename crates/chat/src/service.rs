//! ChatService – Nachrichten senden, Verlauf laden, loeschen

use std::sync::Arc;

use lobby_core::{bereinigen, MessageId};
use lobby_db::{models::NeueNachricht, MessageRepository};

use crate::{
    error::{ChatError, ChatResult},
    types::ChatNachricht,
};

/// Maximale Laenge einer Nachricht in Zeichen
pub const MAX_TEXT_LAENGE: usize = 500;

/// ChatService verwaltet den gemeinsamen Nachrichtenverlauf der Gruppe
pub struct ChatService<R: MessageRepository> {
    repo: Arc<R>,
    max_text_laenge: usize,
}

impl<R: MessageRepository> ChatService<R> {
    /// Erstellt einen neuen ChatService mit Standard-Textlimit
    pub fn neu(repo: Arc<R>) -> Arc<Self> {
        Self::mit_textlimit(repo, MAX_TEXT_LAENGE)
    }

    /// Erstellt einen ChatService mit eigenem Textlimit
    pub fn mit_textlimit(repo: Arc<R>, max_text_laenge: usize) -> Arc<Self> {
        Arc::new(Self {
            repo,
            max_text_laenge: max_text_laenge.clamp(1, MAX_TEXT_LAENGE),
        })
    }

    /// Nachricht speichern
    ///
    /// Der Text wird getrimmt und auf das Limit gekuerzt. Ein leerer
    /// Text wird abgelehnt.
    pub async fn nachricht_senden(&self, username: &str, text: &str) -> ChatResult<ChatNachricht> {
        let text = bereinigen(text, self.max_text_laenge);
        if text.is_empty() {
            return Err(ChatError::UngueltigeEingabe(
                "Nachrichteninhalt darf nicht leer sein".into(),
            ));
        }
        if username.is_empty() {
            return Err(ChatError::UngueltigeEingabe(
                "Absender darf nicht leer sein".into(),
            ));
        }

        let record = self
            .repo
            .append(NeueNachricht {
                username,
                text: &text,
            })
            .await?;

        tracing::debug!(message_id = %record.id, username = %username, "Nachricht gesendet");
        Ok(record.into())
    }

    /// Die neuesten `limit` Nachrichten laden, aelteste zuerst
    pub async fn verlauf_laden(&self, limit: i64) -> ChatResult<Vec<ChatNachricht>> {
        let records = self.repo.recent(limit).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Einzelne Nachricht loeschen
    ///
    /// `id` ist die Textform aus dem Protokoll; eine ungueltige oder
    /// unbekannte ID ergibt `NachrichtNichtGefunden`.
    pub async fn nachricht_loeschen(&self, id: &str) -> ChatResult<MessageId> {
        let message_id =
            MessageId::parsen(id).ok_or_else(|| ChatError::NachrichtNichtGefunden(id.to_string()))?;

        if !self.repo.delete_one(message_id).await? {
            return Err(ChatError::NachrichtNichtGefunden(id.to_string()));
        }

        tracing::debug!(message_id = %message_id, "Nachricht geloescht");
        Ok(message_id)
    }

    /// Gesamten Verlauf loeschen, gibt die Anzahl geloeschter Nachrichten zurueck
    pub async fn alle_loeschen(&self) -> ChatResult<u64> {
        let anzahl = self.repo.delete_all().await?;
        tracing::info!(anzahl, "Chat-Verlauf geleert");
        Ok(anzahl)
    }
}
