//! SQLite-Implementierung des UserRepository

use crate::error::DbError;
use crate::models::{BenutzerRecord, STANDARD_RANG};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::pool::SqliteDb;

impl UserRepository for SqliteDb {
    async fn upsert(&self, nickname: &str) -> DbResult<BenutzerRecord> {
        // Bestehende Zeilen bleiben unveraendert, daher ist der Aufruf idempotent
        let eingefuegt = sqlx::query(
            "INSERT INTO users (nickname, rank) VALUES (?, ?)
             ON CONFLICT(nickname) DO NOTHING",
        )
        .bind(nickname)
        .bind(STANDARD_RANG)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if eingefuegt > 0 {
            tracing::info!(nickname = %nickname, "Neuer Benutzer registriert");
        }

        self.get_by_nickname(nickname)
            .await?
            .ok_or_else(|| DbError::nicht_gefunden(format!("Benutzer '{nickname}'")))
    }

    async fn get_by_nickname(&self, nickname: &str) -> DbResult<Option<BenutzerRecord>> {
        use sqlx::Row as _;

        let row = sqlx::query("SELECT nickname, rank FROM users WHERE nickname = ?")
            .bind(nickname)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| -> DbResult<BenutzerRecord> {
            let rank: Option<String> = r.try_get("rank")?;
            Ok(BenutzerRecord {
                nickname: r.try_get("nickname")?,
                rank: rank
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| STANDARD_RANG.to_string()),
            })
        })
        .transpose()
    }
}
