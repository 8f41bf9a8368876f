//! SQLite-Implementierung des MessageRepository

use chrono::{DateTime, Utc};
use lobby_core::MessageId;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NachrichtRecord, NeueNachricht};
use crate::repository::{DbResult, MessageRepository};
use crate::sqlite::pool::SqliteDb;

impl MessageRepository for SqliteDb {
    async fn append(&self, data: NeueNachricht<'_>) -> DbResult<NachrichtRecord> {
        let id = MessageId::new();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO messages (id, username, text, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.username)
        .bind(data.text)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::trace!(message_id = %id, username = %data.username, "Nachricht gespeichert");

        Ok(NachrichtRecord {
            id,
            username: data.username.to_string(),
            text: data.text.to_string(),
            created_at: now,
        })
    }

    async fn recent(&self, limit: i64) -> DbResult<Vec<NachrichtRecord>> {
        // Neueste `limit` Zeilen waehlen, dann chronologisch ausgeben
        let rows = sqlx::query(
            "SELECT id, username, text, created_at FROM (
                 SELECT seq, id, username, text, created_at
                 FROM messages
                 ORDER BY seq DESC
                 LIMIT ?
             )
             ORDER BY seq ASC",
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_nachricht).collect()
    }

    async fn delete_one(&self, id: MessageId) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM messages")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn row_to_nachricht(row: &sqlx::sqlite::SqliteRow) -> DbResult<NachrichtRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map(MessageId)
        .map_err(|e| DbError::intern(format!("Ungueltige Nachrichten-UUID '{id_str}': {e}")))?;

    let created_at = parse_timestamp(row.try_get("created_at")?)?;

    Ok(NachrichtRecord {
        id,
        username: row.try_get("username")?,
        text: row.try_get("text")?,
        created_at,
    })
}

fn parse_timestamp(s: String) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Fallback fuer SQLite datetime()-Format
            chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| DbError::intern(format!("Ungueltige Zeitangabe '{s}': {e}")))
}
