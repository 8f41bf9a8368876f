//! Unit-Tests fuer den ChatService

use std::sync::Arc;

use lobby_core::MessageId;
use lobby_db::SqliteDb;

use crate::{error::ChatError, service::ChatService};

async fn test_db() -> Arc<SqliteDb> {
    Arc::new(SqliteDb::in_memory().await.expect("In-Memory-DB konnte nicht geoeffnet werden"))
}

#[tokio::test]
async fn test_nachricht_senden_erfolgreich() {
    let service = ChatService::neu(test_db().await);

    let nachricht = service
        .nachricht_senden("alice", "Hallo Welt!")
        .await
        .expect("Nachricht senden fehlgeschlagen");

    assert_eq!(nachricht.username, "alice");
    assert_eq!(nachricht.text, "Hallo Welt!");
}

#[tokio::test]
async fn test_text_wird_getrimmt() {
    let service = ChatService::neu(test_db().await);

    let nachricht = service
        .nachricht_senden("alice", "   Hallo   ")
        .await
        .expect("Nachricht senden fehlgeschlagen");

    assert_eq!(nachricht.text, "Hallo");
}

#[tokio::test]
async fn test_leere_nachricht_abgelehnt() {
    let service = ChatService::neu(test_db().await);

    let result = service.nachricht_senden("alice", "   ").await;
    assert!(matches!(result, Err(ChatError::UngueltigeEingabe(_))));
}

#[tokio::test]
async fn test_zu_lange_nachricht_gekuerzt() {
    let service = ChatService::neu(test_db().await);

    let zu_lang = "x".repeat(600);
    let nachricht = service
        .nachricht_senden("alice", &zu_lang)
        .await
        .expect("Nachricht senden fehlgeschlagen");

    assert_eq!(nachricht.text.chars().count(), 500);
}

#[tokio::test]
async fn test_verlauf_laden() {
    let service = ChatService::neu(test_db().await);

    for i in 1..=5 {
        service
            .nachricht_senden("bob", &format!("Nachricht {i}"))
            .await
            .expect("Nachricht senden fehlgeschlagen");
    }

    let verlauf = service.verlauf_laden(3).await.expect("Verlauf laden fehlgeschlagen");
    let texte: Vec<_> = verlauf.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texte, vec!["Nachricht 3", "Nachricht 4", "Nachricht 5"]);
}

#[tokio::test]
async fn test_nachricht_loeschen() {
    let service = ChatService::neu(test_db().await);

    let nachricht = service
        .nachricht_senden("alice", "Zu loeschen")
        .await
        .expect("Nachricht senden fehlgeschlagen");

    let geloescht = service
        .nachricht_loeschen(&nachricht.id.to_string())
        .await
        .expect("Nachricht loeschen fehlgeschlagen");
    assert_eq!(geloescht, nachricht.id);

    assert!(service.verlauf_laden(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unbekannte_nachricht_loeschen() {
    let service = ChatService::neu(test_db().await);

    let result = service.nachricht_loeschen(&MessageId::new().to_string()).await;
    assert!(matches!(result, Err(ChatError::NachrichtNichtGefunden(_))));

    let result = service.nachricht_loeschen("keine-uuid").await;
    assert!(matches!(result, Err(ChatError::NachrichtNichtGefunden(_))));
}

#[tokio::test]
async fn test_alle_loeschen() {
    let service = ChatService::neu(test_db().await);

    service.nachricht_senden("alice", "eins").await.unwrap();
    service.nachricht_senden("bob", "zwei").await.unwrap();

    assert_eq!(service.alle_loeschen().await.unwrap(), 2);
    assert!(service.verlauf_laden(10).await.unwrap().is_empty());
}
