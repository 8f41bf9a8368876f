//! Integration-Tests ueber echte TCP-Verbindungen (In-Memory SQLite)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use lobby_chat::ChatService;
use lobby_core::MessageId;
use lobby_db::SqliteDb;
use lobby_protocol::control::{
    ChatDeleteRequest, ChatSendRequest, ControlMessage, ControlPayload, ErrorCode, JoinRequest,
};
use lobby_protocol::wire::FrameCodec;
use lobby_signaling::{
    PresenceConfig, PresenceCoordinator, SignalingConfig, SignalingServer, SignalingState,
};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_util::codec::Framed;

type Client = Framed<TcpStream, FrameCodec>;

const WARTEZEIT: Duration = Duration::from_secs(5);

async fn server() -> (SignalingServer<SqliteDb>, SocketAddr) {
    server_mit(SignalingConfig::default()).await
}

async fn server_mit(config: SignalingConfig) -> (SignalingServer<SqliteDb>, SocketAddr) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let db = Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory DB konnte nicht erstellt werden"),
    );
    let state = SignalingState::neu(
        config,
        PresenceCoordinator::neu(PresenceConfig::default()),
        ChatService::neu(db),
    );
    let server = SignalingServer::binden(state, "127.0.0.1:0".parse().unwrap())
        .await
        .expect("Binden fehlgeschlagen");
    let addr = server.lokale_addr().unwrap();
    (server, addr)
}

async fn verbinden(addr: SocketAddr) -> Client {
    let stream = TcpStream::connect(addr).await.expect("Verbinden fehlgeschlagen");
    Framed::new(stream, FrameCodec::new())
}

async fn senden(client: &mut Client, request_id: u32, payload: ControlPayload) {
    client
        .send(ControlMessage::new(request_id, payload))
        .await
        .expect("Senden fehlgeschlagen");
}

/// Naechste Nachricht ausser Keepalive-Pings
async fn empfangen(client: &mut Client) -> ControlMessage {
    loop {
        let frame = tokio::time::timeout(WARTEZEIT, client.next())
            .await
            .expect("Keine Nachricht innerhalb der Wartezeit")
            .expect("Verbindung geschlossen")
            .expect("Ungueltiges Frame");
        if !matches!(frame.payload, ControlPayload::Ping(_)) {
            return frame;
        }
    }
}

/// Join senden und die vier Antworten des Beitritts abholen
async fn beitreten(client: &mut Client, name: &str) -> (String, bool) {
    senden(
        client,
        1,
        ControlPayload::Join(JoinRequest {
            username: name.into(),
        }),
    )
    .await;

    let akzeptiert = match empfangen(client).await.payload {
        ControlPayload::Accepted(a) => (a.username, a.is_moderator),
        andere => panic!("Accepted erwartet, erhalten: {andere:?}"),
    };
    assert!(matches!(empfangen(client).await.payload, ControlPayload::GroupState(_)));
    assert!(matches!(empfangen(client).await.payload, ControlPayload::PresenceChanged(_)));
    assert!(matches!(empfangen(client).await.payload, ControlPayload::ChatHistory(_)));
    akzeptiert
}

async fn namensliste(client: &mut Client) -> Vec<String> {
    match empfangen(client).await.payload {
        ControlPayload::PresenceChanged(l) => l.names,
        andere => panic!("PresenceChanged erwartet, erhalten: {andere:?}"),
    }
}

#[tokio::test]
async fn beitritt_liefert_alles_in_reihenfolge() {
    let (server, addr) = server().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = async move {
        let mut a = verbinden(addr).await;
        senden(&mut a, 1, ControlPayload::Join(JoinRequest { username: " Alice ".into() })).await;

        match empfangen(&mut a).await.payload {
            ControlPayload::Accepted(akz) => {
                assert_eq!(akz.username, "Alice");
                assert!(!akz.is_moderator);
            }
            andere => panic!("Accepted erwartet, erhalten: {andere:?}"),
        }
        match empfangen(&mut a).await.payload {
            ControlPayload::GroupState(g) => assert_eq!(g.moderator_name, "Moderator"),
            andere => panic!("GroupState erwartet, erhalten: {andere:?}"),
        }
        assert_eq!(namensliste(&mut a).await, vec!["Alice"]);
        match empfangen(&mut a).await.payload {
            ControlPayload::ChatHistory(h) => assert!(h.messages.is_empty()),
            andere => panic!("ChatHistory erwartet, erhalten: {andere:?}"),
        }

        shutdown_tx.send(true).unwrap();
    };

    let (ergebnis, ()) = tokio::join!(server.starten(shutdown_rx), client);
    ergebnis.unwrap();
}

#[tokio::test]
async fn chat_senden_und_loeschen() {
    let (server, addr) = server().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = async move {
        let mut a = verbinden(addr).await;
        assert_eq!(beitreten(&mut a, "Moderator").await, ("Moderator".to_string(), true));

        let mut b = verbinden(addr).await;
        assert_eq!(beitreten(&mut b, "Bob").await, ("Bob".to_string(), false));
        assert_eq!(namensliste(&mut a).await, vec!["Bob", "Moderator"]);

        senden(&mut b, 2, ControlPayload::ChatSend(ChatSendRequest { text: "Hallo".into() })).await;
        let id = match empfangen(&mut a).await.payload {
            ControlPayload::MessagePosted(n) => {
                assert_eq!(n.username, "Bob");
                assert_eq!(n.text, "Hallo");
                n.id
            }
            andere => panic!("MessagePosted erwartet, erhalten: {andere:?}"),
        };
        assert!(matches!(empfangen(&mut b).await.payload, ControlPayload::MessagePosted(_)));

        // Ohne Rolle passiert nichts; der Pong kommt als naechstes
        senden(&mut b, 3, ControlPayload::ChatDelete(ChatDeleteRequest { id: id.clone() })).await;
        senden(&mut b, 4, ControlMessage::ping(4, 1).payload).await;
        let pong = empfangen(&mut b).await;
        assert_eq!(pong.request_id, 4);
        assert!(matches!(pong.payload, ControlPayload::Pong(_)));

        senden(&mut a, 5, ControlPayload::ChatDelete(ChatDeleteRequest { id: id.clone() })).await;
        for client in [&mut a, &mut b] {
            match empfangen(client).await.payload {
                ControlPayload::MessageDeleted(d) => assert_eq!(d.id, id),
                andere => panic!("MessageDeleted erwartet, erhalten: {andere:?}"),
            }
        }

        let unbekannt = MessageId::new().to_string();
        senden(&mut a, 6, ControlPayload::ChatDelete(ChatDeleteRequest { id: unbekannt })).await;
        let fehler = empfangen(&mut a).await;
        assert_eq!(fehler.request_id, 6);
        assert!(matches!(
            fehler.payload,
            ControlPayload::Error(ref e) if e.code == ErrorCode::NotFound
        ));

        shutdown_tx.send(true).unwrap();
    };

    let (ergebnis, ()) = tokio::join!(server.starten(shutdown_rx), client);
    ergebnis.unwrap();
}

#[tokio::test]
async fn clear_befehl_vom_moderator_leert_chat() {
    let (server, addr) = server().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = async move {
        let mut a = verbinden(addr).await;
        beitreten(&mut a, "Moderator").await;

        senden(&mut a, 2, ControlPayload::ChatSend(ChatSendRequest { text: "eins".into() })).await;
        assert!(matches!(empfangen(&mut a).await.payload, ControlPayload::MessagePosted(_)));

        senden(&mut a, 3, ControlPayload::ChatSend(ChatSendRequest { text: " /clear ".into() })).await;
        assert!(matches!(empfangen(&mut a).await.payload, ControlPayload::ChatCleared));

        let mut b = verbinden(addr).await;
        senden(&mut b, 1, ControlPayload::Join(JoinRequest { username: "Bob".into() })).await;
        let mut verlauf = None;
        for _ in 0..4 {
            if let ControlPayload::ChatHistory(h) = empfangen(&mut b).await.payload {
                verlauf = Some(h.messages);
            }
        }
        assert_eq!(verlauf, Some(Vec::new()));

        shutdown_tx.send(true).unwrap();
    };

    let (ergebnis, ()) = tokio::join!(server.starten(shutdown_rx), client);
    ergebnis.unwrap();
}

#[tokio::test]
async fn trennen_aktualisiert_namensliste() {
    let (server, addr) = server().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = async move {
        let mut a = verbinden(addr).await;
        beitreten(&mut a, "Moderator").await;
        let mut b = verbinden(addr).await;
        beitreten(&mut b, "Bob").await;
        namensliste(&mut a).await;

        drop(a);
        assert_eq!(namensliste(&mut b).await, vec!["Bob"]);

        // Platz ist wieder frei
        let mut c = verbinden(addr).await;
        assert_eq!(beitreten(&mut c, "Moderator").await, ("Moderator".to_string(), true));

        shutdown_tx.send(true).unwrap();
    };

    let (ergebnis, ()) = tokio::join!(server.starten(shutdown_rx), client);
    ergebnis.unwrap();
}

#[tokio::test]
async fn server_nachricht_vom_client_ergibt_fehler() {
    let (server, addr) = server().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = async move {
        let mut a = verbinden(addr).await;
        senden(&mut a, 9, ControlPayload::ChatCleared).await;

        let antwort = empfangen(&mut a).await;
        assert_eq!(antwort.request_id, 9);
        assert!(matches!(
            antwort.payload,
            ControlPayload::Error(ref e) if e.code == ErrorCode::InvalidRequest
        ));

        shutdown_tx.send(true).unwrap();
    };

    let (ergebnis, ()) = tokio::join!(server.starten(shutdown_rx), client);
    ergebnis.unwrap();
}

#[tokio::test]
async fn ungueltiges_frame_schliesst_verbindung() {
    let (server, addr) = server().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(&5u32.to_be_bytes()).await.unwrap();
        stream.write_all(b"nope!").await.unwrap();

        let mut framed = Framed::new(stream, FrameCodec::new());
        let ende = tokio::time::timeout(WARTEZEIT, framed.next())
            .await
            .expect("Server hat die Verbindung nicht geschlossen");
        assert!(!matches!(ende, Some(Ok(_))));

        shutdown_tx.send(true).unwrap();
    };

    let (ergebnis, ()) = tokio::join!(server.starten(shutdown_rx), client);
    ergebnis.unwrap();
}

#[tokio::test]
async fn max_clients_gilt_fuer_gleichzeitig_wartende_verbindungen() {
    let (server, addr) = server_mit(SignalingConfig {
        max_clients: 1,
        ..SignalingConfig::default()
    })
    .await;

    // Alle vier stehen schon im Backlog, bevor die Accept-Loop laeuft
    let mut clients = Vec::new();
    for _ in 0..4 {
        clients.push(verbinden(addr).await);
    }
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = async move {
        let mut offen = Vec::new();
        let mut abgelehnt = 0;
        for mut c in clients {
            match tokio::time::timeout(Duration::from_millis(500), c.next()).await {
                Ok(Some(Ok(antwort))) => {
                    assert!(matches!(
                        antwort.payload,
                        ControlPayload::Error(ref e) if e.code == ErrorCode::ServerFull
                    ));
                    abgelehnt += 1;
                }
                Err(_) => offen.push(c),
                Ok(andere) => panic!("ServerFull oder Stille erwartet, erhalten: {andere:?}"),
            }
        }
        assert_eq!(abgelehnt, 3);
        assert_eq!(offen.len(), 1);

        assert_eq!(beitreten(&mut offen[0], "u0").await, ("u0".to_string(), false));

        shutdown_tx.send(true).unwrap();
    };

    let (ergebnis, ()) = tokio::join!(server.starten(shutdown_rx), client);
    ergebnis.unwrap();
}

#[tokio::test]
async fn shutdown_sendet_abschied_an_offene_verbindungen() {
    let (server, addr) = server().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = async move {
        let mut a = verbinden(addr).await;
        beitreten(&mut a, "Alice").await;

        shutdown_tx.send(true).unwrap();
        let abschied = empfangen(&mut a).await;
        assert!(matches!(
            abschied.payload,
            ControlPayload::Error(ref e) if e.code == ErrorCode::InternalError
        ));
    };

    let (ergebnis, ()) = tokio::join!(server.starten(shutdown_rx), client);
    ergebnis.unwrap();
}
