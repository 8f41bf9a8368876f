//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `SignalingServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen Task mit einer `ClientConnection`.
//!
//! ## Concurrency-Modell
//! Da die Repository-Traits async fn ohne Send-Garantie verwenden
//! (async_fn_in_trait), laufen alle Verbindungs-Tasks in einer
//! `tokio::task::LocalSet`. Der Presence-Kern selbst ist trotzdem
//! thread-safe und wird auch von der REST-API gelesen.

use futures_util::SinkExt;
use lobby_db::MessageRepository;
use lobby_protocol::{
    control::{ControlMessage, ErrorCode},
    wire::FrameCodec,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinSet, LocalSet};
use tokio_util::codec::Framed;

use crate::connection::ClientConnection;
use crate::error::SignalingError;
use crate::server_state::SignalingState;

/// Wie lange offene Verbindungen nach dem Shutdown noch laufen duerfen
const SHUTDOWN_FRIST: Duration = Duration::from_secs(5);

/// TCP-Signaling-Server
pub struct SignalingServer<R: MessageRepository + 'static> {
    state: Arc<SignalingState<R>>,
    listener: TcpListener,
}

impl<R: MessageRepository + 'static> SignalingServer<R> {
    /// Bindet den TCP-Socket
    ///
    /// Port 0 waehlt einen freien Port, siehe `lokale_addr`.
    pub async fn binden(
        state: Arc<SignalingState<R>>,
        bind_addr: SocketAddr,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        Ok(Self { state, listener })
    }

    /// Tatsaechlich gebundene Adresse
    pub fn lokale_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Akzeptiert Verbindungen bis `shutdown_rx` ein `true`-Signal empfaengt
    ///
    /// Verwendet eine `LocalSet` fuer alle Verbindungs-Tasks.
    pub async fn starten(self, shutdown_rx: watch::Receiver<bool>) -> std::io::Result<()> {
        let local = LocalSet::new();
        local.run_until(self.accept_loop(shutdown_rx)).await
    }

    /// Interne Accept-Loop (laeuft innerhalb der LocalSet)
    ///
    /// Nach dem Shutdown-Signal werden die offenen Verbindungs-Tasks noch
    /// zu Ende gefuehrt, damit jede ihre Abschiedsnachricht senden kann.
    async fn accept_loop(self, mut shutdown_rx: watch::Receiver<bool>) -> std::io::Result<()> {
        tracing::info!(
            adresse = %self.listener.local_addr()?,
            "TCP Signaling-Server gestartet"
        );

        let mut verbindungen = JoinSet::new();

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            self.annehmen(stream, peer_addr, &shutdown_rx, &mut verbindungen);
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    }
                }

                // Beendete Verbindungs-Tasks einsammeln
                Some(_) = verbindungen.join_next(), if !verbindungen.is_empty() => {}

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Signaling-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        let offen = verbindungen.len();
        let abschluss = async { while verbindungen.join_next().await.is_some() {} };
        if tokio::time::timeout(SHUTDOWN_FRIST, abschluss).await.is_err() {
            tracing::warn!(offen, "Verbindungen nach Shutdown-Frist abgebrochen");
        }

        tracing::info!("TCP Signaling-Server gestoppt");
        Ok(())
    }

    /// Nimmt eine Verbindung an oder lehnt sie ab
    ///
    /// Die Verbindung wird hier synchron registriert, damit die naechste
    /// Annahme den aktuellen Stand von `max_clients` sieht.
    fn annehmen(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
        shutdown_rx: &watch::Receiver<bool>,
        verbindungen: &mut JoinSet<()>,
    ) {
        // Client-Limit pruefen (auch anonyme Verbindungen zaehlen)
        let offen = self.state.broadcaster.client_anzahl() as u32;
        if offen >= self.state.config.max_clients {
            tracing::warn!(
                peer = %peer_addr,
                max = self.state.config.max_clients,
                "Server voll – Verbindung abgelehnt"
            );
            verbindungen.spawn_local(async move {
                let mut framed = Framed::new(stream, FrameCodec::new());
                let _ = framed
                    .send(ControlMessage::error(
                        0,
                        ErrorCode::ServerFull,
                        SignalingError::ServerVoll.to_string(),
                    ))
                    .await;
            });
            return;
        }

        tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");

        let verbindung = ClientConnection::neu(Arc::clone(&self.state), peer_addr);
        let shutdown_rx = shutdown_rx.clone();

        // Lokaler Task – kein Send erforderlich
        verbindungen.spawn_local(async move {
            verbindung.verarbeiten(stream, shutdown_rx).await;
        });
    }
}
