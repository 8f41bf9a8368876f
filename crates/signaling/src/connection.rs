//! Client-Connection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! lokalen Task und eine frische `ConnectionId`.
//!
//! ## Ablauf
//! ```text
//! registrieren -> Schleife (Frames | Broadcast-Queue | Ping | Shutdown) -> trennen
//! ```
//! Das Trennen laeuft genau einmal, egal warum die Schleife endet.
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen Ping
//! - Kommt innerhalb von `verbindungs_timeout_sek` kein Frame, wird getrennt

use futures_util::{SinkExt, StreamExt};
use lobby_core::ConnectionId;
use lobby_db::MessageRepository;
use lobby_protocol::{
    control::{ControlMessage, ErrorCode},
    wire::FrameCodec,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::codec::Framed;

use crate::dispatcher::{jetzt_ms, DispatcherContext, MessageDispatcher};
use crate::error::{SignalingError, SignalingResult};
use crate::handlers::presence_handler;
use crate::server_state::SignalingState;

/// Warum die Verbindungsschleife regulaer endete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ende {
    /// Client hat die Verbindung geschlossen
    Geschlossen,
    /// Server faehrt herunter
    Shutdown,
}

/// Verarbeitet eine einzelne Verbindung
///
/// Liest Frames via `FrameCodec`, dispatcht an `MessageDispatcher` und
/// sendet Antworten und Broadcasts zurueck.
pub struct ClientConnection<R: MessageRepository + 'static> {
    state: Arc<SignalingState<R>>,
    ctx: DispatcherContext,
    queue: mpsc::Receiver<ControlMessage>,
}

impl<R: MessageRepository + 'static> ClientConnection<R> {
    /// Erstellt eine neue ClientConnection mit frischer ID
    ///
    /// Registriert die Verbindung sofort im Broadcaster; ab hier zaehlt sie
    /// gegen `max_clients`.
    pub fn neu(state: Arc<SignalingState<R>>, peer_addr: SocketAddr) -> Self {
        let connection_id = ConnectionId::new();
        let queue = state.broadcaster.client_registrieren(connection_id);
        Self {
            state,
            ctx: DispatcherContext {
                connection_id,
                peer_addr,
            },
            queue,
        }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht; danach ist die Verbindung aus Presence und Broadcaster
    /// entfernt.
    pub async fn verarbeiten<S>(self, stream: S, shutdown_rx: watch::Receiver<bool>)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let Self { state, ctx, queue } = self;
        let conn = ctx.connection_id;
        tracing::info!(connection_id = %conn, peer = %ctx.peer_addr, "Neue Verbindung");

        let framed = Framed::new(stream, FrameCodec::new());

        match schleife(&state, &ctx, framed, queue, shutdown_rx).await {
            Ok(Ende::Geschlossen) => {
                tracing::info!(connection_id = %conn, "Verbindung vom Client getrennt");
            }
            Ok(Ende::Shutdown) => {
                tracing::info!(connection_id = %conn, "Verbindung wegen Shutdown getrennt");
            }
            Err(e) => {
                tracing::warn!(connection_id = %conn, fehler = %e, "Verbindung abgebrochen");
            }
        }

        presence_handler::handle_disconnect(conn, &state);
        tracing::info!(connection_id = %conn, "Verbindungs-Task beendet");
    }
}

async fn schleife<R, S>(
    state: &Arc<SignalingState<R>>,
    ctx: &DispatcherContext,
    mut framed: Framed<S, FrameCodec>,
    mut queue: mpsc::Receiver<ControlMessage>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> SignalingResult<Ende>
where
    R: MessageRepository + 'static,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let keepalive_intervall = Duration::from_secs(state.config.keepalive_sek);
    let timeout_dauer = Duration::from_secs(state.config.verbindungs_timeout_sek);
    let dispatcher = MessageDispatcher::neu(Arc::clone(state));

    let mut letzter_empfang = Instant::now();
    let mut naechster_ping = Instant::now() + keepalive_intervall;
    let mut ping_request_id: u32 = 0;

    loop {
        let frist = letzter_empfang + timeout_dauer;

        tokio::select! {
            // Eingehende Nachricht vom Client
            frame = framed.next() => {
                let nachricht = match frame {
                    Some(Ok(n)) => n,
                    Some(Err(e)) => {
                        return Err(SignalingError::protokoll(format!("Frame-Lesefehler: {e}")));
                    }
                    None => return Ok(Ende::Geschlossen),
                };
                letzter_empfang = Instant::now();
                tracing::trace!(
                    connection_id = %ctx.connection_id,
                    request_id = nachricht.request_id,
                    "Nachricht empfangen"
                );

                if let Some(antwort) = dispatcher.dispatch(nachricht, ctx).await {
                    framed.send(antwort).await?;
                }
            }

            // Ausgehende Nachricht aus dem Broadcaster
            Some(ausgehend) = queue.recv() => {
                framed.send(ausgehend).await?;
            }

            // Keepalive-Ping
            _ = tokio::time::sleep_until(naechster_ping) => {
                ping_request_id = ping_request_id.wrapping_add(1);
                framed.send(ControlMessage::ping(ping_request_id, jetzt_ms())).await?;
                naechster_ping = Instant::now() + keepalive_intervall;
            }

            // Kein Frame innerhalb des Timeouts
            _ = tokio::time::sleep_until(frist) => {
                return Err(SignalingError::Timeout);
            }

            // Shutdown-Signal
            Ok(()) = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    let abschied = ControlMessage::error(
                        0,
                        ErrorCode::InternalError,
                        "Server wird heruntergefahren",
                    );
                    let _ = framed.send(abschied).await;
                    return Ok(Ende::Shutdown);
                }
            }
        }
    }
}
