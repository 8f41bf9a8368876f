//! lobby-server – Bibliotheks-Root
//!
//! Verdrahtet Datenbank, Dienste, Presence-Kern, REST-API und
//! TCP-Signaling zu einem lauffaehigen Server.

pub mod config;
pub mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use config::ServerConfig;
use lobby_api::{ApiState, RestServer, RestServerKonfig};
use lobby_chat::{ChatService, LoginService};
use lobby_db::SqliteDb;
use lobby_signaling::{PresenceCoordinator, SignalingServer, SignalingState};
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen und migrieren
    /// 2. Chat- und Login-Dienst sowie Presence-Kern aufbauen
    /// 3. REST-API starten
    /// 4. TCP-Signaling starten
    /// 5. Auf Ctrl-C warten, dann Shutdown an alle Subsysteme senden
    pub async fn starten(self) -> Result<()> {
        let tcp_addr = self.config.tcp_bind_adresse()?;
        let api_addr = self.config.api_bind_adresse()?;

        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %tcp_addr,
            api = %api_addr,
            "Server startet"
        );

        let db = Arc::new(
            SqliteDb::oeffnen(&self.config.datenbank_config())
                .await
                .with_context(|| format!("Datenbank '{}' nicht verfuegbar", self.config.datenbank.url))?,
        );

        let chat = ChatService::neu(Arc::clone(&db));
        let login = LoginService::neu(db);
        let presence = PresenceCoordinator::neu(self.config.presence_config());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let rest = RestServer::neu(RestServerKonfig {
            bind_addr: api_addr,
            cors_origins: self.config.netzwerk.cors_origins.clone(),
        });
        let rest_task = tokio::spawn(rest.starten(
            ApiState::neu(login, presence.clone()),
            shutdown_rx.clone(),
        ));

        let signaling_state =
            SignalingState::neu(self.config.signaling_config(), presence, chat);
        let signaling = SignalingServer::binden(signaling_state, tcp_addr)
            .await
            .with_context(|| format!("TCP-Port {tcp_addr} nicht verfuegbar"))?;

        let signal = async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
                Err(e) => tracing::error!(fehler = %e, "Signal-Handler fehlgeschlagen"),
            }
            let _ = shutdown_tx.send(true);
        };

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        let (signaling_ergebnis, ()) = tokio::join!(signaling.starten(shutdown_rx), signal);
        signaling_ergebnis.context("TCP-Signaling abgebrochen")?;

        rest_task
            .await
            .context("REST-Task abgebrochen")?
            .context("REST-Server fehlgeschlagen")?;

        tracing::info!("Server beendet");
        Ok(())
    }
}
