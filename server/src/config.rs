//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist. Einige Werte lassen sich zusaetzlich per
//! Umgebungsvariable ueberschreiben:
//!
//! - `LOBBY_MODERATOR_NAME`
//! - `LOBBY_GROUP_NAME`
//! - `LOBBY_GROUP_AVATAR_URL`
//! - `LOBBY_DATABASE_URL`

use std::net::SocketAddr;

use anyhow::Context;
use lobby_db::DatabaseConfig;
use lobby_signaling::{PresenceConfig, SignalingConfig};
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Chat- und Presence-Einstellungen
    pub chat: ChatEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale Anzahl gleichzeitiger Clients
    pub max_clients: u32,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Lobby Server".into(),
            max_clients: 512,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer TCP und REST
    pub bind_adresse: String,
    /// Port fuer das Control-Protokoll
    pub tcp_port: u16,
    /// Port fuer die REST-API
    pub api_port: u16,
    /// Server-Ping-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Inaktive Verbindungen werden nach dieser Zeit getrennt
    pub verbindungs_timeout_sek: u64,
    /// CORS-Origins fuer REST (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            tcp_port: 9987,
            api_port: 10080,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
            cors_origins: vec![],
        }
    }
}

/// Chat- und Presence-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEinstellungen {
    /// Reservierter Moderator-Name
    pub moderator_name: String,
    /// Startname der Gruppe
    pub gruppenname: String,
    /// Start-Avatar der Gruppe (leer = keiner)
    pub gruppen_avatar_url: String,
    /// Anzahl Nachrichten im Verlauf fuer Beitretende
    pub verlauf_limit: i64,
    pub max_name_laenge: usize,
    pub max_gruppenname_laenge: usize,
    pub max_avatar_laenge: usize,
    pub max_suffix: u32,
}

impl Default for ChatEinstellungen {
    fn default() -> Self {
        let p = PresenceConfig::default();
        Self {
            moderator_name: p.moderator_name,
            gruppenname: p.gruppenname,
            gruppen_avatar_url: p.gruppen_avatar_url,
            verlauf_limit: p.verlauf_limit,
            max_name_laenge: p.max_name_laenge,
            max_gruppenname_laenge: p.max_gruppenname_laenge,
            max_avatar_laenge: p.max_avatar_laenge,
            max_suffix: p.max_suffix,
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    /// WAL-Modus fuer SQLite
    pub sqlite_wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        let d = DatabaseConfig::default();
        Self {
            url: d.url,
            max_verbindungen: d.max_verbindungen,
            sqlite_wal: d.sqlite_wal,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei und wendet danach die
    /// Umgebungsvariablen an.
    /// Fehlt die Datei, wird die Standardkonfiguration verwendet.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        config.umgebung_anwenden(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Ueberschreibt Werte aus der Umgebung; `lookup` liefert den Wert
    /// einer Variable oder `None`
    pub fn umgebung_anwenden(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(wert) = lookup("LOBBY_MODERATOR_NAME") {
            self.chat.moderator_name = wert;
        }
        if let Some(wert) = lookup("LOBBY_GROUP_NAME") {
            self.chat.gruppenname = wert;
        }
        if let Some(wert) = lookup("LOBBY_GROUP_AVATAR_URL") {
            self.chat.gruppen_avatar_url = wert;
        }
        if let Some(wert) = lookup("LOBBY_DATABASE_URL") {
            self.datenbank.url = wert;
        }
    }

    /// Bind-Adresse fuer das Control-Protokoll
    pub fn tcp_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        adresse_parsen(&self.netzwerk.bind_adresse, self.netzwerk.tcp_port)
    }

    /// Bind-Adresse fuer die REST-API
    pub fn api_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        adresse_parsen(&self.netzwerk.bind_adresse, self.netzwerk.api_port)
    }

    pub fn presence_config(&self) -> PresenceConfig {
        PresenceConfig {
            moderator_name: self.chat.moderator_name.clone(),
            gruppenname: self.chat.gruppenname.clone(),
            gruppen_avatar_url: self.chat.gruppen_avatar_url.clone(),
            max_name_laenge: self.chat.max_name_laenge,
            max_gruppenname_laenge: self.chat.max_gruppenname_laenge,
            max_avatar_laenge: self.chat.max_avatar_laenge,
            verlauf_limit: self.chat.verlauf_limit,
            max_suffix: self.chat.max_suffix,
        }
    }

    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            max_clients: self.server.max_clients,
            keepalive_sek: self.netzwerk.keepalive_sek,
            verbindungs_timeout_sek: self.netzwerk.verbindungs_timeout_sek,
        }
    }

    pub fn datenbank_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.sqlite_wal,
        }
    }
}

fn adresse_parsen(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Ungueltige Bind-Adresse '{host}:{port}'"))
}
