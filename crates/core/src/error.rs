//! Fehlertypen fuer Lobby
//!
//! Die Fehler-Taxonomie des Presence-Kerns. Keiner dieser Fehler beendet
//! eine Sitzung; der Aufrufer entscheidet, ob er still verworfen oder dem
//! Client als Ablehnung gemeldet wird.

use thiserror::Error;

/// Globaler Result-Alias fuer Lobby
pub type Result<T> = std::result::Result<T, LobbyError>;

/// Alle moeglichen Fehler im Lobby-Kern
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LobbyError {
    /// Leerer oder ungueltiger Name/Text
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    /// Reservierter Name ist bereits vergeben
    #[error("Name bereits vergeben: {0}")]
    NameVergeben(String),

    /// Alle Suffixe `#2` bis `#<max>` sind belegt
    #[error("Kein freier Name fuer '{basis}' (bis #{max} versucht)")]
    NamensraumErschoepft { basis: String, max: u32 },

    /// Privilegierte Aktion ohne Moderator-Rolle
    #[error("Nicht autorisiert: {0}")]
    NichtAutorisiert(String),
}
