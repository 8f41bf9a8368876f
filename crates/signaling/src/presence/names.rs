//! Namens-Registry – Verbindung -> Anzeigename
//!
//! Haelt die Zuordnung jeder benannten Verbindung zu ihrem Anzeigenamen
//! und den umgekehrten Index Name -> Verbindung. Beide Maps werden nur
//! gemeinsam veraendert, die Registry ist daher nie inkonsistent.
//!
//! Kollisionen werden beim Eintragen aufgeloest: ist der gewuenschte Name
//! vergeben, wird das kleinste freie Suffix `#2`, `#3`, … angehaengt.

use std::collections::HashMap;

use lobby_core::{ConnectionId, LobbyError};

/// Zuordnung Verbindung <-> Anzeigename
#[derive(Debug, Default)]
pub struct NameRegistry {
    /// connection_id -> Anzeigename
    namen: HashMap<ConnectionId, String>,
    /// Anzeigename -> connection_id (Sekundaerindex)
    inhaber: HashMap<String, ConnectionId>,
}

impl NameRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Traegt `gewuenscht` (bereits bereinigt) fuer `conn` ein
    ///
    /// Ein eigener, frueherer Eintrag von `conn` zaehlt nicht als Kollision
    /// und wird ersetzt. Sind alle Suffixe bis `#max_suffix` belegt, bleibt
    /// die Registry unveraendert.
    pub fn reservieren(
        &mut self,
        conn: ConnectionId,
        gewuenscht: &str,
        max_suffix: u32,
    ) -> Result<String, LobbyError> {
        if gewuenscht.is_empty() {
            return Err(LobbyError::UngueltigeEingabe(
                "Name darf nicht leer sein".into(),
            ));
        }

        let endgueltig = self.freien_namen_finden(conn, gewuenscht, max_suffix)?;

        self.freigeben(conn);
        self.inhaber.insert(endgueltig.clone(), conn);
        self.namen.insert(conn, endgueltig.clone());

        tracing::trace!(connection_id = %conn, name = %endgueltig, "Name reserviert");
        Ok(endgueltig)
    }

    fn freien_namen_finden(
        &self,
        conn: ConnectionId,
        basis: &str,
        max_suffix: u32,
    ) -> Result<String, LobbyError> {
        if self.ist_frei_fuer(conn, basis) {
            return Ok(basis.to_string());
        }

        (2..=max_suffix)
            .map(|n| format!("{basis}#{n}"))
            .find(|kandidat| self.ist_frei_fuer(conn, kandidat))
            .ok_or_else(|| LobbyError::NamensraumErschoepft {
                basis: basis.to_string(),
                max: max_suffix,
            })
    }

    fn ist_frei_fuer(&self, conn: ConnectionId, name: &str) -> bool {
        self.inhaber.get(name).map_or(true, |c| *c == conn)
    }

    /// Entfernt den Eintrag von `conn`; unbekannte Verbindungen sind kein Fehler
    pub fn freigeben(&mut self, conn: ConnectionId) -> Option<String> {
        let name = self.namen.remove(&conn)?;
        if self.inhaber.get(&name) == Some(&conn) {
            self.inhaber.remove(&name);
        }
        Some(name)
    }

    /// Aktueller Name einer Verbindung
    pub fn name(&self, conn: ConnectionId) -> Option<&str> {
        self.namen.get(&conn).map(String::as_str)
    }

    /// Welche Verbindung haelt diesen Namen?
    pub fn inhaber(&self, name: &str) -> Option<ConnectionId> {
        self.inhaber.get(name).copied()
    }

    /// Alle Online-Namen, sortiert fuer die Anzeige
    ///
    /// Primaer ohne Beachtung der Gross-/Kleinschreibung, bei Gleichstand
    /// entscheidet der unveraenderte Name.
    pub fn namen_sortiert(&self) -> Vec<String> {
        let mut namen: Vec<String> = self.inhaber.keys().cloned().collect();
        namen.sort_by_cached_key(|n| (n.to_lowercase(), n.clone()));
        namen
    }

    pub fn anzahl(&self) -> usize {
        self.namen.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.namen.is_empty()
    }
}
