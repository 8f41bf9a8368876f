//! Presence-Koordinator – Beitritt, Umbenennung, Trennung, Admin-Aktionen
//!
//! Vereint `NameRegistry`, `ModeratorAuthority` und `GroupState` hinter
//! einem einzigen Mutex. Jeder Uebergang prueft, reserviert, aendert Rollen
//! und legt die Zustellungen fest, ohne den Lock dazwischen abzugeben. Die
//! eigentliche Zustellung an die Verbindungen passiert danach ausserhalb.
//!
//! ## Zustaende pro Verbindung
//! ```text
//! Anonym --Join--> Benannt --Disconnect--> (entfernt)
//!                   Benannt --Join/Rename--> Benannt
//! ```
//! Eine Verbindung ist genau dann benannt, wenn die Registry einen Eintrag
//! fuer sie hat.

use std::sync::Arc;

use lobby_core::{bereinigen, ConnectionId, LobbyError};
use lobby_protocol::control::{
    AcceptedEvent, ControlPayload, GroupStateChange, GroupStateEvent, PresenceList,
    RejectionEvent,
};
use parking_lot::Mutex;

use super::authority::ModeratorAuthority;
use super::group::GroupState;
use super::names::NameRegistry;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Grenzwerte und Startwerte des Presence-Kerns
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// Reservierter Moderator-Name
    pub moderator_name: String,
    /// Startname der Gruppe
    pub gruppenname: String,
    /// Start-Avatar der Gruppe (leer = keiner)
    pub gruppen_avatar_url: String,
    pub max_name_laenge: usize,
    pub max_gruppenname_laenge: usize,
    pub max_avatar_laenge: usize,
    /// Anzahl Nachrichten im Verlauf fuer Beitretende
    pub verlauf_limit: i64,
    /// Hoechstes Namens-Suffix (`#2` bis `#max_suffix`)
    pub max_suffix: u32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            moderator_name: "Moderator".into(),
            gruppenname: "Allgemeiner Chat".into(),
            gruppen_avatar_url: String::new(),
            max_name_laenge: 32,
            max_gruppenname_laenge: 64,
            max_avatar_laenge: 256,
            verlauf_limit: 200,
            max_suffix: 999,
        }
    }
}

// ---------------------------------------------------------------------------
// Entscheidung
// ---------------------------------------------------------------------------

/// Empfaenger einer Zustellung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ziel {
    Verbindung(ConnectionId),
    Alle,
}

#[derive(Debug, Clone)]
pub struct Zustellung {
    pub ziel: Ziel,
    pub payload: ControlPayload,
}

/// Ergebnis eines Uebergangs: was an wen geht, in dieser Reihenfolge
#[derive(Debug, Clone, Default)]
pub struct Entscheidung {
    pub zustellungen: Vec<Zustellung>,
    /// Der Ausloeser soll zusaetzlich den Nachrichten-Verlauf bekommen
    pub verlauf_senden: bool,
}

impl Entscheidung {
    /// Keine Zustandsaenderung, nichts zu senden
    pub fn keine() -> Self {
        Self::default()
    }

    pub fn ist_leer(&self) -> bool {
        self.zustellungen.is_empty() && !self.verlauf_senden
    }

    fn an(mut self, conn: ConnectionId, payload: ControlPayload) -> Self {
        self.zustellungen.push(Zustellung {
            ziel: Ziel::Verbindung(conn),
            payload,
        });
        self
    }

    fn an_alle(mut self, payload: ControlPayload) -> Self {
        self.zustellungen.push(Zustellung {
            ziel: Ziel::Alle,
            payload,
        });
        self
    }

    fn abgelehnt(conn: ConnectionId, grund: impl Into<String>) -> Self {
        Self::keine().an(
            conn,
            ControlPayload::NameRejected(RejectionEvent {
                reason: grund.into(),
            }),
        )
    }
}

// ---------------------------------------------------------------------------
// Zustand hinter dem Lock
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct PresenceState {
    namen: NameRegistry,
    autoritaet: ModeratorAuthority,
    gruppe: GroupState,
    /// Revision der zuletzt verteilten Namensliste
    revision: u64,
}

impl PresenceState {
    /// Naechste Namensliste; erhoeht die Revision
    fn naechste_liste(&mut self) -> ControlPayload {
        self.revision += 1;
        ControlPayload::PresenceChanged(PresenceList {
            revision: self.revision,
            names: self.namen.namen_sortiert(),
        })
    }

    /// Der reservierte Name ist frei fuer `conn` (Platz und Registry)
    fn reservierter_name_frei(&self, conn: ConnectionId) -> bool {
        let reserviert = self.autoritaet.reservierter_name();
        self.autoritaet.kann_beanspruchen(conn)
            && self.namen.inhaber(reserviert).map_or(true, |c| c == conn)
    }

    fn akzeptiert(&self, conn: ConnectionId, name: String) -> ControlPayload {
        ControlPayload::Accepted(AcceptedEvent {
            username: name,
            is_moderator: self.autoritaet.hat_rolle(conn),
        })
    }
}

// ---------------------------------------------------------------------------
// PresenceCoordinator
// ---------------------------------------------------------------------------

/// Gemeinsamer Presence- und Autoritaetszustand
///
/// Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct PresenceCoordinator {
    config: Arc<PresenceConfig>,
    state: Arc<Mutex<PresenceState>>,
}

fn name_vergeben(name: &str) -> String {
    LobbyError::NameVergeben(name.to_string()).to_string()
}

impl PresenceCoordinator {
    /// Der reservierte Name wird wie ein Join-Name bereinigt; ein leerer
    /// Wert faellt auf den Standard zurueck.
    pub fn neu(mut config: PresenceConfig) -> Self {
        let reserviert = bereinigen(&config.moderator_name, config.max_name_laenge);
        if reserviert.is_empty() {
            tracing::warn!("Leerer Moderator-Name konfiguriert, verwende Standard");
            config.moderator_name = PresenceConfig::default().moderator_name;
        } else {
            config.moderator_name = reserviert;
        }

        let state = PresenceState {
            namen: NameRegistry::neu(),
            autoritaet: ModeratorAuthority::neu(config.moderator_name.clone()),
            gruppe: GroupState::neu(
                bereinigen(&config.gruppenname, config.max_gruppenname_laenge),
                bereinigen(&config.gruppen_avatar_url, config.max_avatar_laenge),
            ),
            revision: 0,
        };
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn config(&self) -> &PresenceConfig {
        &self.config
    }

    /// Beitritt einer Verbindung
    ///
    /// Ein erneuter Join einer benannten Verbindung laeuft komplett neu durch
    /// und ersetzt deren bisherigen Namen.
    pub fn beitreten(&self, conn: ConnectionId, roh: &str) -> Entscheidung {
        let gewuenscht = bereinigen(roh, self.config.max_name_laenge);
        if gewuenscht.is_empty() {
            return Entscheidung::keine();
        }

        let mut s = self.state.lock();
        let alt = s.namen.name(conn).map(str::to_string);

        let anspruch = s.autoritaet.ist_reserviert(&gewuenscht);
        if anspruch && !s.reservierter_name_frei(conn) {
            tracing::info!(connection_id = %conn, "Moderator-Name beim Join abgelehnt");
            return Entscheidung::abgelehnt(conn, name_vergeben(&gewuenscht));
        }

        let name = match s.namen.reservieren(conn, &gewuenscht, self.config.max_suffix) {
            Ok(n) => n,
            Err(e) => return Entscheidung::abgelehnt(conn, e.to_string()),
        };
        if anspruch {
            s.autoritaet.beanspruchen(conn, &name);
        } else if let Some(alt) = &alt {
            s.autoritaet.bei_umbenennung(conn, alt, &name);
        }

        tracing::info!(
            connection_id = %conn,
            name = %name,
            moderator = anspruch,
            erneut = alt.is_some(),
            "Verbindung beigetreten"
        );

        let akzeptiert = s.akzeptiert(conn, name);
        let gruppe = ControlPayload::GroupState(s.gruppe.snapshot(&self.config.moderator_name));
        let liste = s.naechste_liste();

        let mut e = Entscheidung::keine()
            .an(conn, akzeptiert)
            .an(conn, gruppe)
            .an_alle(liste);
        e.verlauf_senden = true;
        e
    }

    /// Eigenen Namen aendern
    pub fn umbenennen(&self, conn: ConnectionId, roh: &str) -> Entscheidung {
        let gewuenscht = bereinigen(roh, self.config.max_name_laenge);
        if gewuenscht.is_empty() {
            return Entscheidung::keine();
        }

        let mut s = self.state.lock();
        let alt = match s.namen.name(conn) {
            Some(n) => n.to_string(),
            None => return Entscheidung::keine(),
        };

        if s.autoritaet.hat_rolle(conn) {
            return Entscheidung::keine().an(
                conn,
                ControlPayload::RenameDenied(RejectionEvent {
                    reason: "Moderatoren koennen ihren Namen nicht aendern".into(),
                }),
            );
        }

        let anspruch = s.autoritaet.ist_reserviert(&gewuenscht);
        if anspruch && !s.reservierter_name_frei(conn) {
            return Entscheidung::abgelehnt(conn, name_vergeben(&gewuenscht));
        }

        let name = match s.namen.reservieren(conn, &gewuenscht, self.config.max_suffix) {
            Ok(n) => n,
            Err(e) => return Entscheidung::abgelehnt(conn, e.to_string()),
        };
        if anspruch {
            s.autoritaet.beanspruchen(conn, &name);
        } else {
            s.autoritaet.bei_umbenennung(conn, &alt, &name);
        }

        tracing::info!(connection_id = %conn, alt = %alt, neu = %name, "Verbindung umbenannt");

        let akzeptiert = s.akzeptiert(conn, name);
        let liste = s.naechste_liste();
        Entscheidung::keine().an(conn, akzeptiert).an_alle(liste)
    }

    /// Moderator-Rolle eines anderen Teilnehmers umschalten
    pub fn befoerdern(&self, akteur: ConnectionId, ziel_roh: &str) -> Entscheidung {
        let ziel_name = bereinigen(ziel_roh, self.config.max_name_laenge);

        let mut s = self.state.lock();
        if !s.autoritaet.hat_rolle(akteur) {
            tracing::debug!(connection_id = %akteur, "Befoerderung ohne Rolle ignoriert");
            return Entscheidung::keine();
        }
        let ziel = match s.namen.inhaber(&ziel_name) {
            Some(z) if z != akteur => z,
            _ => return Entscheidung::keine(),
        };

        let neu = match s.autoritaet.rolle_umschalten(akteur, ziel, &ziel_name) {
            Ok(neu) => neu,
            Err(e) => {
                tracing::debug!(connection_id = %akteur, fehler = %e, "Befoerderung verworfen");
                return Entscheidung::keine();
            }
        };

        let akzeptiert = ControlPayload::Accepted(AcceptedEvent {
            username: ziel_name,
            is_moderator: neu,
        });
        let liste = s.naechste_liste();
        Entscheidung::keine().an(ziel, akzeptiert).an_alle(liste)
    }

    /// Anderen Teilnehmer umbenennen (nur Moderator)
    pub fn admin_umbenennen(
        &self,
        akteur: ConnectionId,
        alt_name: &str,
        neu_roh: &str,
    ) -> Entscheidung {
        let alt_name = alt_name.trim();
        let gewuenscht = bereinigen(neu_roh, self.config.max_name_laenge);
        if alt_name.is_empty() || gewuenscht.is_empty() {
            return Entscheidung::keine();
        }

        let mut s = self.state.lock();
        if !s.autoritaet.hat_rolle(akteur) {
            tracing::debug!(connection_id = %akteur, "Admin-Umbenennung ohne Rolle ignoriert");
            return Entscheidung::keine();
        }
        let ziel = match s.namen.inhaber(alt_name) {
            Some(z) => z,
            None => return Entscheidung::keine(),
        };

        let anspruch = s.autoritaet.ist_reserviert(&gewuenscht);
        if anspruch && !s.reservierter_name_frei(ziel) {
            return Entscheidung::abgelehnt(akteur, name_vergeben(&gewuenscht));
        }

        let name = match s.namen.reservieren(ziel, &gewuenscht, self.config.max_suffix) {
            Ok(n) => n,
            Err(e) => return Entscheidung::abgelehnt(akteur, e.to_string()),
        };
        if anspruch {
            s.autoritaet.beanspruchen(ziel, &name);
        } else {
            s.autoritaet.bei_umbenennung(ziel, alt_name, &name);
        }

        tracing::info!(akteur = %akteur, ziel = %ziel, alt = %alt_name, neu = %name, "Admin-Umbenennung");

        let akzeptiert = s.akzeptiert(ziel, name);
        let liste = s.naechste_liste();
        Entscheidung::keine().an(ziel, akzeptiert).an_alle(liste)
    }

    /// Verbindung getrennt; mehrfacher Aufruf wirkt wie einer
    pub fn trennen(&self, conn: ConnectionId) -> Entscheidung {
        let mut s = self.state.lock();
        let entfernt = s.namen.freigeben(conn);
        s.autoritaet.primaer_freigeben_falls(conn);

        match entfernt {
            Some(name) => {
                tracing::info!(connection_id = %conn, name = %name, "Verbindung ausgetreten");
                let liste = s.naechste_liste();
                Entscheidung::keine().an_alle(liste)
            }
            None => Entscheidung::keine(),
        }
    }

    /// Gruppenname setzen (nur Moderator)
    pub fn gruppenname_setzen(&self, akteur: ConnectionId, roh: &str) -> Entscheidung {
        let mut s = self.state.lock();
        if !s.autoritaet.hat_rolle(akteur) {
            return Entscheidung::keine();
        }
        let name = match s.gruppe.umbenennen(roh, self.config.max_gruppenname_laenge) {
            Some(n) => n.to_string(),
            None => return Entscheidung::keine(),
        };

        tracing::info!(akteur = %akteur, name = %name, "Gruppe umbenannt");
        Entscheidung::keine().an_alle(ControlPayload::GroupStateChanged(GroupStateChange {
            name: Some(name),
            avatar_url: None,
        }))
    }

    /// Gruppen-Avatar setzen oder entfernen (nur Moderator)
    pub fn gruppenavatar_setzen(&self, akteur: ConnectionId, roh: &str) -> Entscheidung {
        let mut s = self.state.lock();
        if !s.autoritaet.hat_rolle(akteur) {
            return Entscheidung::keine();
        }
        let url = s
            .gruppe
            .avatar_setzen(roh, self.config.max_avatar_laenge)
            .to_string();

        tracing::info!(akteur = %akteur, avatar_url = %url, "Gruppen-Avatar geaendert");
        Entscheidung::keine().an_alle(ControlPayload::GroupStateChanged(GroupStateChange {
            name: None,
            avatar_url: Some(url),
        }))
    }

    /// Rollenpruefung fuer Nachrichten-Loeschung und Chat-Leerung
    pub fn autorisieren(&self, conn: ConnectionId) -> Result<(), LobbyError> {
        if self.state.lock().autoritaet.hat_rolle(conn) {
            Ok(())
        } else {
            Err(LobbyError::NichtAutorisiert(
                "Moderator-Rolle erforderlich".into(),
            ))
        }
    }

    // -----------------------------------------------------------------------
    // Lesezugriffe
    // -----------------------------------------------------------------------

    pub fn anzeigename(&self, conn: ConnectionId) -> Option<String> {
        self.state.lock().namen.name(conn).map(str::to_string)
    }

    pub fn ist_moderator(&self, conn: ConnectionId) -> bool {
        self.state.lock().autoritaet.hat_rolle(conn)
    }

    pub fn primaer(&self) -> Option<ConnectionId> {
        self.state.lock().autoritaet.primaer()
    }

    /// Aktuelle Namensliste mit der zuletzt verteilten Revision
    pub fn namen(&self) -> PresenceList {
        let s = self.state.lock();
        PresenceList {
            revision: s.revision,
            names: s.namen.namen_sortiert(),
        }
    }

    pub fn online_anzahl(&self) -> usize {
        self.state.lock().namen.anzahl()
    }

    pub fn gruppe(&self) -> GroupStateEvent {
        self.state.lock().gruppe.snapshot(&self.config.moderator_name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
