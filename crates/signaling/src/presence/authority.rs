//! Moderator-Autoritaet
//!
//! Verwaltet den exklusiven Platz des reservierten Moderator-Namens
//! (`primaer`) und die Rollen-Flags aller Verbindungen. Nur der Platz ist
//! exklusiv; per Befoerderung koennen mehrere Verbindungen die Rolle haben.

use std::collections::HashSet;

use lobby_core::{ConnectionId, LobbyError};

#[derive(Debug)]
pub struct ModeratorAuthority {
    reservierter_name: String,
    primaer: Option<ConnectionId>,
    rollen: HashSet<ConnectionId>,
}

impl ModeratorAuthority {
    pub fn neu(reservierter_name: impl Into<String>) -> Self {
        Self {
            reservierter_name: reservierter_name.into(),
            primaer: None,
            rollen: HashSet::new(),
        }
    }

    pub fn reservierter_name(&self) -> &str {
        &self.reservierter_name
    }

    pub fn ist_reserviert(&self, name: &str) -> bool {
        name == self.reservierter_name
    }

    /// Darf `conn` den reservierten Platz einnehmen?
    pub fn kann_beanspruchen(&self, conn: ConnectionId) -> bool {
        self.primaer.map_or(true, |p| p == conn)
    }

    /// Beansprucht den reservierten Platz fuer `conn`
    ///
    /// Erfolgreich nur fuer den reservierten Namen und nur wenn der Platz
    /// frei ist oder bereits `conn` gehoert. Bei Erfolg erhaelt `conn` auch
    /// das Rollen-Flag.
    pub fn beanspruchen(&mut self, conn: ConnectionId, name: &str) -> bool {
        if !self.ist_reserviert(name) || !self.kann_beanspruchen(conn) {
            return false;
        }
        self.primaer = Some(conn);
        self.rollen.insert(conn);
        tracing::info!(connection_id = %conn, "Moderator-Platz vergeben");
        true
    }

    /// Schaltet das Rollen-Flag von `ziel` um
    ///
    /// Nur erlaubt wenn `akteur` selbst die Rolle hat, und nie fuer den
    /// Akteur selbst. Gibt den neuen Rollenzustand des Ziels zurueck.
    pub fn rolle_umschalten(
        &mut self,
        akteur: ConnectionId,
        ziel: ConnectionId,
        ziel_name: &str,
    ) -> Result<bool, LobbyError> {
        if !self.hat_rolle(akteur) {
            return Err(LobbyError::NichtAutorisiert(
                "Moderator-Rolle erforderlich".into(),
            ));
        }
        if akteur == ziel {
            return Err(LobbyError::UngueltigeEingabe(
                "Eigene Rolle kann nicht umgeschaltet werden".into(),
            ));
        }

        if self.rollen.remove(&ziel) {
            tracing::info!(akteur = %akteur, ziel = %ziel, "Moderator-Rolle entzogen");
            return Ok(false);
        }

        self.rollen.insert(ziel);
        if self.ist_reserviert(ziel_name) && self.kann_beanspruchen(ziel) {
            self.primaer = Some(ziel);
        }
        tracing::info!(akteur = %akteur, ziel = %ziel, "Moderator-Rolle vergeben");
        Ok(true)
    }

    /// Raeumt beim Trennen auf: Rollen-Flag weg, Platz frei falls `conn` ihn hielt
    pub fn primaer_freigeben_falls(&mut self, conn: ConnectionId) -> bool {
        self.rollen.remove(&conn);
        if self.primaer == Some(conn) {
            self.primaer = None;
            tracing::info!(connection_id = %conn, "Moderator-Platz freigegeben");
            return true;
        }
        false
    }

    /// Gibt den Platz frei, wenn der Primaer-Moderator den reservierten Namen ablegt
    pub fn bei_umbenennung(&mut self, conn: ConnectionId, alt: &str, neu: &str) {
        if self.primaer == Some(conn) && self.ist_reserviert(alt) && !self.ist_reserviert(neu) {
            self.primaer = None;
            tracing::info!(connection_id = %conn, "Moderator-Platz durch Umbenennung frei");
        }
    }

    pub fn hat_rolle(&self, conn: ConnectionId) -> bool {
        self.rollen.contains(&conn)
    }

    pub fn primaer(&self) -> Option<ConnectionId> {
        self.primaer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOD: &str = "Moderator";

    #[test]
    fn nur_reservierter_name_kann_beansprucht_werden() {
        let mut auth = ModeratorAuthority::neu(MOD);
        let a = ConnectionId::new();

        assert!(!auth.beanspruchen(a, "Alice"));
        assert_eq!(auth.primaer(), None);
        assert!(!auth.hat_rolle(a));
    }

    #[test]
    fn platz_ist_exklusiv() {
        let mut auth = ModeratorAuthority::neu(MOD);
        let (a, b) = (ConnectionId::new(), ConnectionId::new());

        assert!(auth.beanspruchen(a, MOD));
        assert!(!auth.beanspruchen(b, MOD));
        assert!(auth.beanspruchen(a, MOD), "Erneuter Anspruch des Inhabers");
        assert_eq!(auth.primaer(), Some(a));
        assert!(auth.hat_rolle(a));
        assert!(!auth.hat_rolle(b));
    }

    #[test]
    fn trennen_gibt_platz_und_rolle_frei() {
        let mut auth = ModeratorAuthority::neu(MOD);
        let (a, b) = (ConnectionId::new(), ConnectionId::new());

        auth.beanspruchen(a, MOD);
        assert!(auth.primaer_freigeben_falls(a));
        assert!(!auth.hat_rolle(a));
        assert!(!auth.primaer_freigeben_falls(a));

        assert!(auth.beanspruchen(b, MOD));
    }

    #[test]
    fn umschalten_ohne_rolle_verweigert() {
        let mut auth = ModeratorAuthority::neu(MOD);
        let (a, b) = (ConnectionId::new(), ConnectionId::new());

        assert!(matches!(
            auth.rolle_umschalten(a, b, "Bob"),
            Err(LobbyError::NichtAutorisiert(_))
        ));
        assert!(!auth.hat_rolle(b));
    }

    #[test]
    fn umschalten_setzt_und_entzieht_rolle() {
        let mut auth = ModeratorAuthority::neu(MOD);
        let (a, c) = (ConnectionId::new(), ConnectionId::new());
        auth.beanspruchen(a, MOD);

        assert_eq!(auth.rolle_umschalten(a, c, "Bob"), Ok(true));
        assert!(auth.hat_rolle(c));
        assert_eq!(auth.primaer(), Some(a));

        assert_eq!(auth.rolle_umschalten(a, c, "Bob"), Ok(false));
        assert!(!auth.hat_rolle(c));
    }

    #[test]
    fn eigene_rolle_nicht_umschaltbar() {
        let mut auth = ModeratorAuthority::neu(MOD);
        let a = ConnectionId::new();
        auth.beanspruchen(a, MOD);

        assert!(auth.rolle_umschalten(a, a, MOD).is_err());
        assert!(auth.hat_rolle(a));
    }

    #[test]
    fn befoerderung_mit_reserviertem_namen_uebernimmt_platz() {
        let mut auth = ModeratorAuthority::neu(MOD);
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        auth.beanspruchen(a, MOD);
        auth.bei_umbenennung(a, MOD, "Alice");
        assert_eq!(auth.primaer(), None);

        assert_eq!(auth.rolle_umschalten(a, b, MOD), Ok(true));
        assert_eq!(auth.primaer(), Some(b));
    }

    #[test]
    fn umbenennung_weg_vom_reservierten_namen_gibt_platz_frei() {
        let mut auth = ModeratorAuthority::neu(MOD);
        let a = ConnectionId::new();
        auth.beanspruchen(a, MOD);

        auth.bei_umbenennung(a, MOD, MOD);
        assert_eq!(auth.primaer(), Some(a));

        auth.bei_umbenennung(a, MOD, "Alice");
        assert_eq!(auth.primaer(), None);
        assert!(auth.hat_rolle(a), "Rolle bleibt bei Umbenennung erhalten");
    }
}
