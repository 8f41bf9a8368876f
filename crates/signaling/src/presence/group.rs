//! Gruppenzustand (Name und Avatar der Gruppe)

use lobby_core::bereinigen;
use lobby_protocol::control::GroupStateEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupState {
    name: String,
    avatar_url: String,
}

impl GroupState {
    pub fn neu(name: impl Into<String>, avatar_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar_url: avatar_url.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    /// Setzt den Gruppennamen; ein nach dem Bereinigen leerer Name wird ignoriert
    pub fn umbenennen(&mut self, roh: &str, max_laenge: usize) -> Option<&str> {
        let name = bereinigen(roh, max_laenge);
        if name.is_empty() {
            return None;
        }
        self.name = name;
        Some(&self.name)
    }

    /// Setzt den Avatar; leer entfernt ihn
    pub fn avatar_setzen(&mut self, roh: &str, max_laenge: usize) -> &str {
        self.avatar_url = bereinigen(roh, max_laenge);
        &self.avatar_url
    }

    /// Vollstaendiger Zustand fuer einen beitretenden Client
    pub fn snapshot(&self, moderator_name: &str) -> GroupStateEvent {
        GroupStateEvent {
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            moderator_name: moderator_name.to_string(),
        }
    }
}
