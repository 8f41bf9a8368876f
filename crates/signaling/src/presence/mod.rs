//! Presence- und Autoritaetskern
//!
//! Wer ist online, unter welchem Namen, und wer darf moderieren?
//!
//! - [`NameRegistry`] – eindeutige Anzeigenamen mit `#n`-Suffixen
//! - [`ModeratorAuthority`] – exklusiver Moderator-Platz und Rollen-Flags
//! - [`GroupState`] – Name und Avatar der Gruppe
//! - [`PresenceCoordinator`] – setzt alles zu den Protokoll-Uebergaengen
//!   zusammen und entscheidet, was an wen verteilt wird

pub mod authority;
pub mod coordinator;
pub mod group;
pub mod names;

pub use authority::ModeratorAuthority;
pub use coordinator::{Entscheidung, PresenceConfig, PresenceCoordinator, Ziel, Zustellung};
pub use group::GroupState;
pub use names::NameRegistry;
