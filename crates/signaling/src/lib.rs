//! lobby-signaling – TCP Control Layer und Presence-Kern
//!
//! Dieser Crate implementiert den Echtzeit-Teil von Lobby: TCP-Verbindungen,
//! eindeutige Anzeigenamen, die Moderator-Rolle, den Gruppenzustand und
//! die Verteilung von Chat-Ereignissen.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SignalingServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task, eigene ConnectionId)
//!     |
//!     v
//! MessageDispatcher
//!     |
//!     +-- PresenceHandler (Join, Rename, Disconnect)
//!     +-- AdminHandler    (Promote, Rename anderer)
//!     +-- GroupHandler    (Name, Avatar)
//!     +-- ChatHandler     (Send, Delete, Clear)
//!
//! PresenceCoordinator – Namen, Moderator-Platz, Gruppe (ein Mutex)
//! EventBroadcaster    – Events an eine oder alle Verbindungen senden
//! ```

pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod presence;
pub mod server_state;
pub mod tcp;

// Bequeme Re-Exporte
pub use broadcast::EventBroadcaster;
pub use connection::ClientConnection;
pub use dispatcher::MessageDispatcher;
pub use error::{SignalingError, SignalingResult};
pub use presence::{PresenceConfig, PresenceCoordinator};
pub use server_state::{SignalingConfig, SignalingState};
pub use tcp::SignalingServer;
