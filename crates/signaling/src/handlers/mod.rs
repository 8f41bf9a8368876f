//! Handler fuer alle Control-Nachrichten
//!
//! Jeder Handler ist fuer einen bestimmten Nachrichtentyp zustaendig
//! und hat Zugriff auf den gemeinsamen SignalingState. Ereignisse fuer
//! andere Verbindungen laufen ueber den Broadcaster; der Rueckgabewert
//! ist nur fuer direkte Antworten an den Absender.

pub mod admin_handler;
pub mod chat_handler;
pub mod group_handler;
pub mod presence_handler;
