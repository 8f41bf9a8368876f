//! REST-Handler

pub mod health;
pub mod users;
