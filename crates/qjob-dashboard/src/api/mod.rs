//! API endpoint handlers.

pub mod backends;
pub mod chat;
pub mod circuits;
pub mod health;
pub mod results;
pub mod run;
pub mod session;
