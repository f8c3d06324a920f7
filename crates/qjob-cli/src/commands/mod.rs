//! CLI command implementations.

pub mod ask;
pub mod backends;
pub mod common;
pub mod config;
pub mod run;
pub mod validate;
