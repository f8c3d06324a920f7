//! Library half of the `qjob` binary: argument definitions and commands.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
