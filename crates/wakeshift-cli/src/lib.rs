//! The `wakeshift` command-line interface: shift today's calendar, run the
//! webhook server, and manage authentication and the Oura subscription.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
