//! Oura Ring wake source.
//!
//! The wake instant is the end of the latest sleep session recorded for
//! today. The same client manages the webhook subscription that lets Oura
//! notify the server when new sleep data lands.

mod client;
mod config;
mod provider;
mod sleep;

pub use client::{OuraClient, WebhookSubscription};
pub use config::{OURA_API_BASE, OURA_REDIRECT_URI, OuraConfig};
pub use provider::OuraProvider;
pub use sleep::{SleepSession, select_wake};
