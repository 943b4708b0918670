//! Google Calendar provider.
//!
//! Reads a day's events from Calendar API v3 and moves them with `PATCH`.
//! Authentication is the OAuth 2.0 PKCE flow with a loopback redirect;
//! users supply their own client ID and secret.
//!
//! ```ignore
//! use wakeshift_providers::auth::OAuthCredentials;
//! use wakeshift_providers::google::{GoogleConfig, GoogleProvider};
//!
//! let config = GoogleConfig::new(OAuthCredentials::new(
//!     "your-client-id.apps.googleusercontent.com",
//!     "your-client-secret",
//! ));
//!
//! GoogleProvider::session(&config)?.authorize().await?;
//! let provider = GoogleProvider::new(config)?;
//! ```

mod client;
mod config;
mod provider;

pub use client::{ApiCalendar, GoogleCalendarClient};
pub use config::{CALENDAR_API_BASE, GoogleConfig};
pub use provider::GoogleProvider;
