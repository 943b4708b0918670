//! Calendar and wake-signal providers.
//!
//! - [`CalendarProvider`] lists a day's events and moves them
//! - [`WakeSource`] reports when the user actually woke up
//! - [`ProviderError`] is the shared error type
//!
//! The Google Calendar and Oura backends share the OAuth machinery in
//! [`auth`].
//!
//! ```text
//! ┌─────────────────┐          ┌─────────────────┐
//! │ Google Calendar │          │    Oura API     │
//! └────────┬────────┘          └────────┬────────┘
//!          │                            │
//!          ▼                            ▼
//! ┌─────────────────┐          ┌─────────────────┐
//! │ GoogleProvider  │          │  OuraProvider   │
//! └────────┬────────┘          └────────┬────────┘
//!          │ CalendarProvider           │ WakeSource
//!          └─────────────┬──────────────┘
//!                        ▼
//!                 wakeshift-server
//! ```

pub mod auth;
pub mod error;
#[cfg(feature = "google")]
pub mod google;
mod http;
#[cfg(feature = "oura")]
pub mod oura;
pub mod provider;

use std::path::PathBuf;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use http::DEFAULT_TIMEOUT;
pub use provider::{BoxFuture, CalendarProvider, ErrorProvider, WakeSource};

/// Directory for stored tokens, `~/.local/share/wakeshift` on Linux.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wakeshift")
}
