//! Server error types.

use std::io;

use thiserror::Error;
use wakeshift_providers::ProviderError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while running a shift or serving webhooks.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (listener, bind, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The wake source had no sleep data for the day.
    #[error("no wake time available for {date}")]
    NoWakeSignal { date: String },

    /// No sleep event was found in the calendar.
    #[error("no sleep event found in calendar for {date}")]
    NoExpectedWake { date: String },

    /// The offset is larger than the configured bound.
    #[error("offset of {offset} minutes exceeds the maximum of {max} minutes")]
    OffsetRejected { offset: i64, max: i64 },

    /// The local day has no well-defined midnight.
    #[error("cannot determine the bounds of {date} in the local timezone")]
    DayBounds { date: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a missing wake signal error.
    pub fn no_wake_signal(date: impl ToString) -> Self {
        Self::NoWakeSignal {
            date: date.to_string(),
        }
    }

    /// Creates a missing sleep event error.
    pub fn no_expected_wake(date: impl ToString) -> Self {
        Self::NoExpectedWake {
            date: date.to_string(),
        }
    }
}
