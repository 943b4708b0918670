//! Provider traits: where events come from and where the wake signal comes
//! from.
//!
//! Both traits return boxed futures so they can be used as trait objects by
//! the orchestrator, which owns an `Arc<dyn CalendarProvider>` and an
//! `Arc<dyn WakeSource>`.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, NaiveDate, Utc};
use wakeshift_core::{CalendarEvent, TimeWindow, TimedSpan};

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Using boxed futures keeps the traits object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A calendar backend that can list a day's events and move them.
///
/// Implementations should be `Send + Sync` and handle authentication and
/// paging internally.
pub trait CalendarProvider: Send + Sync {
    /// Returns the name of this provider (e.g. "google").
    fn name(&self) -> &str;

    /// Returns the identity that owns `calendar_id`.
    ///
    /// Attendees carrying this identity do not make an event shared.
    fn self_identity<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, ProviderResult<String>>;

    /// Fetches the events starting inside `window`, sorted by start time.
    ///
    /// Recurring events are expanded into instances and cancelled events are
    /// left out.
    fn fetch_day_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>>;

    /// Writes new start and end instants for one event.
    ///
    /// Each boundary's timezone annotation is sent back unchanged.
    fn update_event_times<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        span: &'a TimedSpan,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}

/// A source of the actual wake-up instant.
pub trait WakeSource: Send + Sync {
    /// Returns the name of this source (e.g. "oura").
    fn name(&self) -> &str;

    /// Returns the most relevant wake instant for `today`, if any.
    fn latest_wake(&self, today: NaiveDate) -> BoxFuture<'_, ProviderResult<Option<DateTime<Utc>>>>;
}

/// A provider that always returns an error.
///
/// Stands in for a backend that is not configured, so that runs which do
/// not need it (a manual offset needs no wake source) still work.
#[derive(Debug)]
pub struct ErrorProvider {
    name: String,
    error: ProviderError,
}

impl ErrorProvider {
    /// Creates a new error provider.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn error(&self) -> ProviderError {
        ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name)
    }
}

impl CalendarProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn self_identity<'a>(&'a self, _calendar_id: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn fetch_day_events<'a>(
        &'a self,
        _calendar_id: &'a str,
        _window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn update_event_times<'a>(
        &'a self,
        _calendar_id: &'a str,
        _event_id: &'a str,
        _span: &'a TimedSpan,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }
}

impl WakeSource for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn latest_wake(&self, _today: NaiveDate) -> BoxFuture<'_, ProviderResult<Option<DateTime<Utc>>>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::TimeZone;

    #[tokio::test]
    async fn error_provider_returns_error() {
        let provider = ErrorProvider::new("oura", ProviderError::configuration("not configured"));

        let today = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
        let err = provider.latest_wake(today).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert_eq!(err.provider(), Some("oura"));
        assert_eq!(WakeSource::name(&provider), "oura");
    }

    #[tokio::test]
    async fn error_provider_as_calendar() {
        let provider = ErrorProvider::new("google", ProviderError::authentication("no token"));
        let start = Utc.with_ymd_and_hms(2025, 2, 5, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, start + chrono::Duration::days(1));

        let err = provider.fetch_day_events("primary", window).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(provider.self_identity("primary").await.is_err());
    }
}
