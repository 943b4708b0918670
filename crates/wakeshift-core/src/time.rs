//! Time types for calendar events.
//!
//! This module provides [`EventTime`] for representing event start/end times
//! (which may be either a specific instant or an all-day date), [`TimedSpan`]
//! for the start/end pair produced by a shift, and [`TimeWindow`] for
//! defining query ranges.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// An opaque timezone annotation attached to an event boundary.
///
/// Providers hand this back exactly as they received it (for Google Calendar
/// it is the IANA name in the `timeZone` field). It is never parsed or
/// validated against the instant it travels with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneAnnotation(String);

impl ZoneAnnotation {
    /// Wraps a provider-supplied annotation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the annotation as given by the provider.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An instant together with the annotation it was delivered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moment {
    /// The instant, stored in UTC.
    pub at: DateTime<Utc>,
    /// Timezone annotation carried verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<ZoneAnnotation>,
}

impl Moment {
    /// Creates a moment without annotation.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at, zone: None }
    }

    /// Builder method to attach an annotation.
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(ZoneAnnotation::new(zone));
        self
    }
}

/// Represents one boundary (start or end) of a calendar event.
///
/// Calendar events can have two types of times:
/// - **DateTime**: A specific point in time (stored as UTC) with an optional
///   timezone annotation
/// - **AllDay**: A date without a specific time (all-day events)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific instant.
    DateTime(Moment),
    /// An all-day event date (no specific time).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates a new `EventTime::DateTime` from a UTC datetime.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::DateTime(Moment::new(dt))
    }

    /// Creates a new `EventTime::DateTime` from a datetime in any timezone.
    pub fn from_local<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        Self::from_utc(dt.with_timezone(&Utc))
    }

    /// Creates a new `EventTime::DateTime` carrying a timezone annotation.
    pub fn annotated(dt: DateTime<Utc>, zone: impl Into<String>) -> Self {
        Self::DateTime(Moment::new(dt).with_zone(zone))
    }

    /// Creates a new `EventTime::AllDay` from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` if this is an all-day event time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the moment if this is a `DateTime` variant.
    pub fn as_moment(&self) -> Option<&Moment> {
        match self {
            Self::DateTime(m) => Some(m),
            Self::AllDay(_) => None,
        }
    }

    /// Returns the instant if this is a `DateTime` variant.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        self.as_moment().map(|m| &m.at)
    }

    /// Returns the date if this is an `AllDay` variant.
    pub fn as_date(&self) -> Option<&NaiveDate> {
        match self {
            Self::AllDay(d) => Some(d),
            Self::DateTime(_) => None,
        }
    }
}

/// A timed start/end pair, as produced by shifting an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedSpan {
    /// Start of the span.
    pub start: Moment,
    /// End of the span.
    pub end: Moment,
}

impl TimedSpan {
    /// Returns the length of the span.
    pub fn duration(&self) -> Duration {
        self.end.at - self.start.at
    }
}

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a time window covering a single local day in the given timezone.
    ///
    /// Returns `None` when local midnight does not exist or is ambiguous
    /// (a DST transition at midnight), in which case the earliest valid
    /// interpretation cannot be chosen safely.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<Self> {
        let start = tz
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .single()?
            .with_timezone(&Utc);
        let end = tz
            .from_local_datetime(&date.succ_opt()?.and_hms_opt(0, 0, 0)?)
            .single()?
            .with_timezone(&Utc);
        Some(Self { start, end })
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod event_time {
        use super::*;

        #[test]
        fn datetime_creation() {
            let dt = utc(2025, 2, 5, 10, 30, 0);
            let et = EventTime::from_utc(dt);
            assert!(!et.is_all_day());
            assert_eq!(et.as_datetime(), Some(&dt));
            assert_eq!(et.as_date(), None);
            assert!(et.as_moment().unwrap().zone.is_none());
        }

        #[test]
        fn annotated_creation() {
            let dt = utc(2025, 2, 5, 10, 30, 0);
            let et = EventTime::annotated(dt, "Europe/Paris");
            let moment = et.as_moment().unwrap();
            assert_eq!(moment.at, dt);
            assert_eq!(moment.zone.as_ref().unwrap().as_str(), "Europe/Paris");
        }

        #[test]
        fn allday_creation() {
            let d = date(2025, 2, 5);
            let et = EventTime::from_date(d);
            assert!(et.is_all_day());
            assert_eq!(et.as_date(), Some(&d));
            assert_eq!(et.as_datetime(), None);
        }

        #[test]
        fn from_local_converts_to_utc() {
            let tz = FixedOffset::east_opt(2 * 3600).unwrap();
            let local = tz.with_ymd_and_hms(2025, 2, 5, 9, 0, 0).unwrap();
            let et = EventTime::from_local(local);
            assert_eq!(et.as_datetime(), Some(&utc(2025, 2, 5, 7, 0, 0)));
        }

        #[test]
        fn serde_roundtrip() {
            let et = EventTime::annotated(utc(2025, 2, 5, 10, 30, 0), "UTC");
            let json = serde_json::to_string(&et).unwrap();
            let parsed: EventTime = serde_json::from_str(&json).unwrap();
            assert_eq!(et, parsed);
        }
    }

    mod time_window {
        use super::*;

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            TimeWindow::new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
        }

        #[test]
        fn contains_datetime() {
            let window = TimeWindow::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
            assert!(window.contains(utc(2025, 2, 5, 9, 0, 0)));
            assert!(window.contains(utc(2025, 2, 5, 16, 59, 59)));
            assert!(!window.contains(utc(2025, 2, 5, 17, 0, 0)));
            assert!(!window.contains(utc(2025, 2, 5, 8, 59, 59)));
        }

        #[test]
        fn for_date_utc() {
            let window = TimeWindow::for_date(date(2025, 2, 5), &Utc).unwrap();
            assert_eq!(window.start, utc(2025, 2, 5, 0, 0, 0));
            assert_eq!(window.end, utc(2025, 2, 6, 0, 0, 0));
            assert_eq!(window.duration(), Duration::hours(24));
        }

        #[test]
        fn for_date_with_offset() {
            let tz = FixedOffset::west_opt(5 * 3600).unwrap();
            let window = TimeWindow::for_date(date(2025, 2, 5), &tz).unwrap();
            assert_eq!(window.start, utc(2025, 2, 5, 5, 0, 0));
            assert_eq!(window.end, utc(2025, 2, 6, 5, 0, 0));
        }
    }

    #[test]
    fn timed_span_duration() {
        let span = TimedSpan {
            start: Moment::new(utc(2025, 2, 5, 7, 15, 0)),
            end: Moment::new(utc(2025, 2, 5, 7, 45, 0)),
        };
        assert_eq!(span.duration(), Duration::minutes(30));
    }
}
