//! Event classification.
//!
//! [`classify`] decides whether an event may be moved when the day is
//! shifted. Rules are applied in a fixed order and the first match wins:
//!
//! 1. title contains a sleep-marker term → [`SkipReason::SleepMarker`]
//! 2. title contains a prayer-marker term → [`SkipReason::PrayerMarker`]
//! 3. the event is all-day → [`SkipReason::AllDay`]
//! 4. someone other than the owner attends → [`SkipReason::HasAttendees`]
//! 5. the event has no start instant → [`SkipReason::NoStartTime`]
//!
//! Anything else is eligible.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;
use crate::terms::{PRAYER_MARKERS, SLEEP_MARKERS};

/// Why an event is left where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The event is the sleep/wake block itself.
    SleepMarker,
    /// The event is a fixed-time prayer.
    PrayerMarker,
    /// The event has no time of day.
    AllDay,
    /// Other people attend.
    HasAttendees,
    /// The event has no start instant.
    NoStartTime,
}

impl SkipReason {
    /// Returns the wire name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SleepMarker => "sleep-marker",
            Self::PrayerMarker => "prayer-marker",
            Self::AllDay => "all-day",
            Self::HasAttendees => "has-attendees",
            Self::NoStartTime => "no-start-time",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one event.
///
/// `reason` is set exactly when `skip` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Whether the event is exempt from shifting.
    pub skip: bool,
    /// Why the event is exempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
}

impl Classification {
    /// An event that may be shifted.
    pub const fn eligible() -> Self {
        Self {
            skip: false,
            reason: None,
        }
    }

    /// An event that stays in place.
    pub const fn skipped(reason: SkipReason) -> Self {
        Self {
            skip: true,
            reason: Some(reason),
        }
    }

    /// Returns true if the event may be shifted.
    pub fn is_eligible(&self) -> bool {
        !self.skip
    }
}

/// Classifies one event for the owner identified by `self_identity`.
pub fn classify(event: &CalendarEvent, self_identity: &str) -> Classification {
    let title = event.display_title();

    if SLEEP_MARKERS.matches(title) {
        return Classification::skipped(SkipReason::SleepMarker);
    }
    if PRAYER_MARKERS.matches(title) {
        return Classification::skipped(SkipReason::PrayerMarker);
    }
    if event.is_all_day() {
        return Classification::skipped(SkipReason::AllDay);
    }
    if !event.is_solo(self_identity) {
        return Classification::skipped(SkipReason::HasAttendees);
    }
    if event.start_moment().is_none() {
        return Classification::skipped(SkipReason::NoStartTime);
    }

    Classification::eligible()
}
