//! Event types for calendar events.
//!
//! This module provides the provider-agnostic event representation used by
//! the classifier, the wake-time resolver and the shift engine:
//! - [`CalendarEvent`]: one calendar entry for the day
//! - [`Attendee`]: a participant of an event

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{EventTime, Moment, ZoneAnnotation};

/// Placeholder used for matching when an event has no title.
pub const UNTITLED: &str = "Untitled";

/// An attendee of a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// The attendee's email address.
    pub email: String,
    /// Whether this attendee entry represents the calendar owner.
    #[serde(default)]
    pub is_self: bool,
}

impl Attendee {
    /// Creates a new attendee with the given email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_self: false,
        }
    }

    /// Creates an attendee flagged as the calendar owner.
    pub fn myself(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_self: true,
        }
    }

    /// Returns true if this attendee is the owner identified by `self_identity`,
    /// either by email match or by the provider's self flag.
    pub fn is_owner(&self, self_identity: &str) -> bool {
        self.is_self || self.email == self_identity
    }
}

/// A calendar event as seen by the shift engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Unique identifier for the event (provider-specific).
    pub id: String,
    /// The event title, if any.
    pub title: Option<String>,
    /// When the event starts. `None` when the provider omitted it.
    pub start: Option<EventTime>,
    /// When the event ends. `None` when the provider omitted it.
    pub end: Option<EventTime>,
    /// Event attendees in provider order.
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

impl CalendarEvent {
    /// Creates a timed event.
    pub fn timed(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            start: Some(EventTime::from_utc(start)),
            end: Some(EventTime::from_utc(end)),
            attendees: Vec::new(),
        }
    }

    /// Creates an all-day event spanning `[start, end)`.
    pub fn all_day(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            start: Some(EventTime::from_date(start)),
            end: Some(EventTime::from_date(end)),
            attendees: Vec::new(),
        }
    }

    /// Returns the title used for matching and display.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    /// Returns true if either boundary is a date without time.
    pub fn is_all_day(&self) -> bool {
        self.start.as_ref().is_some_and(EventTime::is_all_day)
            || self.end.as_ref().is_some_and(EventTime::is_all_day)
    }

    /// Returns the start instant, if the event has one.
    pub fn start_moment(&self) -> Option<&Moment> {
        self.start.as_ref().and_then(EventTime::as_moment)
    }

    /// Returns the end instant, if the event has one.
    pub fn end_moment(&self) -> Option<&Moment> {
        self.end.as_ref().and_then(EventTime::as_moment)
    }

    /// Returns the attendees that are not the calendar owner.
    pub fn other_attendees<'a>(
        &'a self,
        self_identity: &'a str,
    ) -> impl Iterator<Item = &'a Attendee> + 'a {
        self.attendees
            .iter()
            .filter(move |a| !a.is_owner(self_identity))
    }

    /// Returns true if nobody but the owner attends.
    pub fn is_solo(&self, self_identity: &str) -> bool {
        self.other_attendees(self_identity).next().is_none()
    }

    /// Builder method to replace the title.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Builder method to add an attendee.
    pub fn with_attendee(mut self, attendee: Attendee) -> Self {
        self.attendees.push(attendee);
        self
    }

    /// Builder method to annotate both boundaries with a timezone.
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        let zone = zone.into();
        for boundary in [&mut self.start, &mut self.end] {
            if let Some(EventTime::DateTime(moment)) = boundary {
                moment.zone = Some(ZoneAnnotation::new(zone.clone()));
            }
        }
        self
    }
}
