//! Per-day shift plan.
//!
//! [`plan_day`] runs the classifier and the shift engine over a day's events
//! and records one [`EventDecision`] per event, in input order. Nothing is
//! written anywhere; the caller decides whether to apply the plan.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::{Classification, SkipReason, classify};
use crate::event::CalendarEvent;
use crate::shift::apply_shift;
use crate::time::TimedSpan;

/// What happens to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDecision {
    /// Provider event identifier.
    pub event_id: String,
    /// Title for display (placeholder when absent).
    pub title: String,
    /// Classifier verdict.
    pub classification: Classification,
    /// Original span, for timed events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<TimedSpan>,
    /// New span, set only for events that move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shifted: Option<TimedSpan>,
}

impl EventDecision {
    /// Returns true if this event moves.
    pub fn is_shifted(&self) -> bool {
        self.shifted.is_some()
    }
}

/// Decisions for a whole day at a given offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPlan {
    /// Offset in minutes applied to eligible events.
    pub offset_minutes: i64,
    /// One decision per input event, in input order.
    pub decisions: Vec<EventDecision>,
}

impl ShiftPlan {
    /// Decisions for events that move.
    pub fn shifted(&self) -> impl Iterator<Item = &EventDecision> {
        self.decisions.iter().filter(|d| d.is_shifted())
    }

    /// Number of events that move.
    pub fn shifted_count(&self) -> usize {
        self.shifted().count()
    }

    /// Number of events left in place.
    pub fn skipped_count(&self) -> usize {
        self.decisions.len() - self.shifted_count()
    }
}

/// Builds the plan for `events` at `offset_minutes`.
pub fn plan_day(events: &[CalendarEvent], self_identity: &str, offset_minutes: i64) -> ShiftPlan {
    let decisions = events
        .iter()
        .map(|event| decide(event, self_identity, offset_minutes))
        .collect();

    ShiftPlan {
        offset_minutes,
        decisions,
    }
}

/// Classifies and, when eligible, shifts one event.
///
/// [`classify`] only checks the start. An eligible event with no end instant
/// cannot be moved either, and is reported as [`SkipReason::NoStartTime`]
/// because the reason list has no separate entry for a missing end.
fn decide(event: &CalendarEvent, self_identity: &str, offset_minutes: i64) -> EventDecision {
    let original = match (event.start_moment(), event.end_moment()) {
        (Some(start), Some(end)) => Some(TimedSpan {
            start: start.clone(),
            end: end.clone(),
        }),
        _ => None,
    };

    let mut classification = classify(event, self_identity);
    let mut shifted = None;

    if classification.is_eligible() {
        shifted = apply_shift(event, offset_minutes);
        if shifted.is_none() {
            warn!(event_id = %event.id, "eligible event has no end instant, leaving it");
            classification = Classification::skipped(SkipReason::NoStartTime);
        }
    }

    EventDecision {
        event_id: event.id.clone(),
        title: event.display_title().to_string(),
        classification,
        original,
        shifted,
    }
}
