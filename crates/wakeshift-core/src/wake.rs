//! Expected wake time lookup.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::event::CalendarEvent;
use crate::terms::SLEEP_MARKERS;

/// Returns the end of the first sleep-marker event in `events`.
///
/// Events are scanned in the order given, which must be ascending start time
/// for the main sleep block to win over a later nap. Only the first title
/// match is considered: if it has no end instant (an all-day "Sleep" entry,
/// say) the result is `None` even when a later match has one.
pub fn resolve_expected_wake(events: &[CalendarEvent]) -> Option<DateTime<Utc>> {
    let sleep = events
        .iter()
        .find(|e| SLEEP_MARKERS.matches(e.display_title()))?;

    let end = sleep.end_moment().map(|m| m.at);
    debug!(
        event_id = %sleep.id,
        title = sleep.display_title(),
        expected_wake = ?end,
        "found sleep event"
    );
    end
}
