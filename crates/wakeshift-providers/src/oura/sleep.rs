//! Picking the wake instant out of Oura sleep sessions.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

/// One entry of `GET /v2/usercollection/sleep`.
///
/// Timestamps carry the ring's local offset, e.g.
/// `2025-02-05T07:12:30+01:00`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SleepSession {
    /// Session id.
    #[serde(default)]
    pub id: Option<String>,
    /// Day the session is attributed to.
    #[serde(default)]
    pub day: Option<NaiveDate>,
    /// When the user went to bed.
    #[serde(default)]
    pub bedtime_start: Option<DateTime<FixedOffset>>,
    /// When the user got up.
    #[serde(default)]
    pub bedtime_end: Option<DateTime<FixedOffset>>,
}

/// Selects the wake instant for `today`.
///
/// Among sessions whose `bedtime_end` falls on `today` in its own offset,
/// the latest end wins. When none ended today the most recent session
/// overall is used instead.
pub fn select_wake(sessions: &[SleepSession], today: NaiveDate) -> Option<DateTime<Utc>> {
    let ended = || sessions.iter().filter_map(|s| s.bedtime_end.map(|end| (s, end)));

    let chosen = ended()
        .filter(|(_, end)| end.date_naive() == today)
        .max_by_key(|(_, end)| *end)
        .or_else(|| {
            let latest = ended().max_by_key(|(_, end)| *end);
            if latest.is_some() {
                warn!(%today, "no sleep session ended today, using the most recent one");
            }
            latest
        });

    let (session, end) = chosen?;
    debug!(
        bedtime_start = ?session.bedtime_start,
        bedtime_end = %end,
        "selected sleep session"
    );
    Some(end.with_timezone(&Utc))
}
