//! Wake offset computation and the policy deciding whether to act on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Returns `actual - expected` in whole minutes, rounded half away from zero.
///
/// Positive means the user woke later than planned. There is no bound on the
/// magnitude: a wake signal from the wrong day yields a huge offset, which
/// [`OffsetPolicy`] is there to catch.
pub fn compute_offset(actual: DateTime<Utc>, expected: DateTime<Utc>) -> i64 {
    let millis = (actual - expected).num_milliseconds();
    let minutes = millis / MILLIS_PER_MINUTE;
    let remainder = millis % MILLIS_PER_MINUTE;
    if remainder.abs() * 2 >= MILLIS_PER_MINUTE {
        minutes + millis.signum()
    } else {
        minutes
    }
}

/// What to do with a computed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetDecision {
    /// Push eligible events later by this many minutes.
    Shift(i64),
    /// Woke on time or early; leave the day alone.
    NoShift,
    /// The offset is larger than any plausible lie-in.
    Reject {
        /// The offending offset.
        offset: i64,
        /// The configured bound.
        max: i64,
    },
}

/// Bounds applied to an offset before any event is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetPolicy {
    /// Largest offset, in minutes, that is still believed.
    pub max_offset_minutes: i64,
}

impl Default for OffsetPolicy {
    fn default() -> Self {
        Self {
            max_offset_minutes: Self::DEFAULT_MAX_OFFSET_MINUTES,
        }
    }
}

impl OffsetPolicy {
    /// Twelve hours.
    pub const DEFAULT_MAX_OFFSET_MINUTES: i64 = 720;

    /// Creates a policy with the given bound.
    pub fn new(max_offset_minutes: i64) -> Self {
        Self { max_offset_minutes }
    }

    /// Decides what to do with `offset`.
    pub fn evaluate(&self, offset: i64) -> OffsetDecision {
        if offset <= 0 {
            OffsetDecision::NoShift
        } else if offset > self.max_offset_minutes {
            OffsetDecision::Reject {
                offset,
                max: self.max_offset_minutes,
            }
        } else {
            OffsetDecision::Shift(offset)
        }
    }
}
