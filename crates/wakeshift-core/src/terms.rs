//! Reserved title terms and the matching used against them.

/// An immutable set of lowercase terms matched by substring containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSet {
    name: &'static str,
    terms: &'static [&'static str],
}

/// Titles that mark the sleep block (and the wake-up time at its end).
pub const SLEEP_MARKERS: TermSet = TermSet::new(
    "sleep-marker",
    &["sleep", "wake", "wakeup", "wake up", "bedtime"],
);

/// Titles of fixed-time prayers. These follow the sun, not the alarm clock.
pub const PRAYER_MARKERS: TermSet = TermSet::new(
    "prayer-marker",
    &[
        "fajr", "dhuhr", "asr", "maghrib", "isha", "prayer", "salah", "salat",
    ],
);

impl TermSet {
    /// Creates a term set. Terms must already be lowercase.
    pub const fn new(name: &'static str, terms: &'static [&'static str]) -> Self {
        Self { name, terms }
    }

    /// Name of the set, used in log output.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The terms in this set.
    pub fn terms(&self) -> &'static [&'static str] {
        self.terms
    }

    /// Returns the first term contained in `title`, ignoring case.
    pub fn find_in(&self, title: &str) -> Option<&'static str> {
        let title = title.to_lowercase();
        self.terms.iter().copied().find(|term| title.contains(term))
    }

    /// Returns true if `title` contains any term of the set, ignoring case.
    pub fn matches(&self, title: &str) -> bool {
        self.find_in(title).is_some()
    }
}
