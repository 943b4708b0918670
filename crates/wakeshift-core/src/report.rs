//! Plain-text rendering of a [`ShiftPlan`].

use std::fmt::Write as _;

use chrono::TimeZone;

use crate::plan::{EventDecision, ShiftPlan};

/// Whether the plan was written back or only previewed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// Nothing was written.
    #[default]
    DryRun,
    /// Shifted events were written back.
    Applied,
}

impl ReportMode {
    fn verb(self) -> &'static str {
        match self {
            Self::DryRun => "WOULD SHIFT",
            Self::Applied => "SHIFTED",
        }
    }
}

/// Renders `plan` line by line, with clock times shown in `tz`.
///
/// ```text
/// Offset: 120 minutes (2.0 hours)
///   SKIP (sleep-marker): Sleep
///   WOULD SHIFT: Breakfast (07:15 -> 09:15)
///
/// Done! Shifted: 1, Skipped: 1
/// ```
pub fn render_plan<Tz>(plan: &ShiftPlan, mode: ReportMode, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    render(plan, mode, &[], tz)
}

/// Renders a written-back plan where the writes for `failed` event ids did
/// not go through. Those events are listed as `FAILED` and left out of the
/// shifted count.
pub fn render_applied<Tz>(plan: &ShiftPlan, failed: &[String], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    render(plan, ReportMode::Applied, failed, tz)
}

fn render<Tz>(plan: &ShiftPlan, mode: ReportMode, failed: &[String], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let is_failed = |d: &EventDecision| failed.iter().any(|id| *id == d.event_id);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Offset: {} minutes ({:.1} hours)",
        plan.offset_minutes,
        plan.offset_minutes as f64 / 60.0
    );

    for decision in &plan.decisions {
        let verb = if is_failed(decision) {
            "FAILED"
        } else {
            mode.verb()
        };
        let _ = writeln!(out, "  {}", render_decision(decision, verb, tz));
    }

    let failures = plan.shifted().filter(|d| is_failed(*d)).count();
    let _ = write!(
        out,
        "\nDone! Shifted: {}, Skipped: {}",
        plan.shifted_count() - failures,
        plan.skipped_count()
    );
    if failures > 0 {
        let _ = write!(out, ", Failed: {failures}");
    }
    out
}

fn render_decision<Tz>(decision: &EventDecision, verb: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match (&decision.original, &decision.shifted) {
        (Some(original), Some(shifted)) => format!(
            "{}: {} ({} -> {})",
            verb,
            decision.title,
            original.start.at.with_timezone(tz).format("%H:%M"),
            shifted.start.at.with_timezone(tz).format("%H:%M"),
        ),
        _ => {
            let reason = decision
                .classification
                .reason
                .map_or("unknown", |r| r.as_str());
            format!("SKIP ({reason}): {}", decision.title)
        }
    }
}
