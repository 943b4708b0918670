//! One day's shift, end to end.
//!
//! [`ShiftRunner`] sequences the providers and the core: resolve the
//! calendar owner, fetch the day, work out the offset, plan, and write back
//! the events that move.

use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use wakeshift_core::{
    OffsetDecision, OffsetPolicy, ReportMode, ShiftPlan, TimeWindow, compute_offset, plan_day,
    render_applied, render_plan, resolve_expected_wake,
};
use wakeshift_providers::{CalendarProvider, WakeSource};

use crate::error::{ServerError, ServerResult};

/// Parameters of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Calendar to read and write.
    pub calendar_id: String,
    /// Local day to shift.
    pub today: NaiveDate,
    /// Plan only, write nothing.
    pub dry_run: bool,
    /// Use this offset instead of asking the wake source.
    pub manual_offset: Option<i64>,
}

impl RunRequest {
    /// A run for today in the local timezone.
    pub fn today(calendar_id: impl Into<String>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            today: Local::now().date_naive(),
            dry_run: false,
            manual_offset: None,
        }
    }

    /// Builder: plan only.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Builder: force an offset.
    pub fn with_manual_offset(mut self, offset: Option<i64>) -> Self {
        self.manual_offset = offset;
        self
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Offset in minutes.
    pub offset: i64,
    /// The plan, absent when the offset called for no shift.
    pub plan: Option<ShiftPlan>,
    /// Whether writes were suppressed.
    pub dry_run: bool,
    /// Events written successfully.
    pub applied: usize,
    /// Ids of the events whose write failed.
    pub failed: Vec<String>,
}

impl RunOutcome {
    /// Human-readable summary with times rendered in `tz`.
    pub fn render<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match &self.plan {
            None => format!(
                "Offset: {} minutes\nWoke up on time or early, no shift needed",
                self.offset
            ),
            Some(plan) => {
                if self.dry_run {
                    render_plan(plan, ReportMode::DryRun, tz)
                } else {
                    render_applied(plan, &self.failed, tz)
                }
            }
        }
    }
}

/// Runs the shift for one day against a calendar and a wake source.
pub struct ShiftRunner {
    calendar: Arc<dyn CalendarProvider>,
    wake: Arc<dyn WakeSource>,
    policy: OffsetPolicy,
    run_lock: Mutex<()>,
}

impl std::fmt::Debug for ShiftRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShiftRunner")
            .field("calendar", &self.calendar.name())
            .field("wake", &self.wake.name())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ShiftRunner {
    /// Creates a runner with the default offset policy.
    pub fn new(calendar: Arc<dyn CalendarProvider>, wake: Arc<dyn WakeSource>) -> Self {
        Self {
            calendar,
            wake,
            policy: OffsetPolicy::default(),
            run_lock: Mutex::new(()),
        }
    }

    /// Builder: set the offset policy.
    pub fn with_policy(mut self, policy: OffsetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The offset policy in use.
    pub fn policy(&self) -> &OffsetPolicy {
        &self.policy
    }

    /// Runs one day. Concurrent calls are serialized so that writes for the
    /// same event never interleave.
    pub async fn run(&self, request: &RunRequest) -> ServerResult<RunOutcome> {
        let _guard = self.run_lock.lock().await;
        let calendar_id = request.calendar_id.as_str();
        let today = request.today;

        let window = TimeWindow::for_date(today, &Local).ok_or_else(|| ServerError::DayBounds {
            date: today.to_string(),
        })?;

        let identity = self.calendar.self_identity(calendar_id).await?;
        let events = self.calendar.fetch_day_events(calendar_id, window).await?;
        info!(calendar_id, %today, count = events.len(), "fetched events");

        let offset = match request.manual_offset {
            Some(offset) => {
                info!(offset, "using manual offset");
                offset
            }
            None => {
                let actual = self
                    .wake
                    .latest_wake(today)
                    .await?
                    .ok_or_else(|| ServerError::no_wake_signal(today))?;
                let expected = resolve_expected_wake(&events)
                    .ok_or_else(|| ServerError::no_expected_wake(today))?;
                let offset = compute_offset(actual, expected);
                info!(%actual, %expected, offset, "computed wake offset");
                offset
            }
        };

        let offset = match self.policy.evaluate(offset) {
            OffsetDecision::Shift(offset) => offset,
            OffsetDecision::NoShift => {
                info!(offset, "woke up on time or early, no shift needed");
                return Ok(RunOutcome {
                    offset,
                    plan: None,
                    dry_run: request.dry_run,
                    applied: 0,
                    failed: Vec::new(),
                });
            }
            OffsetDecision::Reject { offset, max } => {
                return Err(ServerError::OffsetRejected { offset, max });
            }
        };

        let plan = plan_day(&events, &identity, offset);
        let mut outcome = RunOutcome {
            offset,
            plan: None,
            dry_run: request.dry_run,
            applied: 0,
            failed: Vec::new(),
        };

        if request.dry_run {
            debug!(shifted = plan.shifted_count(), "dry run, not writing");
        } else {
            for decision in plan.shifted() {
                let Some(span) = &decision.shifted else {
                    continue;
                };
                match self
                    .calendar
                    .update_event_times(calendar_id, &decision.event_id, span)
                    .await
                {
                    Ok(()) => {
                        debug!(event_id = %decision.event_id, title = %decision.title, "shifted event");
                        outcome.applied += 1;
                    }
                    Err(e) => {
                        error!(event_id = %decision.event_id, title = %decision.title, "failed to shift event: {e}");
                        outcome.failed.push(decision.event_id.clone());
                    }
                }
            }
            if !outcome.failed.is_empty() {
                warn!(failed = outcome.failed.len(), applied = outcome.applied, "some events were not shifted");
            }
        }

        info!(
            offset,
            shifted = plan.shifted_count(),
            skipped = plan.skipped_count(),
            dry_run = request.dry_run,
            "shift complete"
        );
        outcome.plan = Some(plan);
        Ok(outcome)
    }
}
