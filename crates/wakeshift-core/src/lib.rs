//! Core of wakeshift: calendar events, the shift classifier, wake offset
//! computation, the shift engine and plan reporting.
//!
//! Everything here is synchronous and free of I/O. Providers and the
//! orchestrator live in the other crates of the workspace.

pub mod classify;
pub mod event;
pub mod offset;
pub mod plan;
pub mod report;
pub mod shift;
pub mod terms;
pub mod time;
pub mod tracing;
pub mod wake;

pub use classify::{Classification, SkipReason, classify};
pub use event::{Attendee, CalendarEvent, UNTITLED};
pub use offset::{OffsetDecision, OffsetPolicy, compute_offset};
pub use plan::{EventDecision, ShiftPlan, plan_day};
pub use report::{ReportMode, render_applied, render_plan};
pub use shift::apply_shift;
pub use terms::{PRAYER_MARKERS, SLEEP_MARKERS, TermSet};
pub use time::{EventTime, Moment, TimeWindow, TimedSpan, ZoneAnnotation};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use wake::resolve_expected_wake;
