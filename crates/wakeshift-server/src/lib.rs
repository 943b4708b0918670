//! Shift orchestration and the Oura webhook server.
//!
//! - [`ShiftRunner`] runs one day: wake offset, plan, write-back
//! - [`webhook`] serves the HTTP endpoints Oura notifies when new sleep data
//!   is available, running the shift on each new sleep session
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use wakeshift_server::{RunRequest, ShiftRunner};
//! # use wakeshift_providers::{CalendarProvider, WakeSource};
//!
//! # async fn example(
//! #     calendar: Arc<dyn CalendarProvider>,
//! #     wake: Arc<dyn WakeSource>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let runner = ShiftRunner::new(calendar, wake);
//! let outcome = runner.run(&RunRequest::today("primary").with_dry_run(true)).await?;
//! println!("{}", outcome.render(&chrono::Local));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod runner;
mod signals;
pub mod signature;
pub mod webhook;

pub use config::{DEFAULT_BIND, WebhookConfig};
pub use error::{ServerError, ServerResult};
pub use runner::{RunOutcome, RunRequest, ShiftRunner};
pub use signals::ShutdownHandle;
pub use webhook::{WebhookState, router, serve, serve_on};
