//! Default command: shift today's events.

use chrono::Local;

use crate::cli::ShiftArgs;
use crate::config::WakeshiftConfig;
use crate::error::ClientResult;
use wakeshift_server::RunRequest;

/// Shifts today's events and prints the report.
pub async fn run(args: ShiftArgs, config: &WakeshiftConfig) -> ClientResult<()> {
    let runner = super::build_runner(config)?;
    let request = RunRequest::today(config.calendar_id(args.calendar.as_deref()))
        .with_dry_run(args.dry_run)
        .with_manual_offset(args.offset);

    if args.dry_run {
        println!("=== DRY RUN MODE - no changes will be made ===\n");
    }

    let outcome = runner.run(&request).await?;
    println!("{}", outcome.render(&Local));
    Ok(())
}
