//! `emsbus scan`: admin-only device discovery on the bus.

use tokio::sync::mpsc;

use emsbus_core::{Dashboard, DashboardConfig, ScanOutcome};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

const CONFIRM_PROMPT: &str = "Are you sure you want to initiate a full device scan of the EMS bus?";

pub async fn handle(config: &DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let (tx, mut notes) = mpsc::unbounded_channel();
    let mut dashboard = Dashboard::connect(config, tx).await?;
    let color = output::should_color(&global.color);

    // A failed identity check at connect time leaves us anonymous.
    if config.access_token.is_some() && !dashboard.identity().admin {
        dashboard.verify_identity().await?;
    }
    dashboard.request_scan()?;
    if !util::confirm(CONFIRM_PROMPT, "scan", global.yes)? {
        dashboard.cancel_scan();
        if !global.quiet {
            eprintln!("Scan cancelled");
        }
        return Ok(());
    }

    let spinner = util::spinner("Requesting device scan...", global);
    let outcome = dashboard.confirm_scan().await;
    spinner.finish_and_clear();

    match outcome? {
        ScanOutcome::Dispatched => {
            while let Ok(note) = notes.try_recv() {
                output::print_notification(&note, color, global.quiet);
            }
            Ok(())
        }
        // The notification carries the same message as the error; let the
        // diagnostic report it once.
        ScanOutcome::Failed { message } => Err(CliError::ScanFailed { message }),
    }
}
