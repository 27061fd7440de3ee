//! `emsbus status`: one poll, rendered once.

use std::sync::Arc;

use emsbus_core::{
    DashboardConfig, DashboardView, GatewaySource, Identity, PollState, ScanState, StatusSource,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(config: &DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let source = GatewaySource::new(config)?;

    let spinner = util::spinner("Reading bus status...", global);
    let result = source.read_status().await;
    spinner.finish_and_clear();
    let status = result?;

    let identity = if config.access_token.is_some() {
        source.identity().await?
    } else {
        Identity::anonymous()
    };

    let state = PollState {
        snapshot: Some(Arc::new(status)),
        error: None,
        updated_at: Some(chrono::Utc::now()),
        sequence: 1,
    };
    let view = DashboardView::build(&state, &identity, ScanState::Idle);

    let rendered = output::render_view(&global.output, &view, output::should_color(&global.color))?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
