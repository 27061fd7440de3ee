//! `emsbus watch`: live dashboard.
//!
//! Re-renders whenever an applied poll changes the view. Enter refreshes
//! immediately; Ctrl-C tears the dashboard down, cancelling the timer.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use emsbus_core::{Dashboard, DashboardConfig, DashboardView, GatewaySource};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn handle(config: &DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let (tx, mut notes) = mpsc::unbounded_channel();
    let mut dashboard = Dashboard::connect(config, tx).await?;
    let mut updates = dashboard.subscribe();
    let color = output::should_color(&global.color);

    render(&dashboard, global, color)?;
    dashboard.activate()?;
    if !global.quiet {
        eprintln!(
            "Refreshing every {}s. Press Enter to refresh now, Ctrl-C to quit.",
            config.poll_interval.as_secs()
        );
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),

            changed = updates.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                updates.mark_unchanged();
                if let Err(e) = render(&dashboard, global, color) {
                    break Err(e);
                }
            }

            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    if let Some(seq) = dashboard.refresh() {
                        debug!(seq, "manual refresh");
                    }
                }
                Ok(None) => {
                    debug!("stdin closed, manual refresh disabled");
                    stdin_open = false;
                }
                Err(e) => break Err(CliError::Io(e)),
            },

            Some(note) = notes.recv() => {
                output::print_notification(&note, color, global.quiet);
            }
        }
    };

    dashboard.deactivate().await;
    result
}

fn render(
    dashboard: &Dashboard<GatewaySource>,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let view = dashboard.view();
    let format = match global.output {
        // One document per line keeps a long-running stream parseable.
        OutputFormat::Json => OutputFormat::JsonCompact,
        ref other => other.clone(),
    };
    let mut rendered = output::render_view(&format, &view, color)?;
    if matches!(format, OutputFormat::Table) {
        if let DashboardView::Loading { error: Some(_) } = view {
            rendered.push_str("\nPress Enter to retry.");
        }
        rendered.push('\n');
    }
    output::print_output(&rendered, global.quiet);
    Ok(())
}
