//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders a `DashboardView` in the format selected by `--output`. Table
//! uses `tabled` for the quality grid, structured formats use serde, plain
//! emits tab-separated lines for scripting.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use emsbus_core::{
    DashboardView, Notification, NotificationLevel, QualityTier, Severity, StatRow, StatusView,
};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatcher ────────────────────────────────────────────────

pub fn render_view(
    format: &OutputFormat,
    view: &DashboardView,
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(render_table_view(view, color)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(view)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(view)?),
        OutputFormat::Plain => Ok(render_plain_view(view)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a notification to stderr. Errors are shown even in quiet mode.
pub fn print_notification(note: &Notification, color: bool, quiet: bool) {
    if quiet && note.level != NotificationLevel::Error {
        return;
    }
    let text = match (note.level, color) {
        (_, false) => note.message.clone(),
        (NotificationLevel::Error, true) => note.message.red().to_string(),
        (NotificationLevel::Info, true) => note.message.cyan().to_string(),
    };
    eprintln!("{text}");
}

// ── Table ────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct QualityRow {
    #[tabled(rename = "Device")]
    id: String,
    #[tabled(rename = "# Success")]
    success: String,
    #[tabled(rename = "# Fail")]
    fail: String,
    #[tabled(rename = "Quality")]
    quality: String,
}

impl From<&StatRow> for QualityRow {
    fn from(row: &StatRow) -> Self {
        Self {
            id: row.id.clone(),
            success: row.success.clone(),
            fail: row.fail.clone(),
            quality: quality_cell(row),
        }
    }
}

fn quality_cell(row: &StatRow) -> String {
    match row.quality {
        Some(q) => {
            let marker = match q.tier {
                QualityTier::Excellent => "",
                QualityTier::Degraded => " !",
                QualityTier::Poor => " !!",
            };
            format!("{}%{marker}", q.percent)
        }
        None => String::new(),
    }
}

fn render_table_view(view: &DashboardView, color: bool) -> String {
    match view {
        DashboardView::Loading { error: None } => "Loading bus status...".into(),
        DashboardView::Loading { error: Some(failure) } => {
            paint_error(&failure.message, color)
        }
        DashboardView::Ready(status) => render_status(status, color),
    }
}

fn render_status(view: &StatusView, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}{}",
        "EMS Bus",
        paint_severity(&view.status_line, view.connectivity.severity, color)
    );
    let _ = writeln!(out, "{:<10}{}", "Active", view.summary);
    if let Some(at) = view.updated_at {
        let local = at.with_timezone(&chrono::Local);
        let _ = writeln!(out, "{:<10}{}", "Updated", local.format("%H:%M:%S"));
    }

    if !view.rows.is_empty() {
        let rows: Vec<QualityRow> = view.rows.iter().map(QualityRow::from).collect();
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", Table::new(rows).with(Style::rounded()));
    }

    if let Some(ref failure) = view.error {
        let _ = writeln!(out, "{}", paint_error(&failure.message, color));
    }

    out.trim_end().to_owned()
}

fn paint_severity(text: &str, severity: Severity, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match severity {
        Severity::Success => text.green().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Error => text.red().to_string(),
    }
}

fn paint_error(message: &str, color: bool) -> String {
    if color {
        message.red().bold().to_string()
    } else {
        message.to_owned()
    }
}

// ── Plain ────────────────────────────────────────────────────────────

fn render_plain_view(view: &DashboardView) -> String {
    match view {
        DashboardView::Loading { error: None } => "loading".into(),
        DashboardView::Loading { error: Some(failure) } => {
            format!("error\t{}", failure.message)
        }
        DashboardView::Ready(status) => {
            let mut out = String::new();
            let _ = writeln!(out, "status\t{}", status.connectivity.label);
            let _ = writeln!(out, "uptime\t{}", status.uptime);
            let _ = writeln!(out, "active\t{}", status.summary);
            for row in &status.rows {
                let quality = row.quality.map(|q| q.percent.to_string()).unwrap_or_default();
                let _ = writeln!(out, "{}\t{}\t{}\t{quality}", row.id, row.success, row.fail);
            }
            if let Some(ref failure) = status.error {
                let _ = writeln!(out, "error\t{}", failure.message);
            }
            out.trim_end().to_owned()
        }
    }
}
