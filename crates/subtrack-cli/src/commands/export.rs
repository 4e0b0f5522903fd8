//! Export command implementations
//!
//! Builds the requested report and hands it to the core exporter; output
//! goes to a file when `--output` is given, stdout otherwise.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use subtrack_core::engine::{EngineConfig, ProjectionEngine, DEFAULT_UPCOMING_WINDOW_DAYS};
use subtrack_core::export::{self, ExportFormat};
use subtrack_core::models::TimelineFilter;
use subtrack_core::snapshot::Snapshot;

fn parse_format(format: &str) -> Result<ExportFormat> {
    format.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

fn report_written(output: Option<&Path>) {
    if let Some(path) = output {
        println!("✅ Exported to {}", path.display());
    }
}

fn engine_with_horizon(horizon_months: u32) -> ProjectionEngine {
    ProjectionEngine::new(EngineConfig {
        horizon_months,
        upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
    })
}

pub fn cmd_export_categories(
    snapshot: &Snapshot,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let breakdown = ProjectionEngine::default().category_breakdown(snapshot);
    let mut out = open_output(output)?;
    export::export_category_breakdown(&breakdown, parse_format(format)?, &mut out)?;
    report_written(output);
    Ok(())
}

pub fn cmd_export_months(
    snapshot: &Snapshot,
    format: &str,
    output: Option<&Path>,
    horizon: u32,
    now: DateTime<Utc>,
) -> Result<()> {
    let projection = engine_with_horizon(horizon).monthly_projection(snapshot, now);
    let mut out = open_output(output)?;
    export::export_projection(&projection, parse_format(format)?, &mut out)?;
    report_written(output);
    Ok(())
}

pub fn cmd_export_peaks(
    snapshot: &Snapshot,
    format: &str,
    output: Option<&Path>,
    horizon: u32,
    now: DateTime<Utc>,
) -> Result<()> {
    let peaks = engine_with_horizon(horizon).peak_months(snapshot, now);
    let mut out = open_output(output)?;
    export::export_peak_months(&peaks, parse_format(format)?, &mut out)?;
    report_written(output);
    Ok(())
}

pub fn cmd_export_timeline(
    snapshot: &Snapshot,
    format: &str,
    output: Option<&Path>,
    now: DateTime<Utc>,
) -> Result<()> {
    let timeline =
        ProjectionEngine::default().timeline(snapshot, &TimelineFilter::default(), now);
    let mut out = open_output(output)?;
    export::export_timeline(&timeline, parse_format(format)?, &mut out)?;
    report_written(output);
    Ok(())
}
