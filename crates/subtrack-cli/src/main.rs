//! Subtrack CLI - subscription billing projections and analytics
//!
//! Usage:
//!   subtrack report categories            Category cost breakdown
//!   subtrack report months                12-month spend projection
//!   subtrack timeline --search netflix    Filtered event timeline
//!   subtrack export months --format csv   Reproducible report export

mod cli;
mod commands;


use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let snapshot = commands::load_snapshot(&cli.snapshot)?;
    let now = Utc::now();

    match cli.command {
        Commands::Report { report_type } => match report_type {
            ReportType::Categories => {
                commands::cmd_report_categories(&snapshot, cli.json)
            }
            ReportType::Months { horizon } => {
                commands::cmd_report_months(&snapshot, horizon, now, cli.json)
            }
            ReportType::Peaks { horizon } => {
                commands::cmd_report_peaks(&snapshot, horizon, now, cli.json)
            }
            ReportType::Trends => commands::cmd_report_trends(&snapshot, cli.json),
        },
        Commands::Timeline {
            search,
            action,
            range,
        } => commands::cmd_timeline(
            &snapshot,
            search.as_deref(),
            action.as_deref(),
            &range,
            now,
            cli.json,
        ),
        Commands::Calendar { horizon } => {
            commands::cmd_calendar(&snapshot, horizon, now, cli.json)
        }
        Commands::Upcoming { days } => {
            commands::cmd_upcoming(&snapshot, days, now, cli.json)
        }
        Commands::Export { export_type } => match export_type {
            ExportType::Categories { format, output } => {
                commands::cmd_export_categories(&snapshot, &format, output.as_deref())
            }
            ExportType::Months {
                format,
                output,
                horizon,
            } => commands::cmd_export_months(&snapshot, &format, output.as_deref(), horizon, now),
            ExportType::Peaks {
                format,
                output,
                horizon,
            } => commands::cmd_export_peaks(&snapshot, &format, output.as_deref(), horizon, now),
            ExportType::Timeline { format, output } => {
                commands::cmd_export_timeline(&snapshot, &format, output.as_deref(), now)
            }
        },
    }
}
