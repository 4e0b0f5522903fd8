//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Subtrack - project and analyze recurring subscription spend
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(about = "Billing projections and analytics over a subscription snapshot", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Snapshot JSON file ({subscriptions, history}) exported from the
    /// subscription store
    #[arg(long, default_value = "snapshot.json", global = true)]
    pub snapshot: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate projection and analytics reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Show the grouped subscription event timeline
    Timeline {
        /// Case-insensitive search over subscription names and actions
        #[arg(short, long)]
        search: Option<String>,

        /// Filter to one action (e.g. created, renewal, payment_success)
        #[arg(short, long)]
        action: Option<String>,

        /// Time range: today, this-week, this-month, all
        #[arg(short, long, default_value = "all")]
        range: String,
    },

    /// Show the payment calendar, inactive subscriptions included
    Calendar {
        /// Months ahead to display
        #[arg(long, default_value = "12")]
        horizon: u32,
    },

    /// Show renewals due in the next few days
    Upcoming {
        /// Look-ahead window in days
        #[arg(short, long, default_value = "7")]
        days: i64,
    },

    /// Export a report to CSV or JSON
    Export {
        #[command(subcommand)]
        export_type: ExportType,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Category cost breakdown of active subscriptions
    Categories,

    /// Monthly spend projection over the horizon
    Months {
        /// Months ahead to project
        #[arg(long, default_value = "12")]
        horizon: u32,
    },

    /// Months ranked by projected spend
    Peaks {
        /// Months ahead to project
        #[arg(long, default_value = "12")]
        horizon: u32,
    },

    /// Historical renewal, cancellation, and payment trends
    Trends,
}

#[derive(Subcommand)]
pub enum ExportType {
    /// Export the category breakdown
    Categories {
        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the monthly projection
    Months {
        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Months ahead to project
        #[arg(long, default_value = "12")]
        horizon: u32,
    },

    /// Export the peak-months ranking
    Peaks {
        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Months ahead to project
        #[arg(long, default_value = "12")]
        horizon: u32,
    },

    /// Export the event timeline
    Timeline {
        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
