//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `reports` - Category, projection, peak, and trend reports
//! - `timeline` - Grouped event timeline with analytics
//! - `calendar` - Payment calendar and upcoming-renewal views
//! - `export` - CSV/JSON report export

pub mod calendar;
pub mod export;
pub mod reports;
pub mod timeline;

// Re-export command functions for main.rs
pub use calendar::*;
pub use export::*;
pub use reports::*;
pub use timeline::*;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use subtrack_core::models::SkippedRecord;
use subtrack_core::snapshot::{Snapshot, SnapshotFile};

/// Load a snapshot document and capture it for the engine.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let file = SnapshotFile::load(path)
        .with_context(|| format!("Failed to load snapshot file {}", path.display()))?;
    let snapshot = Snapshot::capture(&file, Utc::now()).context("Failed to capture snapshot")?;
    tracing::debug!(
        subscriptions = snapshot.subscriptions.len(),
        history = snapshot.history.len(),
        "Snapshot ready"
    );
    Ok(snapshot)
}

/// Print skipped-record advisories after a report, if any.
pub fn print_skipped(skipped: &[SkippedRecord]) {
    if skipped.is_empty() {
        return;
    }
    println!();
    println!(
        "   ⚠️  {} subscription(s) excluded from analytics:",
        skipped.len()
    );
    for record in skipped {
        println!(
            "      {} ({}): {}",
            record.subscription_name, record.subscription_id, record.reason
        );
    }
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
