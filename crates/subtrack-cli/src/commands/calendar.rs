//! Payment calendar and upcoming-renewal commands

use anyhow::Result;
use chrono::{DateTime, Utc};
use subtrack_core::engine::{EngineConfig, ProjectionEngine, DEFAULT_HORIZON_MONTHS};
use subtrack_core::snapshot::Snapshot;

use super::{print_skipped, truncate};

pub fn cmd_calendar(
    snapshot: &Snapshot,
    horizon: u32,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let engine = ProjectionEngine::new(EngineConfig {
        horizon_months: horizon,
        upcoming_window_days: 7,
    });
    let calendar = engine.payment_calendar(snapshot, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&calendar)?);
        return Ok(());
    }

    println!();
    println!("🗓  Payment Calendar ({} months)", horizon);
    println!("   ─────────────────────────────────────────────────────────────");

    for month in &calendar.months {
        if month.events.is_empty() {
            continue;
        }
        println!();
        println!("   {}", month.month_label);
        for event in &month.events {
            let note = if event.is_trial {
                " (trial ends)"
            } else if !event.is_active {
                " (inactive)"
            } else {
                ""
            };
            println!(
                "      {}  {:24} {:>10.2}{}",
                event.date,
                truncate(&event.subscription_name, 24),
                event.amount,
                note
            );
        }
    }

    if calendar.months.iter().all(|m| m.events.is_empty()) {
        println!("   Nothing scheduled in this window.");
    }

    print_skipped(&calendar.skipped);
    Ok(())
}

pub fn cmd_upcoming(
    snapshot: &Snapshot,
    days: i64,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let engine = ProjectionEngine::new(EngineConfig {
        horizon_months: DEFAULT_HORIZON_MONTHS,
        upcoming_window_days: days,
    });
    let upcoming = engine.upcoming_renewals(snapshot, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&upcoming)?);
        return Ok(());
    }

    println!();
    println!("⏰ Upcoming Renewals (next {} days)", upcoming.window_days);
    println!("   ─────────────────────────────────────────────────────────────");

    if upcoming.items.is_empty() {
        println!("   Nothing due in this window.");
        print_skipped(&upcoming.skipped);
        return Ok(());
    }

    for item in &upcoming.items {
        let note = if item.is_trial { " (trial ends)" } else { "" };
        println!(
            "   {}  {:24} {:>10.2}{}",
            item.date,
            truncate(&item.subscription_name, 24),
            item.amount,
            note
        );
    }

    println!();
    println!("   Total due: ${:.2}", upcoming.total_due);

    print_skipped(&upcoming.skipped);
    Ok(())
}
