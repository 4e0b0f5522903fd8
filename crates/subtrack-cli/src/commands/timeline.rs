//! Timeline command implementation

use anyhow::Result;
use chrono::{DateTime, Utc};
use subtrack_core::engine::ProjectionEngine;
use subtrack_core::models::{HistoryAction, TimeRange, TimelineFilter};
use subtrack_core::snapshot::Snapshot;

use super::truncate;

pub fn cmd_timeline(
    snapshot: &Snapshot,
    search: Option<&str>,
    action: Option<&str>,
    range: &str,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let time_range: TimeRange = range
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{} (use today, this-week, this-month, all)", e))?;

    let filter = TimelineFilter {
        search_term: search.map(|s| s.to_string()),
        action: action.map(HistoryAction::from),
        time_range,
    };

    let timeline = ProjectionEngine::default().timeline(snapshot, &filter, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
        return Ok(());
    }

    println!();
    println!("🕑 Subscription Timeline");
    if search.is_some() || action.is_some() || time_range != TimeRange::All {
        println!(
            "   Filter: search={} action={} range={}",
            search.unwrap_or("*"),
            action.unwrap_or("*"),
            time_range
        );
    }
    println!("   ─────────────────────────────────────────────────────────────");

    if timeline.groups.is_empty() {
        println!("   No events match this filter.");
        return Ok(());
    }

    for group in &timeline.groups {
        println!();
        println!("   {}", group.label);
        for event in &group.entries {
            println!(
                "      {}  {}",
                event.entry.created_at.format("%Y-%m-%d %H:%M"),
                truncate(&event.description, 70)
            );
        }
    }

    let analytics = &timeline.analytics;
    println!();
    println!(
        "   {} event(s), {} in the last 30 days",
        analytics.total_events, analytics.events_last_30_days
    );

    if !analytics.most_active.is_empty() {
        let names: Vec<String> = analytics
            .most_active
            .iter()
            .map(|a| format!("{} ({})", a.subscription_name, a.event_count))
            .collect();
        println!("   Most active: {}", names.join(", "));
    }

    Ok(())
}
