//! Report command implementations

use anyhow::Result;
use chrono::{DateTime, Utc};
use subtrack_core::engine::{EngineConfig, ProjectionEngine, DEFAULT_UPCOMING_WINDOW_DAYS};
use subtrack_core::snapshot::Snapshot;

use super::{print_skipped, truncate};

fn engine_with_horizon(horizon_months: u32) -> ProjectionEngine {
    ProjectionEngine::new(EngineConfig {
        horizon_months,
        upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
    })
}

pub fn cmd_report_categories(snapshot: &Snapshot, json: bool) -> Result<()> {
    let breakdown = ProjectionEngine::default().category_breakdown(snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    println!();
    println!("💳 Category Breakdown");
    println!("   ─────────────────────────────────────────────────────────────");

    if breakdown.categories.is_empty() {
        println!("   No active subscriptions in this snapshot.");
        print_skipped(&breakdown.skipped);
        return Ok(());
    }

    println!(
        "   Monthly: ${:.2}    Yearly: ${:.2}",
        breakdown.total_monthly_cost, breakdown.total_yearly_cost
    );
    println!();
    println!(
        "   {:20} │ {:>5} │ {:>10} │ {:>10} │ {:>6}",
        "Category", "Subs", "Monthly", "Yearly", "%"
    );
    println!("   ─────────────────────┼───────┼────────────┼────────────┼────────");

    for cat in &breakdown.categories {
        println!(
            "   {:20} │ {:>5} │ {:>10.2} │ {:>10.2} │ {:>5.1}%",
            truncate(&cat.category, 20),
            cat.count,
            cat.total_monthly_cost,
            cat.total_yearly_cost,
            cat.percentage
        );
    }

    print_skipped(&breakdown.skipped);
    Ok(())
}

pub fn cmd_report_months(
    snapshot: &Snapshot,
    horizon: u32,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let projection = engine_with_horizon(horizon).monthly_projection(snapshot, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&projection)?);
        return Ok(());
    }

    println!();
    println!("📅 Monthly Projection ({} months)", projection.horizon_months);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:16} │ {:>10} │ {:>8} │",
        "Month", "Amount", "Charges"
    );
    println!("   ─────────────────┼────────────┼──────────┼─────");

    for month in &projection.months {
        let marker = if month.above_average { "▲" } else { " " };
        println!(
            "   {:16} │ {:>10.2} │ {:>8} │ {}",
            month.month_label,
            month.total_amount,
            month.occurrences.len(),
            marker
        );
    }

    println!("   ─────────────────┼────────────┼──────────┼─────");
    println!(
        "   {:16} │ {:>10.2} │          │ ▲ above average",
        "Average", projection.average_month_total
    );

    print_skipped(&projection.skipped);
    Ok(())
}

pub fn cmd_report_peaks(
    snapshot: &Snapshot,
    horizon: u32,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let peaks = engine_with_horizon(horizon).peak_months(snapshot, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&peaks)?);
        return Ok(());
    }

    println!();
    println!("🔝 Peak Spending Months");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {:4} │ {:16} │ {:>10}", "#", "Month", "Amount");
    println!("   ─────┼──────────────────┼────────────");

    for month in &peaks.months {
        println!(
            "   {:>4} │ {:16} │ {:>10.2}",
            month.rank, month.month_label, month.total_amount
        );
    }

    print_skipped(&peaks.skipped);
    Ok(())
}

pub fn cmd_report_trends(snapshot: &Snapshot, json: bool) -> Result<()> {
    let trends = ProjectionEngine::default().spending_trends(snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&trends)?);
        return Ok(());
    }

    println!();
    println!("📈 Historical Trends");
    println!("   ─────────────────────────────────────────────────────────────");

    if trends.points.is_empty() {
        println!("   No renewal, cancellation, or payment history recorded.");
        return Ok(());
    }

    println!(
        "   {:16} │ {:>8} │ {:>8} │ {:>8} │ {:>10}",
        "Month", "Renewals", "Cancels", "Payments", "Paid"
    );
    println!("   ─────────────────┼──────────┼──────────┼──────────┼────────────");

    for point in &trends.points {
        println!(
            "   {:16} │ {:>8} │ {:>8} │ {:>8} │ {:>10.2}",
            point.month_label,
            point.renewal_count,
            point.cancellation_count,
            point.payment_count,
            point.amount_paid
        );
    }

    let total_paid: f64 = trends.points.iter().map(|p| p.amount_paid).sum();
    println!("   ─────────────────┼──────────┼──────────┼──────────┼────────────");
    println!(
        "   {:16} │          │          │          │ {:>10.2}",
        "Total", total_paid
    );

    Ok(())
}
