//! Export of derived reports
//!
//! The export collaborator consumes the aggregator's and timeline builder's
//! output verbatim: field names and row ordering are stable, so the same
//! snapshot always exports byte-identical files.

use std::io::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{CategoryBreakdown, GroupedTimeline, PeakMonthsReport, ProjectionReport};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {} (use csv or json)", s)),
        }
    }
}

/// CSV row for the category breakdown.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRow<'a> {
    category: &'a str,
    count: usize,
    total_monthly_cost: f64,
    total_yearly_cost: f64,
    percentage: f64,
}

/// CSV row for the monthly projection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthRow<'a> {
    month_key: &'a str,
    month_label: &'a str,
    total_amount: f64,
    above_average: bool,
}

/// CSV row for the peak-months ranking.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PeakRow<'a> {
    rank: usize,
    month_key: &'a str,
    month_label: &'a str,
    total_amount: f64,
    above_average: bool,
}

/// CSV row for the timeline: one line per event, bucket label included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimelineRow<'a> {
    group: &'a str,
    created_at: String,
    action: &'a str,
    subscription_name: &'a str,
    description: &'a str,
}

fn write_json<W: Write, T: Serialize>(value: &T, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}

fn into_export_error(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Error {
    Error::Export(err.to_string())
}

fn write_csv_rows<W: Write, T: Serialize>(rows: Vec<T>, out: &mut W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let buffer = writer.into_inner().map_err(into_export_error)?;
    out.write_all(&buffer)?;
    Ok(())
}

/// Write the category breakdown, one row per category.
pub fn export_category_breakdown<W: Write>(
    breakdown: &CategoryBreakdown,
    format: ExportFormat,
    mut out: W,
) -> Result<()> {
    match format {
        ExportFormat::Json => write_json(breakdown, out),
        ExportFormat::Csv => {
            let rows: Vec<CategoryRow> = breakdown
                .categories
                .iter()
                .map(|c| CategoryRow {
                    category: &c.category,
                    count: c.count,
                    total_monthly_cost: c.total_monthly_cost,
                    total_yearly_cost: c.total_yearly_cost,
                    percentage: c.percentage,
                })
                .collect();
            write_csv_rows(rows, &mut out)
        }
    }
}

/// Write the monthly projection, one row per horizon month in
/// chronological order.
pub fn export_projection<W: Write>(
    projection: &ProjectionReport,
    format: ExportFormat,
    mut out: W,
) -> Result<()> {
    match format {
        ExportFormat::Json => write_json(projection, out),
        ExportFormat::Csv => {
            let rows: Vec<MonthRow> = projection
                .months
                .iter()
                .map(|m| MonthRow {
                    month_key: &m.month_key,
                    month_label: &m.month_label,
                    total_amount: m.total_amount,
                    above_average: m.above_average,
                })
                .collect();
            write_csv_rows(rows, &mut out)
        }
    }
}

/// Write the peak-months ranking, highest spend first.
pub fn export_peak_months<W: Write>(
    peaks: &PeakMonthsReport,
    format: ExportFormat,
    mut out: W,
) -> Result<()> {
    match format {
        ExportFormat::Json => write_json(peaks, out),
        ExportFormat::Csv => {
            let rows: Vec<PeakRow> = peaks
                .months
                .iter()
                .map(|m| PeakRow {
                    rank: m.rank,
                    month_key: &m.month_key,
                    month_label: &m.month_label,
                    total_amount: m.total_amount,
                    above_average: m.above_average,
                })
                .collect();
            write_csv_rows(rows, &mut out)
        }
    }
}

/// Write the grouped timeline, one row per event in display order.
pub fn export_timeline<W: Write>(
    timeline: &GroupedTimeline,
    format: ExportFormat,
    mut out: W,
) -> Result<()> {
    match format {
        ExportFormat::Json => write_json(timeline, out),
        ExportFormat::Csv => {
            let mut rows = Vec::new();
            for group in &timeline.groups {
                for event in &group.entries {
                    rows.push(TimelineRow {
                        group: &group.label,
                        created_at: event.entry.created_at.to_rfc3339(),
                        action: event.entry.action.as_str(),
                        subscription_name: &event.entry.subscription_name,
                        description: &event.description,
                    });
                }
            }
            write_csv_rows(rows, &mut out)
        }
    }
}
