//! Subtrack Core Library
//!
//! Recurring billing projection and analytics engine:
//! - Calendar arithmetic for billing cadences with month-length clamping
//! - Occurrence generation over a bounded projection horizon
//! - Cost normalization across weekly/monthly/quarterly/yearly cycles
//! - Category, monthly-projection, peak-month, and trend aggregation
//! - Grouped, filterable history timelines
//! - CSV/JSON export of every derived view
//!
//! The engine is a pure, read-only projection over a snapshot of
//! subscriptions and history entries: it owns no storage, performs no I/O
//! during computation, and never mutates its inputs.

pub mod aggregate;
pub mod calendar;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod occurrence;
pub mod snapshot;
pub mod timeline;

/// Test fixtures shared by unit and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use engine::{
    EngineConfig, ProjectionEngine, DEFAULT_HORIZON_MONTHS, DEFAULT_UPCOMING_WINDOW_DAYS,
};
pub use error::{Error, Result};
pub use export::ExportFormat;
pub use models::{
    BillingCycle, CategoryAggregate, CategoryBreakdown, GroupedTimeline, HistoryAction,
    HistoryEntry, MonthProjection, Occurrence, PaymentCalendar, PeakMonthsReport,
    ProjectionReport, SkipReason, SkippedRecord, Subscription, TimeRange, TimelineFilter,
    TrendsReport, UpcomingRenewals,
};
pub use snapshot::{Snapshot, SnapshotFile, SnapshotSource};
