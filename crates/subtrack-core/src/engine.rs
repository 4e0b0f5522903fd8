//! Query facade
//!
//! The single entry point external collaborators call. The engine is
//! stateless and synchronous: every operation is a pure function of the
//! snapshot, the configuration, and a caller-supplied "now" — there is no
//! ambient clock and no cached state, so identical inputs always produce
//! identical output and the operations may run in parallel over one
//! snapshot without synchronization.

use chrono::{DateTime, Utc};

use crate::aggregate;
use crate::models::{
    CategoryBreakdown, GroupedTimeline, PaymentCalendar, PeakMonthsReport, ProjectionReport,
    TimelineFilter, TrendsReport, UpcomingRenewals,
};
use crate::snapshot::Snapshot;
use crate::timeline;

/// Months projected forward when the caller does not say otherwise.
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// Look-ahead window for the upcoming-renewals view.
pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;

/// The engine's only tunables, passed as plain values — never global state.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub horizon_months: u32,
    pub upcoming_window_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
        }
    }
}

/// Stateless dispatcher over the aggregation and timeline modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionEngine {
    config: EngineConfig,
}

impl ProjectionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Category breakdown of active, non-trial subscriptions.
    pub fn category_breakdown(&self, snapshot: &Snapshot) -> CategoryBreakdown {
        aggregate::category_breakdown(&snapshot.subscriptions)
    }

    /// Forward-looking per-month spend projection over the horizon.
    pub fn monthly_projection(
        &self,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> ProjectionReport {
        aggregate::monthly_projection(
            &snapshot.subscriptions,
            now.date_naive(),
            self.config.horizon_months,
        )
    }

    /// Projection buckets ranked by spend, highest first.
    pub fn peak_months(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> PeakMonthsReport {
        aggregate::peak_months(&self.monthly_projection(snapshot, now))
    }

    /// Backward-looking monthly activity folded from the history log.
    pub fn spending_trends(&self, snapshot: &Snapshot) -> TrendsReport {
        aggregate::spending_trends(&snapshot.history)
    }

    /// Filtered, grouped event timeline with analytics.
    pub fn timeline(
        &self,
        snapshot: &Snapshot,
        filter: &TimelineFilter,
        now: DateTime<Utc>,
    ) -> GroupedTimeline {
        timeline::build(&snapshot.history, filter, now)
    }

    /// Display calendar over all subscriptions, informational entries for
    /// inactive ones included.
    pub fn payment_calendar(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> PaymentCalendar {
        aggregate::payment_calendar(
            &snapshot.subscriptions,
            now.date_naive(),
            self.config.horizon_months,
        )
    }

    /// Renewals due within the configured look-ahead window.
    pub fn upcoming_renewals(
        &self,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> UpcomingRenewals {
        aggregate::upcoming_renewals(
            &snapshot.subscriptions,
            now.date_naive(),
            self.config.upcoming_window_days,
        )
    }
}
