//! Timeline building over the append-only history log
//!
//! Filters compose with AND semantics, entries group under relative-date
//! buckets against a caller-supplied "now", and every entry is rendered to
//! a human description from a per-action template table. Unknown actions
//! render generically; they never fail the build. The source entries are
//! reordered and grouped but never edited.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::calendar;
use crate::models::{
    ActionCount, GroupedTimeline, HistoryAction, HistoryEntry, SubscriptionActivity,
    TimeRange, TimelineAnalytics, TimelineEvent, TimelineFilter, TimelineGroup,
};

/// Render one history entry to a human-readable description.
pub fn describe(entry: &HistoryEntry) -> String {
    let name = &entry.subscription_name;
    let old = entry.old_value.as_deref();
    let new = entry.new_value.as_deref();

    match &entry.action {
        HistoryAction::Created => format!("Created subscription \"{}\"", name),
        HistoryAction::Updated => match (old, new) {
            (Some(old), Some(new)) => {
                format!("Updated \"{}\" from \"{}\" to \"{}\"", name, old, new)
            }
            _ => format!("Updated subscription \"{}\"", name),
        },
        HistoryAction::Deleted => format!("Deleted subscription \"{}\"", name),
        HistoryAction::PaymentSuccess => match new {
            Some(amount) => format!("Payment of {} for \"{}\" succeeded", amount, name),
            None => format!("Payment for \"{}\" succeeded", name),
        },
        HistoryAction::PaymentFailed => format!("Payment for \"{}\" failed", name),
        HistoryAction::CostChanged => match (old, new) {
            (Some(old), Some(new)) => {
                format!("Cost of \"{}\" changed from {} to {}", name, old, new)
            }
            _ => format!("Cost of \"{}\" changed", name),
        },
        HistoryAction::Renewal => format!("Renewed \"{}\"", name),
        HistoryAction::Pause => format!("Paused \"{}\"", name),
        HistoryAction::Resume => format!("Resumed \"{}\"", name),
        HistoryAction::Cancel => format!("Cancelled \"{}\"", name),
        HistoryAction::Refund => format!("Refund issued for \"{}\"", name),
        HistoryAction::TrialStart => format!("Trial started for \"{}\"", name),
        HistoryAction::TrialEnd => format!("Trial ended for \"{}\"", name),
        // Open action set: anything unrecognized gets the generic rendering
        HistoryAction::Other(action) => format!("Recorded \"{}\" for \"{}\"", action, name),
    }
}

fn in_time_range(at: DateTime<Utc>, range: TimeRange, now: DateTime<Utc>) -> bool {
    match range {
        TimeRange::All => true,
        TimeRange::Today => at.date_naive() == now.date_naive(),
        TimeRange::ThisWeek => {
            let days_ago = (now.date_naive() - at.date_naive()).num_days();
            (0..7).contains(&days_ago)
        }
        TimeRange::ThisMonth => {
            at.year() == now.year() && at.month() == now.month()
        }
    }
}

fn matches(entry: &HistoryEntry, filter: &TimelineFilter, now: DateTime<Utc>) -> bool {
    if let Some(term) = filter.search_term.as_deref().map(str::trim) {
        if !term.is_empty() {
            let term = term.to_lowercase();
            let name_hit = entry.subscription_name.to_lowercase().contains(&term);
            let action_hit = entry.action.as_str().to_lowercase().contains(&term);
            if !name_hit && !action_hit {
                return false;
            }
        }
    }
    if let Some(action) = &filter.action {
        if entry.action != *action {
            return false;
        }
    }
    in_time_range(entry.created_at, filter.time_range, now)
}

/// Relative-date bucket: (sort key, label). Lower keys sort first, so the
/// most recent bucket leads; literal month buckets order newest-first via
/// the negated month index.
fn bucket(at: DateTime<Utc>, now: DateTime<Utc>) -> ((u8, i64), String) {
    let date = at.date_naive();
    let days_ago = (now.date_naive() - date).num_days();

    if days_ago == 0 {
        return ((0, 0), "Today".to_string());
    }
    if days_ago == 1 {
        return ((1, 0), "Yesterday".to_string());
    }
    if (0..7).contains(&days_ago) {
        return ((2, 0), "This Week".to_string());
    }
    if date.year() == now.year() && date.month() == now.month() {
        return ((3, 0), "This Month".to_string());
    }

    let month_index = date.year() as i64 * 12 + date.month0() as i64;
    ((4, -month_index), calendar::month_label(date))
}

fn compute_analytics(filtered: &[&HistoryEntry], now: DateTime<Utc>) -> TimelineAnalytics {
    let mut action_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut per_subscription: BTreeMap<String, u64> = BTreeMap::new();
    let mut last_30_days = 0u64;

    for entry in filtered {
        *action_counts
            .entry(entry.action.as_str().to_string())
            .or_insert(0) += 1;
        *per_subscription
            .entry(entry.subscription_name.clone())
            .or_insert(0) += 1;

        let age = now.signed_duration_since(entry.created_at);
        if age >= Duration::zero() && age <= Duration::days(30) {
            last_30_days += 1;
        }
    }

    let mut most_active: Vec<SubscriptionActivity> = per_subscription
        .into_iter()
        .map(|(subscription_name, event_count)| SubscriptionActivity {
            subscription_name,
            event_count,
        })
        .collect();
    // Count descending; the BTreeMap already yields names ascending, and the
    // stable sort preserves that for ties
    most_active.sort_by(|a, b| b.event_count.cmp(&a.event_count));
    most_active.truncate(5);

    TimelineAnalytics {
        total_events: filtered.len() as u64,
        action_counts: action_counts
            .into_iter()
            .map(|(action, count)| ActionCount { action, count })
            .collect(),
        most_active,
        events_last_30_days: last_30_days,
    }
}

/// Build the grouped, filtered timeline plus analytics over the filtered
/// set.
pub fn build(
    entries: &[HistoryEntry],
    filter: &TimelineFilter,
    now: DateTime<Utc>,
) -> GroupedTimeline {
    let mut filtered: Vec<&HistoryEntry> = entries
        .iter()
        .filter(|entry| matches(entry, filter, now))
        .collect();
    filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut groups: BTreeMap<(u8, i64), TimelineGroup> = BTreeMap::new();
    for entry in &filtered {
        let (key, label) = bucket(entry.created_at, now);
        groups
            .entry(key)
            .or_insert_with(|| TimelineGroup {
                label,
                entries: Vec::new(),
            })
            .entries
            .push(TimelineEvent {
                entry: (*entry).clone(),
                description: describe(entry),
            });
    }

    let analytics = compute_analytics(&filtered, now);
    tracing::debug!(
        total = analytics.total_events,
        groups = groups.len(),
        "Timeline build complete"
    );

    GroupedTimeline {
        groups: groups.into_values().collect(),
        analytics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{history_entry, ts, with_values};

    fn now() -> DateTime<Utc> {
        ts("2024-06-15T14:00:00Z")
    }

    #[test]
    fn test_relative_buckets() {
        let entries = vec![
            history_entry("h1", "s1", "Netflix", "renewal", ts("2024-06-15T12:00:00Z")),
            history_entry("h2", "s1", "Netflix", "renewal", ts("2024-06-14T12:00:00Z")),
            history_entry("h3", "s1", "Netflix", "renewal", ts("2024-06-10T12:00:00Z")),
            history_entry("h4", "s1", "Netflix", "renewal", ts("2024-06-01T12:00:00Z")),
            history_entry("h5", "s1", "Netflix", "renewal", ts("2023-05-11T12:00:00Z")),
        ];

        let timeline = build(&entries, &TimelineFilter::default(), now());
        let labels: Vec<&str> = timeline.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Today", "Yesterday", "This Week", "This Month", "May 2023"]
        );
    }

    #[test]
    fn test_old_entry_gets_literal_month_label() {
        // ~400 days before "now"
        let entries = vec![history_entry(
            "h1", "s1", "Netflix", "created", ts("2023-05-12T09:00:00Z"),
        )];
        let timeline = build(&entries, &TimelineFilter::default(), now());
        assert_eq!(timeline.groups[0].label, "May 2023");
    }

    #[test]
    fn test_literal_months_order_newest_first() {
        let entries = vec![
            history_entry("h1", "s1", "A", "created", ts("2023-02-10T09:00:00Z")),
            history_entry("h2", "s1", "A", "created", ts("2023-11-10T09:00:00Z")),
        ];
        let timeline = build(&entries, &TimelineFilter::default(), now());
        let labels: Vec<&str> = timeline.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["November 2023", "February 2023"]);
    }

    #[test]
    fn test_entries_within_group_sort_newest_first() {
        let entries = vec![
            history_entry("h1", "s1", "Netflix", "renewal", ts("2024-06-15T08:00:00Z")),
            history_entry("h2", "s1", "Netflix", "cancel", ts("2024-06-15T12:00:00Z")),
        ];
        let timeline = build(&entries, &TimelineFilter::default(), now());
        assert_eq!(timeline.groups[0].entries[0].entry.id, "h2");
    }

    #[test]
    fn test_filters_compose_with_and_semantics() {
        let entries = vec![
            history_entry("h1", "s1", "Netflix", "created", ts("2024-06-14T12:00:00Z")),
            history_entry("h2", "s1", "Netflix", "renewal", ts("2024-06-14T13:00:00Z")),
            history_entry("h3", "s2", "Spotify", "created", ts("2024-06-14T14:00:00Z")),
            history_entry("h4", "s3", "Netlify", "created", ts("2024-01-03T14:00:00Z")),
        ];

        let full = TimelineFilter {
            search_term: Some("net".to_string()),
            action: Some(HistoryAction::Created),
            time_range: TimeRange::ThisMonth,
        };
        let timeline = build(&entries, &full, now());
        assert_eq!(timeline.analytics.total_events, 1);
        assert_eq!(timeline.groups[0].entries[0].entry.id, "h1");

        // Dropping any one filter can only grow the result set
        for relaxed in [
            TimelineFilter { search_term: None, ..full.clone() },
            TimelineFilter { action: None, ..full.clone() },
            TimelineFilter { time_range: TimeRange::All, ..full.clone() },
        ] {
            let wider = build(&entries, &relaxed, now());
            assert!(wider.analytics.total_events >= timeline.analytics.total_events);
        }
    }

    #[test]
    fn test_search_is_case_insensitive_and_matches_actions() {
        let entries = vec![
            history_entry("h1", "s1", "NETFLIX", "created", ts("2024-06-14T12:00:00Z")),
            history_entry("h2", "s2", "Gym", "payment_failed", ts("2024-06-14T13:00:00Z")),
        ];

        let by_name = TimelineFilter {
            search_term: Some("netflix".to_string()),
            ..Default::default()
        };
        assert_eq!(build(&entries, &by_name, now()).analytics.total_events, 1);

        let by_action = TimelineFilter {
            search_term: Some("payment_f".to_string()),
            ..Default::default()
        };
        assert_eq!(build(&entries, &by_action, now()).analytics.total_events, 1);
    }

    #[test]
    fn test_descriptions_from_template_table() {
        let updated = with_values(
            history_entry("h1", "s1", "Netflix", "updated", now()),
            Some("15.99"),
            Some("17.99"),
        );
        assert_eq!(
            describe(&updated),
            "Updated \"Netflix\" from \"15.99\" to \"17.99\""
        );

        let bare = history_entry("h2", "s1", "Netflix", "updated", now());
        assert_eq!(describe(&bare), "Updated subscription \"Netflix\"");

        let unknown = history_entry("h3", "s1", "Netflix", "chargeback", now());
        assert_eq!(describe(&unknown), "Recorded \"chargeback\" for \"Netflix\"");
    }

    #[test]
    fn test_most_active_top_five_with_name_tiebreak() {
        let mut entries = Vec::new();
        for (i, name) in ["Zoo", "App"].iter().enumerate() {
            for j in 0..2 {
                entries.push(history_entry(
                    &format!("h{}-{}", i, j),
                    &format!("s{}", i),
                    name,
                    "renewal",
                    ts("2024-06-14T12:00:00Z"),
                ));
            }
        }
        for (i, name) in ["B", "C", "D", "E", "F"].iter().enumerate() {
            entries.push(history_entry(
                &format!("x{}", i),
                &format!("t{}", i),
                name,
                "created",
                ts("2024-06-13T12:00:00Z"),
            ));
        }

        let timeline = build(&entries, &TimelineFilter::default(), now());
        let most_active = &timeline.analytics.most_active;
        assert_eq!(most_active.len(), 5);
        // Tied leaders order by name ascending
        assert_eq!(most_active[0].subscription_name, "App");
        assert_eq!(most_active[1].subscription_name, "Zoo");
        assert_eq!(most_active[2].event_count, 1);
    }

    #[test]
    fn test_rolling_thirty_day_count() {
        let entries = vec![
            history_entry("h1", "s1", "A", "renewal", ts("2024-06-01T12:00:00Z")),
            history_entry("h2", "s1", "A", "renewal", ts("2024-04-01T12:00:00Z")),
        ];
        let timeline = build(&entries, &TimelineFilter::default(), now());
        assert_eq!(timeline.analytics.events_last_30_days, 1);
        assert_eq!(timeline.analytics.total_events, 2);
    }

    #[test]
    fn test_empty_history_yields_empty_timeline() {
        let timeline = build(&[], &TimelineFilter::default(), now());
        assert!(timeline.groups.is_empty());
        assert_eq!(timeline.analytics.total_events, 0);
    }
}
