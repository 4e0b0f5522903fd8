//! Snapshot boundary
//!
//! The engine never talks to a store directly: it consumes a `Snapshot`, a
//! point-in-time read of subscriptions and history entries. Providers must
//! hand out a consistent view (one read transaction or one atomic fetch) so
//! a concurrent mutation can never be observed half-applied; the engine
//! reads each listing exactly once per capture.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{HistoryEntry, Subscription};

/// Read-only access to the persisted subscription data.
///
/// Implementations are expected to return the same consistent view for all
/// three listings until the next mutation.
pub trait SnapshotSource {
    fn list_active_subscriptions(&self) -> Result<Vec<Subscription>>;
    fn list_all_subscriptions(&self) -> Result<Vec<Subscription>>;
    fn list_history_entries(&self) -> Result<Vec<HistoryEntry>>;
}

/// A consistent, point-in-time view of the data the engine projects over.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub subscriptions: Vec<Subscription>,
    pub history: Vec<HistoryEntry>,
    /// When the snapshot was assembled; callers may key caches on this
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Assemble a snapshot from a source with a single read of each listing.
    pub fn capture(source: &dyn SnapshotSource, taken_at: DateTime<Utc>) -> Result<Self> {
        let subscriptions = source.list_all_subscriptions()?;
        let history = source.list_history_entries()?;
        tracing::debug!(
            subscriptions = subscriptions.len(),
            history = history.len(),
            "Snapshot captured"
        );
        Ok(Self {
            subscriptions,
            history,
            taken_at,
        })
    }

    pub fn active_subscriptions(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.iter().filter(|s| s.is_active)
    }
}

/// Whole-dataset snapshot document, loadable from a JSON file.
///
/// This is the file-backed `SnapshotSource` the CLI uses: the surrounding
/// CRUD layer exports `{subscriptions, history}` and the engine projects
/// over it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFile {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl SnapshotFile {
    /// Load and parse a snapshot document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let file: SnapshotFile = serde_json::from_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            subscriptions = file.subscriptions.len(),
            history = file.history.len(),
            "Loaded snapshot file"
        );
        Ok(file)
    }
}

impl SnapshotSource for SnapshotFile {
    fn list_active_subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect())
    }

    fn list_all_subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self.subscriptions.clone())
    }

    fn list_history_entries(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.history.clone())
    }
}
