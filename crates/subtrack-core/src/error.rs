//! Error types for subtrack

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A subscription carries a billing cycle the engine does not know how
    /// to expand. Fatal for that subscription only; the aggregator catches
    /// this at the per-record boundary and reports a skipped record.
    #[error("unrecognized billing cycle \"{cycle}\" on subscription {subscription_id}")]
    UnrecognizedCycle {
        subscription_id: String,
        cycle: String,
    },

    #[error("invalid snapshot data: {0}")]
    InvalidData(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, Error>;
