use crate::{MissRecord, MissResult, MissStats};
use async_trait::async_trait;

/// Durable, append-only destination for miss records
#[async_trait]
pub trait MissSink: Send + Sync {
    /// Persist one record
    ///
    /// # Errors
    /// Returns `MissError::RecordingFailed` if the record could not be stored
    async fn append(&self, record: &MissRecord) -> MissResult<()>;

    /// Sink name for logs
    fn name(&self) -> &str;
}

/// Aggregate reporting over recorded misses
#[async_trait]
pub trait MissStatsSource: Send + Sync {
    /// Compute statistics, including the `recent_limit` most recent misses
    ///
    /// # Errors
    /// Returns `MissError::Storage` if the backing store cannot be queried
    async fn stats(&self, recent_limit: usize) -> MissResult<MissStats>;
}
