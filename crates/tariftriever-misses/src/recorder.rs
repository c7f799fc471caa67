//! Fire-and-forget hand-off to a miss sink

use crate::{MissError, MissRecord, MissSink};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Cheap-to-clone sender side of the miss pipeline.
///
/// `record_miss` never blocks and never fails. A background task drains the
/// channel into the sink; sink errors are logged and the record dropped.
/// Once every clone is dropped the task finishes the backlog and exits.
#[derive(Clone)]
pub struct MissRecorder {
    tx: mpsc::UnboundedSender<MissRecord>,
}

impl MissRecorder {
    /// Start the background writer. Must be called inside a Tokio runtime.
    pub fn spawn(sink: Arc<dyn MissSink>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<MissRecord>();

        let worker = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                match sink.append(&record).await {
                    Ok(()) => {
                        metrics::counter!("tariftriever_misses_recorded_total").increment(1);
                        tracing::debug!(
                            sink = sink.name(),
                            language = %record.language,
                            "Miss recorded"
                        );
                    }
                    Err(e) => {
                        metrics::counter!("tariftriever_miss_recording_failures_total")
                            .increment(1);
                        tracing::warn!(
                            sink = sink.name(),
                            error = %e,
                            "Dropping miss record"
                        );
                    }
                }
            }
            tracing::debug!(sink = sink.name(), "Miss recorder stopped");
        });

        (Self { tx }, worker)
    }

    /// Queue a record for persistence
    pub fn record_miss(&self, record: MissRecord) {
        if let Err(e) = self.tx.send(record) {
            let error = MissError::recording_failed(format!("recorder task has stopped: {e}"));
            tracing::warn!(error = %error, "Dropping miss record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryMissSink;
    use std::time::Duration;
    use tariftriever_common::Language;

    #[tokio::test]
    async fn test_records_reach_the_sink() {
        let sink = InMemoryMissSink::new();
        let (recorder, worker) = MissRecorder::spawn(Arc::new(sink.clone()));

        recorder.record_miss(MissRecord::new("xyzzy", Language::Ru, Some(7), "test"));
        recorder.record_miss(MissRecord::new("xyzzy", Language::Ru, Some(7), "test"));

        drop(recorder);
        worker.await.unwrap();

        // No deduplication: both identical misses are kept
        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.query_text == "xyzzy"));
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let sink = InMemoryMissSink::new();
        sink.set_failing(true);
        let (recorder, worker) = MissRecorder::spawn(Arc::new(sink.clone()));

        recorder.record_miss(MissRecord::new("lost", Language::En, None, "test"));
        // Let the worker attempt (and drop) the first record
        tokio::time::sleep(Duration::from_millis(50)).await;
        sink.set_failing(false);
        recorder.record_miss(MissRecord::new("kept", Language::En, None, "test"));

        assert!(sink.wait_for(1, Duration::from_secs(1)).await);
        drop(recorder);
        worker.await.unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query_text, "kept");
    }

    #[tokio::test]
    async fn test_record_after_worker_stopped_does_not_panic() {
        let sink = InMemoryMissSink::new();
        let (recorder, worker) = MissRecorder::spawn(Arc::new(sink));
        worker.abort();
        let _ = worker.await;

        recorder.record_miss(MissRecord::new("late", Language::Ru, None, "test"));
    }
}
