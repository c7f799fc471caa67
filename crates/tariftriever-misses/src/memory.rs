//! Process-local miss sink

use crate::{MissError, MissRecord, MissResult, MissSink, MissStats, MissStatsSource};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

/// Keeps miss records in memory. Used when no database is configured and
/// as the test double for the resolver.
#[derive(Clone, Default)]
pub struct InMemoryMissSink {
    records: Arc<Mutex<Vec<MissRecord>>>,
    appended: Arc<Notify>,
    fail: Arc<AtomicBool>,
}

impl InMemoryMissSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every append and stats query fail until cleared
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MissRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn records(&self) -> Vec<MissRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least `count` records arrived or `timeout` elapsed.
    /// Returns whether the count was reached.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.appended.notified();
                if self.len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }
}

#[async_trait]
impl MissSink for InMemoryMissSink {
    async fn append(&self, record: &MissRecord) -> MissResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MissError::recording_failed("in-memory sink set to fail"));
        }
        self.lock().push(record.clone());
        self.appended.notify_waiters();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl MissStatsSource for InMemoryMissSink {
    async fn stats(&self, recent_limit: usize) -> MissResult<MissStats> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MissError::storage("in-memory sink set to fail"));
        }
        let records = self.records();
        Ok(MissStats::from_records(&records, recent_limit, Utc::now()))
    }
}
