use crate::error::InsufficientHistoryError;
use crate::history::{Sample, SampleHistory, ShiftedResult};
use crate::SampleSource;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Default retention horizon: long enough for 15 minute averages.
pub const DEFAULT_RETENTION_SECS: u64 = 900;

type SharedHistory<V> = Arc<RwLock<SampleHistory<V>>>;

/// Samples a [`SampleSource`] periodically and answers window queries over
/// the recorded history.
///
/// Each key owns its own lock, so a `collect` appending to one device never
/// blocks a reader of another. Readers see a history either before or after
/// an append, never in between.
pub struct TimeWindowedCollector<S: SampleSource> {
    source: S,
    retention_secs: u64,
    histories: DashMap<S::Key, SharedHistory<S::Sample>>,
}

impl<S: SampleSource> TimeWindowedCollector<S> {
    pub fn new(source: S, retention_secs: u64) -> Self {
        Self {
            source,
            retention_secs,
            histories: DashMap::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reads one sample per key from the source and records it with the
    /// current time.
    pub fn collect(&self) {
        self.collect_at(Utc::now().timestamp());
    }

    /// Same as [`collect`](Self::collect) with an explicit timestamp.
    pub fn collect_at(&self, now: i64) {
        let samples = match self.source.read_all() {
            Ok(samples) => samples,
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "Collection failed");
                return;
            }
        };

        tracing::trace!(source = self.source.name(), count = samples.len(), now, "Collected samples");

        for (key, value) in samples {
            self.append(key, now, value);
        }
    }

    /// Appends a sample to `key`'s history, creating the history on first use.
    pub fn append(&self, key: S::Key, timestamp: i64, value: S::Sample) {
        let history = self
            .histories
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(SampleHistory::new(self.retention_secs))))
            .value()
            .clone();

        let appended = history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .append(timestamp, value);

        if !appended {
            tracing::debug!(
                source = self.source.name(),
                key = %key,
                timestamp,
                "Sample dropped, not newer than latest"
            );
        }
    }

    fn history(&self, key: &S::Key) -> Option<SharedHistory<S::Sample>> {
        self.histories.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the sample for `key` with the largest timestamp at or before
    /// `reference_time - window`, together with that sample's own timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`InsufficientHistoryError`] when the key has never been
    /// collected or no sample is old enough.
    pub fn get_shifted(
        &self,
        key: &S::Key,
        window: i64,
        reference_time: i64,
    ) -> Result<ShiftedResult<S::Sample>, InsufficientHistoryError> {
        let target = reference_time.saturating_sub(window);
        let insufficient = || InsufficientHistoryError {
            key: key.to_string(),
            target,
        };

        let history = self.history(key).ok_or_else(insufficient)?;
        let guard = history.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .at_or_before(target)
            .cloned()
            .map(ShiftedResult::from)
            .ok_or_else(insufficient)
    }

    /// Returns the most recent sample for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`InsufficientHistoryError`] when the history is empty.
    pub fn get_latest(&self, key: &S::Key) -> Result<Sample<S::Sample>, InsufficientHistoryError> {
        let insufficient = || InsufficientHistoryError {
            key: key.to_string(),
            target: i64::MAX,
        };

        let history = self.history(key).ok_or_else(insufficient)?;
        let guard = history.read().unwrap_or_else(PoisonError::into_inner);
        guard.latest().cloned().ok_or_else(insufficient)
    }

    /// Keys with at least one recorded sample.
    pub fn tracked_keys(&self) -> Vec<S::Key> {
        self.histories.iter().map(|entry| entry.key().clone()).collect()
    }
}
