use std::collections::VecDeque;

/// One reading of a counter record, taken at `timestamp` (seconds since the
/// epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample<V> {
    pub timestamp: i64,
    pub value: V,
}

/// A historical sample returned for a window query.
///
/// `timestamp` is the time the sample was actually taken, not the nominal
/// target of the query, so callers can compute a rate over the exact elapsed
/// time:
///
/// ```text
/// rate = (latest.value - shifted.value) / (latest.timestamp - shifted.timestamp)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftedResult<V> {
    pub value: V,
    pub timestamp: i64,
}

impl<V> From<Sample<V>> for ShiftedResult<V> {
    fn from(sample: Sample<V>) -> Self {
        Self {
            value: sample.value,
            timestamp: sample.timestamp,
        }
    }
}

/// Time-ordered samples for one tracked key, bounded by a retention horizon.
///
/// Timestamps are strictly increasing. Pruning keeps the newest sample at or
/// before `newest - retention` so a query for a window equal to the
/// retention still resolves.
#[derive(Debug, Clone)]
pub struct SampleHistory<V> {
    retention_secs: i64,
    samples: VecDeque<Sample<V>>,
}

impl<V: Clone> SampleHistory<V> {
    pub fn new(retention_secs: u64) -> Self {
        Self {
            retention_secs: i64::try_from(retention_secs).unwrap_or(i64::MAX),
            samples: VecDeque::new(),
        }
    }

    /// Appends a sample. Returns `false` and leaves the history untouched
    /// when `timestamp` is not newer than the latest sample.
    pub fn append(&mut self, timestamp: i64, value: V) -> bool {
        if self
            .samples
            .back()
            .is_some_and(|last| timestamp <= last.timestamp)
        {
            return false;
        }
        self.samples.push_back(Sample { timestamp, value });
        self.prune(timestamp);
        true
    }

    fn prune(&mut self, newest: i64) {
        let cutoff = newest.saturating_sub(self.retention_secs);
        while self.samples.len() >= 2 && self.samples[1].timestamp <= cutoff {
            self.samples.pop_front();
        }
    }

    /// The sample with the largest timestamp `<= target`.
    pub fn at_or_before(&self, target: i64) -> Option<&Sample<V>> {
        let idx = self.samples.partition_point(|s| s.timestamp <= target);
        idx.checked_sub(1).and_then(|i| self.samples.get(i))
    }

    pub fn latest(&self) -> Option<&Sample<V>> {
        self.samples.back()
    }

    pub fn oldest(&self) -> Option<&Sample<V>> {
        self.samples.front()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
