//! Host statistics collection for the hostmon agent.
//!
//! The [`provider::HostStatsProvider`] trait answers point-in-time questions
//! about the host (CPU, memory, disk, network, swap, processes, load). The
//! Linux implementation reads `/proc`-style sources through the
//! [`fs::FileSystem`] seam so parsing can be exercised against fixtures.
//!
//! Monotonic counters (disk I/O, CPU ticks) are additionally sampled on a
//! schedule by a [`windowed::TimeWindowedCollector`], which keeps a bounded
//! per-key history and answers "value as of now minus window" queries for
//! rate calculations.

pub mod cpu;
pub mod disk;
pub mod error;
pub mod fs;
pub mod history;
pub mod host;
pub mod linux;
pub mod load;
pub mod memory;
pub mod mock;
pub mod network;
pub mod process;
pub mod provider;
pub mod windowed;

#[cfg(test)]
mod tests;

use error::OperatingSystemError;
use std::fmt::Display;
use std::hash::Hash;

/// A source of counter samples keyed by device or CPU id.
///
/// Implementations are driven by a [`windowed::TimeWindowedCollector`] at
/// each collection interval. The trait requires `Send + Sync` so collection
/// can run on a background task while request handlers query the history.
pub trait SampleSource: Send + Sync {
    type Key: Eq + Hash + Clone + Display + Send + Sync + 'static;
    type Sample: Clone + Send + Sync + 'static;

    /// Returns the source name (e.g., `"disk"`, `"cpu"`), used for logging.
    fn name(&self) -> &str;

    /// Lists the keys currently present on the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying system source cannot be read.
    fn keys(&self) -> Result<Vec<Self::Key>, OperatingSystemError>;

    /// Reads one fresh sample for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key vanished or the source cannot be read.
    fn read(&self, key: &Self::Key) -> Result<Self::Sample, OperatingSystemError>;

    /// Reads a sample for every key. The default reads key by key and skips
    /// keys whose read fails; sources backed by a single file override this
    /// to parse it once.
    ///
    /// # Errors
    ///
    /// Returns an error only if the key listing itself fails.
    fn read_all(&self) -> Result<Vec<(Self::Key, Self::Sample)>, OperatingSystemError> {
        let mut samples = Vec::new();
        for key in self.keys()? {
            match self.read(&key) {
                Ok(sample) => samples.push((key, sample)),
                Err(e) => tracing::warn!(source = self.name(), key = %key, error = %e, "Sample read failed"),
            }
        }
        Ok(samples)
    }
}
