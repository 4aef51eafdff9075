use crate::error::{InsufficientHistoryError, Result};
use crate::history::ShiftedResult;
use hostmon_common::types::{
    CpuTimes, DiskDeviceStats, MemoryKind, NetworkInterfaceInfo, ProcessInfo, SwapInfo,
    SystemLoad,
};
use std::collections::{BTreeSet, HashMap};

/// Point-in-time facts about the host, plus windowed access to the counters
/// that are sampled in the background.
///
/// Item functions hold an `Arc<dyn HostStatsProvider>`; every method is a
/// fresh read except the `*_shifted` queries, which answer from history
/// recorded by [`collect`](HostStatsProvider::collect).
pub trait HostStatsProvider: Send + Sync {
    /// Bytes `(free, total)` of the filesystem mounted at `path`.
    fn fs_size(&self, path: &str) -> Result<(u64, u64)>;

    /// Inodes `(free, total)` of the filesystem mounted at `path`.
    fn fs_inodes(&self, path: &str) -> Result<(u64, u64)>;

    fn net_interface_names(&self) -> Result<BTreeSet<String>>;

    fn net_interface_info(&self, name: &str) -> Result<NetworkInterfaceInfo>;

    fn process_infos(&self) -> Result<Vec<ProcessInfo>>;

    /// Numeric id of the named user. Fails with `NotFound` for unknown users.
    fn uid(&self, user: &str) -> Result<u32>;

    fn memory(&self) -> Result<HashMap<MemoryKind, u64>>;

    fn disk_device_names(&self) -> Result<BTreeSet<String>>;

    fn disk_device_stats(&self, device: &str) -> Result<DiskDeviceStats>;

    /// CPUs currently listed in the kernel statistics.
    fn cpu_count(&self) -> Result<usize>;

    /// CPUs the kernel could bring online, including offline ones.
    fn possible_cpu_count(&self) -> Result<usize>;

    /// Counters for one CPU, or the aggregate of all CPUs for id `-1`.
    fn cpu_times(&self, id: i32) -> Result<CpuTimes>;

    fn hostname(&self) -> Result<String>;

    fn uname(&self) -> Result<Vec<String>>;

    fn uptime(&self) -> Result<u64>;

    fn max_number_of_running_processes(&self) -> Result<u64>;

    fn system_load(&self) -> Result<SystemLoad>;

    /// Bytes `(free, total)` for one swap device or `"all"`.
    fn swap_size(&self, device: &str) -> Result<(u64, u64)>;

    fn swap_info(&self) -> Result<SwapInfo>;

    /// Swap partitions; swap files are not reported.
    fn swap_device_names(&self) -> Result<BTreeSet<String>>;

    /// Records one sample of every windowed counter.
    fn collect(&self);

    fn disk_device_stats_shifted(
        &self,
        device: &str,
        shift: i64,
        now: i64,
    ) -> std::result::Result<ShiftedResult<DiskDeviceStats>, InsufficientHistoryError>;

    fn cpu_times_shifted(
        &self,
        id: i32,
        shift: i64,
        now: i64,
    ) -> std::result::Result<ShiftedResult<CpuTimes>, InsufficientHistoryError>;
}
