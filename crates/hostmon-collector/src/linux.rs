use crate::cpu::{self, CpuTimesSource};
use crate::disk::{self, DiskStatsSource};
use crate::error::{InsufficientHistoryError, Result};
use crate::fs::{FileSystem, RealFs};
use crate::history::ShiftedResult;
use crate::provider::HostStatsProvider;
use crate::windowed::{TimeWindowedCollector, DEFAULT_RETENTION_SECS};
use crate::{host, load, memory, network, process};
use hostmon_common::types::{
    CpuTimes, DiskDeviceStats, MemoryKind, NetworkInterfaceInfo, ProcessInfo, SwapInfo,
    SystemLoad,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// [`HostStatsProvider`] backed by Linux `/proc` and `statvfs`.
pub struct Linux {
    fs: Arc<dyn FileSystem>,
    disk_collector: TimeWindowedCollector<DiskStatsSource>,
    cpu_collector: TimeWindowedCollector<CpuTimesSource>,
}

impl Linux {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(RealFs::new()), DEFAULT_RETENTION_SECS)
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>, retention_secs: u64) -> Self {
        Self {
            disk_collector: TimeWindowedCollector::new(
                DiskStatsSource::new(Arc::clone(&fs)),
                retention_secs,
            ),
            cpu_collector: TimeWindowedCollector::new(
                CpuTimesSource::new(Arc::clone(&fs)),
                retention_secs,
            ),
            fs,
        }
    }

    pub fn disk_collector(&self) -> &TimeWindowedCollector<DiskStatsSource> {
        &self.disk_collector
    }

    pub fn cpu_collector(&self) -> &TimeWindowedCollector<CpuTimesSource> {
        &self.cpu_collector
    }
}

impl Default for Linux {
    fn default() -> Self {
        Self::new()
    }
}

impl HostStatsProvider for Linux {
    fn fs_size(&self, path: &str) -> Result<(u64, u64)> {
        disk::fs_size(self.fs.as_ref(), path)
    }

    fn fs_inodes(&self, path: &str) -> Result<(u64, u64)> {
        disk::fs_inodes(self.fs.as_ref(), path)
    }

    fn net_interface_names(&self) -> Result<BTreeSet<String>> {
        network::net_interface_names(self.fs.as_ref())
    }

    fn net_interface_info(&self, name: &str) -> Result<NetworkInterfaceInfo> {
        network::net_interface_info(self.fs.as_ref(), name)
    }

    fn process_infos(&self) -> Result<Vec<ProcessInfo>> {
        process::process_infos(self.fs.as_ref())
    }

    fn uid(&self, user: &str) -> Result<u32> {
        host::uid(self.fs.as_ref(), user)
    }

    fn memory(&self) -> Result<HashMap<MemoryKind, u64>> {
        memory::memory(self.fs.as_ref())
    }

    fn disk_device_names(&self) -> Result<BTreeSet<String>> {
        disk::disk_device_names(self.fs.as_ref())
    }

    fn disk_device_stats(&self, device: &str) -> Result<DiskDeviceStats> {
        disk::disk_device_stats(self.fs.as_ref(), device)
    }

    fn cpu_count(&self) -> Result<usize> {
        cpu::cpu_count(self.fs.as_ref())
    }

    fn possible_cpu_count(&self) -> Result<usize> {
        cpu::possible_cpu_count(self.fs.as_ref())
    }

    fn cpu_times(&self, id: i32) -> Result<CpuTimes> {
        cpu::cpu_times(self.fs.as_ref(), id)
    }

    fn hostname(&self) -> Result<String> {
        host::hostname(self.fs.as_ref())
    }

    fn uname(&self) -> Result<Vec<String>> {
        host::uname(self.fs.as_ref())
    }

    fn uptime(&self) -> Result<u64> {
        load::uptime(self.fs.as_ref())
    }

    fn max_number_of_running_processes(&self) -> Result<u64> {
        host::max_number_of_running_processes(self.fs.as_ref())
    }

    fn system_load(&self) -> Result<SystemLoad> {
        load::system_load(self.fs.as_ref())
    }

    fn swap_size(&self, device: &str) -> Result<(u64, u64)> {
        memory::swap_size(self.fs.as_ref(), device)
    }

    fn swap_info(&self) -> Result<SwapInfo> {
        memory::swap_info(self.fs.as_ref())
    }

    fn swap_device_names(&self) -> Result<BTreeSet<String>> {
        memory::swap_device_names(self.fs.as_ref())
    }

    fn collect(&self) {
        self.disk_collector.collect();
        self.cpu_collector.collect();
    }

    fn disk_device_stats_shifted(
        &self,
        device: &str,
        shift: i64,
        now: i64,
    ) -> std::result::Result<ShiftedResult<DiskDeviceStats>, InsufficientHistoryError> {
        self.disk_collector
            .get_shifted(&device.to_string(), shift, now)
    }

    fn cpu_times_shifted(
        &self,
        id: i32,
        shift: i64,
        now: i64,
    ) -> std::result::Result<ShiftedResult<CpuTimes>, InsufficientHistoryError> {
        self.cpu_collector.get_shifted(&id, shift, now)
    }
}
