use crate::error::{OperatingSystemError, Result};
use crate::fs::{self, FileSystem};
use crate::SampleSource;
use hostmon_common::types::DiskDeviceStats;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

pub const PROC_DISKSTATS: &str = "/proc/diskstats";

/// Parses `/proc/diskstats` into `(device, stats)` pairs. Rows in the short
/// legacy partition format are skipped.
pub fn parse_diskstats(content: &str) -> Result<Vec<(String, DiskDeviceStats)>> {
    let mut devices = Vec::new();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 14 {
            continue;
        }
        let n = |i: usize| fs::parse_u64(PROC_DISKSTATS, fields[i]);
        devices.push((
            fields[2].to_string(),
            DiskDeviceStats {
                read_operations: n(3)?,
                read_merged: n(4)?,
                read_sectors: n(5)?,
                read_ms: n(6)?,
                write_operations: n(7)?,
                write_merged: n(8)?,
                write_sectors: n(9)?,
                write_ms: n(10)?,
                io_in_progress: n(11)?,
                io_ms: n(12)?,
                weighted_io_ms: n(13)?,
            },
        ));
    }
    Ok(devices)
}

pub fn disk_device_names(fs: &dyn FileSystem) -> Result<BTreeSet<String>> {
    Ok(parse_diskstats(&fs::read(fs, PROC_DISKSTATS)?)?
        .into_iter()
        .map(|(name, _)| name)
        .collect())
}

pub fn disk_device_stats(fs: &dyn FileSystem, device: &str) -> Result<DiskDeviceStats> {
    parse_diskstats(&fs::read(fs, PROC_DISKSTATS)?)?
        .into_iter()
        .find(|(name, _)| name == device)
        .map(|(_, stats)| stats)
        .ok_or_else(|| OperatingSystemError::not_found("disk device", device))
}

/// Bytes `(free, total)` of the filesystem mounted at `path`. Free space is
/// what an unprivileged user may still allocate.
pub fn fs_size(fs: &dyn FileSystem, path: &str) -> Result<(u64, u64)> {
    let stat = fs
        .statvfs(Path::new(path))
        .map_err(|e| OperatingSystemError::io(path, e))?;
    Ok((
        stat.blocks_available * stat.fragment_size,
        stat.blocks * stat.fragment_size,
    ))
}

/// Inodes `(free, total)` of the filesystem mounted at `path`.
pub fn fs_inodes(fs: &dyn FileSystem, path: &str) -> Result<(u64, u64)> {
    let stat = fs
        .statvfs(Path::new(path))
        .map_err(|e| OperatingSystemError::io(path, e))?;
    Ok((stat.files_free, stat.files))
}

/// Samples [`DiskDeviceStats`] for every block device.
pub struct DiskStatsSource {
    fs: Arc<dyn FileSystem>,
}

impl DiskStatsSource {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl SampleSource for DiskStatsSource {
    type Key = String;
    type Sample = DiskDeviceStats;

    fn name(&self) -> &str {
        "disk"
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(disk_device_names(self.fs.as_ref())?.into_iter().collect())
    }

    fn read(&self, key: &String) -> Result<DiskDeviceStats> {
        disk_device_stats(self.fs.as_ref(), key)
    }

    fn read_all(&self) -> Result<Vec<(String, DiskDeviceStats)>> {
        parse_diskstats(&fs::read(self.fs.as_ref(), PROC_DISKSTATS)?)
    }
}
