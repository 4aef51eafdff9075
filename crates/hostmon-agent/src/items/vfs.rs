use super::{arg, average_window, size_mode};
use crate::error::ItemError;
use crate::registry::ItemResult;
use chrono::Utc;
use hostmon_collector::error::InsufficientHistoryError;
use hostmon_collector::provider::HostStatsProvider;
use hostmon_common::types::DiskDeviceStats;
use hostmon_common::value::Value;

/// `vfs.fs.size[fs,total|free|used|pfree|pused]`
pub fn fs_size(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    let (free, total) = provider.fs_size(arg(args, 0, "/"))?;
    size_mode(arg(args, 1, "total"), free, total)
}

/// `vfs.fs.inode[fs,total|free|used|pfree|pused]`
pub fn fs_inode(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    let (free, total) = provider.fs_inodes(arg(args, 0, "/"))?;
    size_mode(arg(args, 1, "total"), free, total)
}

#[derive(Clone, Copy)]
enum Direction {
    Read,
    Write,
}

impl Direction {
    fn sectors(self, stats: &DiskDeviceStats) -> u64 {
        match self {
            Direction::Read => stats.read_sectors,
            Direction::Write => stats.write_sectors,
        }
    }

    fn operations(self, stats: &DiskDeviceStats) -> u64 {
        match self {
            Direction::Read => stats.read_operations,
            Direction::Write => stats.write_operations,
        }
    }
}

/// `vfs.dev.read[device,sectors|operations|sps|ops,avg1|avg5|avg15]`
pub fn dev_read(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    dev_io(provider, args, Direction::Read)
}

/// `vfs.dev.write[device,sectors|operations|sps|ops,avg1|avg5|avg15]`
pub fn dev_write(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    dev_io(provider, args, Direction::Write)
}

fn devices(provider: &dyn HostStatsProvider, device: &str) -> Result<Vec<String>, ItemError> {
    match device {
        "all" => Ok(provider.disk_device_names()?.into_iter().collect()),
        other => Ok(vec![other.strip_prefix("/dev/").unwrap_or(other).to_string()]),
    }
}

fn dev_io(provider: &dyn HostStatsProvider, args: &[String], direction: Direction) -> ItemResult {
    let device = arg(args, 0, "all");
    let devices = devices(provider, device)?;
    let kind = arg(args, 1, "sps");

    let counter: fn(Direction, &DiskDeviceStats) -> u64 = match kind {
        "sectors" | "sps" => Direction::sectors,
        "operations" | "ops" => Direction::operations,
        other => return Err(ItemError::invalid("type", other)),
    };

    if matches!(kind, "sectors" | "operations") {
        let mut sum = 0u64;
        for device in &devices {
            sum += counter(direction, &provider.disk_device_stats(device)?);
        }
        return Ok(Value::from(sum));
    }

    let window = average_window(arg(args, 2, "avg1"))?;
    let now = Utc::now().timestamp();
    let rate_of = |name: &str| -> Result<f64, InsufficientHistoryError> {
        let latest = provider.disk_device_stats_shifted(name, 0, now)?;
        let earlier = provider.disk_device_stats_shifted(name, window, now)?;
        let elapsed = latest.timestamp - earlier.timestamp;
        if elapsed <= 0 {
            return Ok(0.0);
        }
        let delta = counter(direction, &latest.value).saturating_sub(counter(direction, &earlier.value));
        Ok(delta as f64 / elapsed as f64)
    };

    if device != "all" {
        return Ok(Value::from(rate_of(&devices[0])?));
    }

    // Devices that appeared since the last collection have no history yet
    let mut rate = 0.0;
    let mut last_error = None;
    let mut contributed = false;
    for name in &devices {
        match rate_of(name) {
            Ok(device_rate) => {
                rate += device_rate;
                contributed = true;
            }
            Err(e) => {
                tracing::debug!(device = %name, error = %e, "Skipping device without history");
                last_error = Some(e);
            }
        }
    }
    match (contributed, last_error) {
        (false, Some(e)) => Err(e.into()),
        _ => Ok(Value::from(rate)),
    }
}
