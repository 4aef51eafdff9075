use crate::error::{OperatingSystemError, Result};
use crate::fs::{self, FileSystem};
use hostmon_common::types::SystemLoad;
use sysinfo::System;

pub const PROC_LOADAVG: &str = "/proc/loadavg";
pub const PROC_UPTIME: &str = "/proc/uptime";

pub fn system_load(fs: &dyn FileSystem) -> Result<SystemLoad> {
    let content = fs::read(fs, PROC_LOADAVG)?;
    let averages: Vec<f64> = content
        .split_whitespace()
        .take(3)
        .map(|field| {
            field
                .parse()
                .map_err(|_| OperatingSystemError::parse(PROC_LOADAVG, format!("bad average {field:?}")))
        })
        .collect::<Result<_>>()?;

    match averages.as_slice() {
        [one, five, fifteen] => Ok(SystemLoad {
            one: *one,
            five: *five,
            fifteen: *fifteen,
        }),
        _ => Err(OperatingSystemError::parse(PROC_LOADAVG, "expected three averages")),
    }
}

/// Seconds since boot. Falls back to `sysinfo` when `/proc/uptime` cannot be
/// read.
pub fn uptime(fs: &dyn FileSystem) -> Result<u64> {
    let content = match fs::read(fs, PROC_UPTIME) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(error = %e, "Falling back to sysinfo for uptime");
            return Ok(System::uptime());
        }
    };
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| OperatingSystemError::parse(PROC_UPTIME, "empty file"))?;
    let secs: f64 = first
        .parse()
        .map_err(|_| OperatingSystemError::parse(PROC_UPTIME, format!("bad uptime {first:?}")))?;
    Ok(secs as u64)
}
