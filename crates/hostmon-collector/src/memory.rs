use crate::error::{OperatingSystemError, Result};
use crate::fs::{self, FileSystem};
use hostmon_common::types::{MemoryKind, SwapInfo};
use std::collections::{BTreeSet, HashMap};

pub const PROC_MEMINFO: &str = "/proc/meminfo";
pub const PROC_SWAPS: &str = "/proc/swaps";
pub const PROC_VMSTAT: &str = "/proc/vmstat";

/// Parses `/proc/meminfo` into a map of field name to bytes.
fn meminfo(fs: &dyn FileSystem) -> Result<HashMap<String, u64>> {
    let content = fs::read(fs, PROC_MEMINFO)?;
    let mut fields = HashMap::new();
    for line in content.lines() {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        let mut parts = rest.split_whitespace();
        let Some(value) = parts.next() else {
            continue;
        };
        let value = fs::parse_u64(PROC_MEMINFO, value)?;
        let bytes = match parts.next() {
            Some("kB") => value * 1024,
            _ => value,
        };
        fields.insert(name.to_string(), bytes);
    }
    Ok(fields)
}

/// Memory figures in bytes for every [`MemoryKind`].
pub fn memory(fs: &dyn FileSystem) -> Result<HashMap<MemoryKind, u64>> {
    let info = meminfo(fs)?;
    let field = |name: &str| {
        info.get(name)
            .copied()
            .ok_or_else(|| OperatingSystemError::parse(PROC_MEMINFO, format!("missing {name}")))
    };

    let free = field("MemFree")?;
    let buffers = field("Buffers")?;
    let cached = field("Cached")?;
    // MemAvailable only exists since Linux 3.14
    let available = info
        .get("MemAvailable")
        .copied()
        .unwrap_or(free + buffers + cached);

    Ok(HashMap::from([
        (MemoryKind::Total, field("MemTotal")?),
        (MemoryKind::Free, free),
        (MemoryKind::Buffers, buffers),
        (MemoryKind::Cached, cached),
        (MemoryKind::Shared, info.get("Shmem").copied().unwrap_or(0)),
        (MemoryKind::Available, available),
    ]))
}

/// Rows of `/proc/swaps` after the header: `(filename, type, size_kb, used_kb)`.
fn swap_rows(fs: &dyn FileSystem) -> Result<Vec<(String, String, u64, u64)>> {
    fs::rows(fs, PROC_SWAPS)?
        .into_iter()
        .skip(1)
        .filter(|row| row.len() >= 4)
        .map(|row| {
            Ok((
                row[0].clone(),
                row[1].clone(),
                fs::parse_u64(PROC_SWAPS, &row[2])?,
                fs::parse_u64(PROC_SWAPS, &row[3])?,
            ))
        })
        .collect()
}

fn device_name(filename: &str) -> &str {
    filename.rsplit('/').next().unwrap_or(filename)
}

/// Block devices used as swap partitions. Swap files are excluded.
pub fn swap_device_names(fs: &dyn FileSystem) -> Result<BTreeSet<String>> {
    Ok(swap_rows(fs)?
        .into_iter()
        .filter(|(_, kind, _, _)| kind == "partition")
        .map(|(filename, _, _, _)| device_name(&filename).to_string())
        .collect())
}

/// Bytes `(free, total)` of one swap device, or of all swap when `device`
/// is `"all"`.
pub fn swap_size(fs: &dyn FileSystem, device: &str) -> Result<(u64, u64)> {
    if device == "all" {
        let info = meminfo(fs)?;
        let free = info.get("SwapFree").copied().unwrap_or(0);
        let total = info.get("SwapTotal").copied().unwrap_or(0);
        return Ok((free, total));
    }

    swap_rows(fs)?
        .into_iter()
        .find(|(filename, _, _, _)| filename == device || device_name(filename) == device)
        .map(|(_, _, size, used)| (size.saturating_sub(used) * 1024, size * 1024))
        .ok_or_else(|| OperatingSystemError::not_found("swap device", device))
}

pub fn swap_info(fs: &dyn FileSystem) -> Result<SwapInfo> {
    let mut info = SwapInfo::default();
    for row in fs::rows(fs, PROC_VMSTAT)? {
        match row.as_slice() {
            [name, value] if name == "pswpin" => info.pages_in = fs::parse_u64(PROC_VMSTAT, value)?,
            [name, value] if name == "pswpout" => info.pages_out = fs::parse_u64(PROC_VMSTAT, value)?,
            _ => {}
        }
    }
    Ok(info)
}
