use crate::error::{OperatingSystemError, Result};
use crate::fs::{self, FileSystem};
use hostmon_common::types::ProcessInfo;
use std::io;
use std::path::Path;

pub const PROC: &str = "/proc";

/// Parses `/proc/<pid>/status`.
fn parse_status(pid: u32, path: &str, content: &str) -> Result<ProcessInfo> {
    let mut name = None;
    let mut state = None;
    let mut uid = None;
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "Name" => name = Some(value.to_string()),
            "State" => state = value.chars().next(),
            // Real, effective, saved and filesystem uid; the real one comes first
            "Uid" => {
                let real = value.split_whitespace().next().unwrap_or_default();
                uid = Some(fs::parse_u64(path, real)? as u32);
            }
            _ => {}
        }
    }

    Ok(ProcessInfo {
        pid,
        uid: uid.ok_or_else(|| OperatingSystemError::parse(path, "missing Uid"))?,
        name: name.ok_or_else(|| OperatingSystemError::parse(path, "missing Name"))?,
        state: state.unwrap_or('?'),
    })
}

fn vanished(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound || e.raw_os_error() == Some(libc::ESRCH)
}

/// Every process currently listed under `/proc`.
///
/// A process that exits between the directory listing and the read of its
/// status file is skipped, as is one whose status file cannot be parsed.
pub fn process_infos(fs: &dyn FileSystem) -> Result<Vec<ProcessInfo>> {
    let names = fs
        .read_dir_names(Path::new(PROC))
        .map_err(|e| OperatingSystemError::io(PROC, e))?;

    let mut infos = Vec::new();
    for pid in names.iter().filter_map(|name| name.parse::<u32>().ok()) {
        let path = format!("{PROC}/{pid}/status");
        let content = match fs.read_to_string(Path::new(&path)) {
            Ok(content) => content,
            Err(e) if vanished(&e) => {
                tracing::trace!(pid, "Process exited before it could be read");
                continue;
            }
            Err(e) => return Err(OperatingSystemError::io(path, e)),
        };
        match parse_status(pid, &path, &content) {
            Ok(info) => infos.push(info),
            Err(e) => tracing::debug!(pid, error = %e, "Skipping unreadable process status"),
        }
    }
    Ok(infos)
}
