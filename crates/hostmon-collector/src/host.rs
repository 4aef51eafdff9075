use crate::error::{OperatingSystemError, Result};
use crate::fs::{self, FileSystem};
use sysinfo::System;

pub const PROC_HOSTNAME: &str = "/proc/sys/kernel/hostname";
pub const PROC_OSTYPE: &str = "/proc/sys/kernel/ostype";
pub const PROC_OSRELEASE: &str = "/proc/sys/kernel/osrelease";
pub const PROC_VERSION: &str = "/proc/sys/kernel/version";
pub const PROC_PID_MAX: &str = "/proc/sys/kernel/pid_max";
pub const ETC_PASSWD: &str = "/etc/passwd";

fn read_trimmed(fs: &dyn FileSystem, path: &str) -> Result<String> {
    Ok(fs::read(fs, path)?.trim().to_string())
}

pub fn hostname(fs: &dyn FileSystem) -> Result<String> {
    match read_trimmed(fs, PROC_HOSTNAME) {
        Ok(name) => Ok(name),
        Err(e) => System::host_name().ok_or(e),
    }
}

/// Operating system name, host name, kernel release, kernel version and
/// machine architecture.
pub fn uname(fs: &dyn FileSystem) -> Result<Vec<String>> {
    Ok(vec![
        read_trimmed(fs, PROC_OSTYPE)?,
        hostname(fs)?,
        read_trimmed(fs, PROC_OSRELEASE)?,
        read_trimmed(fs, PROC_VERSION)?,
        std::env::consts::ARCH.to_string(),
    ])
}

pub fn max_number_of_running_processes(fs: &dyn FileSystem) -> Result<u64> {
    fs::parse_u64(PROC_PID_MAX, &read_trimmed(fs, PROC_PID_MAX)?)
}

/// Looks up a user's numeric id in `/etc/passwd`.
pub fn uid(fs: &dyn FileSystem, user: &str) -> Result<u32> {
    if user.is_empty() {
        return Err(OperatingSystemError::not_found("user", user));
    }
    let content = fs::read(fs, ETC_PASSWD)?;
    for line in content.lines().filter(|line| !line.starts_with('#')) {
        let mut fields = line.split(':');
        if fields.next() != Some(user) {
            continue;
        }
        let uid = fields.nth(1).unwrap_or_default();
        return Ok(fs::parse_u64(ETC_PASSWD, uid)? as u32);
    }
    Err(OperatingSystemError::not_found("user", user))
}
