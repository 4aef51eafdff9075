use crate::error::{OperatingSystemError, Result};
use crate::fs::{self, FileSystem};
use crate::SampleSource;
use hostmon_common::types::CpuTimes;
use std::sync::Arc;

pub const PROC_STAT: &str = "/proc/stat";
pub const SYS_CPU_POSSIBLE: &str = "/sys/devices/system/cpu/possible";

/// CPU id used for the aggregate `cpu` line of `/proc/stat`.
pub const ALL_CPUS: i32 = -1;

/// Parses every `cpu`/`cpuN` line of `/proc/stat`.
pub fn parse_stat(content: &str) -> Result<Vec<(i32, CpuTimes)>> {
    let mut cpus = Vec::new();
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        let Some(suffix) = label.strip_prefix("cpu") else {
            continue;
        };
        let id = if suffix.is_empty() {
            ALL_CPUS
        } else {
            suffix
                .parse()
                .map_err(|_| OperatingSystemError::parse(PROC_STAT, format!("bad cpu label {label:?}")))?
        };

        let mut counters = [0u64; 10];
        for (slot, field) in counters.iter_mut().zip(fields) {
            *slot = fs::parse_u64(PROC_STAT, field)?;
        }
        let [user, nice, system, idle, iowait, irq, softirq, steal, guest, guest_nice] = counters;
        cpus.push((
            id,
            CpuTimes {
                user,
                nice,
                system,
                idle,
                iowait,
                irq,
                softirq,
                steal,
                guest,
                guest_nice,
            },
        ));
    }
    Ok(cpus)
}

/// Number of per-CPU lines in `/proc/stat`.
pub fn cpu_count(fs: &dyn FileSystem) -> Result<usize> {
    let cpus = parse_stat(&fs::read(fs, PROC_STAT)?)?;
    Ok(cpus.iter().filter(|(id, _)| *id != ALL_CPUS).count())
}

/// Number of CPUs the kernel could bring online, from a list such as
/// `0-3,8-11`.
pub fn possible_cpu_count(fs: &dyn FileSystem) -> Result<usize> {
    let content = fs::read(fs, SYS_CPU_POSSIBLE)?;
    let mut count = 0;
    for range in content.trim().split(',').filter(|range| !range.is_empty()) {
        let (first, last) = range.split_once('-').unwrap_or((range, range));
        let first = fs::parse_u64(SYS_CPU_POSSIBLE, first)?;
        let last = fs::parse_u64(SYS_CPU_POSSIBLE, last)?;
        if last < first {
            return Err(OperatingSystemError::parse(
                SYS_CPU_POSSIBLE,
                format!("descending range {range:?}"),
            ));
        }
        count += (last - first + 1) as usize;
    }
    Ok(count)
}

pub fn cpu_times(fs: &dyn FileSystem, id: i32) -> Result<CpuTimes> {
    parse_stat(&fs::read(fs, PROC_STAT)?)?
        .into_iter()
        .find(|(cpu, _)| *cpu == id)
        .map(|(_, times)| times)
        .ok_or_else(|| OperatingSystemError::not_found("cpu", id.to_string()))
}

/// Samples [`CpuTimes`] for every CPU plus the aggregate line.
pub struct CpuTimesSource {
    fs: Arc<dyn FileSystem>,
}

impl CpuTimesSource {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl SampleSource for CpuTimesSource {
    type Key = i32;
    type Sample = CpuTimes;

    fn name(&self) -> &str {
        "cpu"
    }

    fn keys(&self) -> Result<Vec<i32>> {
        Ok(parse_stat(&fs::read(self.fs.as_ref(), PROC_STAT)?)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    fn read(&self, key: &i32) -> Result<CpuTimes> {
        cpu_times(self.fs.as_ref(), *key)
    }

    fn read_all(&self) -> Result<Vec<(i32, CpuTimes)>> {
        parse_stat(&fs::read(self.fs.as_ref(), PROC_STAT)?)
    }
}
