use serde::{Deserialize, Serialize};

/// Cumulative CPU time counters for one CPU line of `/proc/stat`, in clock
/// ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
}

impl CpuTimes {
    /// Names accepted by [`CpuTimes::get`], in `/proc/stat` column order.
    pub const FIELDS: [&'static str; 10] = [
        "user",
        "nice",
        "system",
        "idle",
        "iowait",
        "interrupt",
        "softirq",
        "steal",
        "guest",
        "guest_nice",
    ];

    /// Looks up a counter by the name used in item keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use hostmon_common::types::CpuTimes;
    ///
    /// let times = CpuTimes { user: 7, irq: 3, ..Default::default() };
    /// assert_eq!(times.get("user"), Some(7));
    /// assert_eq!(times.get("interrupt"), Some(3));
    /// assert_eq!(times.get("bogus"), None);
    /// ```
    pub fn get(&self, field: &str) -> Option<u64> {
        let value = match field {
            "user" => self.user,
            "nice" => self.nice,
            "system" => self.system,
            "idle" => self.idle,
            "iowait" => self.iowait,
            "interrupt" | "irq" => self.irq,
            "softirq" => self.softirq,
            "steal" => self.steal,
            "guest" => self.guest,
            "guest_nice" => self.guest_nice,
            _ => return None,
        };
        Some(value)
    }

    /// Sum of all counters. Guest time is already accounted in `user` and
    /// `nice` by the kernel, so it is excluded.
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }
}

/// Cumulative I/O counters for one block device, from `/proc/diskstats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiskDeviceStats {
    pub read_operations: u64,
    pub read_merged: u64,
    pub read_sectors: u64,
    pub read_ms: u64,
    pub write_operations: u64,
    pub write_merged: u64,
    pub write_sectors: u64,
    pub write_ms: u64,
    pub io_in_progress: u64,
    pub io_ms: u64,
    pub weighted_io_ms: u64,
}

/// Cumulative counters for one network interface, from `/proc/net/dev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkInterfaceInfo {
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub rx_errors: u64,
    pub rx_dropped: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
    pub tx_dropped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub uid: u32,
    pub name: String,
    pub state: char,
}

/// Load averages over 1, 5 and 15 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemLoad {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Pages swapped in and out since boot, from `/proc/vmstat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwapInfo {
    pub pages_in: u64,
    pub pages_out: u64,
}

/// The fixed set of memory figures reported by a host provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Total,
    Free,
    Buffers,
    Cached,
    Shared,
    Available,
}

impl MemoryKind {
    pub const ALL: [MemoryKind; 6] = [
        MemoryKind::Total,
        MemoryKind::Free,
        MemoryKind::Buffers,
        MemoryKind::Cached,
        MemoryKind::Shared,
        MemoryKind::Available,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MemoryKind::Total => "total",
            MemoryKind::Free => "free",
            MemoryKind::Buffers => "buffers",
            MemoryKind::Cached => "cached",
            MemoryKind::Shared => "shared",
            MemoryKind::Available => "available",
        }
    }
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemoryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown memory kind: {s}"))
    }
}
