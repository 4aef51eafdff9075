use crate::error::{InsufficientHistoryError, OperatingSystemError};
use crate::fs::FsStat;
use crate::history::{SampleHistory, ShiftedResult};
use crate::linux::Linux;
use crate::mock::MockFs;
use crate::provider::HostStatsProvider;
use crate::windowed::TimeWindowedCollector;
use crate::SampleSource;
use hostmon_common::types::{DiskDeviceStats, MemoryKind};
use std::sync::{Arc, Mutex};

/// Source whose next readings are set by the test.
struct FixedSource {
    readings: Mutex<Vec<(String, DiskDeviceStats)>>,
}

impl FixedSource {
    fn new() -> Self {
        Self {
            readings: Mutex::new(Vec::new()),
        }
    }

    fn set(&self, readings: Vec<(String, DiskDeviceStats)>) {
        *self.readings.lock().unwrap() = readings;
    }
}

impl SampleSource for FixedSource {
    type Key = String;
    type Sample = DiskDeviceStats;

    fn name(&self) -> &str {
        "fixed"
    }

    fn keys(&self) -> crate::error::Result<Vec<String>> {
        Ok(self.readings.lock().unwrap().iter().map(|(k, _)| k.clone()).collect())
    }

    fn read(&self, key: &String) -> crate::error::Result<DiskDeviceStats> {
        self.readings
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| OperatingSystemError::not_found("disk device", key.clone()))
    }
}

fn reads(n: u64) -> DiskDeviceStats {
    DiskDeviceStats {
        read_operations: n,
        ..Default::default()
    }
}

#[test]
fn shifted_sample_gives_exact_rate() {
    let collector = TimeWindowedCollector::new(FixedSource::new(), 900);
    collector.append("sda".to_string(), 0, reads(100));
    collector.append("sda".to_string(), 60, reads(220));

    let shifted = collector.get_shifted(&"sda".to_string(), 60, 60).unwrap();
    assert_eq!(
        shifted,
        ShiftedResult {
            value: reads(100),
            timestamp: 0
        }
    );

    let latest = collector.get_latest(&"sda".to_string()).unwrap();
    let rate = (latest.value.read_operations - shifted.value.read_operations) as f64
        / (latest.timestamp - shifted.timestamp) as f64;
    assert!((rate - 2.0).abs() < f64::EPSILON);
}

#[test]
fn shifted_returns_nearest_sample_before_target() {
    let collector = TimeWindowedCollector::new(FixedSource::new(), 900);
    for (t, n) in [(0, 10), (10, 20), (25, 30), (40, 40)] {
        collector.append("sda".to_string(), t, reads(n));
    }

    // target 40 - 20 = 20 -> sample at 10, reporting its own timestamp
    let shifted = collector.get_shifted(&"sda".to_string(), 20, 40).unwrap();
    assert_eq!(shifted.timestamp, 10);
    assert_eq!(shifted.value, reads(20));

    // exact match is included
    let shifted = collector.get_shifted(&"sda".to_string(), 15, 40).unwrap();
    assert_eq!(shifted.timestamp, 25);
}

#[test]
fn shifted_fails_when_no_sample_is_old_enough() {
    let collector = TimeWindowedCollector::new(FixedSource::new(), 900);
    collector.append("sda".to_string(), 100, reads(1));

    let err = collector.get_shifted(&"sda".to_string(), 60, 120).unwrap_err();
    assert_eq!(
        err,
        InsufficientHistoryError {
            key: "sda".to_string(),
            target: 60
        }
    );
}

#[test]
fn unknown_key_has_insufficient_history() {
    let collector = TimeWindowedCollector::new(FixedSource::new(), 900);
    assert!(collector.get_shifted(&"nvme0n1".to_string(), 0, 0).is_err());
    assert!(collector.get_latest(&"nvme0n1".to_string()).is_err());
}

#[test]
fn history_drops_non_increasing_timestamps() {
    let mut history = SampleHistory::new(900);
    assert!(history.append(10, 1u64));
    assert!(!history.append(10, 2));
    assert!(!history.append(5, 3));
    assert_eq!(history.len(), 1);
    assert_eq!(history.latest().map(|s| s.value), Some(1));
}

#[test]
fn history_prunes_but_keeps_boundary_sample() {
    let mut history = SampleHistory::new(60);
    for t in (0..=120).step_by(10) {
        history.append(t, t as u64);
    }

    // cutoff is 120 - 60 = 60; the sample at 60 must survive for a 60s window
    assert_eq!(history.oldest().map(|s| s.timestamp), Some(60));
    assert_eq!(history.at_or_before(60).map(|s| s.value), Some(60));
    assert!(history.at_or_before(59).is_none());
}

#[test]
fn collect_records_every_key_from_source() {
    let collector = TimeWindowedCollector::new(FixedSource::new(), 900);
    collector.source().set(vec![("sda".into(), reads(1)), ("sdb".into(), reads(2))]);
    collector.collect_at(100);
    collector.source().set(vec![("sda".into(), reads(5))]);
    collector.collect_at(110);

    assert_eq!(collector.get_latest(&"sda".to_string()).unwrap().value, reads(5));
    assert_eq!(collector.get_latest(&"sdb".to_string()).unwrap().timestamp, 100);
    let mut keys = collector.tracked_keys();
    keys.sort();
    assert_eq!(keys, vec!["sda".to_string(), "sdb".to_string()]);
}

#[test]
fn concurrent_appends_never_expose_torn_samples() {
    let collector = Arc::new(TimeWindowedCollector::new(FixedSource::new(), 30));
    let key = "sda".to_string();
    collector.append(key.clone(), 0, DiskDeviceStats::default());

    std::thread::scope(|scope| {
        let writer = Arc::clone(&collector);
        let writer_key = key.clone();
        scope.spawn(move || {
            for t in 1..2000u64 {
                let stats = DiskDeviceStats {
                    read_operations: t,
                    write_operations: t * 2,
                    read_sectors: t * 3,
                    ..Default::default()
                };
                writer.append(writer_key.clone(), t as i64, stats);
            }
        });

        for _ in 0..4 {
            let reader = Arc::clone(&collector);
            let reader_key = key.clone();
            scope.spawn(move || {
                for _ in 0..2000 {
                    let latest = reader.get_latest(&reader_key).unwrap();
                    let t = latest.value.read_operations;
                    assert_eq!(latest.timestamp, t as i64);
                    assert_eq!(latest.value.write_operations, t * 2);
                    assert_eq!(latest.value.read_sectors, t * 3);

                    if let Ok(shifted) = reader.get_shifted(&reader_key, 10, latest.timestamp) {
                        assert!(shifted.timestamp <= latest.timestamp - 10);
                        assert_eq!(shifted.value.write_operations, shifted.value.read_operations * 2);
                    }
                }
            });
        }
    });
}

const DISKSTATS: &str = "\
   8       0 sda 1000 10 8000 500 2000 20 16000 900 0 1200 1400
   8       1 sda1 900 5 7000 450 1900 15 15000 850 0 1100 1300
 253       0 dm-0 300 0 2400 100 600 0 4800 300 0 400 400
";

const PROC_STAT: &str = "\
cpu  100 0 50 800 10 0 5 0 0 0
cpu0 60 0 30 400 5 0 3 0 0 0
cpu1 40 0 20 400 5 0 2 0 0 0
intr 12345
ctxt 6789
";

const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:9091406708 32855976    0    0    0     0          0         0 9091406708 32855976    0    0    0     0       0          0
  eth0: 1500 10 1 2 0 0 0 0 3000 20 3 4 0 0 0 0
";

const MEMINFO: &str = "\
MemTotal:       16000000 kB
MemFree:         2000000 kB
MemAvailable:    9000000 kB
Buffers:          500000 kB
Cached:          6000000 kB
SwapTotal:       4000000 kB
SwapFree:        3000000 kB
Shmem:            100000 kB
";

const SWAPS: &str = "\
Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority
/dev/dm-0                               partition\t10485756\t311756\t\t-1
/mnt/swap_file                          file\t\t524284\t\t0\t\t-2
";

fn linux(fs: MockFs) -> Linux {
    Linux::with_fs(Arc::new(fs), 900)
}

#[test]
fn swap_device_names_skip_swap_files() {
    let linux = linux(MockFs::new().with_file("/proc/swaps", SWAPS));
    let names: Vec<String> = linux.swap_device_names().unwrap().into_iter().collect();
    assert_eq!(names, vec!["dm-0".to_string()]);
}

#[test]
fn swap_size_per_device_and_total() {
    let linux = linux(
        MockFs::new()
            .with_file("/proc/swaps", SWAPS)
            .with_file("/proc/meminfo", MEMINFO),
    );
    assert_eq!(
        linux.swap_size("dm-0").unwrap(),
        ((10485756 - 311756) * 1024, 10485756 * 1024)
    );
    assert_eq!(linux.swap_size("all").unwrap(), (3000000 * 1024, 4000000 * 1024));
    assert!(matches!(
        linux.swap_size("sdz"),
        Err(OperatingSystemError::NotFound { .. })
    ));
}

#[test]
fn process_infos_skip_vanished_pids() {
    let fs = MockFs::new()
        .with_listing("/proc", ["1", "4242", "self", "77"])
        .with_file("/proc/1/status", "Name:\tinit\nState:\tS (sleeping)\nUid:\t0\t0\t0\t0\n")
        .with_file("/proc/77/status", "Name:\tsshd\nState:\tR (running)\nUid:\t1000\t1000\t1000\t1000\n");
    let infos = linux(fs).process_infos().unwrap();

    let pids: Vec<u32> = infos.iter().map(|p| p.pid).collect();
    assert_eq!(pids, vec![1, 77]);
    assert_eq!(infos[0].uid, 0);
    assert_eq!(infos[1].name, "sshd");
    assert_eq!(infos[1].state, 'R');
}

#[test]
fn uid_of_unknown_user_is_an_os_error() {
    let fs = MockFs::new().with_file(
        "/etc/passwd",
        "root:x:0:0:root:/root:/bin/bash\nzabbix:x:998:997::/var/lib/zabbix:/sbin/nologin\n",
    );
    let linux = linux(fs);
    assert_eq!(linux.uid("zabbix").unwrap(), 998);
    assert!(matches!(
        linux.uid(""),
        Err(OperatingSystemError::NotFound { kind: "user", .. })
    ));
}

#[test]
fn net_interface_names_handle_joined_names() {
    let linux = linux(MockFs::new().with_file("/proc/net/dev", NET_DEV));
    let names = linux.net_interface_names().unwrap();
    assert!(names.contains("lo"));
    assert!(names.contains("eth0"));

    let lo = linux.net_interface_info("lo").unwrap();
    assert_eq!(lo.rx_bytes, 9091406708);
    let eth0 = linux.net_interface_info("eth0").unwrap();
    assert_eq!((eth0.tx_bytes, eth0.tx_errors, eth0.tx_dropped), (3000, 3, 4));
}

#[test]
fn memory_reports_every_kind() {
    let memory = linux(MockFs::new().with_file("/proc/meminfo", MEMINFO))
        .memory()
        .unwrap();
    for kind in MemoryKind::ALL {
        assert!(memory.contains_key(&kind), "missing {kind}");
    }
    assert_eq!(memory[&MemoryKind::Total], 16000000 * 1024);
    assert_eq!(memory[&MemoryKind::Shared], 100000 * 1024);
}

#[test]
fn cpu_count_excludes_aggregate_line() {
    let linux = linux(MockFs::new().with_file("/proc/stat", PROC_STAT));
    assert_eq!(linux.cpu_count().unwrap(), 2);
    assert_eq!(linux.cpu_times(-1).unwrap().idle, 800);
    assert_eq!(linux.cpu_times(1).unwrap().user, 40);
}

#[test]
fn fs_size_and_inodes_use_statvfs() {
    let stat = FsStat {
        fragment_size: 4096,
        blocks: 1000,
        blocks_free: 400,
        blocks_available: 300,
        files: 500,
        files_free: 200,
    };
    let linux = linux(MockFs::new().with_statvfs("/", stat));
    assert_eq!(linux.fs_size("/").unwrap(), (300 * 4096, 1000 * 4096));
    assert_eq!(linux.fs_inodes("/").unwrap(), (200, 500));
    assert!(linux.fs_size("/missing").is_err());
}

#[test]
fn linux_collect_feeds_shifted_queries() {
    let linux = linux(
        MockFs::new()
            .with_file("/proc/diskstats", DISKSTATS)
            .with_file("/proc/stat", PROC_STAT),
    );
    linux.disk_collector().collect_at(1000);
    linux.cpu_collector().collect_at(1000);

    let disk = linux.disk_device_stats_shifted("sda", 60, 1060).unwrap();
    assert_eq!(disk.timestamp, 1000);
    assert_eq!(disk.value.read_sectors, 8000);
    assert!(linux.disk_device_stats_shifted("sda", 61, 1060).is_err());

    let cpu = linux.cpu_times_shifted(-1, 0, 1000).unwrap();
    assert_eq!(cpu.value.user, 100);

    let names: Vec<String> = linux.disk_device_names().unwrap().into_iter().collect();
    assert_eq!(names, vec!["dm-0", "sda", "sda1"]);
}

#[test]
fn system_load_parses_three_averages() {
    let linux = linux(MockFs::new().with_file("/proc/loadavg", "0.50 0.40 0.30 1/123 4567\n"));
    let load = linux.system_load().unwrap();
    assert!((load.one - 0.5).abs() < f64::EPSILON);
    assert!((load.fifteen - 0.3).abs() < f64::EPSILON);
}

#[test]
fn real_fs_reads_files_listings_and_statvfs() {
    use crate::fs::{FileSystem, RealFs};

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("loadavg"), "1.00 0.50 0.25 2/200 99\n").unwrap();
    std::fs::create_dir(dir.path().join("42")).unwrap();

    let fs = RealFs::new();
    let mut names = fs.read_dir_names(dir.path()).unwrap();
    names.sort();
    assert_eq!(names, vec!["42", "loadavg"]);
    assert!(fs
        .read_to_string(&dir.path().join("loadavg"))
        .unwrap()
        .starts_with("1.00"));

    let stat = fs.statvfs(dir.path()).unwrap();
    assert!(stat.blocks >= stat.blocks_free);
    assert!(stat.fragment_size > 0);
    assert!(fs.statvfs(&dir.path().join("missing")).is_err());
}

#[test]
fn process_infos_skip_unparseable_status() {
    let fs = MockFs::new()
        .with_listing("/proc", ["1", "2", "3"])
        .with_file("/proc/1/status", "Name:\tinit\nState:\tS\nUid:\t0\t0\t0\t0\n")
        .with_file("/proc/2/status", "Name:\tkworker\nState:\tI\n")
        .with_file("/proc/3/status", "State:\tR\nUid:\t1000\t1000\t1000\t1000\n");
    let infos = linux(fs).process_infos().unwrap();

    let pids: Vec<u32> = infos.iter().map(|p| p.pid).collect();
    assert_eq!(pids, vec![1]);
}

#[test]
fn possible_cpus_count_every_listed_range() {
    let possible = |content: &str| {
        linux(MockFs::new().with_file("/sys/devices/system/cpu/possible", content))
            .possible_cpu_count()
    };
    assert_eq!(possible("0-7\n").unwrap(), 8);
    assert_eq!(possible("0\n").unwrap(), 1);
    assert_eq!(possible("0-3,8-11,16\n").unwrap(), 9);
    assert!(matches!(
        possible("3-1\n"),
        Err(OperatingSystemError::Parse { .. })
    ));
    assert!(linux(MockFs::new()).possible_cpu_count().is_err());
}
