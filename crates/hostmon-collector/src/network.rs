use crate::error::{OperatingSystemError, Result};
use crate::fs::{self, FileSystem};
use hostmon_common::types::NetworkInterfaceInfo;
use std::collections::BTreeSet;

pub const PROC_NET_DEV: &str = "/proc/net/dev";

/// Parses `/proc/net/dev`. Counters are separated from the interface name by
/// the last `:` on the line, so rows where the name runs into the first
/// counter (`lo:9091406708 ...`) parse the same as padded ones.
pub fn parse_net_dev(content: &str) -> Result<Vec<(String, NetworkInterfaceInfo)>> {
    let mut interfaces = Vec::new();
    for line in content.lines() {
        let Some((name, counters)) = line.rsplit_once(':') else {
            continue;
        };
        let fields: Vec<&str> = counters.split_whitespace().collect();
        if fields.len() < 16 {
            return Err(OperatingSystemError::parse(
                PROC_NET_DEV,
                format!("expected 16 counters, got {}", fields.len()),
            ));
        }
        let n = |i: usize| fs::parse_u64(PROC_NET_DEV, fields[i]);
        interfaces.push((
            name.trim().to_string(),
            NetworkInterfaceInfo {
                rx_bytes: n(0)?,
                rx_packets: n(1)?,
                rx_errors: n(2)?,
                rx_dropped: n(3)?,
                tx_bytes: n(8)?,
                tx_packets: n(9)?,
                tx_errors: n(10)?,
                tx_dropped: n(11)?,
            },
        ));
    }
    Ok(interfaces)
}

pub fn net_interface_names(fs: &dyn FileSystem) -> Result<BTreeSet<String>> {
    Ok(parse_net_dev(&fs::read(fs, PROC_NET_DEV)?)?
        .into_iter()
        .map(|(name, _)| name)
        .collect())
}

pub fn net_interface_info(fs: &dyn FileSystem, interface: &str) -> Result<NetworkInterfaceInfo> {
    parse_net_dev(&fs::read(fs, PROC_NET_DEV)?)?
        .into_iter()
        .find(|(name, _)| name == interface)
        .map(|(_, info)| info)
        .ok_or_else(|| OperatingSystemError::not_found("network interface", interface))
}
