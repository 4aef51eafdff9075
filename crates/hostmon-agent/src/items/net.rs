use super::arg;
use crate::error::ItemError;
use crate::registry::ItemResult;
use hostmon_collector::provider::HostStatsProvider;
use hostmon_common::value::Value;

/// `net.if.in[if,bytes|packets|errors|dropped]`
pub fn if_in(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    let info = provider.net_interface_info(arg(args, 0, ""))?;
    let value = match arg(args, 1, "bytes") {
        "bytes" => info.rx_bytes,
        "packets" => info.rx_packets,
        "errors" => info.rx_errors,
        "dropped" => info.rx_dropped,
        other => return Err(ItemError::invalid("mode", other)),
    };
    Ok(Value::from(value))
}

/// `net.if.out[if,bytes|packets|errors|dropped]`
pub fn if_out(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    let info = provider.net_interface_info(arg(args, 0, ""))?;
    let value = match arg(args, 1, "bytes") {
        "bytes" => info.tx_bytes,
        "packets" => info.tx_packets,
        "errors" => info.tx_errors,
        "dropped" => info.tx_dropped,
        other => return Err(ItemError::invalid("mode", other)),
    };
    Ok(Value::from(value))
}
