use crate::registry::ItemResult;
use hostmon_collector::provider::HostStatsProvider;
use hostmon_common::value::Value;

pub fn ping(_: &dyn HostStatsProvider, _: &[String]) -> ItemResult {
    Ok(Value::from(1))
}

pub fn version(_: &dyn HostStatsProvider, _: &[String]) -> ItemResult {
    Ok(Value::from(env!("CARGO_PKG_VERSION")))
}
