use super::arg;
use crate::registry::ItemResult;
use hostmon_collector::provider::HostStatsProvider;
use hostmon_common::value::Value;

/// `proc.num[name,user]`: processes matching both filters; an empty filter
/// matches everything.
pub fn num(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    let name = arg(args, 0, "");
    let uid = match arg(args, 1, "") {
        "" => None,
        user => Some(provider.uid(user)?),
    };

    let count = provider
        .process_infos()?
        .iter()
        .filter(|p| name.is_empty() || p.name == name)
        .filter(|p| uid.map_or(true, |uid| p.uid == uid))
        .count();
    Ok(Value::from(count))
}
