use super::{arg, percent, size_mode};
use crate::error::ItemError;
use crate::registry::ItemResult;
use hostmon_collector::provider::HostStatsProvider;
use hostmon_common::types::{MemoryKind, SwapInfo};
use hostmon_common::value::Value;

/// `vm.memory.size[total|free|buffers|cached|shared|available|used|pfree|pused]`
pub fn memory_size(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    let memory = provider.memory()?;
    let get = |kind: MemoryKind| memory.get(&kind).copied().unwrap_or(0);

    let total = get(MemoryKind::Total);
    let used = total.saturating_sub(get(MemoryKind::Free) + get(MemoryKind::Buffers) + get(MemoryKind::Cached));

    let value = match arg(args, 0, "total") {
        "used" => Value::from(used),
        "pused" => Value::from(percent(used, total)),
        "pfree" => Value::from(percent(total.saturating_sub(used), total)),
        other => {
            let kind: MemoryKind = other.parse().map_err(|_| ItemError::invalid("mode", other))?;
            Value::from(get(kind))
        }
    };
    Ok(value)
}

/// `system.swap.size[device|all,free|total|used|pfree|pused]`
pub fn swap_size(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    let (free, total) = provider.swap_size(arg(args, 0, "all"))?;
    size_mode(arg(args, 1, "free"), free, total)
}

/// `system.swap.in[all,pages]`: pages swapped in since boot.
pub fn swap_in(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    swap_pages(provider, args, |info| info.pages_in)
}

/// `system.swap.out[all,pages]`: pages swapped out since boot.
pub fn swap_out(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    swap_pages(provider, args, |info| info.pages_out)
}

// The kernel only keeps system-wide paging counters.
fn swap_pages(provider: &dyn HostStatsProvider, args: &[String], pick: fn(&SwapInfo) -> u64) -> ItemResult {
    match arg(args, 0, "all") {
        "all" => {}
        other => return Err(ItemError::invalid("device", other)),
    }
    match arg(args, 1, "pages") {
        "pages" => Ok(Value::from(pick(&provider.swap_info()?))),
        other => Err(ItemError::invalid("type", other)),
    }
}
