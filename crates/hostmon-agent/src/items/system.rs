use super::{arg, average_window, percent};
use crate::error::ItemError;
use crate::registry::ItemResult;
use chrono::Utc;
use hostmon_collector::cpu::ALL_CPUS;
use hostmon_collector::provider::HostStatsProvider;
use hostmon_common::types::CpuTimes;
use hostmon_common::value::Value;

pub fn hostname(provider: &dyn HostStatsProvider, _: &[String]) -> ItemResult {
    Ok(provider.hostname()?.into())
}

pub fn uname(provider: &dyn HostStatsProvider, _: &[String]) -> ItemResult {
    Ok(provider.uname()?.join(" ").into())
}

pub fn uptime(provider: &dyn HostStatsProvider, _: &[String]) -> ItemResult {
    Ok(provider.uptime()?.into())
}

pub fn maxproc(provider: &dyn HostStatsProvider, _: &[String]) -> ItemResult {
    Ok(provider.max_number_of_running_processes()?.into())
}

/// `system.cpu.num[online|max]`
pub fn cpu_num(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    match arg(args, 0, "online") {
        "online" => Ok(provider.cpu_count()?.into()),
        "max" => Ok(provider.possible_cpu_count()?.into()),
        other => Err(ItemError::invalid("type", other)),
    }
}

/// `system.cpu.load[all|percpu,avg1|avg5|avg15]`
pub fn cpu_load(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    let load = provider.system_load()?;
    let average = match arg(args, 1, "avg1") {
        "avg1" => load.one,
        "avg5" => load.five,
        "avg15" => load.fifteen,
        other => return Err(ItemError::invalid("mode", other)),
    };

    match arg(args, 0, "all") {
        "all" => Ok(Value::from(average)),
        "percpu" => {
            let cpus = provider.cpu_count()?.max(1);
            Ok(Value::from(average / cpus as f64))
        }
        other => Err(ItemError::invalid("cpu", other)),
    }
}

/// `system.cpu.util[cpu,type,avg1|avg5|avg15]`: share of CPU time spent in
/// `type` over the window, from sampled history.
pub fn cpu_util(provider: &dyn HostStatsProvider, args: &[String]) -> ItemResult {
    let cpu = match arg(args, 0, "all") {
        "all" => ALL_CPUS,
        other => other.parse().map_err(|_| ItemError::invalid("cpu", other))?,
    };
    let kind = arg(args, 1, "user");
    let window = average_window(arg(args, 2, "avg1"))?;

    let now = Utc::now().timestamp();
    let latest = provider.cpu_times_shifted(cpu, 0, now)?;
    let earlier = provider.cpu_times_shifted(cpu, window, now)?;

    let counter = |times: &CpuTimes| times.get(kind).ok_or_else(|| ItemError::invalid("type", kind));
    let spent = counter(&latest.value)?.saturating_sub(counter(&earlier.value)?);
    let total = latest.value.total().saturating_sub(earlier.value.total());
    Ok(percent(spent, total).into())
}
