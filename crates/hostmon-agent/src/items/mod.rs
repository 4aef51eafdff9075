//! Built-in item functions.
//!
//! Every function is registered in the [`Catalog`] under a function name
//! (`"fs_size"`) and a default key (`"vfs.fs.size"`). Item files map exposed
//! keys to function names; without item files the default keys are served.

pub mod agent;
pub mod net;
pub mod proc;
pub mod system;
pub mod vfs;
pub mod vm;

use crate::error::ItemError;
use crate::registry::{Arity, Item, ItemResult};
use hostmon_collector::provider::HostStatsProvider;
use hostmon_common::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

type Provided = fn(&dyn HostStatsProvider, &[String]) -> ItemResult;

/// One built-in function: its catalog name, default key and arity.
struct Builtin {
    function: &'static str,
    key: &'static str,
    arity: Arity,
    run: Provided,
}

#[rustfmt::skip]
const BUILTINS: &[Builtin] = &[
    Builtin { function: "agent_ping", key: "agent.ping", arity: Arity::exact(0), run: agent::ping },
    Builtin { function: "agent_version", key: "agent.version", arity: Arity::exact(0), run: agent::version },
    Builtin { function: "hostname", key: "system.hostname", arity: Arity::exact(0), run: system::hostname },
    Builtin { function: "uname", key: "system.uname", arity: Arity::exact(0), run: system::uname },
    Builtin { function: "uptime", key: "system.uptime", arity: Arity::exact(0), run: system::uptime },
    Builtin { function: "maxproc", key: "kernel.maxproc", arity: Arity::exact(0), run: system::maxproc },
    Builtin { function: "cpu_num", key: "system.cpu.num", arity: Arity::range(0, 1), run: system::cpu_num },
    Builtin { function: "cpu_load", key: "system.cpu.load", arity: Arity::range(0, 2), run: system::cpu_load },
    Builtin { function: "cpu_util", key: "system.cpu.util", arity: Arity::range(0, 3), run: system::cpu_util },
    Builtin { function: "fs_size", key: "vfs.fs.size", arity: Arity::range(1, 2), run: vfs::fs_size },
    Builtin { function: "fs_inode", key: "vfs.fs.inode", arity: Arity::range(1, 2), run: vfs::fs_inode },
    Builtin { function: "dev_read", key: "vfs.dev.read", arity: Arity::range(0, 3), run: vfs::dev_read },
    Builtin { function: "dev_write", key: "vfs.dev.write", arity: Arity::range(0, 3), run: vfs::dev_write },
    Builtin { function: "memory_size", key: "vm.memory.size", arity: Arity::range(0, 1), run: vm::memory_size },
    Builtin { function: "swap_size", key: "system.swap.size", arity: Arity::range(0, 2), run: vm::swap_size },
    Builtin { function: "swap_in", key: "system.swap.in", arity: Arity::range(0, 2), run: vm::swap_in },
    Builtin { function: "swap_out", key: "system.swap.out", arity: Arity::range(0, 2), run: vm::swap_out },
    Builtin { function: "net_if_in", key: "net.if.in", arity: Arity::range(1, 2), run: net::if_in },
    Builtin { function: "net_if_out", key: "net.if.out", arity: Arity::range(1, 2), run: net::if_out },
    Builtin { function: "proc_num", key: "proc.num", arity: Arity::range(0, 2), run: proc::num },
];

/// The built-in item functions bound to a host provider.
pub struct Catalog {
    functions: HashMap<&'static str, Item>,
    default_keys: HashMap<&'static str, &'static str>,
}

impl Catalog {
    pub fn new(provider: Arc<dyn HostStatsProvider>) -> Self {
        let mut functions = HashMap::new();
        let mut default_keys = HashMap::new();
        for builtin in BUILTINS {
            let provider = Arc::clone(&provider);
            let run = builtin.run;
            functions.insert(
                builtin.function,
                Item::new(builtin.arity, move |args| run(provider.as_ref(), args)),
            );
            default_keys.insert(builtin.key, builtin.function);
        }
        Self {
            functions,
            default_keys,
        }
    }

    pub fn function(&self, name: &str) -> Option<&Item> {
        self.functions.get(name)
    }

    /// Every function under its default key.
    pub fn default_items(&self) -> HashMap<String, Item> {
        self.default_keys
            .iter()
            .filter_map(|(key, function)| {
                self.functions
                    .get(function)
                    .map(|item| (key.to_string(), item.clone()))
            })
            .collect()
    }
}

/// The argument at `index`, or `default` when it is absent or empty.
pub(crate) fn arg<'a>(args: &'a [String], index: usize, default: &'a str) -> &'a str {
    match args.get(index) {
        Some(value) if !value.is_empty() => value.as_str(),
        _ => default,
    }
}

pub(crate) fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Window length in seconds for an `avg1`/`avg5`/`avg15` mode argument.
pub(crate) fn average_window(mode: &str) -> Result<i64, ItemError> {
    match mode {
        "avg1" => Ok(60),
        "avg5" => Ok(300),
        "avg15" => Ok(900),
        other => Err(ItemError::invalid("mode", other)),
    }
}

/// Formats `(free, total)` according to a `total|free|used|pfree|pused` mode.
pub(crate) fn size_mode(mode: &str, free: u64, total: u64) -> ItemResult {
    let used = total.saturating_sub(free);
    let value: Value = match mode {
        "total" => total.into(),
        "free" => free.into(),
        "used" => used.into(),
        "pfree" => percent(free, total).into(),
        "pused" => percent(used, total).into(),
        other => return Err(ItemError::invalid("mode", other)),
    };
    Ok(value)
}
