//! Immutable item mappings and their atomic hot swap.
//!
//! An [`ItemRegistry`] is built wholesale from ordered sources and never
//! mutated afterwards. The [`RegistryHandle`] holds the live snapshot; a
//! reload replaces it with a single atomic pointer swap, and every request
//! works against the snapshot it loaded for its whole duration.

use crate::error::ItemError;
use arc_swap::ArcSwap;
use hostmon_common::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub type ItemResult = Result<Value, ItemError>;

type ItemFn = dyn Fn(&[String]) -> ItemResult + Send + Sync;

/// Number of arguments an item accepts, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: usize,
}

impl Arity {
    pub const fn exact(n: usize) -> Self {
        Self { min: n, max: n }
    }

    pub const fn range(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn accepts(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// A registered item function together with its declared arity.
#[derive(Clone)]
pub struct Item {
    arity: Arity,
    function: Arc<ItemFn>,
}

impl Item {
    pub fn new<F>(arity: Arity, function: F) -> Self
    where
        F: Fn(&[String]) -> ItemResult + Send + Sync + 'static,
    {
        Self {
            arity,
            function: Arc::new(function),
        }
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn call(&self, args: &[String]) -> ItemResult {
        (self.function)(args)
    }

    /// Whether both handles point at the same function.
    pub fn same_function(&self, other: &Item) -> bool {
        Arc::ptr_eq(&self.function, &other.function)
    }
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item").field("arity", &self.arity).finish_non_exhaustive()
    }
}

/// A flattened name to item mapping with a version number.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    version: u64,
    items: HashMap<String, Item>,
}

impl ItemRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merges sources in order; a later source overrides an earlier one for
    /// the same name. Ordering within a source does not matter since each
    /// source is already a map.
    pub fn merge<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = HashMap<String, Item>>,
    {
        let mut items = HashMap::new();
        for source in sources {
            items.extend(source);
        }
        Self { version: 0, items }
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The live registry snapshot.
pub struct RegistryHandle {
    current: ArcSwap<ItemRegistry>,
}

impl RegistryHandle {
    pub fn new(initial: ItemRegistry) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// The snapshot a request should use for its whole duration.
    pub fn snapshot(&self) -> Arc<ItemRegistry> {
        self.current.load_full()
    }

    /// Atomically replaces the live registry, stamping it with the next
    /// version number. Returns the installed snapshot. Concurrent installs
    /// must be serialized by the caller.
    pub fn install(&self, mut registry: ItemRegistry) -> Arc<ItemRegistry> {
        registry.version = self.current.load().version + 1;
        let installed = Arc::new(registry);
        self.current.store(Arc::clone(&installed));
        tracing::info!(
            version = installed.version,
            items = installed.len(),
            "Item registry installed"
        );
        installed
    }

    /// Builds a new registry and installs it only if the build succeeds. On
    /// failure the current registry stays live and the error is returned.
    pub fn rebuild<F, E>(&self, build: F) -> Result<Arc<ItemRegistry>, E>
    where
        F: FnOnce() -> Result<ItemRegistry, E>,
    {
        let registry = build()?;
        Ok(self.install(registry))
    }
}

impl Default for RegistryHandle {
    fn default() -> Self {
        Self::new(ItemRegistry::empty())
    }
}
