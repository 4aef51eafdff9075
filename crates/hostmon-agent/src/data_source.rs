use crate::key::KeyParser;
use crate::registry::RegistryHandle;
use hostmon_common::value::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Returned for any key that cannot be answered.
pub const DEFAULT_VALUE: &str = "ZBX_NOTSUPPORTED";

/// Turns a raw request key into a value. Implementations are total: every
/// input, however malformed, produces a value.
pub trait KeyProcessor: Send + Sync {
    fn process(&self, raw_key: &str) -> Value;
}

/// Resolves keys against the live item registry.
///
/// Unparseable keys, unknown names, arity mismatches, item errors and item
/// panics all yield [`DEFAULT_VALUE`].
pub struct DataSource {
    parser: KeyParser,
    registry: Arc<RegistryHandle>,
}

impl DataSource {
    pub fn new(registry: Arc<RegistryHandle>) -> Self {
        Self {
            parser: KeyParser,
            registry,
        }
    }

    pub fn default_value() -> Value {
        Value::from(DEFAULT_VALUE)
    }
}

impl KeyProcessor for DataSource {
    fn process(&self, raw_key: &str) -> Value {
        let key = match self.parser.parse(raw_key) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting malformed key");
                return Self::default_value();
            }
        };

        let registry = self.registry.snapshot();
        let Some(item) = registry.get(&key.name) else {
            tracing::debug!(key = %key.name, "Unknown item");
            return Self::default_value();
        };

        let arity = item.arity();
        if !arity.accepts(key.args.len()) {
            tracing::debug!(
                key = %key.name,
                given = key.args.len(),
                min = arity.min,
                max = arity.max,
                "Argument count mismatch"
            );
            return Self::default_value();
        }

        match panic::catch_unwind(AssertUnwindSafe(|| item.call(&key.args))) {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                tracing::warn!(key = raw_key, error = %e, "Item failed");
                Self::default_value()
            }
            Err(_) => {
                tracing::error!(key = raw_key, "Item panicked");
                Self::default_value()
            }
        }
    }
}
