use crate::error::ConfigurationError;
use crate::registry::{Item, ItemRegistry, RegistryHandle};
use crate::source::{self, SourceLoader};
use arc_swap::ArcSwapOption;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub listen_host: String,
    pub listen_port: u16,
    /// Item files merged in order; later files override earlier ones.
    /// Relative paths are resolved against the config file's directory.
    pub item_files: Vec<PathBuf>,
    #[serde(default = "default_collection_interval")]
    pub collection_interval_secs: u64,
    #[serde(default = "default_history_retention")]
    pub history_retention_secs: u64,
    #[serde(default = "default_io_timeout")]
    pub io_timeout_secs: u64,
    /// `tracing` filter directives, e.g. `"hostmon=debug"`
    #[serde(default)]
    pub log_filter: Option<String>,
}

fn default_collection_interval() -> u64 {
    1
}

fn default_history_retention() -> u64 {
    900
}

fn default_io_timeout() -> u64 {
    3
}

fn require(
    attributes: &toml::Table,
    name: &str,
    expected: &'static str,
    check: impl Fn(&toml::Value) -> bool,
) -> Result<(), ConfigurationError> {
    let value = attributes
        .get(name)
        .ok_or_else(|| ConfigurationError::MissingAttribute(name.to_string()))?;
    if check(value) {
        Ok(())
    } else {
        Err(ConfigurationError::WrongType {
            attribute: name.to_string(),
            expected,
        })
    }
}

impl AgentConfig {
    /// Reads only the attributes of a config file, without resolving items.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let mut attributes = source::read_table(path)?;
        attributes.remove("items");
        Self::from_attributes(&attributes)
    }

    /// Validates required attributes and applies defaults to the rest.
    pub fn from_attributes(attributes: &toml::Table) -> Result<Self, ConfigurationError> {
        require(attributes, "listen_host", "a string", toml::Value::is_str)?;
        require(attributes, "listen_port", "an integer", toml::Value::is_integer)?;
        require(attributes, "item_files", "an array of paths", |v| {
            v.as_array()
                .is_some_and(|files| files.iter().all(toml::Value::is_str))
        })?;

        let config: Self = toml::Value::Table(attributes.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ConfigurationError::Invalid(e.to_string()))?;

        if config.collection_interval_secs == 0 {
            return Err(ConfigurationError::Invalid(
                "collection_interval_secs must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }
}

/// Owns the config file path and performs reloads.
///
/// A reload loads the main file and every item file, merges their items and
/// only then swaps the result in. Any failure leaves both the live registry
/// and the live config untouched.
pub struct ConfigManager {
    config_path: PathBuf,
    loader: Arc<dyn SourceLoader>,
    defaults: HashMap<String, Item>,
    registry: Arc<RegistryHandle>,
    current: ArcSwapOption<AgentConfig>,
    reload_lock: Mutex<()>,
}

impl ConfigManager {
    /// `defaults` are served when the main file declares no items and lists
    /// no item files.
    pub fn new(
        config_path: impl Into<PathBuf>,
        loader: Arc<dyn SourceLoader>,
        defaults: HashMap<String, Item>,
    ) -> Self {
        Self {
            config_path: config_path.into(),
            loader,
            defaults,
            registry: Arc::new(RegistryHandle::default()),
            current: ArcSwapOption::empty(),
            reload_lock: Mutex::new(()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match self.config_path.parent() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Reloads the configuration and atomically installs the new item
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if any source fails to load or a
    /// required attribute is missing or mistyped.
    pub fn update_config(&self) -> Result<Arc<AgentConfig>, ConfigurationError> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut loaded = None;
        self.registry.rebuild(|| -> Result<ItemRegistry, ConfigurationError> {
            let main = self.loader.load(&self.config_path)?;
            let config = AgentConfig::from_attributes(&main.attributes)?;

            let use_defaults = main.items.is_empty() && config.item_files.is_empty();
            let mut sources = vec![main.items];
            for file in &config.item_files {
                sources.push(self.loader.load(&self.resolve(file))?.items);
            }

            let registry = if use_defaults {
                ItemRegistry::merge([self.defaults.clone()])
            } else {
                ItemRegistry::merge(sources)
            };
            loaded = Some(config);
            Ok(registry)
        })?;

        let config = Arc::new(loaded.ok_or_else(|| {
            ConfigurationError::Invalid("reload produced no configuration".to_string())
        })?);
        self.current.store(Some(Arc::clone(&config)));
        tracing::info!(
            path = %self.config_path.display(),
            listen = %config.listen_address(),
            item_files = config.item_files.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn registry(&self) -> Arc<RegistryHandle> {
        Arc::clone(&self.registry)
    }

    /// The last successfully loaded configuration.
    pub fn config(&self) -> Option<Arc<AgentConfig>> {
        self.current.load_full()
    }

    pub fn listen_address(&self) -> Option<String> {
        self.config().map(|config| config.listen_address())
    }
}
