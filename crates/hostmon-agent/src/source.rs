use crate::error::ConfigurationError;
use crate::items::Catalog;
use crate::registry::Item;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// What a configuration source provides: named items and scalar attributes.
#[derive(Debug, Default)]
pub struct LoadedSource {
    pub items: HashMap<String, Item>,
    pub attributes: toml::Table,
}

/// Loads one configuration source from disk.
pub trait SourceLoader: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the source cannot be read, parsed or
    /// resolved.
    fn load(&self, path: &Path) -> Result<LoadedSource, ConfigurationError>;
}

/// Loads TOML sources. The optional `[items]` table maps exposed keys to
/// built-in function names; every other top-level entry is an attribute.
///
/// ```toml
/// listen_port = 10050
///
/// [items]
/// "vfs.fs.size" = "fs_size"
/// "custom.root.free" = "fs_size"
/// ```
pub struct TomlSourceLoader {
    catalog: Arc<Catalog>,
}

impl TomlSourceLoader {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn resolve(&self, items: toml::Table) -> Result<HashMap<String, Item>, ConfigurationError> {
        let mut resolved = HashMap::with_capacity(items.len());
        for (key, value) in items {
            let function = value.as_str().ok_or_else(|| ConfigurationError::WrongType {
                attribute: format!("items.{key}"),
                expected: "a function name",
            })?;
            let item = self
                .catalog
                .function(function)
                .cloned()
                .ok_or_else(|| ConfigurationError::UnknownFunction {
                    key: key.clone(),
                    function: function.to_string(),
                })?;
            resolved.insert(key, item);
        }
        Ok(resolved)
    }
}

/// Reads and parses a TOML file into a table.
pub(crate) fn read_table(path: &Path) -> Result<toml::Table, ConfigurationError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    content.parse::<toml::Table>().map_err(|source| ConfigurationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl SourceLoader for TomlSourceLoader {
    fn load(&self, path: &Path) -> Result<LoadedSource, ConfigurationError> {
        let mut attributes = read_table(path)?;
        let items = match attributes.remove("items") {
            None => HashMap::new(),
            Some(toml::Value::Table(items)) => self.resolve(items)?,
            Some(_) => {
                return Err(ConfigurationError::WrongType {
                    attribute: "items".to_string(),
                    expected: "a table",
                })
            }
        };
        tracing::debug!(path = %path.display(), items = items.len(), "Loaded source");
        Ok(LoadedSource { items, attributes })
    }
}
