use crate::error::KeyFormatError;

/// A parsed request key: an item name plus its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: String,
    pub args: Vec<String>,
}

/// Parses `name` or `name[arg1,arg2,...]`.
///
/// Arguments are split on `,` with no quoting or nesting, and empty
/// arguments are kept, so `name[]` has one empty argument and `name[,]` two.
/// The argument list runs from the first `[` to the closing `]`, which must
/// be the last character of the key.
///
/// # Examples
///
/// ```
/// use hostmon_agent::key::KeyParser;
///
/// let key = KeyParser.parse("vfs.fs.size[/,free]").unwrap();
/// assert_eq!(key.name, "vfs.fs.size");
/// assert_eq!(key.args, vec!["/", "free"]);
///
/// assert!(KeyParser.parse("agent.ping").unwrap().args.is_empty());
/// assert!(KeyParser.parse("vfs.fs.size[/").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyParser;

impl KeyParser {
    pub fn parse(&self, raw: &str) -> Result<Key, KeyFormatError> {
        let Some((name, rest)) = raw.split_once('[') else {
            return Ok(Key {
                name: raw.to_string(),
                args: Vec::new(),
            });
        };

        let inner = rest.strip_suffix(']').ok_or_else(|| KeyFormatError {
            key: raw.to_string(),
        })?;

        Ok(Key {
            name: name.to_string(),
            args: inner.split(',').map(str::to_string).collect(),
        })
    }
}
