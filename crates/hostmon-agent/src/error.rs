use hostmon_collector::error::{InsufficientHistoryError, OperatingSystemError};
use std::path::PathBuf;

/// Framing or transport failure on one connection. Fatal to that connection
/// only.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed before a request was sent")]
    EmptyRequest,

    #[error("message does not start with the ZBXD header")]
    MissingHeader,

    #[error("framed request ended inside the length field")]
    TruncatedLength,

    #[error("framed request announced {expected} bytes but only {received} arrived")]
    TruncatedPayload { expected: usize, received: usize },

    #[error("framed request has invalid length {0}")]
    InvalidLength(i64),

    #[error("request exceeds {limit} bytes")]
    KeyTooLong { limit: usize },

    #[error("request is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// A key opened an argument list with `[` but did not end with `]`.
///
/// # Examples
///
/// ```rust
/// use hostmon_agent::error::KeyFormatError;
///
/// let err = KeyFormatError { key: "vfs.fs.size[/".to_string() };
/// assert!(err.to_string().contains("vfs.fs.size[/"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unterminated argument list in key {key:?}")]
pub struct KeyFormatError {
    pub key: String,
}

/// Failure of an item function. Never reaches the wire: the data source
/// logs it and answers with the default value.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error(transparent)]
    OperatingSystem(#[from] OperatingSystemError),

    #[error(transparent)]
    InsufficientHistory(#[from] InsufficientHistoryError),

    #[error("invalid value {value:?} for parameter '{parameter}'")]
    InvalidArgument {
        parameter: &'static str,
        value: String,
    },
}

impl ItemError {
    pub fn invalid(parameter: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            parameter,
            value: value.into(),
        }
    }
}

/// Reload-time validation failure. The registry that was live before the
/// reload stays live.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("required attribute '{0}' is missing")]
    MissingAttribute(String),

    #[error("attribute '{attribute}' must be {expected}")]
    WrongType {
        attribute: String,
        expected: &'static str,
    },

    #[error("item '{key}' refers to unknown function '{function}'")]
    UnknownFunction { key: String, function: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
