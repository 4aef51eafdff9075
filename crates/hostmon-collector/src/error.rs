/// Errors raised while reading host facts from the operating system.
///
/// # Examples
///
/// ```rust
/// use hostmon_collector::error::OperatingSystemError;
///
/// let err = OperatingSystemError::NotFound {
///     kind: "user",
///     name: "nobody-here".to_string(),
/// };
/// assert!(err.to_string().contains("nobody-here"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum OperatingSystemError {
    /// A system file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A system file was read but its content did not have the expected shape.
    #[error("unexpected content in {path}: {detail}")]
    Parse { path: String, detail: String },

    /// The requested device, interface, user or CPU does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },
}

impl OperatingSystemError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// No sample in a history qualifies for the requested window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("insufficient history for {key}: no sample at or before {target}")]
pub struct InsufficientHistoryError {
    pub key: String,
    /// The reference time minus the window, in seconds since the epoch.
    pub target: i64,
}

/// Convenience `Result` alias for OS reads.
pub type Result<T> = std::result::Result<T, OperatingSystemError>;
