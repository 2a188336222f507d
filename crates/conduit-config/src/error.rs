// crates/conduit-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: The closed error taxonomy for config loading and validation.
// Purpose: Give callers stable, matchable reasons for a rejected config.
// Dependencies: thiserror, std::io
// ============================================================================

/// Errors raised while loading or validating an [`crate::OrchestrationConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file path exceeds the maximum accepted length.
    #[error("config path exceeds max length: {actual_bytes} > {max_bytes}")]
    PathTooLong {
        /// Maximum accepted length, in bytes.
        max_bytes: usize,
        /// Actual length, in bytes.
        actual_bytes: usize,
    },
    /// A single component of the config file path exceeds the maximum accepted length.
    #[error("config path component too long: {actual_bytes} > {max_bytes}")]
    PathComponentTooLong {
        /// Maximum accepted component length, in bytes.
        max_bytes: usize,
        /// Actual component length, in bytes.
        actual_bytes: usize,
    },
    /// The config file exceeds the maximum accepted size.
    #[error("config file exceeds size limit: {actual_bytes} > {max_bytes}")]
    FileTooLarge {
        /// Maximum accepted size, in bytes.
        max_bytes: u64,
        /// Actual file size, in bytes.
        actual_bytes: u64,
    },
    /// The config file is not valid UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,
    /// The config file could not be read from disk.
    #[error("config file could not be read: {0}")]
    Io(#[source] std::io::Error),
    /// The config file's TOML could not be parsed.
    #[error("config file is not valid toml: {0}")]
    Parse(String),
    /// The parsed config failed semantic validation.
    #[error("config is invalid: {0}")]
    Invalid(String),
}
