// crates/conduit-config/src/lib.rs
// ============================================================================
// Module: Conduit Config
// Description: The canonical orchestration configuration model and loader.
// Purpose: Give the CLI and embedders one TOML-backed place to set run-wide
//          defaults: concurrency, timeouts, gate weights, and optional storage.
// Dependencies: conduit-core, toml, serde, thiserror
// ============================================================================

//! ## Overview
//! Everything here overrides a compiled-in default; an absent config file is
//! not an error (§9's "Decided" note on `GateWeights`: defaults apply when a
//! weight is not named). Loading is strict about the *file*, not its
//! content: oversized, non-UTF-8, or path-abusive input is rejected before a
//! single byte is parsed, independent of what the TOML itself says.

#![deny(missing_docs)]

/// Configuration error types.
pub mod error;
/// Configuration data model types.
pub mod model;

pub use error::ConfigError;
pub use model::GateWeightsConfig;
pub use model::OrchestrationConfig;
pub use model::RetryPolicyConfig;
pub use model::StoreConfig;

use std::fs;
use std::path::Path;

/// Maximum accepted length of a config path, in bytes.
const MAX_PATH_LENGTH: usize = 4096;
/// Maximum accepted length of a single path component, in bytes.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum accepted config file size, in bytes.
const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576;

impl OrchestrationConfig {
    /// Loads configuration from `path`, or returns the compiled-in default
    /// when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PathTooLong`] or [`ConfigError::PathComponentTooLong`]
    /// if `path` is abusively long, [`ConfigError::FileTooLarge`] if the file
    /// exceeds [`MAX_CONFIG_FILE_BYTES`], [`ConfigError::NotUtf8`] if its
    /// bytes are not valid UTF-8, [`ConfigError::Parse`] if the TOML cannot
    /// be parsed, [`ConfigError::Io`] on any other read failure, or
    /// [`ConfigError::Invalid`] if the parsed config fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        validate_path(path)?;
        let metadata = fs::metadata(path).map_err(ConfigError::Io)?;
        if metadata.len() > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::FileTooLarge { max_bytes: MAX_CONFIG_FILE_BYTES, actual_bytes: metadata.len() });
        }
        let bytes = fs::read(path).map_err(ConfigError::Io)?;
        let text = String::from_utf8(bytes).map_err(|_| ConfigError::NotUtf8)?;
        let config: Self = toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let path_str = path.to_string_lossy();
    if path_str.len() > MAX_PATH_LENGTH {
        return Err(ConfigError::PathTooLong { max_bytes: MAX_PATH_LENGTH, actual_bytes: path_str.len() });
    }
    for component in path.components() {
        let component_str = component.as_os_str().to_string_lossy();
        if component_str.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::PathComponentTooLong {
                max_bytes: MAX_PATH_COMPONENT_LENGTH,
                actual_bytes: component_str.len(),
            });
        }
    }
    Ok(())
}
