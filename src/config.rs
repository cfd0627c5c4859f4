//! Configuration management
//!
//! The `vjson` tool reads `vjson.toml` from the working directory, or the
//! file given with `--config`. Every field has a default, so an empty or
//! partial file is valid.

use crate::codec::CodecOptions;
use crate::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_CONFIG_FILE, DEFAULT_MAX_MESSAGE_SIZE};
use crate::error::{Result, ToolError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub codec: CodecOptions,
    pub io: IoConfig,
}

// =============================================================================
// Input/Output Configuration
// =============================================================================

/// Byte separating messages in an input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// One message per line
    #[default]
    Newline,
    /// NUL-terminated messages, as sent by the device over USB
    Nul,
}

impl Delimiter {
    pub fn byte(self) -> u8 {
        match self {
            Self::Newline => b'\n',
            Self::Nul => 0x00,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IoConfig {
    /// Capacity of the encode buffer (bytes)
    pub buffer_size: usize,
    /// Largest accepted input message (bytes)
    pub max_message_size: usize,
    /// Message separator in input streams
    pub delimiter: Delimiter,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            delimiter: Delimiter::Newline,
        }
    }
}

impl Config {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.io.buffer_size == 0 {
            return Err(ToolError::ConfigValidation {
                field: "io.buffer_size",
                reason: "must be greater than 0".into(),
            });
        }
        if self.io.max_message_size == 0 {
            return Err(ToolError::ConfigValidation {
                field: "io.max_message_size",
                reason: "must be greater than 0".into(),
            });
        }
        if self.io.buffer_size > self.io.max_message_size {
            return Err(ToolError::ConfigValidation {
                field: "io.buffer_size",
                reason: format!(
                    "{} exceeds io.max_message_size ({})",
                    self.io.buffer_size, self.io.max_message_size
                ),
            });
        }
        Ok(())
    }
}

/// Resolve the config file path
///
/// An explicit path wins; otherwise `vjson.toml` in the working directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load config from file, falling back to defaults
///
/// A missing file is normal; an unreadable or invalid one is logged and
/// ignored.
pub fn load(explicit: Option<&Path>) -> Config {
    let path = config_path(explicit);

    if !path.exists() {
        debug!("No config at {:?}, using defaults", path);
        return Config::default();
    }

    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Config parse error in {:?}: {}, using defaults", path, e);
                Config::default()
            }
        },
        Err(e) => {
            warn!("Failed to read config {:?}: {}, using defaults", path, e);
            Config::default()
        }
    }
}

/// Save config to file
pub fn save(config: &Config, path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).map_err(|e| ToolError::ConfigValidation {
            field: "config",
            reason: e.to_string(),
        })?;
    fs::write(path, content).map_err(|e| ToolError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Default values tests
    // =========================================================================

    #[test]
    fn test_default_io_config_values() {
        let config = IoConfig::default();

        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.delimiter, Delimiter::Newline);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_delimiter_bytes() {
        assert_eq!(Delimiter::Newline.byte(), b'\n');
        assert_eq!(Delimiter::Nul.byte(), 0);
    }

    // =========================================================================
    // Serialization tests
    // =========================================================================

    #[test]
    fn test_delimiter_toml_deserialization() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            delimiter: Delimiter,
        }

        let newline: Wrapper = toml::from_str("delimiter = \"newline\"").unwrap();
        let nul: Wrapper = toml::from_str("delimiter = \"nul\"").unwrap();

        assert_eq!(newline.delimiter, Delimiter::Newline);
        assert_eq!(nul.delimiter, Delimiter::Nul);
    }

    #[test]
    fn test_config_serialize_deserialize_roundtrip() {
        let config = Config {
            codec: CodecOptions {
                hex_prefix: true,
                uppercase_hex: true,
            },
            io: IoConfig {
                buffer_size: 128,
                max_message_size: 1024,
                delimiter: Delimiter::Nul,
            },
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(restored, config);
    }

    #[test]
    fn test_config_partial_section() {
        let partial_toml = r#"
[codec]
hex_prefix = true

[io]
delimiter = "nul"
"#;

        let config: Config = toml::from_str(partial_toml).unwrap();

        assert!(config.codec.hex_prefix);
        assert!(!config.codec.uppercase_hex);
        assert_eq!(config.io.delimiter, Delimiter::Nul);
        assert_eq!(config.io.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_config_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn test_validate_zero_buffer() {
        let mut config = Config::default();
        config.io.buffer_size = 0;

        match config.validate() {
            Err(ToolError::ConfigValidation { field, .. }) => {
                assert_eq!(field, "io.buffer_size")
            }
            other => panic!("Expected ConfigValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_buffer_larger_than_max_message() {
        let mut config = Config::default();
        config.io.buffer_size = 2048;
        config.io.max_message_size = 1024;

        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Path and file tests
    // =========================================================================

    #[test]
    fn test_config_path_explicit_wins() {
        let path = config_path(Some(Path::new("custom.toml")));
        assert_eq!(path, PathBuf::from("custom.toml"));
        assert_eq!(config_path(None), PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = load(Some(Path::new("/nonexistent/vjson.toml")));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("vjson-config-{}.toml", std::process::id()));
        let mut config = Config::default();
        config.codec.uppercase_hex = true;

        save(&config, &path).unwrap();
        let loaded = load(Some(&path));
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
