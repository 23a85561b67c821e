//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_file() {
        let path = write_temp(
            "flash_embed_loader_valid.toml",
            "[listener]\nbind_address = \"127.0.0.1:9000\"\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn reports_validation_errors() {
        let path = write_temp(
            "flash_embed_loader_invalid.toml",
            "[flash]\nfallback_marker = \"\"\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation failed: flash.fallback_marker: must not be empty"
        );
        fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn reports_parse_errors() {
        let path = write_temp("flash_embed_loader_broken.toml", "[flash\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn reports_missing_file() {
        let path = std::env::temp_dir().join("flash_embed_loader_missing.toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
