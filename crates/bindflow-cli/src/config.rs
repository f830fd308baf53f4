//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use bindflow::{BindflowError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for BindflowError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingFile(path) => BindflowError::not_found(path),
            err @ ConfigError::Parse { .. } => BindflowError::validation(err.to_string()),
        }
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (bindflow/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path to config file
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, BindflowError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("bindflow/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "bindflow", "bindflow") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, BindflowError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content =
        fs::read_to_string(path).map_err(|err| BindflowError::io("reading", path, err))?;

    parse_config(&content).map_err(|message| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        }
        .into()
    })
}

fn parse_config(content: &str) -> Result<AppConfig, String> {
    toml::from_str(content).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use bindflow::render::RenderFormat;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [directories]
            json = "/srv/snapshot"
            output = "/srv/out"

            [render]
            program = "/opt/mmdc"
            formats = ["png"]
            scale = 4
            width = 1600
            puppeteer_config = "/app/puppeteer-config.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.directories().json(), Path::new("/srv/snapshot"));
        assert_eq!(config.directories().output(), Path::new("/srv/out"));
        assert_eq!(config.render().program(), "/opt/mmdc");
        assert_eq!(config.render().formats(), &[RenderFormat::Png]);
        assert_eq!(config.render().scale(), Some(4));
        assert_eq!(config.render().width(), Some(1600));
        assert_eq!(config.render().height(), None);
        assert!(config.render().enabled());
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_config("[render]\nwidth = 800\n").unwrap();

        assert_eq!(config.directories().json(), Path::new("./json"));
        assert_eq!(config.render().program(), "mmdc");
        assert_eq!(config.render().scale(), Some(8));
        assert_eq!(config.render().width(), Some(800));
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(parse_config("[render]\nformats = [\"gif\"]\n").is_err());
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, BindflowError::NotFound { .. }));
    }

    #[test]
    fn test_explicit_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[render\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, BindflowError::Validation(_)));
    }
}
