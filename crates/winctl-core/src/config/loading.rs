//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.winctl/config.toml` (global user preferences)
//! 3. **Project config** - `./.winctl/config.toml` (project-specific overrides)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::types::{BackendConfig, LookupConfig, WaitConfig, WinctlConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

const CONFIG_DIR: &str = ".winctl";
const CONFIG_FILE: &str = "config.toml";

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a file exists but cannot be read or parsed, or if the
/// merged configuration fails validation. Missing config files are not errors.
pub fn load_hierarchy() -> Result<WinctlConfig, ConfigError> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(CONFIG_DIR).join(CONFIG_FILE));
    } else {
        debug!(event = "core.config.home_dir_missing");
    }
    paths.push(std::env::current_dir()?.join(CONFIG_DIR).join(CONFIG_FILE));

    load_from_paths(&paths)
}

/// Load and merge the given files in order, later files taking precedence.
pub fn load_from_paths(paths: &[PathBuf]) -> Result<WinctlConfig, ConfigError> {
    let mut config = WinctlConfig::default();

    for path in paths {
        match load_config_file(path) {
            Ok(file_config) => {
                debug!(event = "core.config.file_loaded", path = %path.display());
                config = merge_configs(config, file_config);
            }
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    validate_config(&config)?;

    info!(
        event = "core.config.load_completed",
        backend = config.backend.kind.as_deref().unwrap_or("auto"),
        title_match = config.lookup.title_match.as_deref().unwrap_or("platform")
    );
    Ok(config)
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<WinctlConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            }
        } else {
            ConfigError::IoError { source: e }
        }
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Every field is optional, so an override only replaces what it sets.
pub fn merge_configs(base: WinctlConfig, override_config: WinctlConfig) -> WinctlConfig {
    WinctlConfig {
        backend: BackendConfig {
            kind: override_config.backend.kind.or(base.backend.kind),
        },
        wait: WaitConfig {
            max_attempts: override_config
                .wait
                .max_attempts
                .or(base.wait.max_attempts),
            base_delay_ms: override_config
                .wait
                .base_delay_ms
                .or(base.wait.base_delay_ms),
            backoff: override_config.wait.backoff.or(base.wait.backoff),
        },
        lookup: LookupConfig {
            title_match: override_config
                .lookup
                .title_match
                .or(base.lookup.title_match),
            fuzzy_threshold: override_config
                .lookup
                .fuzzy_threshold
                .or(base.lookup.fuzzy_threshold),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WinctlError;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = load_from_paths(&[
            temp.path().join("nope.toml"),
            temp.path().join("also-nope.toml"),
        ])
        .unwrap();
        assert_eq!(config, WinctlConfig::default());
    }

    #[test]
    fn test_project_overrides_user() {
        let temp = tempfile::tempdir().unwrap();
        let user = write(
            temp.path(),
            "user.toml",
            r#"
[wait]
max_attempts = 20
base_delay_ms = 50

[lookup]
title_match = "substring"
"#,
        );
        let project = write(
            temp.path(),
            "project.toml",
            r#"
[wait]
base_delay_ms = 10

[lookup]
title_match = "fuzzy"
fuzzy_threshold = 0.8
"#,
        );

        let config = load_from_paths(&[user, project]).unwrap();
        assert_eq!(config.wait.max_attempts(), 20);
        assert_eq!(config.wait.base_delay_ms(), 10);
        assert_eq!(config.lookup.title_match.as_deref(), Some("fuzzy"));
        assert_eq!(config.lookup.fuzzy_threshold(), 0.8);
    }

    #[test]
    fn test_user_values_survive_project_without_section() {
        let base: WinctlConfig = toml::from_str(
            r#"
[wait]
max_attempts = 4
"#,
        )
        .unwrap();
        let project: WinctlConfig = toml::from_str(
            r#"
[backend]
kind = "auto"
"#,
        )
        .unwrap();

        let merged = merge_configs(base, project);
        assert_eq!(merged.wait.max_attempts(), 4);
        assert_eq!(merged.backend.kind.as_deref(), Some("auto"));
    }

    #[test]
    fn test_parse_error_is_reported_with_path() {
        let temp = tempfile::tempdir().unwrap();
        let broken = write(temp.path(), "broken.toml", "invalid toml [[[");

        let err = load_from_paths(&[broken]).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_PARSE_ERROR");
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_merged_config_is_validated() {
        let temp = tempfile::tempdir().unwrap();
        let bad = write(
            temp.path(),
            "bad.toml",
            r#"
[lookup]
fuzzy_threshold = 3.0
"#,
        );

        let err = load_from_paths(&[bad]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIGURATION");
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let err = load_config_file(&temp.path().join("missing.toml")).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_NOT_FOUND");
    }

    #[test]
    fn test_toml_parsing_edge_cases() {
        let empty: WinctlConfig = toml::from_str("").unwrap();
        assert_eq!(empty, WinctlConfig::default());

        let partial: WinctlConfig = toml::from_str(
            r#"
[backend]
kind = "macos"
"#,
        )
        .unwrap();
        assert_eq!(partial.backend.kind.as_deref(), Some("macos"));
        assert_eq!(partial.wait.max_attempts(), 10);

        let invalid: Result<WinctlConfig, _> = toml::from_str("[wait]\nmax_attempts = \"ten\"");
        assert!(invalid.is_err());
    }
}
