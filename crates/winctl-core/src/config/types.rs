//! Configuration type definitions.
//!
//! These types are deserialized from TOML config files.
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! kind = "auto"
//!
//! [wait]
//! max_attempts = 10
//! base_delay_ms = 25
//! backoff = 1.0
//!
//! [lookup]
//! title_match = "fuzzy"
//! fuzzy_threshold = 0.85
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::backend::BackendKind;
use crate::errors::ConfigError;
use crate::matching::TitleMatch;
use crate::poll::RetryPolicy;

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.winctl/config.toml`
/// 2. Project config: `./.winctl/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WinctlConfig {
    /// Window system selection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Convergence polling
    #[serde(default)]
    pub wait: WaitConfig,

    /// Title lookup policy
    #[serde(default)]
    pub lookup: LookupConfig,
}

/// Window system selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BackendConfig {
    /// One of: auto, win32, x11, macos. `auto` (or unset) follows the build target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl BackendConfig {
    /// The explicitly requested backend, `None` for auto.
    pub fn requested(&self) -> Result<Option<BackendKind>, ConfigError> {
        match self.kind.as_deref() {
            None => Ok(None),
            Some(name) if name.eq_ignore_ascii_case(defaults::AUTO) => Ok(None),
            Some(name) => name.parse().map(Some),
        }
    }
}

/// Convergence polling.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WaitConfig {
    /// Re-checks after the first one. Default: 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Delay before the first re-check in milliseconds. Default: 25.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_delay_ms: Option<u64>,

    /// Linear growth of the delay per attempt. Default: 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff: Option<f64>,
}

impl WaitConfig {
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or_else(defaults::default_max_attempts)
    }

    pub fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms.unwrap_or_else(defaults::default_base_delay_ms)
    }

    pub fn backoff(&self) -> f64 {
        self.backoff.unwrap_or_else(defaults::default_backoff)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts(),
            Duration::from_millis(self.base_delay_ms()),
            self.backoff(),
        )
    }
}

/// Title lookup policy.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LookupConfig {
    /// One of: platform, exact, substring, fuzzy. Default: platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_match: Option<String>,

    /// Minimum similarity for fuzzy matching. Default: 0.9.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_threshold: Option<f64>,
}

impl LookupConfig {
    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold.unwrap_or_else(defaults::default_fuzzy_threshold)
    }

    /// The configured match, `None` to use the backend default.
    pub fn title_match(&self) -> Result<Option<TitleMatch>, ConfigError> {
        match self.title_match.as_deref() {
            None => Ok(None),
            Some(name) if name.eq_ignore_ascii_case(defaults::PLATFORM) => Ok(None),
            Some(name) => TitleMatch::from_name(name, self.fuzzy_threshold())
                .map(Some)
                .ok_or_else(|| ConfigError::InvalidTitleMatch {
                    title_match: name.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization_round_trip() {
        let config = WinctlConfig {
            backend: BackendConfig {
                kind: Some("x11".to_string()),
            },
            wait: WaitConfig {
                max_attempts: Some(3),
                base_delay_ms: None,
                backoff: Some(0.5),
            },
            lookup: LookupConfig::default(),
        };
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("kind = \"x11\""));
        assert!(toml_str.contains("max_attempts = 3"));
        assert!(!toml_str.contains("base_delay_ms"));

        let parsed: WinctlConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_wait_defaults() {
        let wait = WaitConfig::default();
        assert_eq!(wait.max_attempts(), 10);
        assert_eq!(wait.base_delay_ms(), 25);
        assert_eq!(wait.backoff(), 1.0);
        assert_eq!(wait.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_backend_requested() {
        let auto = BackendConfig {
            kind: Some("AUTO".to_string()),
        };
        assert_eq!(auto.requested().unwrap(), None);
        assert_eq!(BackendConfig::default().requested().unwrap(), None);

        let win32 = BackendConfig {
            kind: Some("win32".to_string()),
        };
        assert_eq!(win32.requested().unwrap(), Some(BackendKind::Win32));

        let bogus = BackendConfig {
            kind: Some("quartz".to_string()),
        };
        assert!(bogus.requested().is_err());
    }

    #[test]
    fn test_lookup_title_match() {
        assert_eq!(LookupConfig::default().title_match().unwrap(), None);

        let fuzzy = LookupConfig {
            title_match: Some("fuzzy".to_string()),
            fuzzy_threshold: Some(0.75),
        };
        assert_eq!(
            fuzzy.title_match().unwrap(),
            Some(TitleMatch::Fuzzy { threshold: 0.75 })
        );

        let platform = LookupConfig {
            title_match: Some("platform".to_string()),
            fuzzy_threshold: None,
        };
        assert_eq!(platform.title_match().unwrap(), None);

        let regex = LookupConfig {
            title_match: Some("regex".to_string()),
            fuzzy_threshold: None,
        };
        assert!(regex.title_match().is_err());
    }
}
