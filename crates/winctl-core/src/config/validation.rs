//! Configuration validation.

use crate::config::types::WinctlConfig;
use crate::errors::ConfigError;

/// Validate the configuration.
///
/// # Errors
///
/// Returns an error for an unknown backend or title match name, a fuzzy
/// threshold outside `(0, 1]`, zero wait attempts or a negative backoff.
pub fn validate_config(config: &WinctlConfig) -> Result<(), ConfigError> {
    config.backend.requested()?;
    config.lookup.title_match()?;

    let threshold = config.lookup.fuzzy_threshold();
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("lookup.fuzzy_threshold must be in (0, 1], got {threshold}"),
        });
    }

    if config.wait.max_attempts() == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "wait.max_attempts must be at least 1".to_string(),
        });
    }

    let backoff = config.wait.backoff();
    if !backoff.is_finite() || backoff < 0.0 {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("wait.backoff must be a non-negative number, got {backoff}"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WinctlError;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&WinctlConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_backend() {
        let mut config = WinctlConfig::default();
        config.backend.kind = Some("wayland".to_string());
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BACKEND");
    }

    #[test]
    fn test_invalid_title_match() {
        let mut config = WinctlConfig::default();
        config.lookup.title_match = Some("glob".to_string());
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TITLE_MATCH");
    }

    #[test]
    fn test_threshold_out_of_range() {
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            let mut config = WinctlConfig::default();
            config.lookup.fuzzy_threshold = Some(bad);
            let err = validate_config(&config).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_CONFIGURATION");
        }

        let mut config = WinctlConfig::default();
        config.lookup.fuzzy_threshold = Some(1.0);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_attempts() {
        let mut config = WinctlConfig::default();
        config.wait.max_attempts = Some(0);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_negative_backoff() {
        let mut config = WinctlConfig::default();
        config.wait.backoff = Some(-1.0);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("backoff"));
    }
}
