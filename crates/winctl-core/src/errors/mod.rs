use std::error::Error;

/// Base trait for all library errors
pub trait WinctlError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether the error was caused by caller input rather than the OS
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the library
pub type WinctlResult<T> = Result<T, Box<dyn WinctlError>>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found at '{path}'")]
    ConfigNotFound { path: String },

    #[error("Failed to parse config file: {message}")]
    ConfigParseError { message: String },

    #[error("Invalid backend '{backend}'. Supported backends: auto, win32, x11, macos")]
    InvalidBackend { backend: String },

    #[error(
        "Invalid title match '{title_match}'. Supported modes: platform, exact, substring, fuzzy"
    )]
    InvalidTitleMatch { title_match: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("IO error reading config: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl WinctlError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidBackend { .. } => "INVALID_BACKEND",
            ConfigError::InvalidTitleMatch { .. } => "INVALID_TITLE_MATCH",
            ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ConfigParseError { .. }
                | ConfigError::InvalidBackend { .. }
                | ConfigError::InvalidTitleMatch { .. }
                | ConfigError::InvalidConfiguration { .. }
        )
    }
}
