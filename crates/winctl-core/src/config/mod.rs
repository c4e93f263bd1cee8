//! # Configuration System
//!
//! Hierarchical TOML configuration.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.winctl/config.toml` (global user preferences)
//! 3. **Project config** - `./.winctl/config.toml` (project-specific overrides)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.winctl/config.toml
//! [backend]
//! kind = "auto"
//!
//! [wait]
//! max_attempts = 20
//!
//! [lookup]
//! title_match = "substring"
//! ```
//!
//! ```rust,no_run
//! use winctl_core::config::WinctlConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WinctlConfig::load_hierarchy()?;
//!     let policy = config.wait.retry_policy();
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{BackendConfig, LookupConfig, WaitConfig, WinctlConfig};
pub use validation::validate_config;

impl WinctlConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
