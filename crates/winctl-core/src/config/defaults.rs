//! Default values for configuration fields.

use crate::matching::DEFAULT_FUZZY_THRESHOLD;
use crate::poll::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};

/// Backend name meaning "follow the build target".
pub const AUTO: &str = "auto";

/// Title match name meaning "use the backend default".
pub const PLATFORM: &str = "platform";

/// Returns the default number of convergence re-checks (10).
pub fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Returns the default delay before the first re-check (25ms).
///
/// With linear backoff and 10 attempts a command waits at most 1.375s.
pub fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY.as_millis() as u64
}

/// Returns the default backoff step (1.0, i.e. `base * attempt`).
pub fn default_backoff() -> f64 {
    1.0
}

/// Returns the default fuzzy title similarity threshold (0.9).
pub fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}
