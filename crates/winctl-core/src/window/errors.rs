use crate::backend::BackendKind;
use crate::errors::WinctlError;

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Unsupported platform '{platform}': no window system backend is available")]
    UnsupportedPlatform { platform: String },

    #[error("Backend '{backend}' is not available on platform '{platform}'")]
    BackendUnavailable {
        backend: BackendKind,
        platform: String,
    },

    #[error("Failed to connect to the window system: {message}")]
    ConnectionFailed { message: String },

    #[error("Window not found: {handle}")]
    WindowNotFound { handle: String },

    #[error("Handle {handle} does not belong to the {backend} backend")]
    ForeignHandle {
        handle: String,
        backend: BackendKind,
    },

    #[error("{call} failed with code {code}: {message}")]
    OsCallFailed {
        call: &'static str,
        code: i64,
        message: String,
    },

    #[error("Failed to enumerate windows: {message}")]
    EnumerationFailed { message: String },

    #[error("Invalid window size {width}x{height}: width and height must not be negative")]
    InvalidSize { width: i32, height: i32 },

    #[error("Offset ({dx}, {dy}) takes the window outside the coordinate range")]
    InvalidOffset { dx: i32, dy: i32 },

    #[error(
        "Accessibility permission required: enable in System Settings > Privacy & Security > Accessibility"
    )]
    AccessibilityPermissionDenied,

    #[error("Script execution failed: {message}")]
    ScriptFailed { message: String },
}

impl WinctlError for WindowError {
    fn error_code(&self) -> &'static str {
        match self {
            WindowError::UnsupportedPlatform { .. } => "UNSUPPORTED_PLATFORM",
            WindowError::BackendUnavailable { .. } => "BACKEND_UNAVAILABLE",
            WindowError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            WindowError::WindowNotFound { .. } => "WINDOW_NOT_FOUND",
            WindowError::ForeignHandle { .. } => "FOREIGN_HANDLE",
            WindowError::OsCallFailed { .. } => "OS_CALL_FAILED",
            WindowError::EnumerationFailed { .. } => "ENUMERATION_FAILED",
            WindowError::InvalidSize { .. } => "INVALID_SIZE",
            WindowError::InvalidOffset { .. } => "INVALID_OFFSET",
            WindowError::AccessibilityPermissionDenied => "ACCESSIBILITY_PERMISSION_DENIED",
            WindowError::ScriptFailed { .. } => "SCRIPT_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            WindowError::UnsupportedPlatform { .. }
                | WindowError::BackendUnavailable { .. }
                | WindowError::ForeignHandle { .. }
                | WindowError::InvalidSize { .. }
                | WindowError::InvalidOffset { .. }
                | WindowError::AccessibilityPermissionDenied
        )
    }
}
