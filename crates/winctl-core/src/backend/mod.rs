//! Platform window-system adapters.
//!
//! Every platform implements [`WindowSystem`]; [`open`] picks the one compiled
//! for the current target once, at startup.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::ConfigError;
use crate::geometry::{Point, Rect, Size};
use crate::matching::TitleMatch;
use crate::window::errors::WindowError;
use crate::window::types::WindowHandle;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "windows")]
pub mod win32;
#[cfg(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
pub mod x11;

/// Named window-system implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Handle-based Win32 user32 API.
    #[serde(rename = "win32")]
    Win32,
    /// X11 with EWMH client messages.
    #[serde(rename = "x11")]
    X11Ewmh,
    /// macOS window list plus the Accessibility API.
    #[serde(rename = "macos")]
    MacOsAccessibility,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Win32 => "win32",
            BackendKind::X11Ewmh => "x11",
            BackendKind::MacOsAccessibility => "macos",
        }
    }

    /// Backend compiled for the current target, if any.
    pub fn native() -> Option<BackendKind> {
        if cfg!(target_os = "windows") {
            Some(BackendKind::Win32)
        } else if cfg!(target_os = "macos") {
            Some(BackendKind::MacOsAccessibility)
        } else if cfg!(any(
            target_os = "linux",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "dragonfly"
        )) {
            Some(BackendKind::X11Ewmh)
        } else {
            None
        }
    }

    /// Behavioral differences the window layer has to respect.
    pub fn policy(&self) -> BackendPolicy {
        match self {
            BackendKind::Win32 => BackendPolicy {
                rejects_negative_position: false,
                default_title_match: TitleMatch::Substring,
                activate_before_restore: false,
            },
            BackendKind::X11Ewmh => BackendPolicy {
                rejects_negative_position: true,
                default_title_match: TitleMatch::Exact,
                activate_before_restore: true,
            },
            BackendKind::MacOsAccessibility => BackendPolicy {
                rejects_negative_position: false,
                default_title_match: TitleMatch::fuzzy(),
                activate_before_restore: true,
            },
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win32" | "windows" => Ok(BackendKind::Win32),
            "x11" | "ewmh" => Ok(BackendKind::X11Ewmh),
            "macos" | "mac" => Ok(BackendKind::MacOsAccessibility),
            _ => Err(ConfigError::InvalidBackend {
                backend: s.to_string(),
            }),
        }
    }
}

/// Per-backend rules the window layer applies on top of raw OS calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackendPolicy {
    /// Negative move targets are refused without contacting the OS.
    pub rejects_negative_position: bool,
    /// Title lookup used when configuration leaves it to the platform.
    pub default_title_match: TitleMatch,
    /// The window must be activated before it can be restored.
    pub activate_before_restore: bool,
}

/// Capability interface over one native window system.
///
/// Commands only issue the request. Waiting for the window manager to apply
/// it, and deciding whether it converged, is done by the caller through the
/// query methods. Every method taking a handle fails with
/// `WindowError::WindowNotFound` once the window is gone and with
/// `WindowError::ForeignHandle` for a handle of another platform.
pub trait WindowSystem: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn policy(&self) -> BackendPolicy {
        self.kind().policy()
    }

    /// Top-level visible windows in platform order.
    fn list_windows(&self) -> Result<Vec<WindowHandle>, WindowError>;

    /// Window with input focus, `None` when nothing is focused.
    fn active_window(&self) -> Result<Option<WindowHandle>, WindowError>;

    /// Whether the handle still names a live window.
    fn exists(&self, handle: WindowHandle) -> Result<bool, WindowError>;

    /// Window title.
    ///
    /// `Ok(None)` means the OS gave no usable answer; `Ok(Some(""))` means the
    /// window really has an empty title.
    fn title(&self, handle: WindowHandle) -> Result<Option<String>, WindowError>;

    /// Owning process id, when the platform exposes it.
    fn pid(&self, handle: WindowHandle) -> Result<Option<i32>, WindowError>;

    fn rect(&self, handle: WindowHandle) -> Result<Rect, WindowError>;

    fn move_window(&self, handle: WindowHandle, to: Point) -> Result<(), WindowError>;

    fn resize_window(&self, handle: WindowHandle, to: Size) -> Result<(), WindowError>;

    /// Move and resize. Not transactional: a failure may leave the move applied.
    fn set_rect(&self, handle: WindowHandle, rect: Rect) -> Result<(), WindowError> {
        self.move_window(handle, rect.topleft())?;
        self.resize_window(handle, rect.size())
    }

    fn is_minimized(&self, handle: WindowHandle) -> Result<bool, WindowError>;

    fn is_maximized(&self, handle: WindowHandle) -> Result<bool, WindowError>;

    fn is_visible(&self, handle: WindowHandle) -> Result<bool, WindowError>;

    fn is_active(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        Ok(self.active_window()? == Some(handle))
    }

    fn minimize(&self, handle: WindowHandle) -> Result<(), WindowError>;

    fn maximize(&self, handle: WindowHandle) -> Result<(), WindowError>;

    /// Leave both the minimized and maximized states.
    fn restore(&self, handle: WindowHandle) -> Result<(), WindowError>;

    fn hide(&self, handle: WindowHandle) -> Result<(), WindowError>;

    fn show(&self, handle: WindowHandle) -> Result<(), WindowError>;

    fn activate(&self, handle: WindowHandle) -> Result<(), WindowError>;

    fn close(&self, handle: WindowHandle) -> Result<(), WindowError>;

    fn cursor_position(&self) -> Result<Point, WindowError>;

    /// Size of the whole desktop, or of the primary screen where the platform
    /// has no desktop-wide notion.
    fn screen_size(&self) -> Result<Size, WindowError>;

    /// Release the connection. Called once by `Desktop::shutdown`.
    fn shutdown(&self) {}
}

/// Open the window system for this platform.
///
/// `requested` of `None` means "whatever this build targets". Asking for a
/// backend that is not compiled in is an error naming the platform.
pub fn open(requested: Option<BackendKind>) -> Result<Box<dyn WindowSystem>, WindowError> {
    let platform = std::env::consts::OS.to_string();

    let Some(native) = BackendKind::native() else {
        error!(event = "core.backend.platform_not_supported", platform = %platform);
        return Err(WindowError::UnsupportedPlatform { platform });
    };

    let kind = requested.unwrap_or(native);
    if kind != native {
        error!(
            event = "core.backend.unavailable",
            backend = %kind,
            platform = %platform
        );
        return Err(WindowError::BackendUnavailable {
            backend: kind,
            platform,
        });
    }

    info!(event = "core.backend.open_started", backend = %kind);
    let system = open_native()?;
    info!(event = "core.backend.open_completed", backend = %system.kind());
    Ok(system)
}

#[cfg(target_os = "windows")]
fn open_native() -> Result<Box<dyn WindowSystem>, WindowError> {
    Ok(Box::new(win32::Win32::new()))
}

#[cfg(target_os = "macos")]
fn open_native() -> Result<Box<dyn WindowSystem>, WindowError> {
    Ok(Box::new(macos::MacOsAccessibility::new()))
}

#[cfg(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
fn open_native() -> Result<Box<dyn WindowSystem>, WindowError> {
    Ok(Box::new(x11::X11Ewmh::connect(None)?))
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
)))]
fn open_native() -> Result<Box<dyn WindowSystem>, WindowError> {
    Err(WindowError::UnsupportedPlatform {
        platform: std::env::consts::OS.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WinctlError;

    #[test]
    fn test_backend_kind_round_trip_names() {
        for kind in [
            BackendKind::Win32,
            BackendKind::X11Ewmh,
            BackendKind::MacOsAccessibility,
        ] {
            assert_eq!(kind.as_str().parse::<BackendKind>().unwrap(), kind);
        }
        assert_eq!("EWMH".parse::<BackendKind>().unwrap(), BackendKind::X11Ewmh);
    }

    #[test]
    fn test_backend_kind_rejects_unknown_name() {
        let err = "wayland".parse::<BackendKind>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BACKEND");
    }

    #[test]
    fn test_policies_keep_platform_asymmetry() {
        assert!(BackendKind::X11Ewmh.policy().rejects_negative_position);
        assert!(!BackendKind::Win32.policy().rejects_negative_position);
        assert!(!BackendKind::MacOsAccessibility.policy().rejects_negative_position);

        assert_eq!(
            BackendKind::Win32.policy().default_title_match,
            TitleMatch::Substring
        );
        assert_eq!(
            BackendKind::X11Ewmh.policy().default_title_match,
            TitleMatch::Exact
        );
        assert_eq!(
            BackendKind::MacOsAccessibility.policy().default_title_match,
            TitleMatch::fuzzy()
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_native_backend_on_linux_is_x11() {
        assert_eq!(BackendKind::native(), Some(BackendKind::X11Ewmh));
    }

    #[test]
    fn test_open_rejects_backend_of_another_platform() {
        let Some(native) = BackendKind::native() else {
            return;
        };
        let other = if native == BackendKind::Win32 {
            BackendKind::X11Ewmh
        } else {
            BackendKind::Win32
        };

        let err = match open(Some(other)) {
            Ok(_) => panic!("expected {other} to be unavailable"),
            Err(e) => e,
        };
        assert_eq!(err.error_code(), "BACKEND_UNAVAILABLE");
        assert!(err.to_string().contains(std::env::consts::OS));
    }
}
