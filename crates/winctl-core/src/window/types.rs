use serde::{Deserialize, Serialize};

/// Identity of an OS window.
///
/// Equality and hashing use only the platform identifier, so two handles
/// obtained from separate enumerations compare equal when they name the same
/// window. A handle outlives its window; operations on a stale handle report
/// `WindowError::WindowNotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum WindowHandle {
    /// `HWND` value.
    Win32 { hwnd: isize },
    /// X11 window id.
    X11 { window: u32 },
    /// Owning process and Core Graphics window number.
    MacOs { pid: i32, window_id: u32 },
}

impl WindowHandle {
    /// Process that owns the window, when the handle itself carries it.
    pub fn pid(&self) -> Option<i32> {
        match self {
            WindowHandle::MacOs { pid, .. } => Some(*pid),
            _ => None,
        }
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowHandle::Win32 { hwnd } => write!(f, "win32:{hwnd:#x}"),
            WindowHandle::X11 { window } => write!(f, "x11:{window:#x}"),
            WindowHandle::MacOs { pid, window_id } => write!(f, "macos:{pid}/{window_id}"),
        }
    }
}

/// Display metadata cached alongside a handle when a window is looked up.
///
/// The cache is not kept in sync with the OS; it goes stale silently when the
/// window is retitled or closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    handle: WindowHandle,
    title: Option<String>,
    pid: Option<i32>,
}

impl WindowRecord {
    pub fn new(handle: WindowHandle, title: Option<String>, pid: Option<i32>) -> Self {
        Self { handle, title, pid }
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// Last title read from the OS, if any read succeeded.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn pid(&self) -> Option<i32> {
        self.pid
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }
}

/// Point-in-time snapshot of the four state queries.
///
/// Built on demand from live OS queries and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowState {
    pub minimized: bool,
    pub maximized: bool,
    pub active: bool,
    pub visible: bool,
}
