//! Window enumeration and lookup over one open window system.

use tracing::{debug, info, warn};

use crate::backend::{self, BackendKind, BackendPolicy, WindowSystem};
use crate::config::WinctlConfig;
use crate::errors::ConfigError;
use crate::geometry::{Point, Size};
use crate::matching::TitleMatch;
use crate::poll::{RetryPolicy, Sleeper, ThreadSleeper, await_convergence};
use crate::window::{Window, WindowError, WindowHandle, WindowRecord};

/// Owns the connection to the native window system for the life of the
/// program. Open it once at startup; every [`Window`] borrows it.
pub struct Desktop {
    system: Box<dyn WindowSystem>,
    retry: RetryPolicy,
    title_match: TitleMatch,
    sleeper: Box<dyn Sleeper>,
}

/// Failure to open a [`Desktop`] from configuration.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Window(#[from] WindowError),
}

impl crate::errors::WinctlError for OpenError {
    fn error_code(&self) -> &'static str {
        match self {
            OpenError::Config(e) => e.error_code(),
            OpenError::Window(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            OpenError::Config(e) => e.is_user_error(),
            OpenError::Window(e) => e.is_user_error(),
        }
    }
}

impl Desktop {
    /// Open the backend named by `config` (or the build target's).
    pub fn open(config: &WinctlConfig) -> Result<Self, OpenError> {
        config.validate()?;
        let requested = config.backend.requested()?;
        let system = backend::open(requested)?;
        Ok(Self::from_system(system, config)?)
    }

    /// Wrap an already opened window system.
    pub fn from_system(
        system: Box<dyn WindowSystem>,
        config: &WinctlConfig,
    ) -> Result<Self, ConfigError> {
        let title_match = config
            .lookup
            .title_match()?
            .unwrap_or(system.policy().default_title_match);

        debug!(
            event = "core.desktop.configured",
            backend = %system.kind(),
            title_match = %title_match,
            max_attempts = config.wait.max_attempts()
        );

        Ok(Self {
            system,
            retry: config.wait.retry_policy(),
            title_match,
            sleeper: Box::new(ThreadSleeper),
        })
    }

    /// Replace the sleeper used between convergence checks.
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn backend(&self) -> BackendKind {
        self.system.kind()
    }

    pub fn policy(&self) -> BackendPolicy {
        self.system.policy()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Title match used by [`Desktop::windows_with_title`].
    pub fn title_match(&self) -> TitleMatch {
        self.title_match
    }

    pub(crate) fn system(&self) -> &dyn WindowSystem {
        self.system.as_ref()
    }

    pub(crate) fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// Bind a known handle, reading its title and owner once.
    ///
    /// A title the OS refuses to report is recorded as unknown.
    pub fn window(&self, handle: WindowHandle) -> Result<Window<'_>, WindowError> {
        let title = match self.system.title(handle) {
            Ok(title) => title,
            Err(e @ WindowError::OsCallFailed { .. }) => {
                debug!(event = "core.window.title_unreadable", window = %handle, error = %e);
                None
            }
            Err(e) => return Err(e),
        };
        let pid = match handle.pid() {
            Some(pid) => Some(pid),
            None => self.system.pid(handle)?,
        };
        Ok(Window::new(self, WindowRecord::new(handle, title, pid)))
    }

    /// Window with input focus, if any.
    pub fn active_window(&self) -> Result<Option<Window<'_>>, WindowError> {
        match self.system.active_window()? {
            Some(handle) => match self.window(handle) {
                Ok(window) => Ok(Some(window)),
                Err(WindowError::WindowNotFound { .. }) => Ok(None),
                Err(e) => Err(e),
            },
            None => Ok(None),
        }
    }

    /// Title of the focused window; `None` when nothing is focused or the
    /// title cannot be read.
    pub fn active_window_title(&self) -> Result<Option<String>, WindowError> {
        match self.active_window()? {
            Some(window) => window.title(),
            None => Ok(None),
        }
    }

    /// All top-level visible windows in platform order.
    ///
    /// Windows that close while being enumerated are skipped.
    pub fn all_windows(&self) -> Result<Vec<Window<'_>>, WindowError> {
        info!(event = "core.window.list_started", backend = %self.backend());

        let handles = self.system.list_windows()?;
        let total = handles.len();
        let mut windows = Vec::with_capacity(total);

        for handle in handles {
            match self.window(handle) {
                Ok(window) => windows.push(window),
                Err(WindowError::WindowNotFound { .. }) => {
                    debug!(event = "core.window.vanished_during_list", window = %handle);
                }
                Err(e) => return Err(e),
            }
        }

        if windows.len() < total {
            warn!(
                event = "core.window.list_incomplete",
                skipped_count = total - windows.len(),
                returned_count = windows.len()
            );
        }

        info!(event = "core.window.list_completed", count = windows.len());
        Ok(windows)
    }

    /// Titles of all windows whose title could be read.
    pub fn all_titles(&self) -> Result<Vec<String>, WindowError> {
        Ok(self
            .all_windows()?
            .into_iter()
            .filter_map(|w| w.cached_title())
            .collect())
    }

    /// Windows strictly containing the point (edges excluded).
    pub fn windows_at(&self, x: i32, y: i32) -> Result<Vec<Window<'_>>, WindowError> {
        let point = Point::new(x, y);
        let mut hits = Vec::new();

        for window in self.all_windows()? {
            match window.rect() {
                Ok(rect) if rect.contains_point(point) => hits.push(window),
                Ok(_) => {}
                Err(WindowError::WindowNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        debug!(event = "core.window.hit_test_completed", x = x, y = y, count = hits.len());
        Ok(hits)
    }

    /// Windows whose title matches using the configured [`TitleMatch`].
    pub fn windows_with_title(&self, title: &str) -> Result<Vec<Window<'_>>, WindowError> {
        self.windows_with_title_matching(title, self.title_match)
    }

    /// Windows whose title matches using an explicit [`TitleMatch`].
    pub fn windows_with_title_matching(
        &self,
        title: &str,
        title_match: TitleMatch,
    ) -> Result<Vec<Window<'_>>, WindowError> {
        info!(
            event = "core.window.find_started",
            title = title,
            title_match = %title_match
        );

        let found: Vec<Window<'_>> = self
            .all_windows()?
            .into_iter()
            .filter(|w| {
                w.cached_title()
                    .is_some_and(|candidate| title_match.matches(title, &candidate))
            })
            .collect();

        info!(
            event = "core.window.find_completed",
            title = title,
            count = found.len()
        );
        Ok(found)
    }

    /// Windows owned by process `pid`.
    pub fn windows_of_process(&self, pid: i32) -> Result<Vec<Window<'_>>, WindowError> {
        Ok(self
            .all_windows()?
            .into_iter()
            .filter(|w| w.pid() == Some(pid))
            .collect())
    }

    /// Poll until a window matching `title` appears.
    ///
    /// Uses the desktop's retry policy; `Ok(None)` once it is exhausted.
    pub fn wait_for_window_with_title(
        &self,
        title: &str,
        title_match: TitleMatch,
    ) -> Result<Option<Window<'_>>, WindowError> {
        info!(event = "core.window.poll_started", title = title);

        let mut found = None;
        let appeared = await_convergence(&self.retry, self.sleeper(), || {
            let mut matches = self.windows_with_title_matching(title, title_match)?;
            if matches.is_empty() {
                Ok(false)
            } else {
                found = Some(matches.swap_remove(0));
                Ok(true)
            }
        })?;

        if !appeared {
            warn!(
                event = "core.window.poll_timeout",
                title = title,
                attempts = self.retry.max_attempts()
            );
        }
        Ok(found)
    }

    pub fn cursor_position(&self) -> Result<Point, WindowError> {
        self.system.cursor_position()
    }

    /// Desktop resolution.
    pub fn screen_size(&self) -> Result<Size, WindowError> {
        self.system.screen_size()
    }

    /// Release the window-system connection.
    pub fn shutdown(self) {
        info!(event = "core.desktop.shutdown", backend = %self.backend());
        self.system.shutdown();
    }
}

impl std::fmt::Debug for Desktop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desktop")
            .field("backend", &self.system.kind())
            .field("retry", &self.retry)
            .field("title_match", &self.title_match)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{FakeSystem, FakeWindow};
    use crate::errors::WinctlError;
    use crate::geometry::Rect;

    fn populated(kind: BackendKind) -> (FakeSystem, Vec<WindowHandle>) {
        let system = FakeSystem::new(kind);
        let handles = vec![
            system.add(FakeWindow::new("Terminal — bash", Rect::new(0, 0, 800, 600)).with_pid(1)),
            system.add(FakeWindow::new("Finder", Rect::new(400, 300, 800, 600)).with_pid(2)),
            system.add(
                FakeWindow::new("Untitled - Notepad", Rect::new(-50, -50, 100, 100)).with_pid(2),
            ),
        ];
        (system, handles)
    }

    fn titles(windows: &[Window<'_>]) -> Vec<String> {
        windows.iter().filter_map(|w| w.cached_title()).collect()
    }

    #[test]
    fn test_all_windows_keeps_platform_order() {
        let (system, handles) = populated(BackendKind::Win32);
        let desktop = system.desktop();

        let windows = desktop.all_windows().unwrap();
        let found: Vec<WindowHandle> = windows.iter().map(Window::handle).collect();
        assert_eq!(found, handles);
        assert_eq!(
            desktop.all_titles().unwrap(),
            vec!["Terminal — bash", "Finder", "Untitled - Notepad"]
        );
    }

    #[test]
    fn test_handles_are_stable_across_enumerations() {
        let (system, _) = populated(BackendKind::X11Ewmh);
        let desktop = system.desktop();

        let first = desktop.all_windows().unwrap();
        let second = desktop.all_windows().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_closed_windows_drop_out_of_enumeration() {
        let (system, handles) = populated(BackendKind::Win32);
        let desktop = system.desktop();
        system.remove(handles[1]);

        assert_eq!(
            titles(&desktop.all_windows().unwrap()),
            vec!["Terminal — bash", "Untitled - Notepad"]
        );
        assert!(matches!(
            desktop.window(handles[1]),
            Err(WindowError::WindowNotFound { .. })
        ));
    }

    #[test]
    fn test_unreadable_title_does_not_abort_enumeration() {
        let (system, _) = populated(BackendKind::MacOsAccessibility);
        let overlay = system.add(
            FakeWindow::new("", Rect::new(0, 0, 1000, 1000)).with_unreadable_title(),
        );
        let desktop = system.desktop();

        let windows = desktop.all_windows().unwrap();
        assert_eq!(windows.len(), 4);
        assert_eq!(windows[3].handle(), overlay);
        assert_eq!(windows[3].cached_title(), None);
        assert_eq!(
            desktop.all_titles().unwrap(),
            vec!["Terminal — bash", "Finder", "Untitled - Notepad"]
        );
        assert_eq!(titles(&desktop.windows_with_title("Finder").unwrap()), vec!["Finder"]);
        assert_eq!(desktop.windows_at(500, 400).unwrap().len(), 3);
    }

    #[test]
    fn test_windows_at_uses_strict_containment() {
        let (system, _) = populated(BackendKind::Win32);
        let desktop = system.desktop();

        assert_eq!(
            titles(&desktop.windows_at(500, 400).unwrap()),
            vec!["Terminal — bash", "Finder"]
        );
        // on Finder's left edge and inside Terminal
        assert_eq!(
            titles(&desktop.windows_at(400, 350).unwrap()),
            vec!["Terminal — bash"]
        );
        assert!(desktop.windows_at(0, 0).unwrap().iter().any(|w| {
            w.cached_title().as_deref() == Some("Untitled - Notepad")
        }));
        assert!(desktop.windows_at(5000, 5000).unwrap().is_empty());
    }

    #[test]
    fn test_title_lookup_uses_backend_default() {
        let (system, _) = populated(BackendKind::MacOsAccessibility);
        let desktop = system.desktop();
        assert_eq!(desktop.title_match(), TitleMatch::fuzzy());

        assert_eq!(
            titles(&desktop.windows_with_title("Terminal").unwrap()),
            vec!["Terminal — bash"]
        );
        assert!(desktop.windows_with_title("Safari").unwrap().is_empty());
    }

    #[test]
    fn test_title_lookup_explicit_policies() {
        let (system, _) = populated(BackendKind::Win32);
        let desktop = system.desktop();

        assert_eq!(
            titles(&desktop.windows_with_title("notepad").unwrap()),
            vec!["Untitled - Notepad"]
        );
        assert!(
            desktop
                .windows_with_title_matching("notepad", TitleMatch::Exact)
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            titles(
                &desktop
                    .windows_with_title_matching("Finder", TitleMatch::Exact)
                    .unwrap()
            ),
            vec!["Finder"]
        );
        assert!(
            desktop
                .windows_with_title_matching("Terminal", TitleMatch::fuzzy())
                .unwrap()
                .iter()
                .all(|w| w.cached_title().as_deref() != Some("Finder"))
        );
    }

    #[test]
    fn test_configured_title_match_overrides_backend_default() {
        let (system, _) = populated(BackendKind::X11Ewmh);
        let mut config = WinctlConfig::default();
        config.lookup.title_match = Some("substring".to_string());
        let (desktop, _) = system.desktop_with(&config);

        assert_eq!(desktop.title_match(), TitleMatch::Substring);
        assert_eq!(desktop.windows_with_title("FIND").unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_title_match_config_is_rejected() {
        let (system, _) = populated(BackendKind::X11Ewmh);
        let mut config = WinctlConfig::default();
        config.lookup.title_match = Some("regex".to_string());

        let err = Desktop::from_system(Box::new(system), &config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TITLE_MATCH");
    }

    #[test]
    fn test_active_window_and_title() {
        let (system, handles) = populated(BackendKind::Win32);
        let desktop = system.desktop();

        assert!(desktop.active_window().unwrap().is_none());
        assert_eq!(desktop.active_window_title().unwrap(), None);

        system.set_active(handles[1]);
        let active = desktop.active_window().unwrap().unwrap();
        assert_eq!(active.handle(), handles[1]);
        assert_eq!(desktop.active_window_title().unwrap().as_deref(), Some("Finder"));
    }

    #[test]
    fn test_windows_of_process() {
        let (system, _) = populated(BackendKind::Win32);
        let desktop = system.desktop();

        assert_eq!(
            titles(&desktop.windows_of_process(2).unwrap()),
            vec!["Finder", "Untitled - Notepad"]
        );
        assert!(desktop.windows_of_process(99).unwrap().is_empty());
    }

    #[test]
    fn test_wait_for_window_with_title() {
        let (system, _) = populated(BackendKind::X11Ewmh);
        let desktop = system.desktop();

        let found = desktop
            .wait_for_window_with_title("Finder", TitleMatch::Exact)
            .unwrap();
        assert_eq!(found.unwrap().cached_title().as_deref(), Some("Finder"));
    }

    #[test]
    fn test_wait_for_missing_window_gives_up() {
        let (system, _) = populated(BackendKind::X11Ewmh);
        let mut config = WinctlConfig::default();
        config.wait.max_attempts = Some(3);
        let (desktop, sleeper) = system.desktop_with(&config);

        let found = desktop
            .wait_for_window_with_title("Safari", TitleMatch::Exact)
            .unwrap();
        assert!(found.is_none());
        assert_eq!(sleeper.delays().len(), 3);
    }

    #[test]
    fn test_cursor_and_screen_size() {
        let (system, _) = populated(BackendKind::Win32);
        let desktop = system.desktop();
        assert_eq!(desktop.cursor_position().unwrap(), Point::new(640, 360));
        assert_eq!(desktop.screen_size().unwrap(), Size::new(1920, 1080));
    }

    #[test]
    fn test_foreign_handle_is_rejected() {
        let (system, _) = populated(BackendKind::X11Ewmh);
        let desktop = system.desktop();

        let err = desktop
            .window(WindowHandle::Win32 { hwnd: 0x10 })
            .unwrap_err();
        assert_eq!(err.error_code(), "FOREIGN_HANDLE");
    }

    #[test]
    fn test_open_from_config_with_unknown_backend() {
        let mut config = WinctlConfig::default();
        config.backend.kind = Some("beos".to_string());

        let err = Desktop::open(&config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BACKEND");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_shutdown_consumes_desktop() {
        let (system, _) = populated(BackendKind::Win32);
        let desktop = system.desktop();
        assert_eq!(desktop.backend(), BackendKind::Win32);
        desktop.shutdown();
    }
}
