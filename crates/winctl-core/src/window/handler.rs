use std::cell::RefCell;

use tracing::{debug, info, warn};

use super::errors::WindowError;
use super::types::{WindowHandle, WindowRecord, WindowState};
use crate::backend::WindowSystem;
use crate::desktop::Desktop;
use crate::geometry::{GeometryProxy, Point, Rect, RectAccess, Size};
use crate::poll::await_convergence;

/// A top-level OS window bound to the [`Desktop`] that found it.
///
/// Every query goes to the OS; only the title and owning process are cached.
/// Commands issue the request and report whether the window reached the
/// requested state, polling first when `wait` is set.
pub struct Window<'d> {
    desktop: &'d Desktop,
    record: RefCell<WindowRecord>,
}

impl<'d> Window<'d> {
    pub(crate) fn new(desktop: &'d Desktop, record: WindowRecord) -> Self {
        Self {
            desktop,
            record: RefCell::new(record),
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.record.borrow().handle()
    }

    /// Snapshot of the cached metadata.
    pub fn record(&self) -> WindowRecord {
        self.record.borrow().clone()
    }

    pub fn pid(&self) -> Option<i32> {
        self.record.borrow().pid()
    }

    /// Title as last seen, without asking the OS.
    pub fn cached_title(&self) -> Option<String> {
        self.record.borrow().title().map(str::to_string)
    }

    /// Current title.
    ///
    /// Falls back to the cached title when the OS gives no usable answer.
    /// `Ok(None)` only when neither is known.
    pub fn title(&self) -> Result<Option<String>, WindowError> {
        match self.system().title(self.handle())? {
            Some(title) => {
                self.record.borrow_mut().set_title(title.clone());
                Ok(Some(title))
            }
            None => {
                debug!(
                    event = "core.window.title_fallback_to_cache",
                    window = %self.handle()
                );
                Ok(self.cached_title())
            }
        }
    }

    pub fn exists(&self) -> Result<bool, WindowError> {
        self.system().exists(self.handle())
    }

    pub fn rect(&self) -> Result<Rect, WindowError> {
        self.system().rect(self.handle())
    }

    /// Live geometry view; writes go through [`Window::move_resize_to`].
    pub fn geometry(&self) -> GeometryProxy<&Self> {
        GeometryProxy::new(self)
    }

    pub fn is_minimized(&self) -> Result<bool, WindowError> {
        self.system().is_minimized(self.handle())
    }

    pub fn is_maximized(&self) -> Result<bool, WindowError> {
        self.system().is_maximized(self.handle())
    }

    pub fn is_active(&self) -> Result<bool, WindowError> {
        self.system().is_active(self.handle())
    }

    pub fn is_visible(&self) -> Result<bool, WindowError> {
        self.system().is_visible(self.handle())
    }

    /// Query all four state flags now.
    pub fn state(&self) -> Result<WindowState, WindowError> {
        Ok(WindowState {
            minimized: self.is_minimized()?,
            maximized: self.is_maximized()?,
            active: self.is_active()?,
            visible: self.is_visible()?,
        })
    }

    pub fn minimize(&self, wait: bool) -> Result<bool, WindowError> {
        if self.is_minimized()? {
            debug!(event = "core.window.minimize_skipped", window = %self.handle());
            return Ok(true);
        }
        self.command("minimize", wait, |s, h| s.minimize(h), |w| w.is_minimized())
    }

    /// Maximize. Already-maximized windows are left alone.
    pub fn maximize(&self, wait: bool) -> Result<bool, WindowError> {
        if self.is_maximized()? {
            debug!(event = "core.window.maximize_skipped", window = %self.handle());
            return Ok(true);
        }
        self.command("maximize", wait, |s, h| s.maximize(h), |w| w.is_maximized())
    }

    pub fn restore(&self, wait: bool) -> Result<bool, WindowError> {
        if self.desktop.policy().activate_before_restore {
            self.activate(true)?;
        }
        self.command(
            "restore",
            wait,
            |s, h| s.restore(h),
            |w| Ok(!w.is_minimized()? && !w.is_maximized()?),
        )
    }

    pub fn hide(&self, wait: bool) -> Result<bool, WindowError> {
        self.command("hide", wait, |s, h| s.hide(h), |w| Ok(!w.is_visible()?))
    }

    pub fn show(&self, wait: bool) -> Result<bool, WindowError> {
        self.command("show", wait, |s, h| s.show(h), |w| w.is_visible())
    }

    pub fn activate(&self, wait: bool) -> Result<bool, WindowError> {
        self.command("activate", wait, |s, h| s.activate(h), |w| w.is_active())
    }

    /// Ask the window to close. Converged once the window no longer exists.
    pub fn close(&self, wait: bool) -> Result<bool, WindowError> {
        self.command("close", wait, |s, h| s.close(h), |w| Ok(!w.exists()?))
    }

    /// Move the top-left corner to `(x, y)`, keeping the size.
    pub fn move_to(&self, x: i32, y: i32, wait: bool) -> Result<bool, WindowError> {
        let target = Point::new(x, y);
        if self.refuses_position(target) {
            return Ok(false);
        }
        self.command(
            "move",
            wait,
            |s, h| s.move_window(h, target),
            |w| Ok(w.rect()?.topleft() == target),
        )
    }

    pub fn move_rel(&self, dx: i32, dy: i32, wait: bool) -> Result<bool, WindowError> {
        let current = self.rect()?;
        let (x, y) = offset(current.left, current.top, dx, dy)?;
        self.move_to(x, y, wait)
    }

    /// Resize to `width` x `height`, keeping the top-left corner.
    pub fn resize_to(&self, width: i32, height: i32, wait: bool) -> Result<bool, WindowError> {
        let target = Size::new(width, height);
        check_size(target)?;
        self.command(
            "resize",
            wait,
            |s, h| s.resize_window(h, target),
            |w| Ok(w.rect()?.size() == target),
        )
    }

    pub fn resize_rel(&self, dw: i32, dh: i32, wait: bool) -> Result<bool, WindowError> {
        let current = self.rect()?;
        let (width, height) = offset(current.width, current.height, dw, dh)?;
        self.resize_to(width, height, wait)
    }

    /// Move and resize in one request. Not transactional.
    pub fn move_resize_to(&self, rect: Rect, wait: bool) -> Result<bool, WindowError> {
        check_size(rect.size())?;
        if self.refuses_position(rect.topleft()) {
            return Ok(false);
        }
        self.command(
            "move_resize",
            wait,
            |s, h| s.set_rect(h, rect),
            |w| Ok(w.rect()? == rect),
        )
    }

    fn system(&self) -> &'d dyn WindowSystem {
        self.desktop.system()
    }

    fn refuses_position(&self, target: Point) -> bool {
        let refused =
            self.desktop.policy().rejects_negative_position && (target.x < 0 || target.y < 0);
        if refused {
            warn!(
                event = "core.window.negative_position_rejected",
                window = %self.handle(),
                backend = %self.desktop.backend(),
                x = target.x,
                y = target.y
            );
        }
        refused
    }

    /// Issue `request`, then check `converged` once, or poll it when `wait`.
    fn command<R, C>(
        &self,
        name: &'static str,
        wait: bool,
        request: R,
        mut converged: C,
    ) -> Result<bool, WindowError>
    where
        R: FnOnce(&dyn WindowSystem, WindowHandle) -> Result<(), WindowError>,
        C: FnMut(&Self) -> Result<bool, WindowError>,
    {
        let handle = self.handle();
        info!(
            event = "core.window.command_started",
            command = name,
            window = %handle,
            wait = wait
        );

        if let Err(e) = request(self.system(), handle) {
            warn!(
                event = "core.window.command_failed",
                command = name,
                window = %handle,
                error = %e
            );
            return Err(e);
        }

        let reached = if wait {
            await_convergence(
                self.desktop.retry_policy(),
                self.desktop.sleeper(),
                || converged(self),
            )?
        } else {
            converged(self)?
        };

        if wait && !reached {
            warn!(
                event = "core.window.command_not_converged",
                command = name,
                window = %handle,
                attempts = self.desktop.retry_policy().max_attempts()
            );
        }
        info!(
            event = "core.window.command_completed",
            command = name,
            window = %handle,
            converged = reached
        );
        Ok(reached)
    }
}

fn offset(a: i32, b: i32, da: i32, db: i32) -> Result<(i32, i32), WindowError> {
    match (a.checked_add(da), b.checked_add(db)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(WindowError::InvalidOffset { dx: da, dy: db }),
    }
}

fn check_size(size: Size) -> Result<(), WindowError> {
    if size.width < 0 || size.height < 0 {
        return Err(WindowError::InvalidSize {
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

impl RectAccess for Window<'_> {
    fn read_rect(&self) -> Result<Rect, WindowError> {
        self.rect()
    }

    /// Sends only the part of the rectangle that changed.
    fn write_rect(&self, rect: Rect, wait: bool) -> Result<bool, WindowError> {
        let current = self.rect()?;
        if current.size() == rect.size() {
            self.move_to(rect.left, rect.top, wait)
        } else if current.topleft() == rect.topleft() {
            self.resize_to(rect.width, rect.height, wait)
        } else {
            self.move_resize_to(rect, wait)
        }
    }
}

impl PartialEq for Window<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.handle() == other.handle()
    }
}

impl Eq for Window<'_> {}

impl std::fmt::Debug for Window<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let record = self.record.borrow();
        f.debug_struct("Window")
            .field("handle", &record.handle())
            .field("title", &record.title())
            .field("pid", &record.pid())
            .finish()
    }
}

impl std::fmt::Display for Window<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let record = self.record.borrow();
        match record.title() {
            Some(title) => write!(f, "{} {:?}", record.handle(), title),
            None => write!(f, "{}", record.handle()),
        }
    }
}
