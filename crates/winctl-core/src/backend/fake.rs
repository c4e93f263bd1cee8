//! In-memory window system for tests.
//!
//! Requested changes can be delayed by a number of OS queries (`lag`) to
//! exercise polling, and every command is logged so tests can assert which
//! requests reached the "OS".

use std::sync::{Arc, Mutex};

use super::{BackendKind, WindowSystem};
use crate::config::WinctlConfig;
use crate::desktop::Desktop;
use crate::geometry::{Point, Rect, Size};
use crate::poll::testing::RecordingSleeper;
use crate::window::errors::WindowError;
use crate::window::types::WindowHandle;

#[derive(Debug, Clone)]
pub(crate) struct FakeWindow {
    pub title: Option<String>,
    pub pid: Option<i32>,
    pub rect: Rect,
    pub minimized: bool,
    pub maximized: bool,
    pub visible: bool,
    pub title_fails: bool,
}

impl FakeWindow {
    pub fn new(title: &str, rect: Rect) -> Self {
        Self {
            title: Some(title.to_string()),
            pid: Some(100),
            rect,
            minimized: false,
            maximized: false,
            visible: true,
            title_fails: false,
        }
    }

    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn untitled(mut self) -> Self {
        self.title = None;
        self
    }

    /// Title reads fail with an OS error, like a window the OS keeps private.
    pub fn with_unreadable_title(mut self) -> Self {
        self.title_fails = true;
        self
    }
}

#[derive(Debug, Clone)]
enum Change {
    Rect(Rect),
    Minimized(bool),
    Maximized(bool),
    Visible(bool),
    Active(u32),
    Closed,
}

#[derive(Debug)]
struct Slot {
    id: u32,
    window: FakeWindow,
    closed: bool,
}

#[derive(Debug, Default)]
struct State {
    slots: Vec<Slot>,
    pending: Vec<(u32, u32, Change)>,
    active: Option<u32>,
    lag: u32,
    calls: Vec<String>,
}

impl State {
    /// One OS round trip: age pending changes and apply the due ones.
    fn tick(&mut self) {
        let mut due = Vec::new();
        self.pending.retain_mut(|(remaining, id, change)| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                due.push((*id, change.clone()));
                false
            } else {
                true
            }
        });
        for (id, change) in due {
            self.apply(id, change);
        }
    }

    fn apply(&mut self, id: u32, change: Change) {
        if let Change::Active(id) = change {
            self.active = Some(id);
            if let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) {
                slot.window.minimized = false;
            }
            return;
        }
        let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) else {
            return;
        };
        match change {
            Change::Rect(rect) => slot.window.rect = rect,
            Change::Minimized(value) => slot.window.minimized = value,
            Change::Maximized(value) => slot.window.maximized = value,
            Change::Visible(value) => slot.window.visible = value,
            Change::Closed => {
                slot.closed = true;
                if self.active == Some(id) {
                    self.active = None;
                }
            }
            Change::Active(_) => {}
        }
    }

    fn queue(&mut self, id: u32, change: Change) {
        if self.lag == 0 {
            self.apply(id, change);
        } else {
            self.pending.push((self.lag, id, change));
        }
    }

    fn live(&mut self, id: u32, handle: WindowHandle) -> Result<&mut FakeWindow, WindowError> {
        self.slots
            .iter_mut()
            .find(|s| s.id == id && !s.closed)
            .map(|s| &mut s.window)
            .ok_or_else(|| WindowError::WindowNotFound {
                handle: handle.to_string(),
            })
    }
}

/// Window system living entirely in memory. Clones share the same state.
#[derive(Clone)]
pub(crate) struct FakeSystem {
    kind: BackendKind,
    state: Arc<Mutex<State>>,
}

impl FakeSystem {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Apply requested changes only after `lag` further OS queries.
    pub fn with_lag(self, lag: u32) -> Self {
        self.state.lock().unwrap().lag = lag;
        self
    }

    pub fn add(&self, window: FakeWindow) -> WindowHandle {
        let mut state = self.state.lock().unwrap();
        let id = state.slots.len() as u32 + 1;
        state.slots.push(Slot {
            id,
            window,
            closed: false,
        });
        self.handle_for(id)
    }

    pub fn set_active(&self, handle: WindowHandle) {
        let id = self.id_of(handle).unwrap();
        self.state.lock().unwrap().active = Some(id);
    }

    /// Change or clear a window's title behind the library's back.
    pub fn set_title(&self, handle: WindowHandle, title: Option<&str>) {
        let id = self.id_of(handle).unwrap();
        let mut state = self.state.lock().unwrap();
        let slot = state.slots.iter_mut().find(|s| s.id == id).unwrap();
        slot.window.title = title.map(str::to_string);
    }

    /// Close a window behind the library's back.
    pub fn remove(&self, handle: WindowHandle) {
        let id = self.id_of(handle).unwrap();
        self.state.lock().unwrap().apply(id, Change::Closed);
    }

    pub fn snapshot(&self, handle: WindowHandle) -> FakeWindow {
        let id = self.id_of(handle).unwrap();
        let state = self.state.lock().unwrap();
        state
            .slots
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.window.clone())
            .unwrap()
    }

    /// Commands received so far, as `"<command> <id>"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, command: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(' ').next() == Some(command))
            .count()
    }

    /// Desktop over a clone of this system with default config and a fake clock.
    pub fn desktop(&self) -> Desktop {
        self.desktop_with(&WinctlConfig::default()).0
    }

    pub fn desktop_with(&self, config: &WinctlConfig) -> (Desktop, RecordingSleeper) {
        let sleeper = RecordingSleeper::default();
        let desktop = Desktop::from_system(Box::new(self.clone()), config)
            .unwrap()
            .with_sleeper(Box::new(sleeper.clone()));
        (desktop, sleeper)
    }

    fn handle_for(&self, id: u32) -> WindowHandle {
        match self.kind {
            BackendKind::Win32 => WindowHandle::Win32 {
                hwnd: id as isize * 0x10,
            },
            BackendKind::X11Ewmh => WindowHandle::X11 {
                window: 0x400000 + id,
            },
            BackendKind::MacOsAccessibility => WindowHandle::MacOs {
                pid: 100,
                window_id: id,
            },
        }
    }

    fn id_of(&self, handle: WindowHandle) -> Result<u32, WindowError> {
        match (self.kind, handle) {
            (BackendKind::Win32, WindowHandle::Win32 { hwnd }) => Ok((hwnd / 0x10) as u32),
            (BackendKind::X11Ewmh, WindowHandle::X11 { window }) => Ok(window - 0x400000),
            (BackendKind::MacOsAccessibility, WindowHandle::MacOs { window_id, .. }) => {
                Ok(window_id)
            }
            _ => Err(WindowError::ForeignHandle {
                handle: handle.to_string(),
                backend: self.kind,
            }),
        }
    }

    fn query<T>(
        &self,
        handle: WindowHandle,
        f: impl FnOnce(&mut FakeWindow) -> T,
    ) -> Result<T, WindowError> {
        let id = self.id_of(handle)?;
        let mut state = self.state.lock().unwrap();
        state.tick();
        state.live(id, handle).map(f)
    }

    fn command(
        &self,
        name: &str,
        handle: WindowHandle,
        change: Change,
    ) -> Result<(), WindowError> {
        let id = self.id_of(handle)?;
        let mut state = self.state.lock().unwrap();
        state.live(id, handle)?;
        state.calls.push(format!("{name} {id}"));
        state.queue(id, change);
        Ok(())
    }
}

impl WindowSystem for FakeSystem {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn list_windows(&self) -> Result<Vec<WindowHandle>, WindowError> {
        let mut state = self.state.lock().unwrap();
        state.tick();
        let ids: Vec<u32> = state
            .slots
            .iter()
            .filter(|s| !s.closed && s.window.visible)
            .map(|s| s.id)
            .collect();
        drop(state);
        Ok(ids.into_iter().map(|id| self.handle_for(id)).collect())
    }

    fn active_window(&self) -> Result<Option<WindowHandle>, WindowError> {
        let mut state = self.state.lock().unwrap();
        state.tick();
        let active = state.active;
        drop(state);
        Ok(active.map(|id| self.handle_for(id)))
    }

    fn exists(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        let id = self.id_of(handle)?;
        let mut state = self.state.lock().unwrap();
        state.tick();
        Ok(state.slots.iter().any(|s| s.id == id && !s.closed))
    }

    fn title(&self, handle: WindowHandle) -> Result<Option<String>, WindowError> {
        let (title, fails) = self.query(handle, |w| (w.title.clone(), w.title_fails))?;
        if fails {
            return Err(WindowError::OsCallFailed {
                call: "title",
                code: -25204,
                message: format!("{handle} has no readable title"),
            });
        }
        Ok(title)
    }

    fn pid(&self, handle: WindowHandle) -> Result<Option<i32>, WindowError> {
        self.query(handle, |w| w.pid)
    }

    fn rect(&self, handle: WindowHandle) -> Result<Rect, WindowError> {
        self.query(handle, |w| w.rect)
    }

    fn move_window(&self, handle: WindowHandle, to: Point) -> Result<(), WindowError> {
        let mut rect = self.query(handle, |w| w.rect)?;
        rect.set_topleft(to);
        self.command("move", handle, Change::Rect(rect))
    }

    fn resize_window(&self, handle: WindowHandle, to: Size) -> Result<(), WindowError> {
        let mut rect = self.query(handle, |w| w.rect)?;
        rect.set_size(to);
        self.command("resize", handle, Change::Rect(rect))
    }

    fn set_rect(&self, handle: WindowHandle, rect: Rect) -> Result<(), WindowError> {
        self.command("set_rect", handle, Change::Rect(rect))
    }

    fn is_minimized(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        self.query(handle, |w| w.minimized)
    }

    fn is_maximized(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        self.query(handle, |w| w.maximized)
    }

    fn is_visible(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        self.query(handle, |w| w.visible)
    }

    fn minimize(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.command("minimize", handle, Change::Minimized(true))
    }

    fn maximize(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.command("maximize", handle, Change::Maximized(true))
    }

    fn restore(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.command("restore", handle, Change::Maximized(false))?;
        let id = self.id_of(handle)?;
        self.state
            .lock()
            .unwrap()
            .queue(id, Change::Minimized(false));
        Ok(())
    }

    fn hide(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.command("hide", handle, Change::Visible(false))
    }

    fn show(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.command("show", handle, Change::Visible(true))
    }

    fn activate(&self, handle: WindowHandle) -> Result<(), WindowError> {
        let id = self.id_of(handle)?;
        self.command("activate", handle, Change::Active(id))
    }

    fn close(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.command("close", handle, Change::Closed)
    }

    fn cursor_position(&self) -> Result<Point, WindowError> {
        Ok(Point::new(640, 360))
    }

    fn screen_size(&self) -> Result<Size, WindowError> {
        Ok(Size::new(1920, 1080))
    }
}
