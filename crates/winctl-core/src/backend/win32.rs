//! Win32 window system over `user32`.
//!
//! Every call is synchronous from our side but the target window's thread
//! applies most of them later, so callers poll the query methods to confirm.

use std::ffi::c_void;

use tracing::{debug, warn};
use windows::Win32::Foundation::{
    BOOL, GetLastError, HWND, LPARAM, POINT, RECT, SetLastError, TRUE, WIN32_ERROR, WPARAM,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetCursorPos, GetForegroundWindow, GetSystemMetrics, GetWindowRect,
    GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId, IsIconic, IsWindow,
    IsWindowVisible, IsZoomed, PostMessageW, SM_CXSCREEN, SM_CYSCREEN, SET_WINDOW_POS_FLAGS,
    SHOW_WINDOW_CMD, SW_HIDE, SW_MAXIMIZE, SW_MINIMIZE, SW_RESTORE, SW_SHOW, SWP_NOACTIVATE,
    SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SetForegroundWindow, SetWindowPos, ShowWindow,
    WM_CLOSE,
};

use super::{BackendKind, WindowSystem};
use crate::geometry::{Point, Rect, Size};
use crate::window::errors::WindowError;
use crate::window::types::WindowHandle;

/// `ERROR_INVALID_WINDOW_HANDLE`
const INVALID_WINDOW_HANDLE: i64 = 1400;

/// Recover the Win32 error code from an `HRESULT_FROM_WIN32` value.
fn win32_code(hresult: i32) -> i64 {
    let bits = hresult as u32;
    if bits & 0xFFFF_0000 == 0x8007_0000 {
        i64::from(bits & 0xFFFF)
    } else {
        i64::from(hresult)
    }
}

fn os_error(call: &'static str, handle: WindowHandle, err: windows::core::Error) -> WindowError {
    let code = win32_code(err.code().0);
    if code == INVALID_WINDOW_HANDLE {
        return WindowError::WindowNotFound {
            handle: handle.to_string(),
        };
    }
    WindowError::OsCallFailed {
        call,
        code,
        message: err.message().to_string(),
    }
}

/// Error for a call that reports failure through `GetLastError`.
fn last_error(call: &'static str, handle: WindowHandle) -> WindowError {
    // SAFETY: GetLastError only reads thread-local state.
    let code = unsafe { GetLastError() };
    os_error(call, handle, windows::core::Error::from(code.to_hresult()))
}

/// Windows refuses focus changes from background processes.
fn foreground_refused(handle: WindowHandle) -> WindowError {
    let error = last_error("SetForegroundWindow", handle);
    warn!(event = "core.win32.foreground_refused", window = %handle, error = %error);
    error
}

unsafe extern "system" fn collect_visible(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the &mut Vec passed by list_windows, alive for the
    // whole EnumWindows call.
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<isize>) };
    // SAFETY: hwnd comes straight from EnumWindows.
    if unsafe { IsWindowVisible(hwnd) }.as_bool() {
        handles.push(hwnd.0 as isize);
    }
    TRUE
}

/// Handle-based user32 backend. Holds no state of its own.
#[derive(Debug, Default)]
pub struct Win32;

impl Win32 {
    pub fn new() -> Self {
        Self
    }

    fn hwnd_of(&self, handle: WindowHandle) -> Result<HWND, WindowError> {
        match handle {
            WindowHandle::Win32 { hwnd } => Ok(HWND(hwnd as *mut c_void)),
            other => Err(WindowError::ForeignHandle {
                handle: other.to_string(),
                backend: BackendKind::Win32,
            }),
        }
    }

    /// Resolve `handle` to an HWND that currently names a window.
    fn live(&self, handle: WindowHandle) -> Result<HWND, WindowError> {
        let hwnd = self.hwnd_of(handle)?;
        // SAFETY: IsWindow accepts any value, valid or not.
        if unsafe { IsWindow(hwnd) }.as_bool() {
            Ok(hwnd)
        } else {
            Err(WindowError::WindowNotFound {
                handle: handle.to_string(),
            })
        }
    }

    fn show_window(
        &self,
        handle: WindowHandle,
        command: SHOW_WINDOW_CMD,
    ) -> Result<(), WindowError> {
        let hwnd = self.live(handle)?;
        // SAFETY: hwnd was checked by IsWindow. The return value is the
        // previous visibility, not a success flag.
        let _ = unsafe { ShowWindow(hwnd, command) };
        debug!(event = "core.win32.show_window_sent", window = %handle, command = command.0);
        Ok(())
    }

    fn set_window_pos(
        &self,
        handle: WindowHandle,
        rect: Rect,
        flags: SET_WINDOW_POS_FLAGS,
    ) -> Result<(), WindowError> {
        let hwnd = self.live(handle)?;
        // SAFETY: hwnd was checked by IsWindow; SWP_NOZORDER makes the
        // insert-after handle unused.
        unsafe {
            SetWindowPos(
                hwnd,
                HWND::default(),
                rect.left,
                rect.top,
                rect.width,
                rect.height,
                flags | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        }
        .map_err(|e| os_error("SetWindowPos", handle, e))
    }
}

impl WindowSystem for Win32 {
    fn kind(&self) -> BackendKind {
        BackendKind::Win32
    }

    fn list_windows(&self) -> Result<Vec<WindowHandle>, WindowError> {
        let mut handles: Vec<isize> = Vec::new();
        // SAFETY: the callback only touches `handles` through lparam, and
        // EnumWindows returns before `handles` goes out of scope.
        unsafe {
            EnumWindows(
                Some(collect_visible),
                LPARAM(&mut handles as *mut Vec<isize> as isize),
            )
        }
        .map_err(|e| WindowError::EnumerationFailed {
            message: format!("EnumWindows failed: {}", e.message()),
        })?;

        Ok(handles
            .into_iter()
            .map(|hwnd| WindowHandle::Win32 { hwnd })
            .collect())
    }

    fn active_window(&self) -> Result<Option<WindowHandle>, WindowError> {
        // SAFETY: no arguments; null when no window has focus.
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            Ok(None)
        } else {
            Ok(Some(WindowHandle::Win32 {
                hwnd: hwnd.0 as isize,
            }))
        }
    }

    fn exists(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        let hwnd = self.hwnd_of(handle)?;
        // SAFETY: IsWindow accepts any value, valid or not.
        Ok(unsafe { IsWindow(hwnd) }.as_bool())
    }

    fn title(&self, handle: WindowHandle) -> Result<Option<String>, WindowError> {
        let hwnd = self.live(handle)?;

        // Zero is both "empty title" and "failed"; only the last error tells
        // them apart.
        // SAFETY: SetLastError/GetLastError only touch thread-local state and
        // hwnd was checked by IsWindow.
        let length = unsafe {
            SetLastError(WIN32_ERROR(0));
            GetWindowTextLengthW(hwnd)
        };
        if length == 0 {
            // SAFETY: see above.
            let code = unsafe { GetLastError() };
            if code.0 != 0 {
                debug!(event = "core.win32.title_unavailable", window = %handle, code = code.0);
                return Ok(None);
            }
            return Ok(Some(String::new()));
        }

        let mut buffer = vec![0u16; length as usize + 1];
        // SAFETY: the buffer length is passed through the slice.
        let copied = unsafe { GetWindowTextW(hwnd, &mut buffer) };
        if copied == 0 {
            debug!(event = "core.win32.title_unavailable", window = %handle);
            return Ok(None);
        }
        Ok(Some(String::from_utf16_lossy(&buffer[..copied as usize])))
    }

    fn pid(&self, handle: WindowHandle) -> Result<Option<i32>, WindowError> {
        let hwnd = self.live(handle)?;
        let mut pid: u32 = 0;
        // SAFETY: pid outlives the call.
        let thread = unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid as *mut u32)) };
        if thread == 0 {
            return Err(last_error("GetWindowThreadProcessId", handle));
        }
        Ok(i32::try_from(pid).ok())
    }

    fn rect(&self, handle: WindowHandle) -> Result<Rect, WindowError> {
        let hwnd = self.live(handle)?;
        let mut rect = RECT::default();
        // SAFETY: rect outlives the call.
        unsafe { GetWindowRect(hwnd, &mut rect) }
            .map_err(|e| os_error("GetWindowRect", handle, e))?;
        Ok(Rect::from_edges(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn move_window(&self, handle: WindowHandle, to: Point) -> Result<(), WindowError> {
        self.set_window_pos(handle, Rect::new(to.x, to.y, 0, 0), SWP_NOSIZE)
    }

    fn resize_window(&self, handle: WindowHandle, to: Size) -> Result<(), WindowError> {
        self.set_window_pos(handle, Rect::new(0, 0, to.width, to.height), SWP_NOMOVE)
    }

    fn set_rect(&self, handle: WindowHandle, rect: Rect) -> Result<(), WindowError> {
        self.set_window_pos(handle, rect, SET_WINDOW_POS_FLAGS(0))
    }

    fn is_minimized(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        let hwnd = self.live(handle)?;
        // SAFETY: hwnd was checked by IsWindow.
        Ok(unsafe { IsIconic(hwnd) }.as_bool())
    }

    fn is_maximized(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        let hwnd = self.live(handle)?;
        // SAFETY: hwnd was checked by IsWindow.
        Ok(unsafe { IsZoomed(hwnd) }.as_bool())
    }

    fn is_visible(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        let hwnd = self.live(handle)?;
        // SAFETY: hwnd was checked by IsWindow.
        Ok(unsafe { IsWindowVisible(hwnd) }.as_bool())
    }

    fn minimize(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.show_window(handle, SW_MINIMIZE)
    }

    fn maximize(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.show_window(handle, SW_MAXIMIZE)
    }

    fn restore(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.show_window(handle, SW_RESTORE)?;
        // A minimized window that was maximized before comes back maximized.
        if self.is_maximized(handle)? {
            self.show_window(handle, SW_RESTORE)?;
        }
        Ok(())
    }

    fn hide(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.show_window(handle, SW_HIDE)
    }

    fn show(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.show_window(handle, SW_SHOW)
    }

    fn activate(&self, handle: WindowHandle) -> Result<(), WindowError> {
        let hwnd = self.live(handle)?;
        // SAFETY: hwnd was checked by IsWindow; the last-error slot is
        // thread-local.
        let accepted = unsafe {
            SetLastError(WIN32_ERROR(0));
            SetForegroundWindow(hwnd)
        }
        .as_bool();
        if accepted {
            Ok(())
        } else {
            Err(foreground_refused(handle))
        }
    }

    fn close(&self, handle: WindowHandle) -> Result<(), WindowError> {
        let hwnd = self.live(handle)?;
        // SAFETY: hwnd was checked by IsWindow; WM_CLOSE takes no pointers.
        unsafe { PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0)) }
            .map_err(|e| os_error("PostMessageW", handle, e))
    }

    fn cursor_position(&self) -> Result<Point, WindowError> {
        let mut point = POINT::default();
        // SAFETY: point outlives the call.
        unsafe { GetCursorPos(&mut point) }.map_err(|e| WindowError::OsCallFailed {
            call: "GetCursorPos",
            code: win32_code(e.code().0),
            message: e.message().to_string(),
        })?;
        Ok(Point::new(point.x, point.y))
    }

    fn screen_size(&self) -> Result<Size, WindowError> {
        // SAFETY: GetSystemMetrics takes no pointers.
        let (width, height) =
            unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if width == 0 || height == 0 {
            return Err(WindowError::OsCallFailed {
                call: "GetSystemMetrics",
                code: 0,
                message: "screen metrics unavailable".to_string(),
            });
        }
        Ok(Size::new(width, height))
    }
}
