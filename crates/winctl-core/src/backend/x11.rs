//! X11 window system driven through EWMH client messages.
//!
//! Queries read window properties directly. Commands are sent to the root
//! window as client messages so the window manager performs them; the X
//! server itself never learns about "maximized" or "active".

use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::cookie::{Cookie, VoidCookie};
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::ErrorKind;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, CLIENT_MESSAGE_EVENT, ClientMessageData, ClientMessageEvent, ConnectionExt,
    EventMask, GetPropertyReply, GetWindowAttributesReply, MapState, Window,
};
use x11rb::rust_connection::RustConnection;
use x11rb::x11_utils::TryParse;

use super::{BackendKind, WindowSystem};
use crate::geometry::{Point, Rect, Size};
use crate::window::errors::WindowError;
use crate::window::types::WindowHandle;

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        _NET_CLIENT_LIST,
        _NET_ACTIVE_WINDOW,
        _NET_WM_NAME,
        _NET_WM_PID,
        _NET_WM_STATE,
        _NET_WM_STATE_HIDDEN,
        _NET_WM_STATE_MAXIMIZED_VERT,
        _NET_WM_STATE_MAXIMIZED_HORZ,
        _NET_CLOSE_WINDOW,
        _NET_MOVERESIZE_WINDOW,
        _NET_DESKTOP_GEOMETRY,
        WM_CHANGE_STATE,
        UTF8_STRING,
    }
}

/// Longest property read, in 32-bit units.
const PROPERTY_LENGTH: u32 = 4096;

const NET_WM_STATE_REMOVE: u32 = 0;
const NET_WM_STATE_ADD: u32 = 1;

/// Source indication for requests from pagers and other direct user tools.
const SOURCE_PAGER: u32 = 2;

/// ICCCM IconicState, used with `WM_CHANGE_STATE`.
const ICONIC_STATE: u32 = 3;

/// `StaticGravity`: coordinates name the client window, not its frame.
const STATIC_GRAVITY: u32 = 10;

/// `_NET_MOVERESIZE_WINDOW` flags word for the fields being set.
fn moveresize_flags(x: bool, y: bool, width: bool, height: bool) -> u32 {
    let mut flags = STATIC_GRAVITY | (SOURCE_PAGER << 12);
    for (present, bit) in [(x, 8), (y, 9), (width, 10), (height, 11)] {
        if present {
            flags |= 1 << bit;
        }
    }
    flags
}

/// ICCCM `STRING` properties are ISO 8859-1.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Bytes of a `_NET_WM_NAME` reply, if it actually holds a UTF-8 name.
///
/// A property of another type comes back with the real type and no data.
fn utf8_name(type_: Atom, value: &[u8], utf8_string: Atom) -> Option<&[u8]> {
    (type_ == utf8_string && !value.is_empty()).then_some(value)
}

fn reply_error(call: &'static str, handle: Option<WindowHandle>, err: ReplyError) -> WindowError {
    match err {
        ReplyError::X11Error(e) => match handle {
            Some(handle) if matches!(e.error_kind, ErrorKind::Window | ErrorKind::Drawable) => {
                WindowError::WindowNotFound {
                    handle: handle.to_string(),
                }
            }
            _ => WindowError::OsCallFailed {
                call,
                code: i64::from(e.error_code),
                message: format!("{:?}", e.error_kind),
            },
        },
        ReplyError::ConnectionError(e) => WindowError::ConnectionFailed {
            message: e.to_string(),
        },
    }
}

fn fetch<R: TryParse>(
    call: &'static str,
    handle: Option<WindowHandle>,
    cookie: Result<Cookie<'_, RustConnection, R>, ConnectionError>,
) -> Result<R, WindowError> {
    cookie
        .map_err(ReplyError::from)
        .and_then(|c| c.reply())
        .map_err(|e| reply_error(call, handle, e))
}

fn check(
    call: &'static str,
    handle: Option<WindowHandle>,
    cookie: Result<VoidCookie<'_, RustConnection>, ConnectionError>,
) -> Result<(), WindowError> {
    cookie
        .map_err(ReplyError::from)
        .and_then(|c| c.check())
        .map_err(|e| reply_error(call, handle, e))
}

/// Connection to one X display plus the atoms interned at startup.
pub struct X11Ewmh {
    conn: RustConnection,
    root: Window,
    screen: Size,
    atoms: Atoms,
}

impl X11Ewmh {
    /// Connect to `display`, or to `$DISPLAY` when `None`.
    pub fn connect(display: Option<&str>) -> Result<Self, WindowError> {
        let target = display.unwrap_or("$DISPLAY");
        info!(event = "core.x11.connect_started", display = target);

        let (conn, screen_num) = x11rb::connect(display).map_err(|e| {
            error!(event = "core.x11.connect_failed", error = %e);
            WindowError::ConnectionFailed {
                message: e.to_string(),
            }
        })?;

        let (root, screen) = match conn.setup().roots.get(screen_num) {
            Some(s) => (
                s.root,
                Size::new(s.width_in_pixels.into(), s.height_in_pixels.into()),
            ),
            None => {
                return Err(WindowError::ConnectionFailed {
                    message: format!("display has no screen {screen_num}"),
                });
            }
        };

        let atoms = Atoms::new(&conn)
            .map_err(ReplyError::from)
            .and_then(|cookie| cookie.reply())
            .map_err(|e| reply_error("InternAtom", None, e))?;

        info!(
            event = "core.x11.connect_completed",
            screen = screen_num,
            root = root
        );
        Ok(Self {
            conn,
            root,
            screen,
            atoms,
        })
    }

    fn window_of(&self, handle: WindowHandle) -> Result<Window, WindowError> {
        match handle {
            WindowHandle::X11 { window } => Ok(window),
            other => Err(WindowError::ForeignHandle {
                handle: other.to_string(),
                backend: BackendKind::X11Ewmh,
            }),
        }
    }

    fn property(
        &self,
        handle: Option<WindowHandle>,
        window: Window,
        property: impl Into<Atom>,
        type_: impl Into<Atom>,
    ) -> Result<GetPropertyReply, WindowError> {
        fetch(
            "GetProperty",
            handle,
            self.conn.get_property(false, window, property, type_, 0, PROPERTY_LENGTH),
        )
    }

    fn property32(
        &self,
        handle: Option<WindowHandle>,
        window: Window,
        property: impl Into<Atom>,
        type_: impl Into<Atom>,
    ) -> Result<Vec<u32>, WindowError> {
        let reply = self.property(handle, window, property, type_)?;
        Ok(reply
            .value32()
            .map(|values| values.collect())
            .unwrap_or_default())
    }

    fn attributes(&self, handle: WindowHandle) -> Result<GetWindowAttributesReply, WindowError> {
        let window = self.window_of(handle)?;
        fetch("GetWindowAttributes", Some(handle), self.conn.get_window_attributes(window))
    }

    fn wm_state(&self, handle: WindowHandle) -> Result<Vec<Atom>, WindowError> {
        let window = self.window_of(handle)?;
        self.property32(
            Some(handle),
            window,
            self.atoms._NET_WM_STATE,
            AtomEnum::ATOM,
        )
    }

    /// Ask the window manager to act on `handle`.
    ///
    /// The window is looked up first: client messages addressed to a dead
    /// window are silently dropped by the server.
    fn client_message(
        &self,
        call: &'static str,
        handle: WindowHandle,
        type_: Atom,
        data: [u32; 5],
    ) -> Result<(), WindowError> {
        self.attributes(handle)?;
        let window = self.window_of(handle)?;

        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_,
            data: ClientMessageData::from(data),
        };
        check(
            call,
            Some(handle),
            self.conn.send_event(
                false,
                self.root,
                EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
                event,
            ),
        )?;
        debug!(event = "core.x11.client_message_sent", call = call, window = %handle);
        Ok(())
    }

    fn set_maximized(&self, handle: WindowHandle, action: u32) -> Result<(), WindowError> {
        self.client_message(
            "_NET_WM_STATE",
            handle,
            self.atoms._NET_WM_STATE,
            [
                action,
                self.atoms._NET_WM_STATE_MAXIMIZED_VERT,
                self.atoms._NET_WM_STATE_MAXIMIZED_HORZ,
                SOURCE_PAGER,
                0,
            ],
        )
    }

    fn moveresize(&self, handle: WindowHandle, flags: u32, rect: Rect) -> Result<(), WindowError> {
        // Signed coordinates travel as their two's complement bit pattern.
        self.client_message(
            "_NET_MOVERESIZE_WINDOW",
            handle,
            self.atoms._NET_MOVERESIZE_WINDOW,
            [
                flags,
                rect.left as u32,
                rect.top as u32,
                rect.width as u32,
                rect.height as u32,
            ],
        )
    }
}

impl WindowSystem for X11Ewmh {
    fn kind(&self) -> BackendKind {
        BackendKind::X11Ewmh
    }

    fn list_windows(&self) -> Result<Vec<WindowHandle>, WindowError> {
        let reply = self.property(
            None,
            self.root,
            self.atoms._NET_CLIENT_LIST,
            AtomEnum::WINDOW,
        )?;
        let Some(windows) = reply.value32() else {
            warn!(event = "core.x11.client_list_missing");
            return Err(WindowError::EnumerationFailed {
                message: "_NET_CLIENT_LIST is not set; is an EWMH window manager running?"
                    .to_string(),
            });
        };
        Ok(windows
            .map(|window| WindowHandle::X11 { window })
            .collect())
    }

    fn active_window(&self) -> Result<Option<WindowHandle>, WindowError> {
        let active = self.property32(
            None,
            self.root,
            self.atoms._NET_ACTIVE_WINDOW,
            AtomEnum::WINDOW,
        )?;
        Ok(active
            .first()
            .copied()
            .filter(|&window| window != x11rb::NONE)
            .map(|window| WindowHandle::X11 { window }))
    }

    fn exists(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        match self.attributes(handle) {
            Ok(_) => Ok(true),
            Err(WindowError::WindowNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn title(&self, handle: WindowHandle) -> Result<Option<String>, WindowError> {
        let window = self.window_of(handle)?;

        let net = self.property(
            Some(handle),
            window,
            self.atoms._NET_WM_NAME,
            self.atoms.UTF8_STRING,
        )?;
        let net_name = utf8_name(net.type_, &net.value, self.atoms.UTF8_STRING);
        let has_net_name = net_name.is_some();
        if let Some(bytes) = net_name
            && let Ok(title) = std::str::from_utf8(bytes)
        {
            return Ok(Some(title.to_string()));
        }

        let legacy = self.property(Some(handle), window, AtomEnum::WM_NAME, AtomEnum::ANY)?;
        if legacy.type_ == x11rb::NONE {
            // No name at all is an empty title; a garbled one is unknown.
            return Ok((!has_net_name).then(String::new));
        }
        if legacy.type_ == u32::from(AtomEnum::STRING) {
            Ok(Some(decode_latin1(&legacy.value)))
        } else {
            Ok(Some(String::from_utf8_lossy(&legacy.value).into_owned()))
        }
    }

    fn pid(&self, handle: WindowHandle) -> Result<Option<i32>, WindowError> {
        let window = self.window_of(handle)?;
        let pid = self.property32(
            Some(handle),
            window,
            self.atoms._NET_WM_PID,
            AtomEnum::CARDINAL,
        )?;
        Ok(pid.first().map(|&p| p as i32))
    }

    fn rect(&self, handle: WindowHandle) -> Result<Rect, WindowError> {
        let window = self.window_of(handle)?;
        let geometry = fetch("GetGeometry", Some(handle), self.conn.get_geometry(window))?;
        // Position relative to the root, through any reparenting frames.
        let origin = fetch(
            "TranslateCoordinates",
            Some(handle),
            self.conn.translate_coordinates(window, self.root, 0, 0),
        )?;
        Ok(Rect::new(
            origin.dst_x.into(),
            origin.dst_y.into(),
            geometry.width.into(),
            geometry.height.into(),
        ))
    }

    fn move_window(&self, handle: WindowHandle, to: Point) -> Result<(), WindowError> {
        let rect = Rect::new(to.x, to.y, 0, 0);
        self.moveresize(handle, moveresize_flags(true, true, false, false), rect)
    }

    fn resize_window(&self, handle: WindowHandle, to: Size) -> Result<(), WindowError> {
        let rect = Rect::new(0, 0, to.width, to.height);
        self.moveresize(handle, moveresize_flags(false, false, true, true), rect)
    }

    fn set_rect(&self, handle: WindowHandle, rect: Rect) -> Result<(), WindowError> {
        self.moveresize(handle, moveresize_flags(true, true, true, true), rect)
    }

    fn is_minimized(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        Ok(self
            .wm_state(handle)?
            .contains(&self.atoms._NET_WM_STATE_HIDDEN))
    }

    fn is_maximized(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        let state = self.wm_state(handle)?;
        Ok(state.contains(&self.atoms._NET_WM_STATE_MAXIMIZED_VERT)
            && state.contains(&self.atoms._NET_WM_STATE_MAXIMIZED_HORZ))
    }

    fn is_visible(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        Ok(self.attributes(handle)?.map_state == MapState::VIEWABLE)
    }

    fn minimize(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.client_message(
            "WM_CHANGE_STATE",
            handle,
            self.atoms.WM_CHANGE_STATE,
            [ICONIC_STATE, 0, 0, 0, 0],
        )
    }

    fn maximize(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.set_maximized(handle, NET_WM_STATE_ADD)
    }

    fn restore(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.set_maximized(handle, NET_WM_STATE_REMOVE)?;
        // Window managers deiconify on activation.
        if self.is_minimized(handle)? {
            self.activate(handle)?;
        }
        Ok(())
    }

    fn hide(&self, handle: WindowHandle) -> Result<(), WindowError> {
        let window = self.window_of(handle)?;
        check(
            "UnmapSubwindows",
            Some(handle),
            self.conn.unmap_subwindows(window),
        )?;
        check("UnmapWindow", Some(handle), self.conn.unmap_window(window))
    }

    fn show(&self, handle: WindowHandle) -> Result<(), WindowError> {
        let window = self.window_of(handle)?;
        check("MapWindow", Some(handle), self.conn.map_window(window))?;
        check(
            "MapSubwindows",
            Some(handle),
            self.conn.map_subwindows(window),
        )
    }

    fn activate(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.client_message(
            "_NET_ACTIVE_WINDOW",
            handle,
            self.atoms._NET_ACTIVE_WINDOW,
            [SOURCE_PAGER, x11rb::CURRENT_TIME, 0, 0, 0],
        )
    }

    fn close(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.client_message(
            "_NET_CLOSE_WINDOW",
            handle,
            self.atoms._NET_CLOSE_WINDOW,
            [x11rb::CURRENT_TIME, SOURCE_PAGER, 0, 0, 0],
        )
    }

    fn cursor_position(&self) -> Result<Point, WindowError> {
        let pointer = fetch("QueryPointer", None, self.conn.query_pointer(self.root))?;
        Ok(Point::new(pointer.root_x.into(), pointer.root_y.into()))
    }

    fn screen_size(&self) -> Result<Size, WindowError> {
        let geometry = self.property32(
            None,
            self.root,
            self.atoms._NET_DESKTOP_GEOMETRY,
            AtomEnum::CARDINAL,
        )?;
        match geometry.as_slice() {
            [width, height, ..] => Ok(Size::new(*width as i32, *height as i32)),
            _ => Ok(self.screen),
        }
    }

    fn shutdown(&self) {
        if let Err(e) = self.conn.flush() {
            warn!(event = "core.x11.flush_failed", error = %e);
        }
        info!(event = "core.x11.disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moveresize_flags_mark_present_fields() {
        let base = STATIC_GRAVITY | (2 << 12);
        assert_eq!(moveresize_flags(false, false, false, false), base);
        assert_eq!(moveresize_flags(true, true, false, false), base | 0x300);
        assert_eq!(moveresize_flags(false, false, true, true), base | 0xc00);
        assert_eq!(moveresize_flags(true, true, true, true), base | 0xf00);
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode_latin1(b"xterm"), "xterm");
        assert_eq!(decode_latin1(&[0x43, 0x61, 0x66, 0xe9]), "Café");
    }

    #[test]
    fn test_utf8_name_ignores_empty_and_mistyped_replies() {
        const UTF8: Atom = 300;
        assert_eq!(utf8_name(UTF8, b"xterm", UTF8), Some(&b"xterm"[..]));
        assert_eq!(utf8_name(UTF8, b"", UTF8), None);
        assert_eq!(utf8_name(u32::from(AtomEnum::STRING), b"", UTF8), None);
        assert_eq!(utf8_name(x11rb::NONE, b"", UTF8), None);
    }

    #[test]
    fn test_lost_connection_maps_to_connection_failed() {
        let err = reply_error(
            "GetGeometry",
            Some(WindowHandle::X11 { window: 0x3a00004 }),
            ReplyError::ConnectionError(ConnectionError::UnknownError),
        );
        assert!(matches!(err, WindowError::ConnectionFailed { .. }));
    }

    #[test]
    #[ignore = "needs a running X server with an EWMH window manager"]
    fn test_smoke_lists_windows_with_rects() {
        let x11 = X11Ewmh::connect(None).unwrap();
        let screen = x11.screen_size().unwrap();
        assert!(screen.width > 0 && screen.height > 0);

        for handle in x11.list_windows().unwrap() {
            if !x11.exists(handle).unwrap() {
                continue;
            }
            let rect = x11.rect(handle).unwrap();
            assert!(rect.width >= 0 && rect.height >= 0);
        }
        x11.shutdown();
    }

    #[test]
    #[ignore = "needs a running X server"]
    fn test_smoke_unknown_window_is_not_found() {
        let x11 = X11Ewmh::connect(None).unwrap();
        let handle = WindowHandle::X11 { window: 0x7fff_fff0 };
        assert!(!x11.exists(handle).unwrap());
        assert!(matches!(
            x11.rect(handle),
            Err(WindowError::WindowNotFound { .. })
        ));
    }
}
