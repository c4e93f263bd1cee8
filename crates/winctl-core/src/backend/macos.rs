//! macOS window system: Core Graphics for reading, Accessibility for control.
//!
//! Enumeration and geometry come from the window server's window list, which
//! needs no permission. Every state change goes through the Accessibility
//! API and requires the process to be trusted in System Settings.

use std::ffi::c_void;
use std::ptr;

use accessibility_sys::{
    AXError, AXUIElementCopyAttributeValue, AXUIElementCreateApplication,
    AXUIElementPerformAction, AXUIElementRef, AXUIElementSetAttributeValue,
    AXUIElementSetMessagingTimeout, AXValueCreate, kAXErrorSuccess, kAXMinimizedAttribute,
    kAXTitleAttribute, kAXValueTypeCGPoint, kAXValueTypeCGSize, kAXWindowsAttribute,
};
use core_foundation::array::CFArray;
use core_foundation::base::{CFRelease, CFRetain, CFType, CFTypeRef, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::number::CFNumber;
use core_foundation::string::{CFString, CFStringRef};
use core_graphics::event::CGEvent;
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::{CGPoint, CGRect, CGSize};
use core_graphics::window::{
    CGWindowID, CGWindowListOption, copy_window_info, kCGNullWindowID, kCGWindowBounds,
    kCGWindowIsOnscreen, kCGWindowLayer, kCGWindowListExcludeDesktopElements,
    kCGWindowListOptionIncludingWindow, kCGWindowListOptionOnScreenOnly, kCGWindowName,
    kCGWindowNumber, kCGWindowOwnerPID,
};
use tracing::{debug, warn};

use super::{BackendKind, WindowSystem};
use crate::geometry::{Point, Rect, Size};
use crate::window::errors::WindowError;
use crate::window::types::WindowHandle;

// SAFETY: FFI declarations from the ApplicationServices framework.
// _AXUIElementGetWindow is private but has been stable since 10.x; it is the
// only link between an AX window element and its window-server id.
#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn _AXUIElementGetWindow(element: AXUIElementRef, window_id: *mut CGWindowID) -> AXError;
}

/// Timeout for AX messaging (seconds)
const AX_MESSAGING_TIMEOUT: f32 = 1.0;

const AX_POSITION: &str = "AXPosition";
const AX_SIZE: &str = "AXSize";
const AX_FULL_SCREEN: &str = "AXFullScreen";
const AX_CLOSE_BUTTON: &str = "AXCloseButton";
const AX_HIDDEN: &str = "AXHidden";
const AX_FRONTMOST: &str = "AXFrontmost";
const AX_RAISE: &str = "AXRaise";
const AX_PRESS: &str = "AXPress";

const AX_ERROR_INVALID_UI_ELEMENT: AXError = -25202;
const AX_ERROR_CANNOT_COMPLETE: AXError = -25204;
const AX_ERROR_API_DISABLED: AXError = -25211;

fn check_accessibility_permission() -> Result<(), WindowError> {
    // SAFETY: takes no arguments and only reads the TCC database.
    let trusted = unsafe { AXIsProcessTrusted() };
    if !trusted {
        return Err(WindowError::AccessibilityPermissionDenied);
    }
    Ok(())
}

fn ax_error_name(code: AXError) -> &'static str {
    match code {
        -25200 => "kAXErrorFailure",
        -25201 => "kAXErrorIllegalArgument",
        AX_ERROR_INVALID_UI_ELEMENT => "kAXErrorInvalidUIElement",
        -25203 => "kAXErrorInvalidUIElementObserver",
        AX_ERROR_CANNOT_COMPLETE => "kAXErrorCannotComplete",
        -25205 => "kAXErrorAttributeUnsupported",
        -25206 => "kAXErrorActionUnsupported",
        -25207 => "kAXErrorNotificationUnsupported",
        -25208 => "kAXErrorNotImplemented",
        AX_ERROR_API_DISABLED => "kAXErrorAPIDisabled",
        -25212 => "kAXErrorNoValue",
        -25213 => "kAXErrorParameterizedAttributeUnsupported",
        -25214 => "kAXErrorNotEnoughPrecision",
        _ => "unknown AXError",
    }
}

fn ax_error(call: &'static str, handle: WindowHandle, code: AXError) -> WindowError {
    match code {
        AX_ERROR_INVALID_UI_ELEMENT => WindowError::WindowNotFound {
            handle: handle.to_string(),
        },
        AX_ERROR_API_DISABLED => WindowError::AccessibilityPermissionDenied,
        _ => WindowError::OsCallFailed {
            call,
            code: i64::from(code),
            message: ax_error_name(code).to_string(),
        },
    }
}

/// Owned `AXUIElementRef`, released on drop.
struct AxElement(AXUIElementRef);

impl AxElement {
    fn application(pid: i32) -> Result<Self, WindowError> {
        // SAFETY: AXUIElementCreateApplication creates a +1 retained AXUIElementRef.
        let element = unsafe { AXUIElementCreateApplication(pid) };
        if element.is_null() {
            return Err(WindowError::OsCallFailed {
                call: "AXUIElementCreateApplication",
                code: 0,
                message: format!("no AX element for PID {pid}"),
            });
        }
        // SAFETY: element is a valid AXUIElementRef we just created.
        unsafe {
            AXUIElementSetMessagingTimeout(element, AX_MESSAGING_TIMEOUT);
        }
        Ok(Self(element))
    }

    /// Take a reference to an element borrowed from a container.
    ///
    /// # Safety
    /// `element` must be a live AXUIElementRef.
    unsafe fn retain(element: AXUIElementRef) -> Self {
        // SAFETY: guaranteed live by the caller; the retain is balanced by Drop.
        unsafe { CFRetain(element as CFTypeRef) };
        Self(element)
    }

    fn copy_attribute(&self, attribute: &str) -> Result<CFType, AXError> {
        let cf_attr = CFString::new(attribute);
        let mut value: CFTypeRef = ptr::null();

        // SAFETY: Standard AXUIElementCopyAttributeValue (Copy Rule: +1 retained on success).
        let result = unsafe {
            AXUIElementCopyAttributeValue(self.0, cf_attr.as_concrete_TypeRef(), &mut value)
        };
        if result != kAXErrorSuccess {
            return Err(result);
        }
        if value.is_null() {
            return Err(AX_ERROR_CANNOT_COMPLETE);
        }
        // SAFETY: value is a +1 retained CFTypeRef. wrap_under_create_rule takes ownership.
        Ok(unsafe { CFType::wrap_under_create_rule(value) })
    }

    fn bool_attribute(&self, attribute: &str) -> Result<bool, AXError> {
        let value = self.copy_attribute(attribute)?;
        value
            .downcast::<CFBoolean>()
            .map(bool::from)
            .ok_or(AX_ERROR_CANNOT_COMPLETE)
    }

    fn string_attribute(&self, attribute: &str) -> Result<Option<String>, AXError> {
        let value = self.copy_attribute(attribute)?;
        Ok(value.downcast::<CFString>().map(|s| s.to_string()))
    }

    fn set_attribute(&self, attribute: &str, value: CFTypeRef) -> Result<(), AXError> {
        let cf_attr = CFString::new(attribute);
        // SAFETY: Setting attribute value on a valid element; the value is
        // retained by the callee as needed.
        let result =
            unsafe { AXUIElementSetAttributeValue(self.0, cf_attr.as_concrete_TypeRef(), value) };
        if result != kAXErrorSuccess {
            return Err(result);
        }
        Ok(())
    }

    fn set_bool(&self, attribute: &str, value: bool) -> Result<(), AXError> {
        let cf_value = if value {
            CFBoolean::true_value()
        } else {
            CFBoolean::false_value()
        };
        self.set_attribute(attribute, cf_value.as_CFTypeRef())
    }

    /// Set a CGPoint or CGSize attribute.
    fn set_value<T>(
        &self,
        attribute: &str,
        value_type: accessibility_sys::AXValueType,
        value: &T,
    ) -> Result<(), AXError> {
        // SAFETY: value points to a live struct of the layout named by value_type.
        let ax_value = unsafe { AXValueCreate(value_type, value as *const T as *const c_void) };
        if ax_value.is_null() {
            return Err(AX_ERROR_CANNOT_COMPLETE);
        }
        let result = self.set_attribute(attribute, ax_value as CFTypeRef);
        // SAFETY: Release the value (Create Rule, we own it).
        unsafe { CFRelease(ax_value as CFTypeRef) };
        result
    }

    fn perform(&self, action: &str) -> Result<(), AXError> {
        let cf_action = CFString::new(action);
        // SAFETY: Performing an action on a valid element.
        let result = unsafe { AXUIElementPerformAction(self.0, cf_action.as_concrete_TypeRef()) };
        if result != kAXErrorSuccess {
            return Err(result);
        }
        Ok(())
    }

    fn window_id(&self) -> Option<CGWindowID> {
        let mut window_id: CGWindowID = 0;
        // SAFETY: self.0 is a live element and window_id outlives the call.
        let result = unsafe { _AXUIElementGetWindow(self.0, &mut window_id) };
        (result == kAXErrorSuccess).then_some(window_id)
    }
}

impl Drop for AxElement {
    fn drop(&mut self) {
        // SAFETY: Release the element (Create Rule or our own retain, we own it).
        unsafe { CFRelease(self.0 as CFTypeRef) };
    }
}

/// One entry of the window server's window list.
#[derive(Debug, Clone)]
struct CgWindow {
    window_id: CGWindowID,
    pid: i32,
    title: Option<String>,
    bounds: Rect,
    layer: i64,
    on_screen: bool,
}

impl CgWindow {
    fn handle(&self) -> WindowHandle {
        WindowHandle::MacOs {
            pid: self.pid,
            window_id: self.window_id,
        }
    }
}

fn cg_key(key: CFStringRef) -> CFString {
    // SAFETY: the kCGWindow* keys are immortal framework constants.
    unsafe { CFString::wrap_under_get_rule(key) }
}

fn cg_number(info: &CFDictionary<CFString, CFType>, key: CFStringRef) -> Option<i64> {
    info.find(cg_key(key))
        .and_then(|value| value.downcast::<CFNumber>())
        .and_then(|number| number.to_i64())
}

fn parse_cg_window(info: &CFDictionary<CFString, CFType>) -> Option<CgWindow> {
    // SAFETY: reading immortal framework constants.
    let (number_key, pid_key, layer_key, name_key, bounds_key, onscreen_key) = unsafe {
        (
            kCGWindowNumber,
            kCGWindowOwnerPID,
            kCGWindowLayer,
            kCGWindowName,
            kCGWindowBounds,
            kCGWindowIsOnscreen,
        )
    };

    let window_id = CGWindowID::try_from(cg_number(info, number_key)?).ok()?;
    let pid = i32::try_from(cg_number(info, pid_key)?).ok()?;
    let layer = cg_number(info, layer_key).unwrap_or(0);
    // Names are withheld without the Screen Recording permission.
    let title = info
        .find(cg_key(name_key))
        .and_then(|value| value.downcast::<CFString>())
        .map(|s| s.to_string());
    let on_screen = info
        .find(cg_key(onscreen_key))
        .and_then(|value| value.downcast::<CFBoolean>())
        .map(bool::from)
        .unwrap_or(false);
    let bounds = info
        .find(cg_key(bounds_key))
        .and_then(|value| value.downcast::<CFDictionary>())
        .and_then(|dict| CGRect::from_dict_representation(&dict))
        .map(|r| {
            Rect::new(
                r.origin.x.round() as i32,
                r.origin.y.round() as i32,
                r.size.width.round() as i32,
                r.size.height.round() as i32,
            )
        })
        .unwrap_or_default();

    Some(CgWindow {
        window_id,
        pid,
        title,
        bounds,
        layer,
        on_screen,
    })
}

fn cg_windows(option: CGWindowListOption, relative_to: CGWindowID) -> Vec<CgWindow> {
    let Some(list) = copy_window_info(option, relative_to) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|item| {
            // SAFETY: every entry of the window list is a CFDictionary owned by `list`.
            let info: CFDictionary<CFString, CFType> =
                unsafe { CFDictionary::wrap_under_get_rule(*item as CFDictionaryRef) };
            parse_cg_window(&info)
        })
        .collect()
}

/// AppleScript that brings the process owning `pid` to the front.
fn activation_script(pid: i32) -> String {
    format!(
        r#"tell application "System Events" to set frontmost of (first process whose unix id is {pid}) to true"#
    )
}

fn activate_via_osascript(pid: i32) -> Result<(), WindowError> {
    let script = activation_script(pid);

    match std::process::Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .output()
    {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let hint = if stderr.contains("not allowed") || stderr.contains("permission") {
                " (check System Settings > Privacy & Security > Automation)"
            } else {
                ""
            };
            warn!(
                event = "core.macos.activate_script_failed",
                pid = pid,
                stderr = %stderr
            );
            Err(WindowError::ScriptFailed {
                message: format!("Failed to activate PID {pid}: {stderr}{hint}"),
            })
        }
        Err(e) => Err(WindowError::ScriptFailed {
            message: format!("Failed to run osascript for PID {pid}: {e}"),
        }),
    }
}

/// Window list plus Accessibility control. Holds no state of its own.
#[derive(Debug, Default)]
pub struct MacOsAccessibility;

impl MacOsAccessibility {
    pub fn new() -> Self {
        Self
    }

    fn ids(&self, handle: WindowHandle) -> Result<(i32, CGWindowID), WindowError> {
        match handle {
            WindowHandle::MacOs { pid, window_id } => Ok((pid, window_id)),
            other => Err(WindowError::ForeignHandle {
                handle: other.to_string(),
                backend: BackendKind::MacOsAccessibility,
            }),
        }
    }

    fn cg_window(&self, handle: WindowHandle) -> Result<CgWindow, WindowError> {
        let (_, window_id) = self.ids(handle)?;
        cg_windows(kCGWindowListOptionIncludingWindow, window_id)
            .into_iter()
            .find(|w| w.window_id == window_id)
            .ok_or_else(|| WindowError::WindowNotFound {
                handle: handle.to_string(),
            })
    }

    /// Find the AX element for `handle` among its application's windows.
    fn ax_window(&self, handle: WindowHandle) -> Result<AxElement, WindowError> {
        let (pid, window_id) = self.ids(handle)?;
        check_accessibility_permission()?;
        // Dead windows show up as AX failures; report them as such.
        self.cg_window(handle)?;

        let app = AxElement::application(pid)?;
        let windows = app
            .copy_attribute(kAXWindowsAttribute)
            .map_err(|code| ax_error("AXUIElementCopyAttributeValue", handle, code))?;
        let Some(array) = windows.downcast::<CFArray>() else {
            return Err(ax_error(
                "AXUIElementCopyAttributeValue",
                handle,
                AX_ERROR_CANNOT_COMPLETE,
            ));
        };

        for item in array.iter() {
            // SAFETY: items of the AXWindows array are live AXUIElementRefs
            // owned by `array`; retain takes our own reference.
            let element = unsafe { AxElement::retain(*item as AXUIElementRef) };
            if element.window_id() == Some(window_id) {
                return Ok(element);
            }
        }

        debug!(
            event = "core.macos.ax_window_not_found",
            window = %handle,
            ax_windows = array.len()
        );
        Err(WindowError::OsCallFailed {
            call: "_AXUIElementGetWindow",
            code: 0,
            message: format!("{handle} is not exposed through the Accessibility API"),
        })
    }

    fn application(&self, handle: WindowHandle) -> Result<AxElement, WindowError> {
        let (pid, _) = self.ids(handle)?;
        check_accessibility_permission()?;
        AxElement::application(pid)
    }

    fn set_window_bool(
        &self,
        handle: WindowHandle,
        attribute: &str,
        value: bool,
    ) -> Result<(), WindowError> {
        self.ax_window(handle)?
            .set_bool(attribute, value)
            .map_err(|code| ax_error("AXUIElementSetAttributeValue", handle, code))
    }

    fn window_bool(&self, handle: WindowHandle, attribute: &str) -> Result<bool, WindowError> {
        self.ax_window(handle)?
            .bool_attribute(attribute)
            .map_err(|code| ax_error("AXUIElementCopyAttributeValue", handle, code))
    }
}

impl WindowSystem for MacOsAccessibility {
    fn kind(&self) -> BackendKind {
        BackendKind::MacOsAccessibility
    }

    fn list_windows(&self) -> Result<Vec<WindowHandle>, WindowError> {
        let windows = xcap::Window::all().map_err(|e| WindowError::EnumerationFailed {
            message: format!("Failed to enumerate windows via Core Graphics: {e}"),
        })?;

        let mut handles = Vec::with_capacity(windows.len());
        for w in windows {
            let window_id = match w.id() {
                Ok(id) => id,
                Err(e) => {
                    debug!(
                        event = "core.macos.window_skipped",
                        reason = "id_unavailable",
                        error = %e
                    );
                    continue;
                }
            };
            // xcap returns u32 PIDs, but macOS Accessibility API uses i32.
            let pid = match w.pid().map(i32::try_from) {
                Ok(Ok(pid)) => pid,
                other => {
                    debug!(
                        event = "core.macos.window_skipped",
                        reason = "pid_unavailable",
                        window_id = window_id,
                        ok = other.is_ok()
                    );
                    continue;
                }
            };
            handles.push(WindowHandle::MacOs { pid, window_id });
        }
        Ok(handles)
    }

    fn active_window(&self) -> Result<Option<WindowHandle>, WindowError> {
        // The window list is ordered front to back; layer 0 holds normal windows.
        let front = cg_windows(
            kCGWindowListOptionOnScreenOnly | kCGWindowListExcludeDesktopElements,
            kCGNullWindowID,
        )
        .into_iter()
        .find(|w| w.layer == 0);
        Ok(front.map(|w| w.handle()))
    }

    fn exists(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        match self.cg_window(handle) {
            Ok(_) => Ok(true),
            Err(WindowError::WindowNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn title(&self, handle: WindowHandle) -> Result<Option<String>, WindowError> {
        let window = self.cg_window(handle)?;
        if window.title.is_some() {
            return Ok(window.title);
        }

        // SAFETY: see check_accessibility_permission.
        if !unsafe { AXIsProcessTrusted() } {
            return Ok(None);
        }
        // Overlays and helper windows often have no AX counterpart.
        let element = match self.ax_window(handle) {
            Ok(element) => element,
            Err(e @ WindowError::WindowNotFound { .. }) => return Err(e),
            Err(e) => {
                debug!(event = "core.macos.title_unavailable", window = %handle, error = %e);
                return Ok(None);
            }
        };
        match element.string_attribute(kAXTitleAttribute) {
            Ok(title) => Ok(title),
            Err(code) => {
                debug!(event = "core.macos.title_unavailable", window = %handle, ax_error = code);
                Ok(None)
            }
        }
    }

    fn pid(&self, handle: WindowHandle) -> Result<Option<i32>, WindowError> {
        Ok(Some(self.cg_window(handle)?.pid))
    }

    fn rect(&self, handle: WindowHandle) -> Result<Rect, WindowError> {
        Ok(self.cg_window(handle)?.bounds)
    }

    fn move_window(&self, handle: WindowHandle, to: Point) -> Result<(), WindowError> {
        let point = CGPoint::new(f64::from(to.x), f64::from(to.y));
        self.ax_window(handle)?
            .set_value(AX_POSITION, kAXValueTypeCGPoint, &point)
            .map_err(|code| ax_error("AXUIElementSetAttributeValue", handle, code))
    }

    fn resize_window(&self, handle: WindowHandle, to: Size) -> Result<(), WindowError> {
        let size = CGSize::new(f64::from(to.width), f64::from(to.height));
        self.ax_window(handle)?
            .set_value(AX_SIZE, kAXValueTypeCGSize, &size)
            .map_err(|code| ax_error("AXUIElementSetAttributeValue", handle, code))
    }

    fn is_minimized(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        self.window_bool(handle, kAXMinimizedAttribute)
    }

    fn is_maximized(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        self.window_bool(handle, AX_FULL_SCREEN)
    }

    fn is_visible(&self, handle: WindowHandle) -> Result<bool, WindowError> {
        Ok(self.cg_window(handle)?.on_screen)
    }

    fn minimize(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.set_window_bool(handle, kAXMinimizedAttribute, true)
    }

    fn maximize(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.set_window_bool(handle, AX_FULL_SCREEN, true)
    }

    fn restore(&self, handle: WindowHandle) -> Result<(), WindowError> {
        let window = self.ax_window(handle)?;
        if window.bool_attribute(AX_FULL_SCREEN).unwrap_or(false) {
            window
                .set_bool(AX_FULL_SCREEN, false)
                .map_err(|code| ax_error("AXUIElementSetAttributeValue", handle, code))?;
        }
        window
            .set_bool(kAXMinimizedAttribute, false)
            .map_err(|code| ax_error("AXUIElementSetAttributeValue", handle, code))
    }

    fn hide(&self, handle: WindowHandle) -> Result<(), WindowError> {
        // macOS hides applications, not windows: this hides every window of the app.
        self.cg_window(handle)?;
        self.application(handle)?
            .set_bool(AX_HIDDEN, true)
            .map_err(|code| ax_error("AXUIElementSetAttributeValue", handle, code))
    }

    fn show(&self, handle: WindowHandle) -> Result<(), WindowError> {
        self.cg_window(handle)?;
        self.application(handle)?
            .set_bool(AX_HIDDEN, false)
            .map_err(|code| ax_error("AXUIElementSetAttributeValue", handle, code))?;
        self.set_window_bool(handle, kAXMinimizedAttribute, false)
    }

    fn activate(&self, handle: WindowHandle) -> Result<(), WindowError> {
        let (pid, _) = self.ids(handle)?;
        let window = self.ax_window(handle)?;

        if let Err(code) = self.application(handle)?.set_bool(AX_FRONTMOST, true) {
            warn!(
                event = "core.macos.frontmost_failed_fallback",
                window = %handle,
                ax_error = code,
                message = "AXFrontmost failed, falling back to System Events activation"
            );
            activate_via_osascript(pid)?;
        }

        window
            .perform(AX_RAISE)
            .map_err(|code| ax_error("AXUIElementPerformAction", handle, code))
    }

    fn close(&self, handle: WindowHandle) -> Result<(), WindowError> {
        let window = self.ax_window(handle)?;
        let button = window
            .copy_attribute(AX_CLOSE_BUTTON)
            .map_err(|code| ax_error("AXUIElementCopyAttributeValue", handle, code))?;
        // SAFETY: AXCloseButton holds an AXUIElementRef kept alive by `button`.
        let button = unsafe { AxElement::retain(button.as_CFTypeRef() as AXUIElementRef) };
        button
            .perform(AX_PRESS)
            .map_err(|code| ax_error("AXUIElementPerformAction", handle, code))
    }

    fn cursor_position(&self) -> Result<Point, WindowError> {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState).map_err(|()| {
            WindowError::OsCallFailed {
                call: "CGEventSourceCreate",
                code: 0,
                message: "event source unavailable".to_string(),
            }
        })?;
        let event = CGEvent::new(source).map_err(|()| WindowError::OsCallFailed {
            call: "CGEventCreate",
            code: 0,
            message: "event unavailable".to_string(),
        })?;
        let location = event.location();
        Ok(Point::new(
            location.x.round() as i32,
            location.y.round() as i32,
        ))
    }

    fn screen_size(&self) -> Result<Size, WindowError> {
        let monitors = xcap::Monitor::all().map_err(|e| WindowError::EnumerationFailed {
            message: format!("Failed to enumerate monitors: {e}"),
        })?;
        let primary = monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| monitors.first())
            .ok_or_else(|| WindowError::EnumerationFailed {
                message: "no monitors found".to_string(),
            })?;

        let width = primary.width().map_err(|e| WindowError::EnumerationFailed {
            message: format!("Failed to read monitor width: {e}"),
        })?;
        let height = primary.height().map_err(|e| WindowError::EnumerationFailed {
            message: format!("Failed to read monitor height: {e}"),
        })?;
        Ok(Size::new(
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        ))
    }
}
