//! winctl-core: query and control top-level windows across platforms
//!
//! One [`Desktop`] owns the connection to the native window system (Win32,
//! X11 with EWMH, or macOS Accessibility) and hands out [`Window`] values
//! with a uniform set of geometry, state and command operations.
//!
//! # Main Entry Points
//!
//! - [`desktop`] - Open the window system, enumerate and look up windows
//! - [`window`] - Per-window queries and commands
//! - [`geometry`] - Rectangles and the live geometry view
//! - [`config`] - Configuration management
//!
//! ```rust,no_run
//! use winctl_core::{Desktop, WinctlConfig};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WinctlConfig::load_hierarchy()?;
//!     let desktop = Desktop::open(&config)?;
//!     if let Some(window) = desktop.active_window()? {
//!         window.move_to(100, 100, true)?;
//!         window.geometry().set_width(800)?;
//!     }
//!     desktop.shutdown();
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod desktop;
pub mod errors;
pub mod geometry;
pub mod logging;
pub mod matching;
pub mod poll;
pub mod window;

pub use backend::{BackendKind, BackendPolicy, WindowSystem};
pub use config::WinctlConfig;
pub use desktop::{Desktop, OpenError};
pub use errors::{ConfigError, WinctlError, WinctlResult};
pub use geometry::{GeometryProxy, Point, Rect, Size, point_in_rect};
pub use matching::TitleMatch;
pub use poll::{RetryPolicy, Sleeper};
pub use window::{Window, WindowError, WindowHandle, WindowRecord, WindowState};

pub use logging::init_logging;
