//! Window identity, metadata and the uniform operation set.

pub mod errors;
pub mod handler;
pub mod types;

pub use errors::WindowError;
pub use handler::Window;
pub use types::{WindowHandle, WindowRecord, WindowState};
