//! Window rectangles and the live geometry view.

pub mod proxy;
pub mod types;

pub use proxy::{GeometryProxy, RectAccess};
pub use types::{Point, Rect, Size, point_in_rect};
