use serde::{Deserialize, Serialize};

/// A screen coordinate in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned window rectangle stored as four primitives.
///
/// Every other value (edges, the nine anchor points, size, area) is derived
/// from `left`, `top`, `width` and `height`. Setting an edge or anchor point
/// moves the rectangle and keeps its size; setting `width`, `height` or `size`
/// resizes it and keeps `left`/`top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a rect from its left/top and right/bottom edges.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top))
    }

    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }

    pub fn centerx(&self) -> i32 {
        self.left.saturating_add(self.width.div_euclid(2))
    }

    pub fn centery(&self) -> i32 {
        self.top.saturating_add(self.height.div_euclid(2))
    }

    pub fn topleft(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn midtop(&self) -> Point {
        Point::new(self.centerx(), self.top)
    }

    pub fn topright(&self) -> Point {
        Point::new(self.right(), self.top)
    }

    pub fn midleft(&self) -> Point {
        Point::new(self.left, self.centery())
    }

    pub fn center(&self) -> Point {
        Point::new(self.centerx(), self.centery())
    }

    pub fn midright(&self) -> Point {
        Point::new(self.right(), self.centery())
    }

    pub fn bottomleft(&self) -> Point {
        Point::new(self.left, self.bottom())
    }

    pub fn midbottom(&self) -> Point {
        Point::new(self.centerx(), self.bottom())
    }

    pub fn bottomright(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    /// Strict containment: points on the boundary are outside.
    pub fn contains_point(&self, point: Point) -> bool {
        point_in_rect(point.x, point.y, self.left, self.top, self.width, self.height)
    }

    pub fn set_left(&mut self, left: i32) {
        self.left = left;
    }

    pub fn set_top(&mut self, top: i32) {
        self.top = top;
    }

    pub fn set_right(&mut self, right: i32) {
        self.left = right.saturating_sub(self.width);
    }

    pub fn set_bottom(&mut self, bottom: i32) {
        self.top = bottom.saturating_sub(self.height);
    }

    pub fn set_centerx(&mut self, centerx: i32) {
        self.left = centerx.saturating_sub(self.width.div_euclid(2));
    }

    pub fn set_centery(&mut self, centery: i32) {
        self.top = centery.saturating_sub(self.height.div_euclid(2));
    }

    pub fn set_topleft(&mut self, point: Point) {
        self.set_left(point.x);
        self.set_top(point.y);
    }

    pub fn set_midtop(&mut self, point: Point) {
        self.set_centerx(point.x);
        self.set_top(point.y);
    }

    pub fn set_topright(&mut self, point: Point) {
        self.set_right(point.x);
        self.set_top(point.y);
    }

    pub fn set_midleft(&mut self, point: Point) {
        self.set_left(point.x);
        self.set_centery(point.y);
    }

    pub fn set_center(&mut self, point: Point) {
        self.set_centerx(point.x);
        self.set_centery(point.y);
    }

    pub fn set_midright(&mut self, point: Point) {
        self.set_right(point.x);
        self.set_centery(point.y);
    }

    pub fn set_bottomleft(&mut self, point: Point) {
        self.set_left(point.x);
        self.set_bottom(point.y);
    }

    pub fn set_midbottom(&mut self, point: Point) {
        self.set_centerx(point.x);
        self.set_bottom(point.y);
    }

    pub fn set_bottomright(&mut self, point: Point) {
        self.set_right(point.x);
        self.set_bottom(point.y);
    }

    pub fn set_width(&mut self, width: i32) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: i32) {
        self.height = height;
    }

    pub fn set_size(&mut self, size: Size) {
        self.width = size.width;
        self.height = size.height;
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rect(left={}, top={}, width={}, height={})",
            self.left, self.top, self.width, self.height
        )
    }
}

/// `left < x < left + width && top < y < top + height`
pub fn point_in_rect(x: i32, y: i32, left: i32, top: i32, width: i32, height: i32) -> bool {
    left < x && x < left.saturating_add(width) && top < y && y < top.saturating_add(height)
}
