use std::cell::Cell;

use tracing::debug;

use super::types::{Point, Rect, Size};
use crate::window::errors::WindowError;

/// Source and sink of a window's live rectangle.
pub trait RectAccess {
    /// Ask the OS for the current rectangle.
    fn read_rect(&self) -> Result<Rect, WindowError>;

    /// Request a new rectangle, optionally polling until the OS reports it.
    ///
    /// Returns whether the observed geometry matches the request.
    fn write_rect(&self, rect: Rect, wait: bool) -> Result<bool, WindowError>;
}

impl<T: RectAccess + ?Sized> RectAccess for &T {
    fn read_rect(&self) -> Result<Rect, WindowError> {
        (**self).read_rect()
    }

    fn write_rect(&self, rect: Rect, wait: bool) -> Result<bool, WindowError> {
        (**self).write_rect(rect, wait)
    }
}

/// Live view over a window's geometry.
///
/// Reads are read-through: every accessor refreshes the four primitives from
/// the OS before computing the derived value. Writes are write-through: the
/// setter refreshes, applies the change to a copy and hands it to the adapter.
/// Nothing is locked, so concurrent changes made by the window manager or the
/// user simply win on the next refresh.
pub struct GeometryProxy<A> {
    access: A,
    cached: Cell<Rect>,
    wait: bool,
}

impl<A: RectAccess> GeometryProxy<A> {
    pub fn new(access: A) -> Self {
        Self {
            access,
            cached: Cell::new(Rect::default()),
            wait: false,
        }
    }

    /// Poll for convergence on every write.
    pub fn waiting(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// Re-read the primitives from the OS.
    pub fn refresh(&self) -> Result<Rect, WindowError> {
        let rect = self.access.read_rect()?;
        self.cached.set(rect);
        Ok(rect)
    }

    /// Last primitives seen, without touching the OS.
    pub fn cached(&self) -> Rect {
        self.cached.get()
    }

    /// Request `rect` as a whole.
    ///
    /// The cache afterwards holds what the OS reports, which differs from
    /// `rect` when the request was refused or has not landed yet.
    pub fn commit(&self, rect: Rect) -> Result<bool, WindowError> {
        debug!(event = "core.geometry.commit_started", rect = %rect, wait = self.wait);
        let converged = self.access.write_rect(rect, self.wait)?;
        let observed = self.refresh()?;
        if observed != rect {
            debug!(
                event = "core.geometry.commit_diverged",
                requested = %rect,
                observed = %observed,
                converged = converged
            );
        }
        Ok(converged)
    }

    fn read<T>(&self, f: impl FnOnce(&Rect) -> T) -> Result<T, WindowError> {
        let rect = self.refresh()?;
        Ok(f(&rect))
    }

    fn update(&self, f: impl FnOnce(&mut Rect)) -> Result<bool, WindowError> {
        let mut rect = self.refresh()?;
        f(&mut rect);
        self.commit(rect)
    }

    pub fn left(&self) -> Result<i32, WindowError> {
        self.read(|r| r.left)
    }

    pub fn top(&self) -> Result<i32, WindowError> {
        self.read(|r| r.top)
    }

    pub fn right(&self) -> Result<i32, WindowError> {
        self.read(Rect::right)
    }

    pub fn bottom(&self) -> Result<i32, WindowError> {
        self.read(Rect::bottom)
    }

    pub fn width(&self) -> Result<i32, WindowError> {
        self.read(|r| r.width)
    }

    pub fn height(&self) -> Result<i32, WindowError> {
        self.read(|r| r.height)
    }

    pub fn centerx(&self) -> Result<i32, WindowError> {
        self.read(Rect::centerx)
    }

    pub fn centery(&self) -> Result<i32, WindowError> {
        self.read(Rect::centery)
    }

    pub fn topleft(&self) -> Result<Point, WindowError> {
        self.read(Rect::topleft)
    }

    pub fn midtop(&self) -> Result<Point, WindowError> {
        self.read(Rect::midtop)
    }

    pub fn topright(&self) -> Result<Point, WindowError> {
        self.read(Rect::topright)
    }

    pub fn midleft(&self) -> Result<Point, WindowError> {
        self.read(Rect::midleft)
    }

    pub fn center(&self) -> Result<Point, WindowError> {
        self.read(Rect::center)
    }

    pub fn midright(&self) -> Result<Point, WindowError> {
        self.read(Rect::midright)
    }

    pub fn bottomleft(&self) -> Result<Point, WindowError> {
        self.read(Rect::bottomleft)
    }

    pub fn midbottom(&self) -> Result<Point, WindowError> {
        self.read(Rect::midbottom)
    }

    pub fn bottomright(&self) -> Result<Point, WindowError> {
        self.read(Rect::bottomright)
    }

    pub fn size(&self) -> Result<Size, WindowError> {
        self.read(Rect::size)
    }

    pub fn area(&self) -> Result<i64, WindowError> {
        self.read(Rect::area)
    }

    pub fn set_left(&self, left: i32) -> Result<bool, WindowError> {
        self.update(|r| r.set_left(left))
    }

    pub fn set_top(&self, top: i32) -> Result<bool, WindowError> {
        self.update(|r| r.set_top(top))
    }

    pub fn set_right(&self, right: i32) -> Result<bool, WindowError> {
        self.update(|r| r.set_right(right))
    }

    pub fn set_bottom(&self, bottom: i32) -> Result<bool, WindowError> {
        self.update(|r| r.set_bottom(bottom))
    }

    pub fn set_width(&self, width: i32) -> Result<bool, WindowError> {
        self.update(|r| r.set_width(width))
    }

    pub fn set_height(&self, height: i32) -> Result<bool, WindowError> {
        self.update(|r| r.set_height(height))
    }

    pub fn set_centerx(&self, centerx: i32) -> Result<bool, WindowError> {
        self.update(|r| r.set_centerx(centerx))
    }

    pub fn set_centery(&self, centery: i32) -> Result<bool, WindowError> {
        self.update(|r| r.set_centery(centery))
    }

    pub fn set_topleft(&self, point: impl Into<Point>) -> Result<bool, WindowError> {
        let point = point.into();
        self.update(|r| r.set_topleft(point))
    }

    pub fn set_midtop(&self, point: impl Into<Point>) -> Result<bool, WindowError> {
        let point = point.into();
        self.update(|r| r.set_midtop(point))
    }

    pub fn set_topright(&self, point: impl Into<Point>) -> Result<bool, WindowError> {
        let point = point.into();
        self.update(|r| r.set_topright(point))
    }

    pub fn set_midleft(&self, point: impl Into<Point>) -> Result<bool, WindowError> {
        let point = point.into();
        self.update(|r| r.set_midleft(point))
    }

    pub fn set_center(&self, point: impl Into<Point>) -> Result<bool, WindowError> {
        let point = point.into();
        self.update(|r| r.set_center(point))
    }

    pub fn set_midright(&self, point: impl Into<Point>) -> Result<bool, WindowError> {
        let point = point.into();
        self.update(|r| r.set_midright(point))
    }

    pub fn set_bottomleft(&self, point: impl Into<Point>) -> Result<bool, WindowError> {
        let point = point.into();
        self.update(|r| r.set_bottomleft(point))
    }

    pub fn set_midbottom(&self, point: impl Into<Point>) -> Result<bool, WindowError> {
        let point = point.into();
        self.update(|r| r.set_midbottom(point))
    }

    pub fn set_bottomright(&self, point: impl Into<Point>) -> Result<bool, WindowError> {
        let point = point.into();
        self.update(|r| r.set_bottomright(point))
    }

    pub fn set_size(&self, size: impl Into<Size>) -> Result<bool, WindowError> {
        let size = size.into();
        self.update(|r| r.set_size(size))
    }
}
