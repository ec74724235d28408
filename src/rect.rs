//! Rectangles and other geometry primitives.
//!
//! All geometry is in integer pixels. Positions are relative to the parent view’s origin; the
//! y-axis points down.

use cgmath::{EuclideanSpace, Point2, Vector2, Zero};
use std::ops;

/// A point.
pub type Point = Point2<i32>;

/// A size; `x` is the width and `y` is the height.
pub type Size = Vector2<i32>;

/// Clamps both components of a size to be non-negative.
pub fn clamp_size(size: Size) -> Size {
    Size::new(size.x.max(0), size.y.max(0))
}

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point,

    /// Rectangle size.
    pub size: Size,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point, size: Size) -> Rect {
        Rect { origin, size }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point::origin(),
            size: Size::zero(),
        }
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// The right and bottom edges are exclusive, so a zero-sized rectangle contains nothing.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    /// Returns true if the two rectangles intersect.
    pub fn intersects(&self, rect: Rect) -> bool {
        let own_opposite = self.origin + self.size;
        let rect_opposite = rect.origin + rect.size;

        self.origin.x < rect_opposite.x
            && self.origin.y < rect_opposite.y
            && rect.origin.x < own_opposite.x
            && rect.origin.y < own_opposite.y
    }

    /// Returns the intersection rectangle.
    pub fn intersect(&self, rect: Rect) -> Option<Rect> {
        if !self.intersects(rect) {
            return None;
        }

        let min_x = self.origin.x.max(rect.origin.x);
        let min_y = self.origin.y.max(rect.origin.y);
        let max_x = (self.origin.x + self.size.x).min(rect.origin.x + rect.size.x);
        let max_y = (self.origin.y + self.size.y).min(rect.origin.y + rect.size.y);

        Some(Rect {
            origin: Point::new(min_x, min_y),
            size: Size::new(max_x - min_x, max_y - min_y),
        })
    }

    /// Returns a new rectangle shrunk by the margin. The size never goes negative.
    pub fn inset(&self, margin: Margin) -> Rect {
        Rect {
            origin: Point::new(self.origin.x + margin.left, self.origin.y + margin.top),
            size: clamp_size(Size::new(
                self.size.x - margin.horizontal(),
                self.size.y - margin.vertical(),
            )),
        }
    }

    /// Returns a new rectangle with the given origin.
    pub fn with_origin(&self, origin: Point) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }
}

impl ops::Add<Size> for Rect {
    type Output = Rect;
    fn add(self, offset: Size) -> Rect {
        Rect {
            origin: self.origin + offset,
            size: self.size,
        }
    }
}

/// Space kept free around the contents of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Margin {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Margin {
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Margin {
        Margin {
            left,
            right,
            top,
            bottom,
        }
    }

    /// The same margin on all four sides.
    pub fn uniform(value: i32) -> Margin {
        Margin::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}
