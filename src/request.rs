//! Geometry update requests.

use crate::rect::{Point, Size};
use crate::view::{RoundType, ViewId};

/// One geometry or style change on its way through the tree.
///
/// - `source == target`: the change originated at `target` (a public mutator was called on it).
/// - `source != target` during a perform hook: the container `source` is forcing the geometry of
///   its child `target`. The child applies it unconditionally.
/// - in a report hook, `target` is the descendant whose geometry changed and `source` is where
///   the change came from. Reports only travel upwards.
///
/// Requests are built on the spot and never stored by views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateRequest<T> {
    source: ViewId,
    target: ViewId,
    value: T,
}

impl<T> UpdateRequest<T> {
    pub fn new(source: ViewId, target: ViewId, value: T) -> Self {
        UpdateRequest {
            source,
            target,
            value,
        }
    }

    /// The view the change originated from.
    pub fn source(&self) -> ViewId {
        self.source
    }

    /// The view whose geometry changes.
    pub fn target(&self) -> ViewId {
        self.target
    }

    /// The new value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// True if the view changed on its own rather than being laid out by its container.
    pub fn is_local(&self) -> bool {
        self.source == self.target
    }
}

/// A geometry or style value of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Update {
    Size(Size),
    Position(Point),
    RoundType(RoundType),
    RoundRadius(f32),
}

impl From<Size> for Update {
    fn from(size: Size) -> Update {
        Update::Size(size)
    }
}

impl From<Point> for Update {
    fn from(position: Point) -> Update {
        Update::Position(position)
    }
}

impl From<RoundType> for Update {
    fn from(round_type: RoundType) -> Update {
        Update::RoundType(round_type)
    }
}

impl From<f32> for Update {
    fn from(radius: f32) -> Update {
        Update::RoundRadius(radius)
    }
}

impl<T: Into<Update> + Copy> UpdateRequest<T> {
    pub(crate) fn erase(&self) -> UpdateRequest<Update> {
        UpdateRequest::new(self.source, self.target, self.value.into())
    }
}
