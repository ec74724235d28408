use crate::draw::DrawCtx;
use crate::events::{KeyEvent, MouseEvent};
use crate::frame::{FrameAnchor, FrameFlags};
use crate::rect::{Point, Size};
use crate::request::UpdateRequest;
use crate::tree::{EventCtx, QueryCtx, UpdateCtx};
use bitflags::bitflags;
use cgmath::Zero;
use core::any::Any;
use core::fmt;

/// A handle to a view in a [`ViewTree`](crate::ViewTree).
///
/// Handles are generational: once the view is destroyed, its handle never resolves again, even if
/// the slot is reused by a new view.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId {
    index: u32,
    generation: u32,
}

impl ViewId {
    pub(crate) fn new(index: u32, generation: u32) -> ViewId {
        ViewId { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ViewId({}v{})", self.index, self.generation)
    }
}

bitflags! {
    /// Which corners of a view’s background are rounded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RoundType: u8 {
        const TOP_LEFT = 0x1;
        const TOP_RIGHT = 0x2;
        const BOTTOM_RIGHT = 0x4;
        const BOTTOM_LEFT = 0x8;
        const TOP = Self::TOP_LEFT.bits() | Self::TOP_RIGHT.bits();
        const BOTTOM = Self::BOTTOM_LEFT.bits() | Self::BOTTOM_RIGHT.bits();
        const ALL = Self::TOP.bits() | Self::BOTTOM.bits();
    }
}

/// What kind of node a view becomes when inserted into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// A leaf; cannot have subviews.
    Widget,
    /// May have subviews.
    Container,
    /// A container that can only live in a context’s frame stack.
    Frame {
        flags: FrameFlags,
        anchor: FrameAnchor,
    },
}

/// Result of drawing a view or handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// For events: not handled, let the parent have a go. For drawing: go on and draw the
    /// subviews.
    Ignore,
    /// For events: handled, stop bubbling. For drawing: the view painted everything, skip the
    /// subviews.
    Finish,
}

/// Implements `as_any` and `as_any_mut` inside an `impl View for ...` block.
#[macro_export]
macro_rules! impl_any {
    () => {
        fn as_any(&self) -> &dyn ::core::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
            self
        }
    };
}

/// Views are the nodes of the tree: each one is a table of capabilities (geometry tests, update
/// hooks, hit testing, size hints, drawing and input) that the tree calls into.
///
/// Views don’t store their own geometry. Position, size and corner style live in the tree node and
/// are read and written through the context passed to each hook. While a hook runs, the view has
/// been taken out of the tree; operations on it from within the hook are queued and run as soon
/// as the hook returns.
///
/// All methods except the `as_any` pair have defaults suitable for a plain leaf.
pub trait View: Any + fmt::Debug {
    /// For downcasting; use [`impl_any!`].
    fn as_any(&self) -> &dyn Any;

    /// For downcasting; use [`impl_any!`].
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Read once when the view is inserted into a tree.
    fn kind(&self) -> ViewKind {
        ViewKind::Widget
    }

    /// Called before a locally-originated resize; returning false drops the request silently.
    fn size_update_test(&self, _request: &UpdateRequest<Size>) -> bool {
        true
    }

    fn position_update_test(&self, _request: &UpdateRequest<Point>) -> bool {
        true
    }

    fn round_type_update_test(&self, _request: &UpdateRequest<RoundType>) -> bool {
        true
    }

    fn round_radius_update_test(&self, _request: &UpdateRequest<f32>) -> bool {
        true
    }

    /// Applies a new size to this view.
    ///
    /// Containers override this to lay out their subviews through [`UpdateCtx::resize_child`]
    /// and friends. Overrides must call [`UpdateCtx::report`] when the request is local so that
    /// ancestors hear about it.
    fn perform_size_update(&mut self, request: &UpdateRequest<Size>, cx: &mut UpdateCtx) {
        cx.set_size(*request.value());
        if request.is_local() {
            cx.report(request);
        }
    }

    fn perform_position_update(&mut self, request: &UpdateRequest<Point>, cx: &mut UpdateCtx) {
        cx.set_position(*request.value());
        if request.is_local() {
            cx.report(request);
        }
    }

    fn perform_round_type_update(
        &mut self,
        request: &UpdateRequest<RoundType>,
        cx: &mut UpdateCtx,
    ) {
        cx.set_round_type(*request.value());
        if request.is_local() {
            cx.report(request);
        }
    }

    fn perform_round_radius_update(&mut self, request: &UpdateRequest<f32>, cx: &mut UpdateCtx) {
        cx.set_round_radius(*request.value());
        if request.is_local() {
            cx.report(request);
        }
    }

    /// A descendant changed its size on its own.
    ///
    /// Must not write this view’s own geometry. The default passes the report on to the parent.
    fn report_size_update(&mut self, request: &UpdateRequest<Size>, cx: &mut UpdateCtx) {
        cx.report(request);
    }

    fn report_position_update(&mut self, request: &UpdateRequest<Point>, cx: &mut UpdateCtx) {
        cx.report(request);
    }

    fn report_round_type_update(
        &mut self,
        request: &UpdateRequest<RoundType>,
        cx: &mut UpdateCtx,
    ) {
        cx.report(request);
    }

    fn report_round_radius_update(&mut self, request: &UpdateRequest<f32>, cx: &mut UpdateCtx) {
        cx.report(request);
    }

    /// A subview was attached (or moved within this view’s subviews).
    fn child_added(&mut self, _child: ViewId, _cx: &mut UpdateCtx) {}

    /// A subview was detached or destroyed. `child` may no longer resolve.
    fn child_removed(&mut self, _child: ViewId, _cx: &mut UpdateCtx) {}

    /// Size hint for the parent’s layout. Must be free of side effects.
    fn preferred_size(&self, _cx: &QueryCtx) -> Size {
        Size::zero()
    }

    fn minimum_size(&self, _cx: &QueryCtx) -> Size {
        Size::zero()
    }

    fn maximum_size(&self, _cx: &QueryCtx) -> Size {
        Size::new(i32::MAX, i32::MAX)
    }

    /// Whether the view wants a share of leftover horizontal space.
    fn expand_x(&self, _cx: &QueryCtx) -> bool {
        false
    }

    fn expand_y(&self, _cx: &QueryCtx) -> bool {
        false
    }

    /// Hit test; `point` is in the parent’s coordinate system.
    fn contain(&self, point: Point, cx: &QueryCtx) -> bool {
        cx.rect().contains(point)
    }

    /// Draws the view in its local coordinate system.
    fn draw(&mut self, _cx: &mut DrawCtx) -> Response {
        Response::Ignore
    }

    fn perform_mouse_press(&mut self, _event: &MouseEvent, _cx: &mut EventCtx) -> Response {
        Response::Ignore
    }

    fn perform_mouse_release(&mut self, _event: &MouseEvent, _cx: &mut EventCtx) -> Response {
        Response::Ignore
    }

    fn perform_mouse_move(&mut self, _event: &MouseEvent, _cx: &mut EventCtx) -> Response {
        Response::Ignore
    }

    fn perform_key_press(&mut self, _event: &KeyEvent, _cx: &mut EventCtx) -> Response {
        Response::Ignore
    }

    fn perform_key_release(&mut self, _event: &KeyEvent, _cx: &mut EventCtx) -> Response {
        Response::Ignore
    }

    fn perform_hover_in(&mut self, _cx: &mut EventCtx) {}

    fn perform_hover_out(&mut self, _cx: &mut EventCtx) {}

    /// Called after the view became the focus holder.
    fn perform_focus_on(&mut self, _cx: &mut EventCtx) {}

    /// Called while the view is still the focus holder, right before focus moves on.
    fn perform_focus_off(&mut self, _cx: &mut EventCtx) {}
}
