//! Frames: top-level containers in a context’s frame stack.

use crate::color::Color;
use crate::draw::DrawCtx;
use crate::rect::{Margin, Point, Rect, Size};
use crate::request::UpdateRequest;
use crate::tree::{QueryCtx, UpdateCtx};
use crate::view::{Response, View, ViewId, ViewKind};
use bitflags::bitflags;
use cgmath::{EuclideanSpace, Vector2, Zero};

bitflags! {
    /// Frame behavior in the frame stack.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrameFlags: u8 {
        /// While visible, takes all mouse input regardless of where the pointer is.
        const MODAL = 0x1;
        /// Closed when a press lands outside of it.
        const POPUP = 0x2;
    }
}

/// How the context sizes a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameAnchor {
    /// The frame keeps whatever geometry it is given.
    Fixed,
    /// The frame always covers the whole context.
    Fill,
}

/// Per-frame dispatch bookkeeping, kept in the frame’s tree node.
///
/// The widget references may go stale when widgets are destroyed; readers check that they are
/// still inside the frame.
#[derive(Debug, Clone)]
pub(crate) struct FrameState {
    pub flags: FrameFlags,
    pub anchor: FrameAnchor,
    pub focused_widget: Option<ViewId>,
    pub hovered_widget: Option<ViewId>,
    /// The view that accepted the last press; gets all mouse events until release.
    pub pressed_widget: Option<ViewId>,
}

impl FrameState {
    pub fn new(flags: FrameFlags, anchor: FrameAnchor) -> FrameState {
        FrameState {
            flags,
            anchor,
            focused_widget: None,
            hovered_widget: None,
            pressed_widget: None,
        }
    }
}

/// A plain frame. Stretches its subviews over its area minus the margin and paints a background.
#[derive(Debug, Clone)]
pub struct Frame {
    flags: FrameFlags,
    anchor: FrameAnchor,
    margin: Margin,
    background: Color,
}

impl Frame {
    /// A frame covering the entire context.
    pub fn new() -> Frame {
        Frame {
            flags: FrameFlags::empty(),
            anchor: FrameAnchor::Fill,
            margin: Margin::default(),
            background: Color::TRANSPARENT,
        }
    }

    /// A frame with explicit geometry.
    pub fn fixed() -> Frame {
        Frame {
            anchor: FrameAnchor::Fixed,
            ..Frame::new()
        }
    }

    /// A modal frame with explicit geometry.
    pub fn dialog() -> Frame {
        Frame {
            flags: FrameFlags::MODAL,
            ..Frame::fixed()
        }
    }

    /// A popup frame with explicit geometry; dismissed by pressing outside of it.
    pub fn popup() -> Frame {
        Frame {
            flags: FrameFlags::POPUP,
            ..Frame::fixed()
        }
    }

    pub fn with_margin(mut self, margin: Margin) -> Frame {
        self.margin = margin;
        self
    }

    pub fn with_background(mut self, background: Color) -> Frame {
        self.background = background;
        self
    }

    pub fn anchor(&self) -> FrameAnchor {
        self.anchor
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    fn layout(&self, cx: &mut UpdateCtx) {
        let area = Rect::new(Point::origin(), cx.size()).inset(self.margin);
        for child in cx.children() {
            cx.resize_child(child, area.size);
            cx.move_child(child, area.origin);
        }
    }

    fn padding(&self) -> Size {
        Vector2::new(self.margin.horizontal(), self.margin.vertical())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new()
    }
}

impl View for Frame {
    crate::impl_any!();

    fn kind(&self) -> ViewKind {
        ViewKind::Frame {
            flags: self.flags,
            anchor: self.anchor,
        }
    }

    fn perform_size_update(&mut self, request: &UpdateRequest<Size>, cx: &mut UpdateCtx) {
        cx.set_size(*request.value());
        self.layout(cx);
        if request.is_local() {
            cx.report(request);
        }
    }

    fn report_size_update(&mut self, request: &UpdateRequest<Size>, cx: &mut UpdateCtx) {
        if cx.tree().is_ancestor(cx.id(), request.target()) {
            // subviews always fill the frame
            self.layout(cx);
        }
        cx.report(request);
    }

    fn report_position_update(&mut self, request: &UpdateRequest<Point>, cx: &mut UpdateCtx) {
        if cx.tree().is_ancestor(cx.id(), request.target()) {
            self.layout(cx);
        }
        cx.report(request);
    }

    fn child_added(&mut self, _child: ViewId, cx: &mut UpdateCtx) {
        self.layout(cx);
    }

    fn preferred_size(&self, cx: &QueryCtx) -> Size {
        let tree = cx.tree();
        let content = cx.children().fold(Size::zero(), |acc, child| {
            let size = tree.preferred_size(child);
            Vector2::new(acc.x.max(size.x), acc.y.max(size.y))
        });
        content + self.padding()
    }

    fn minimum_size(&self, cx: &QueryCtx) -> Size {
        let tree = cx.tree();
        let content = cx.children().fold(Size::zero(), |acc, child| {
            let size = tree.minimum_size(child);
            Vector2::new(acc.x.max(size.x), acc.y.max(size.y))
        });
        content + self.padding()
    }

    fn draw(&mut self, cx: &mut DrawCtx) -> Response {
        if self.background.a > 0. {
            cx.fill(self.background);
        }
        Response::Ignore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;
    use crate::Context;

    #[test]
    fn fills_subviews_minus_margin() {
        let mut context = Context::new();
        let frame = context.insert(Frame::fixed().with_margin(Margin::uniform(4)));
        let content = context.insert(Probe::container("content"));
        context.push_frame(frame).unwrap();
        context.tree_mut().push_back_child(frame, content).unwrap();

        context.tree_mut().resize(frame, Size::new(100, 50));
        assert_eq!(context.tree().size(content), Some(Size::new(92, 42)));
        assert_eq!(context.tree().position(content), Some(Point::new(4, 4)));

        // a subview resizing itself is put back in place
        context.tree_mut().resize(content, Size::new(10, 10));
        assert_eq!(context.tree().size(content), Some(Size::new(92, 42)));
    }

    #[test]
    fn size_hints_include_margin() {
        let mut context = Context::new();
        let frame = context.insert(Frame::fixed().with_margin(Margin::uniform(2)));
        let a = context.insert(Probe::leaf("a").with_preferred(Size::new(30, 10)));
        let b = context.insert(Probe::leaf("b").with_preferred(Size::new(20, 40)));
        context.tree_mut().push_back_child(frame, a).unwrap();
        context.tree_mut().push_back_child(frame, b).unwrap();
        assert_eq!(context.tree().preferred_size(frame), Size::new(34, 44));
    }

    #[test]
    fn constructors() {
        assert_eq!(Frame::new().anchor(), FrameAnchor::Fill);
        assert_eq!(Frame::popup().anchor(), FrameAnchor::Fixed);
        assert_eq!(
            Frame::dialog().kind(),
            ViewKind::Frame {
                flags: FrameFlags::MODAL,
                anchor: FrameAnchor::Fixed,
            }
        );
    }

    #[test]
    fn flags_live_in_the_tree() {
        let mut context = Context::new();
        let frame = context.insert(Frame::popup());
        context.push_frame(frame).unwrap();
        assert_eq!(context.tree().frame_flags(frame), Some(FrameFlags::POPUP));

        context.set_frame_flags(frame, FrameFlags::MODAL).unwrap();
        assert_eq!(context.tree().frame_flags(frame), Some(FrameFlags::MODAL));
    }
}
