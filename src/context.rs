//! The root of a view tree: frame stack, focus and hover tracking, input dispatch and drawing.

use crate::cursor::CursorShape;
use crate::draw::{DrawCtx, Renderer};
use crate::error::TreeError;
use crate::events::{KeyAction, KeyEvent, MouseAction, MouseEvent};
use crate::frame::{FrameAnchor, FrameFlags, FrameState};
use crate::rect::{Point, Size};
use crate::request::UpdateRequest;
use crate::tree::{Children, EventCtx, QueryCtx, UpdateCtx, ViewTree};
use crate::view::{Response, View, ViewId, ViewKind};
use cgmath::{EuclideanSpace, Zero};
use log::{debug, trace, warn};

/// The view at the root of every context’s tree. Its subviews are the frames.
#[derive(Debug)]
struct RootView;

impl RootView {
    fn fit_frame(cx: &mut UpdateCtx, frame: ViewId) {
        if cx.tree().frame_anchor(frame) == Some(FrameAnchor::Fill) {
            let size = cx.size();
            cx.move_child(frame, Point::origin());
            cx.resize_child(frame, size);
        }
    }
}

impl View for RootView {
    crate::impl_any!();

    fn kind(&self) -> ViewKind {
        ViewKind::Container
    }

    fn perform_size_update(&mut self, request: &UpdateRequest<Size>, cx: &mut UpdateCtx) {
        cx.set_size(*request.value());
        for frame in cx.children() {
            RootView::fit_frame(cx, frame);
        }
    }

    fn child_added(&mut self, child: ViewId, cx: &mut UpdateCtx) {
        RootView::fit_frame(cx, child);
    }

    fn report_size_update(&mut self, _: &UpdateRequest<Size>, _: &mut UpdateCtx) {}

    fn report_position_update(&mut self, _: &UpdateRequest<Point>, _: &mut UpdateCtx) {}

    fn report_round_type_update(
        &mut self,
        _: &UpdateRequest<crate::view::RoundType>,
        _: &mut UpdateCtx,
    ) {
    }

    fn report_round_radius_update(&mut self, _: &UpdateRequest<f32>, _: &mut UpdateCtx) {}

    fn contain(&self, _point: Point, _cx: &QueryCtx) -> bool {
        true
    }
}

/// A UI context.
///
/// Owns a view tree whose root’s subviews form the frame stack (last is topmost). Tracks which
/// frame has keyboard focus and which one is under the pointer, and within each frame, the focused,
/// hovered and pressed widget. Input events enter here and are routed to views.
///
/// Stale frame and widget references (after a view was destroyed) are dropped on access, without
/// focus-off or hover-out callbacks.
#[derive(Debug)]
pub struct Context {
    tree: ViewTree,
    focused_frame: Option<ViewId>,
    hovered_frame: Option<ViewId>,
    cursor_position: Point,
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Context {
    pub fn new() -> Context {
        Context {
            tree: ViewTree::new(Box::new(RootView)),
            focused_frame: None,
            hovered_frame: None,
            cursor_position: Point::origin(),
        }
    }

    pub fn root(&self) -> ViewId {
        self.tree.root()
    }

    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ViewTree {
        &mut self.tree
    }

    /// Adds a detached view to the tree; see [`ViewTree::insert`].
    pub fn insert<V: View>(&mut self, view: V) -> ViewId {
        self.tree.insert(view)
    }

    pub fn size(&self) -> Size {
        self.tree.size(self.root()).unwrap_or_else(Size::zero)
    }

    /// Resizes the context. `Fill` frames follow.
    pub fn resize(&mut self, size: Size) {
        debug!("resizing context to {}x{}", size.x, size.y);
        let root = self.root();
        self.tree.resize(root, size);
    }

    /// Destroys a view and drops any references to it.
    pub fn destroy(&mut self, view: ViewId) -> Result<(), TreeError> {
        let result = self.tree.destroy(view);
        self.prune();
        result
    }

    // ---- frame stack ----

    /// Iterates over frames from bottom to top.
    pub fn frames(&self) -> Children<'_> {
        self.tree.children(self.root())
    }

    fn in_stack(&self, frame: ViewId) -> bool {
        self.tree.parent(frame) == Some(self.root())
    }

    /// Pushes a frame on top of the stack. A frame that is already in the stack is raised.
    pub fn push_frame(&mut self, frame: ViewId) -> Result<(), TreeError> {
        let root = self.root();
        self.tree.push_back_child(root, frame)?;
        debug!("pushed frame {:?}", frame);
        Ok(())
    }

    /// Moves a frame to the top of the stack.
    pub fn raise_frame(&mut self, frame: ViewId) -> Result<(), TreeError> {
        if !self.in_stack(frame) {
            return Err(self.not_in_stack(frame));
        }
        self.push_frame(frame)
    }

    /// Detaches the topmost frame and returns it.
    pub fn pop_frame(&mut self) -> Option<ViewId> {
        let frame = self.tree.last_child(self.root())?;
        match self.remove_frame(frame) {
            Ok(()) => Some(frame),
            Err(err) => {
                warn!("could not pop frame {:?}: {}", frame, err);
                None
            }
        }
    }

    /// Detaches a frame from the stack without destroying it. A focused or hovered frame gets its
    /// focus-off or hover-out first.
    pub fn remove_frame(&mut self, frame: ViewId) -> Result<(), TreeError> {
        self.prune();
        if !self.in_stack(frame) {
            return Err(self.not_in_stack(frame));
        }
        if self.focused_frame == Some(frame) {
            self.set_focused_frame(None);
        }
        if self.hovered_frame == Some(frame) {
            self.set_hovered_frame(None);
        }
        if let Some(state) = self.tree.frame_state_mut(frame) {
            state.focused_widget = None;
            state.hovered_widget = None;
            state.pressed_widget = None;
        }
        if !self.tree.is_alive(frame) {
            // destroyed by one of the callbacks
            return Ok(());
        }
        let root = self.root();
        self.tree.remove_child(root, frame)?;
        debug!("removed frame {:?}", frame);
        Ok(())
    }

    /// Removes a frame from the stack and destroys it.
    pub fn close_frame(&mut self, frame: ViewId) -> Result<(), TreeError> {
        self.remove_frame(frame)?;
        if self.tree.is_alive(frame) {
            self.tree.destroy(frame)?;
        }
        Ok(())
    }

    pub fn set_frame_flags(&mut self, frame: ViewId, flags: FrameFlags) -> Result<(), TreeError> {
        if !self.tree.is_alive(frame) {
            return Err(TreeError::NoSuchView(frame));
        }
        match self.tree.frame_state_mut(frame) {
            Some(state) => {
                state.flags = flags;
                Ok(())
            }
            None => Err(TreeError::NotAFrame(frame)),
        }
    }

    fn not_in_stack(&self, frame: ViewId) -> TreeError {
        if self.tree.is_alive(frame) {
            TreeError::NotAChild {
                parent: self.root(),
                child: frame,
            }
        } else {
            TreeError::NoSuchView(frame)
        }
    }

    // ---- focus & hover ----

    /// Drops references to frames that were destroyed or left the stack.
    fn prune(&mut self) {
        if let Some(frame) = self.focused_frame {
            if !self.in_stack(frame) {
                debug!("focused frame {:?} is gone", frame);
                self.focused_frame = None;
            }
        }
        if let Some(frame) = self.hovered_frame {
            if !self.in_stack(frame) {
                trace!("hovered frame {:?} is gone", frame);
                self.hovered_frame = None;
            }
        }
    }

    /// Reads a widget reference from a frame’s state, if it still points into the frame.
    fn frame_ref(&self, frame: ViewId, pick: impl Fn(&FrameState) -> Option<ViewId>) -> Option<ViewId> {
        let view = pick(self.tree.frame_state(frame)?)?;
        if view == frame || self.tree.is_ancestor(frame, view) {
            Some(view)
        } else {
            None
        }
    }

    pub fn focused_frame(&self) -> Option<ViewId> {
        self.focused_frame.filter(|frame| self.in_stack(*frame))
    }

    pub fn hovered_frame(&self) -> Option<ViewId> {
        self.hovered_frame.filter(|frame| self.in_stack(*frame))
    }

    /// The focused frame’s focused widget.
    pub fn focused_widget(&self) -> Option<ViewId> {
        let frame = self.focused_frame()?;
        self.frame_ref(frame, |state| state.focused_widget)
    }

    /// The widget under the pointer.
    pub fn hovered_widget(&self) -> Option<ViewId> {
        let frame = self.hovered_frame()?;
        self.frame_ref(frame, |state| state.hovered_widget)
    }

    /// The view that accepted the last press and captures the mouse until release.
    pub fn pressed_widget(&self) -> Option<ViewId> {
        let frame = self.capture_frame()?;
        self.frame_ref(frame, |state| state.pressed_widget)
    }

    fn capture_frame(&self) -> Option<ViewId> {
        self.frames()
            .find(|frame| self.frame_ref(*frame, |state| state.pressed_widget).is_some())
    }

    fn notify(&mut self, view: ViewId, f: impl FnOnce(&mut dyn View, &mut EventCtx)) {
        self.tree
            .with_view(view, |v, tree| f(v, &mut EventCtx::new(tree, view)));
    }

    /// Moves keyboard focus to another frame (or nowhere).
    ///
    /// The old frame’s focused widget loses focus first, then the old frame, and then the new
    /// frame gets its focus-on. Frames that aren’t in the stack can’t take focus.
    pub fn set_focused_frame(&mut self, frame: Option<ViewId>) {
        self.prune();
        if let Some(frame) = frame {
            if !self.in_stack(frame) {
                warn!("{:?} is not in the frame stack and cannot take focus", frame);
                return;
            }
        }
        if self.focused_frame == frame {
            return;
        }

        if let Some(old) = self.focused_frame.take() {
            self.set_focused_widget(old, None);
            if self.in_stack(old) {
                self.notify(old, |view, cx| view.perform_focus_off(cx));
            }
        }
        self.focused_frame = frame.filter(|frame| self.in_stack(*frame));
        if let Some(new) = self.focused_frame {
            self.notify(new, |view, cx| view.perform_focus_on(cx));
        }
        debug!("focused frame: {:?}", self.focused_frame);
    }

    fn set_hovered_frame(&mut self, frame: Option<ViewId>) {
        if self.hovered_frame == frame {
            return;
        }

        if let Some(old) = self.hovered_frame.take() {
            self.set_hovered_widget(old, None);
            if self.in_stack(old) {
                self.notify(old, |view, cx| view.perform_hover_out(cx));
            }
        }
        self.hovered_frame = frame.filter(|frame| self.in_stack(*frame));
        if let Some(new) = self.hovered_frame {
            self.notify(new, |view, cx| view.perform_hover_in(cx));
        }
        trace!("hovered frame: {:?}", self.hovered_frame);
    }

    fn set_hovered_widget(&mut self, frame: ViewId, widget: Option<ViewId>) {
        let old = self.frame_ref(frame, |state| state.hovered_widget);
        if old == widget {
            return;
        }
        if let Some(state) = self.tree.frame_state_mut(frame) {
            state.hovered_widget = None;
        }
        if let Some(old) = old {
            self.notify(old, |view, cx| view.perform_hover_out(cx));
        }
        let widget = widget.filter(|widget| self.tree.is_alive(*widget));
        if let Some(state) = self.tree.frame_state_mut(frame) {
            state.hovered_widget = widget;
        }
        if let Some(new) = widget {
            self.notify(new, |view, cx| view.perform_hover_in(cx));
        }
    }

    fn set_focused_widget(&mut self, frame: ViewId, widget: Option<ViewId>) {
        let old = self.frame_ref(frame, |state| state.focused_widget);
        if old == widget {
            return;
        }
        if let Some(state) = self.tree.frame_state_mut(frame) {
            state.focused_widget = None;
        }
        if let Some(old) = old {
            self.notify(old, |view, cx| view.perform_focus_off(cx));
        }
        let widget = widget.filter(|widget| self.tree.is_alive(*widget));
        if let Some(state) = self.tree.frame_state_mut(frame) {
            state.focused_widget = widget;
        }
        if let Some(new) = widget {
            self.notify(new, |view, cx| view.perform_focus_on(cx));
        }
        trace!("focused widget in {:?}: {:?}", frame, widget);
    }

    /// Focuses a view’s frame and, within it, the view.
    pub fn focus_widget(&mut self, view: ViewId) -> Result<(), TreeError> {
        let frame = match self.tree.frame_of(view) {
            Some(frame) => frame,
            None => return Err(self.not_in_stack(view)),
        };
        self.set_focused_frame(Some(frame));
        if view != frame {
            self.set_focused_widget(frame, Some(view));
        }
        Ok(())
    }

    // ---- dispatch ----

    pub fn cursor_position(&self) -> Point {
        self.cursor_position
    }

    /// Converts window coordinates to the root’s parent coordinate system.
    fn to_root(&self, point: Point) -> Point {
        point - self.tree.position(self.root()).unwrap_or_else(Point::origin).to_vec()
    }

    /// The frame that gets mouse input at `point` (in window coordinates): the topmost visible
    /// modal frame, or else the topmost visible frame containing the point.
    fn hit_frame(&self, point: Point) -> Option<ViewId> {
        let point = self.to_root(point);
        let frames: Vec<_> = self
            .frames()
            .rev()
            .filter(|frame| self.tree.is_visible(*frame))
            .collect();

        let modal = frames.iter().cloned().find(|frame| {
            self.tree
                .frame_flags(*frame)
                .map_or(false, |flags| flags.contains(FrameFlags::MODAL))
        });
        modal.or_else(|| {
            frames
                .into_iter()
                .find(|frame| self.tree.contain(*frame, point))
        })
    }

    /// Closes popups above the frame under a press.
    fn dismiss_popups(&mut self, point: Point) {
        let point = self.to_root(point);
        let frames: Vec<_> = self.frames().rev().collect();
        for frame in frames {
            if !self.tree.is_visible(frame) {
                continue;
            }
            if self.tree.contain(frame, point) {
                break;
            }
            let flags = self.tree.frame_flags(frame).unwrap_or_default();
            if flags.contains(FrameFlags::POPUP) {
                debug!("dismissing popup {:?}", frame);
                if let Err(err) = self.close_frame(frame) {
                    warn!("could not dismiss popup {:?}: {}", frame, err);
                }
            } else if flags.contains(FrameFlags::MODAL) {
                break;
            }
        }
    }

    /// Dispatches a mouse event in window coordinates.
    ///
    /// The event first selects a frame (presses also move focus to it), then within the frame
    /// goes to the view that accepted the last press, or else the innermost view under the
    /// pointer, and bubbles up towards the frame until a view finishes it.
    pub fn dispatch_mouse_event(&mut self, event: MouseEvent) -> Response {
        self.prune();
        self.cursor_position = event.window_location;
        trace!("dispatching {:?}", event);

        if event.action == MouseAction::Press {
            self.dismiss_popups(event.window_location);
        }

        let capture = match event.action {
            MouseAction::Press => None,
            _ => self.capture_frame(),
        };
        let hit = self.hit_frame(event.window_location);
        self.set_hovered_frame(hit);
        let frame = match capture.or(hit) {
            Some(frame) => frame,
            None => return Response::Ignore,
        };

        if event.action == MouseAction::Press {
            self.set_focused_frame(Some(frame));
        }
        if !self.in_stack(frame) {
            return Response::Ignore;
        }
        self.dispatch_in_frame(frame, event)
    }

    fn dispatch_in_frame(&mut self, frame: ViewId, mut event: MouseEvent) -> Response {
        let under = if self.hovered_frame == Some(frame) {
            let point = self.to_root(event.window_location);
            self.tree.hit_test(frame, point).unwrap_or(frame)
        } else {
            // captured from outside the frame
            frame
        };
        self.set_hovered_widget(frame, if under == frame { None } else { Some(under) });

        let captured = match event.action {
            MouseAction::Press => None,
            _ => self.frame_ref(frame, |state| state.pressed_widget),
        };

        let mut response = Response::Ignore;
        let mut current = Some(captured.unwrap_or(under));
        while let Some(view) = current {
            let origin = match self.tree.window_origin(view) {
                Some(origin) => origin,
                None => break,
            };
            event.location = event.window_location - origin.to_vec();

            response = self
                .tree
                .with_view(view, |v, tree| {
                    let mut cx = EventCtx::new(tree, view);
                    match event.action {
                        MouseAction::Press => v.perform_mouse_press(&event, &mut cx),
                        MouseAction::Release => v.perform_mouse_release(&event, &mut cx),
                        MouseAction::Move => v.perform_mouse_move(&event, &mut cx),
                    }
                })
                .unwrap_or(Response::Ignore);

            if response == Response::Finish {
                trace!("{:?} finished {:?}", view, event.action);
                if event.action == MouseAction::Press && self.tree.is_alive(view) {
                    if let Some(state) = self.tree.frame_state_mut(frame) {
                        state.pressed_widget = Some(view);
                    }
                    if view != frame {
                        self.set_focused_widget(frame, Some(view));
                    }
                }
                break;
            }
            if view == frame {
                break;
            }
            current = self.tree.parent(view);
        }

        if event.action == MouseAction::Release {
            if let Some(state) = self.tree.frame_state_mut(frame) {
                state.pressed_widget = None;
            }
        }
        response
    }

    /// Dispatches a key event to the focused widget of the focused frame, bubbling up to the
    /// frame. Dropped if no frame has focus.
    pub fn dispatch_key_event(&mut self, event: KeyEvent) -> Response {
        self.prune();
        let frame = match self.focused_frame {
            Some(frame) => frame,
            None => {
                trace!("no focused frame, dropping {:?}", event);
                return Response::Ignore;
            }
        };

        let mut current = Some(
            self.frame_ref(frame, |state| state.focused_widget)
                .unwrap_or(frame),
        );
        while let Some(view) = current {
            let response = self
                .tree
                .with_view(view, |v, tree| {
                    let mut cx = EventCtx::new(tree, view);
                    match event.action {
                        KeyAction::Press | KeyAction::Repeat => v.perform_key_press(&event, &mut cx),
                        KeyAction::Release => v.perform_key_release(&event, &mut cx),
                    }
                })
                .unwrap_or(Response::Ignore);
            if response == Response::Finish {
                trace!("{:?} finished {:?}", view, event.key);
                return response;
            }
            if view == frame {
                break;
            }
            current = self.tree.parent(view);
        }
        Response::Ignore
    }

    // ---- drawing ----

    pub fn needs_redraw(&self) -> bool {
        self.tree.needs_redraw()
    }

    pub fn request_redraw(&mut self) {
        self.tree.request_redraw();
    }

    /// Draws all visible frames from bottom to top.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        self.tree.take_redraw();
        renderer.begin_frame(self.size());
        {
            let mut cx = DrawCtx::new(&mut *renderer);
            let root = self.root();
            self.tree.draw(root, &mut cx);
        }
        renderer.end_frame();
    }

    // ---- cursor ----

    pub fn push_cursor(&mut self, shape: CursorShape) {
        self.tree.push_cursor(shape);
    }

    pub fn pop_cursor(&mut self) -> Option<CursorShape> {
        self.tree.pop_cursor()
    }

    pub fn cursor(&self) -> CursorShape {
        self.tree.cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::events::{KeyCode, MouseButton};
    use crate::frame::Frame;
    use crate::layout::LinearLayout;
    use crate::rect::Rect;
    use crate::testing::{init_logging, shared_log, PressAction, Probe, RecordingRenderer};
    use cgmath::Vector2;

    fn press(x: i32, y: i32) -> MouseEvent {
        MouseEvent::press(MouseButton::Left, Point::new(x, y))
    }

    fn release(x: i32, y: i32) -> MouseEvent {
        MouseEvent::release(MouseButton::Left, Point::new(x, y))
    }

    fn moved(x: i32, y: i32) -> MouseEvent {
        MouseEvent::moved(Point::new(x, y))
    }

    /// Pushes a fixed frame with the given geometry.
    fn fixed_frame(context: &mut Context, frame: Probe, rect: Rect) -> ViewId {
        let frame = context.insert(frame);
        context.push_frame(frame).unwrap();
        context.tree_mut().set_position(frame, rect.origin);
        context.tree_mut().resize(frame, rect.size);
        frame
    }

    fn place(context: &mut Context, parent: ViewId, view: Probe, rect: Rect) -> ViewId {
        let view = context.insert(view);
        context.tree_mut().push_back_child(parent, view).unwrap();
        context.tree_mut().set_position(view, rect.origin);
        context.tree_mut().resize(view, rect.size);
        view
    }

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn row_of_buttons() {
        init_logging();
        let mut context = Context::new();
        let frame = context.insert(Frame::new());
        let row = context.insert(LinearLayout::horizontal());
        context.push_frame(frame).unwrap();
        context.tree_mut().push_back_child(frame, row).unwrap();

        let buttons: Vec<_> = ["b1", "b2", "b3"]
            .iter()
            .map(|name| {
                let button = context.insert(
                    Probe::leaf(name)
                        .with_preferred(Size::new(100, 20))
                        .expanding(true, false)
                        .on_press(PressAction::Accept),
                );
                context.tree_mut().push_back_child(row, button).unwrap();
                button
            })
            .collect();
        let log = shared_log(context.tree_mut(), &buttons);

        context.resize(Size::new(250, 40));
        assert_eq!(context.tree().size(frame), Some(Size::new(250, 40)));
        let widths: Vec<_> = buttons
            .iter()
            .map(|button| context.tree().size(*button).unwrap().x)
            .collect();
        assert_eq!(widths, vec![83, 83, 84]);

        log.clear();
        let response = context.dispatch_mouse_event(press(100, 20));
        assert_eq!(response, Response::Finish);
        assert_eq!(
            log.take(),
            vec!["b2: hover in", "b2: press at (17, 10)", "b2: focus on"]
        );
        assert_eq!(context.focused_frame(), Some(frame));
        assert_eq!(context.focused_widget(), Some(buttons[1]));
        assert_eq!(context.hovered_widget(), Some(buttons[1]));
    }

    #[test]
    fn frame_focus_and_hover_order() {
        init_logging();
        let mut context = Context::new();
        let a = fixed_frame(&mut context, Probe::frame("a", FrameFlags::empty()), rect(0, 0, 100, 100));
        let b = fixed_frame(&mut context, Probe::frame("b", FrameFlags::empty()), rect(200, 0, 100, 100));
        let log = shared_log(context.tree_mut(), &[a, b]);

        context.dispatch_mouse_event(press(10, 10));
        assert_eq!(
            log.take(),
            vec!["a: hover in", "a: focus on", "a: press at (10, 10)"]
        );

        context.dispatch_mouse_event(press(250, 50));
        assert_eq!(
            log.take(),
            vec![
                "a: hover out",
                "b: hover in",
                "a: focus off",
                "b: focus on",
                "b: press at (50, 50)",
            ]
        );
        assert_eq!(context.focused_frame(), Some(b));

        // nothing under the pointer
        context.dispatch_mouse_event(moved(150, 50));
        assert_eq!(log.take(), vec!["b: hover out"]);
        assert_eq!(context.hovered_frame(), None);
        assert_eq!(context.focused_frame(), Some(b));

        context.remove_frame(b).unwrap();
        assert_eq!(log.take(), vec!["b: focus off"]);
        assert_eq!(context.focused_frame(), None);
        assert!(context.tree().is_alive(b));
    }

    #[test]
    fn widget_focus_follows_frame_focus() {
        init_logging();
        let mut context = Context::new();
        let a = fixed_frame(&mut context, Probe::frame("a", FrameFlags::empty()), rect(0, 0, 100, 100));
        let b = fixed_frame(&mut context, Probe::frame("b", FrameFlags::empty()), rect(200, 0, 100, 100));
        let wa = place(&mut context, a, Probe::leaf("wa").on_press(PressAction::Accept), rect(0, 0, 50, 50));
        let wb = place(&mut context, b, Probe::leaf("wb").on_press(PressAction::Accept), rect(0, 0, 50, 50));
        let log = shared_log(context.tree_mut(), &[a, b, wa, wb]);
        let focus_log = || -> Vec<String> {
            log.take()
                .into_iter()
                .filter(|entry| entry.contains("focus"))
                .collect()
        };

        context.dispatch_mouse_event(press(10, 10));
        context.dispatch_mouse_event(release(10, 10));
        assert_eq!(focus_log(), vec!["a: focus on", "wa: focus on"]);

        context.dispatch_mouse_event(press(210, 10));
        assert_eq!(
            focus_log(),
            vec!["wa: focus off", "a: focus off", "b: focus on", "wb: focus on"]
        );
        assert_eq!(context.focused_widget(), Some(wb));

        context.set_focused_frame(Some(a));
        assert_eq!(focus_log(), vec!["wb: focus off", "b: focus off", "a: focus on"]);
        assert_eq!(context.focused_widget(), None);

        context.focus_widget(wb).unwrap();
        log.clear();
        context.remove_frame(b).unwrap();
        assert_eq!(focus_log(), vec!["wb: focus off", "b: focus off"]);
        context.push_frame(b).unwrap();
        context.set_focused_frame(Some(b));
        assert_eq!(context.focused_widget(), None);
    }

    #[test]
    fn destroyed_views_drop_out_silently() {
        init_logging();
        let mut context = Context::new();
        let frame = fixed_frame(&mut context, Probe::frame("frame", FrameFlags::empty()), rect(0, 0, 200, 100));
        let a = place(
            &mut context,
            frame,
            Probe::leaf("a").on_press(PressAction::DestroySelf),
            rect(0, 0, 50, 50),
        );
        let b = place(&mut context, frame, Probe::leaf("b"), rect(100, 0, 50, 50));
        let log = shared_log(context.tree_mut(), &[frame, a, b]);

        context.dispatch_mouse_event(moved(10, 10));
        assert_eq!(context.hovered_widget(), Some(a));
        log.clear();

        // a destroys itself while handling the press
        assert_eq!(context.dispatch_mouse_event(press(10, 10)), Response::Finish);
        assert!(!context.tree().is_alive(a));
        assert_eq!(context.hovered_widget(), None);
        assert_eq!(context.focused_widget(), None);
        assert_eq!(
            log.take(),
            vec!["frame: focus on", "a: press at (10, 10)", "frame: removed a"]
        );

        context.dispatch_mouse_event(moved(110, 10));
        assert_eq!(context.hovered_widget(), Some(b));
        assert_eq!(
            log.take(),
            vec!["b: hover in", "b: move at (10, 10)", "frame: move at (110, 10)"]
        );

        context.destroy(frame).unwrap();
        assert_eq!(context.focused_frame(), None);
        assert_eq!(context.hovered_frame(), None);
        assert!(log.take().is_empty());
        assert_eq!(context.dispatch_mouse_event(moved(10, 10)), Response::Ignore);
    }

    #[test]
    fn pressed_view_captures_the_mouse() {
        init_logging();
        let mut context = Context::new();
        let frame = fixed_frame(&mut context, Probe::frame("frame", FrameFlags::empty()), rect(0, 0, 200, 100));
        let a = place(
            &mut context,
            frame,
            Probe::leaf("a").on_press(PressAction::Accept),
            rect(10, 10, 20, 20),
        );
        let b = place(&mut context, frame, Probe::leaf("b"), rect(100, 10, 20, 20));
        let log = shared_log(context.tree_mut(), &[a, b]);

        context.dispatch_mouse_event(press(15, 15));
        assert_eq!(context.pressed_widget(), Some(a));
        log.clear();

        context.dispatch_mouse_event(moved(105, 15));
        assert_eq!(
            log.take(),
            vec!["a: hover out", "b: hover in", "a: move at (95, 5)"]
        );
        assert_eq!(context.dispatch_mouse_event(release(105, 15)), Response::Finish);
        assert_eq!(log.take(), vec!["a: release at (95, 5)"]);
        assert_eq!(context.pressed_widget(), None);

        context.dispatch_mouse_event(moved(106, 15));
        assert_eq!(log.take(), vec!["b: move at (6, 5)"]);
        assert_eq!(context.focused_widget(), Some(a));
    }

    #[test]
    fn modal_frame_takes_all_mouse_input() {
        init_logging();
        let mut context = Context::new();
        let base = fixed_frame(&mut context, Probe::frame("base", FrameFlags::empty()), rect(0, 0, 100, 100));
        let dialog = fixed_frame(&mut context, Probe::frame("dialog", FrameFlags::MODAL), rect(300, 300, 50, 50));
        let log = shared_log(context.tree_mut(), &[base, dialog]);

        context.dispatch_mouse_event(press(10, 10));
        assert_eq!(context.focused_frame(), Some(dialog));
        assert_eq!(
            log.take(),
            vec!["dialog: hover in", "dialog: focus on", "dialog: press at (-290, -290)"]
        );

        context.tree_mut().set_visible(dialog, false);
        context.dispatch_mouse_event(press(10, 10));
        assert_eq!(context.focused_frame(), Some(base));
    }

    #[test]
    fn press_outside_closes_popups() {
        init_logging();
        let mut context = Context::new();
        let base = fixed_frame(&mut context, Probe::frame("base", FrameFlags::empty()), rect(0, 0, 100, 100));
        let popup = fixed_frame(&mut context, Probe::frame("popup", FrameFlags::POPUP), rect(50, 50, 20, 20));

        context.dispatch_mouse_event(press(55, 55));
        assert!(context.tree().is_alive(popup));
        assert_eq!(context.focused_frame(), Some(popup));

        context.dispatch_mouse_event(press(10, 10));
        assert!(!context.tree().is_alive(popup));
        assert_eq!(context.focused_frame(), Some(base));
        assert_eq!(context.frames().collect::<Vec<_>>(), vec![base]);
    }

    #[test]
    fn keys_go_to_the_focused_widget() {
        init_logging();
        let mut context = Context::new();
        assert_eq!(
            context.dispatch_key_event(KeyEvent::new(KeyCode::A, KeyAction::Press)),
            Response::Ignore
        );

        let frame = fixed_frame(&mut context, Probe::frame("frame", FrameFlags::empty()), rect(0, 0, 100, 100));
        let field = place(
            &mut context,
            frame,
            Probe::leaf("field").on_press(PressAction::Accept).accepting_keys(),
            rect(0, 0, 50, 20),
        );
        let label = place(
            &mut context,
            frame,
            Probe::leaf("label").on_press(PressAction::Accept),
            rect(0, 50, 50, 20),
        );
        let log = shared_log(context.tree_mut(), &[frame, field, label]);

        context.dispatch_mouse_event(press(5, 5));
        log.clear();
        let response = context.dispatch_key_event(KeyEvent::new(KeyCode::A, KeyAction::Press));
        assert_eq!(response, Response::Finish);
        assert_eq!(log.take(), vec!["field: key A"]);

        // keys the focused widget ignores bubble up to the frame
        context.focus_widget(label).unwrap();
        log.clear();
        let response = context.dispatch_key_event(KeyEvent::new(KeyCode::B, KeyAction::Repeat));
        assert_eq!(response, Response::Ignore);
        assert_eq!(log.take(), vec!["label: key B", "frame: key B"]);
    }

    #[test]
    fn fill_frames_track_the_context_size() {
        init_logging();
        let mut context = Context::new();
        context.resize(Size::new(640, 480));
        let main = context.insert(Frame::new());
        context.push_frame(main).unwrap();
        assert_eq!(context.tree().rect(main), Some(rect(0, 0, 640, 480)));

        let fixed = fixed_frame(&mut context, Probe::frame("fixed", FrameFlags::empty()), rect(5, 5, 10, 10));
        context.resize(Size::new(800, 600));
        assert_eq!(context.tree().rect(main), Some(rect(0, 0, 800, 600)));
        assert_eq!(context.tree().rect(fixed), Some(rect(5, 5, 10, 10)));

        let log = shared_log(context.tree_mut(), &[fixed]);
        context.resize(Size::new(800, 600));
        assert!(log.take().is_empty());
        assert_eq!(context.size(), Size::new(800, 600));
    }

    #[test]
    fn draws_back_to_front() {
        init_logging();
        let red = Color::new(1., 0., 0., 1.);
        let green = Color::new(0., 1., 0., 1.);
        let blue = Color::new(0., 0., 1., 1.);

        let mut context = Context::new();
        let bottom = fixed_frame(
            &mut context,
            Probe::frame("bottom", FrameFlags::empty()).with_color(red),
            rect(10, 20, 100, 100),
        );
        place(&mut context, bottom, Probe::leaf("inner").with_color(green), rect(5, 5, 10, 10));
        let top = fixed_frame(
            &mut context,
            Probe::frame("top", FrameFlags::empty())
                .with_color(blue)
                .finishing_draw(),
            rect(50, 50, 30, 30),
        );
        place(&mut context, top, Probe::leaf("covered").with_color(green), rect(0, 0, 10, 10));
        let hidden = fixed_frame(
            &mut context,
            Probe::frame("hidden", FrameFlags::empty()).with_color(red),
            rect(0, 0, 10, 10),
        );
        context.tree_mut().set_visible(hidden, false);

        assert!(context.needs_redraw());
        let mut renderer = RecordingRenderer::default();
        context.draw(&mut renderer);
        assert!(!context.needs_redraw());
        assert_eq!(renderer.frames, 1);

        let fills: Vec<_> = renderer
            .fills
            .iter()
            .map(|fill| (fill.offset, fill.size, fill.color))
            .collect();
        assert_eq!(
            fills,
            vec![
                (Vector2::new(10., 20.), Size::new(100, 100), red),
                (Vector2::new(15., 25.), Size::new(10, 10), green),
                (Vector2::new(50., 50.), Size::new(30, 30), blue),
            ]
        );
    }

    #[test]
    fn cursor_stack() {
        let mut context = Context::new();
        assert_eq!(context.cursor(), CursorShape::Arrow);
        context.push_cursor(CursorShape::IBeam);
        assert_eq!(context.cursor(), CursorShape::IBeam);
        assert_eq!(context.pop_cursor(), Some(CursorShape::IBeam));
        assert_eq!(context.cursor(), CursorShape::Arrow);
    }

    #[test]
    fn frame_stack_errors() {
        let mut context = Context::new();
        let frame = context.insert(Frame::fixed());
        let widget = context.insert(Probe::leaf("widget"));
        assert_eq!(context.push_frame(widget), Err(TreeError::NotAFrame(widget)));
        assert!(context.raise_frame(frame).is_err());
        assert_eq!(context.pop_frame(), None);

        let other = context.insert(Frame::fixed());
        context.push_frame(frame).unwrap();
        context.push_frame(other).unwrap();
        context.raise_frame(frame).unwrap();
        assert_eq!(context.frames().collect::<Vec<_>>(), vec![other, frame]);
        assert_eq!(context.pop_frame(), Some(frame));
        context.close_frame(other).unwrap();
        assert!(!context.tree().is_alive(other));
        assert_eq!(context.frames().count(), 0);
        assert_eq!(
            context.set_frame_flags(widget, FrameFlags::MODAL),
            Err(TreeError::NotAFrame(widget))
        );
    }
}
