//! Basic widgets.

use crate::color::Color;
use crate::draw::DrawCtx;
use crate::events::{MouseButton, MouseEvent};
use crate::rect::{Point, Size};
use crate::signal::{Signal, SubscriptionId};
use crate::tree::{EventCtx, QueryCtx};
use crate::view::{Response, View, ViewId, ViewKind};
use cgmath::Vector2;

/// A push button.
///
/// Highlights while hovered, captures the mouse while pressed and emits `clicked` when released
/// over itself.
#[derive(Debug)]
pub struct Button {
    label: String,
    color: Color,
    preferred: Size,
    hovered: bool,
    pressed: bool,
    clicked: Signal<ViewId>,
}

impl Button {
    pub fn new<S: Into<String>>(label: S) -> Button {
        Button {
            label: label.into(),
            color: Color::from_rgb(0x999999),
            preferred: Vector2::new(80, 24),
            hovered: false,
            pressed: false,
            clicked: Signal::new(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Button {
        self.color = color;
        self
    }

    pub fn with_preferred_size(mut self, size: Size) -> Button {
        self.preferred = size;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label<S: Into<String>>(&mut self, label: S) {
        self.label = label.into();
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Adds a click handler.
    pub fn on_clicked<F: 'static + FnMut(&ViewId) + Send>(&mut self, handler: F) -> SubscriptionId {
        self.clicked.connect(handler)
    }

    pub fn clicked(&mut self) -> &mut Signal<ViewId> {
        &mut self.clicked
    }

    fn current_color(&self) -> Color {
        match (self.pressed, self.hovered) {
            (true, _) => self.color.shade(-0.15),
            (false, true) => self.color.shade(0.1),
            (false, false) => self.color,
        }
    }
}

impl View for Button {
    crate::impl_any!();

    fn kind(&self) -> ViewKind {
        ViewKind::Widget
    }

    fn preferred_size(&self, _cx: &QueryCtx) -> Size {
        self.preferred
    }

    fn expand_x(&self, _cx: &QueryCtx) -> bool {
        true
    }

    fn draw(&mut self, cx: &mut DrawCtx) -> Response {
        cx.fill(self.current_color());
        Response::Finish
    }

    fn perform_mouse_press(&mut self, event: &MouseEvent, cx: &mut EventCtx) -> Response {
        if event.button != Some(MouseButton::Left) {
            return Response::Ignore;
        }
        self.pressed = true;
        cx.request_redraw();
        Response::Finish
    }

    fn perform_mouse_release(&mut self, event: &MouseEvent, cx: &mut EventCtx) -> Response {
        if !self.pressed || event.button != Some(MouseButton::Left) {
            return Response::Ignore;
        }
        self.pressed = false;
        cx.request_redraw();

        let size = cx.size();
        let inside = event.location.x >= 0
            && event.location.y >= 0
            && event.location.x < size.x
            && event.location.y < size.y;
        if inside {
            self.clicked.emit(&cx.id());
        }
        Response::Finish
    }

    fn perform_mouse_move(&mut self, _event: &MouseEvent, _cx: &mut EventCtx) -> Response {
        if self.pressed {
            Response::Finish
        } else {
            Response::Ignore
        }
    }

    fn perform_hover_in(&mut self, cx: &mut EventCtx) {
        self.hovered = true;
        cx.request_redraw();
    }

    fn perform_hover_out(&mut self, cx: &mut EventCtx) {
        self.hovered = false;
        cx.request_redraw();
    }
}

/// Takes up leftover space in a layout.
#[derive(Debug, Clone, Default)]
pub struct Spacer {
    color: Option<Color>,
}

impl Spacer {
    pub fn new() -> Spacer {
        Spacer::default()
    }

    /// Fills the spacer’s area when drawn.
    pub fn with_color(color: Color) -> Spacer {
        Spacer { color: Some(color) }
    }
}

impl View for Spacer {
    crate::impl_any!();

    fn expand_x(&self, _cx: &QueryCtx) -> bool {
        true
    }

    fn expand_y(&self, _cx: &QueryCtx) -> bool {
        true
    }

    fn contain(&self, _point: Point, _cx: &QueryCtx) -> bool {
        false
    }

    fn draw(&mut self, cx: &mut DrawCtx) -> Response {
        if let Some(color) = self.color {
            cx.fill(color);
        }
        Response::Ignore
    }
}
