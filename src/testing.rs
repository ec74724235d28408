//! Test doubles.

use crate::color::Color;
use crate::draw::{DrawCtx, Renderer};
use crate::events::{KeyEvent, MouseEvent};
use crate::frame::{FrameAnchor, FrameFlags};
use crate::rect::{Point, Size};
use crate::request::UpdateRequest;
use crate::tree::{EventCtx, QueryCtx, UpdateCtx, ViewTree};
use crate::view::{Response, RoundType, View, ViewId, ViewKind};
use cgmath::{Matrix4, SquareMatrix, Vector2, Zero};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Default)]
struct LogInner {
    entries: Vec<String>,
    names: HashMap<ViewId, String>,
}

/// A log shared by several probes.
#[derive(Debug, Clone, Default)]
pub struct Log(Arc<Mutex<LogInner>>);

impl Log {
    pub fn name(&self, id: ViewId) -> String {
        match self.0.lock().names.get(&id) {
            Some(name) => name.clone(),
            None => format!("{:?}", id),
        }
    }

    fn register(&self, id: ViewId, name: &str) {
        self.0.lock().names.insert(id, name.to_string());
    }

    fn push(&self, entry: String) {
        self.0.lock().entries.push(entry);
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::replace(&mut self.0.lock().entries, Vec::new())
    }

    pub fn clear(&self) {
        self.0.lock().entries.clear();
    }
}

/// Connects the probes to a new shared log.
pub fn shared_log(tree: &mut ViewTree, ids: &[ViewId]) -> Log {
    let log = Log::default();
    for &id in ids {
        if let Some(probe) = tree.view_mut::<Probe>(id) {
            probe.log = Some(log.clone());
            log.register(id, &probe.name);
        }
    }
    log
}

/// What a probe does when pressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressAction {
    Ignore,
    Accept,
    Resize(Size),
    DestroySelf,
}

/// A configurable view that records what happens to it.
#[derive(Debug)]
pub struct Probe {
    name: String,
    kind: ViewKind,
    preferred: Size,
    minimum: Size,
    expand: (bool, bool),
    fills_children: bool,
    press: PressAction,
    accepts_keys: bool,
    color: Option<Color>,
    finishes_drawing: bool,
    log: Option<Log>,
}

impl Probe {
    fn new(name: &str, kind: ViewKind) -> Probe {
        Probe {
            name: name.to_string(),
            kind,
            preferred: Size::zero(),
            minimum: Size::zero(),
            expand: (false, false),
            fills_children: false,
            press: PressAction::Ignore,
            accepts_keys: false,
            color: None,
            finishes_drawing: false,
            log: None,
        }
    }

    pub fn leaf(name: &str) -> Probe {
        Probe::new(name, ViewKind::Widget)
    }

    pub fn container(name: &str) -> Probe {
        Probe::new(name, ViewKind::Container)
    }

    /// A fixed-geometry frame.
    pub fn frame(name: &str, flags: FrameFlags) -> Probe {
        Probe::new(
            name,
            ViewKind::Frame {
                flags,
                anchor: FrameAnchor::Fixed,
            },
        )
    }

    pub fn with_preferred(mut self, size: Size) -> Probe {
        self.preferred = size;
        self
    }

    pub fn set_preferred(&mut self, size: Size) {
        self.preferred = size;
    }

    /// Also rejects smaller sizes in the size test.
    pub fn with_minimum(mut self, size: Size) -> Probe {
        self.minimum = size;
        self
    }

    pub fn expanding(mut self, x: bool, y: bool) -> Probe {
        self.expand = (x, y);
        self
    }

    /// Sizes all subviews to the probe’s own size.
    pub fn fills_children(mut self) -> Probe {
        self.fills_children = true;
        self
    }

    pub fn on_press(mut self, action: PressAction) -> Probe {
        self.press = action;
        self
    }

    pub fn accepting_keys(mut self) -> Probe {
        self.accepts_keys = true;
        self
    }

    pub fn with_color(mut self, color: Color) -> Probe {
        self.color = Some(color);
        self
    }

    pub fn finishing_draw(mut self) -> Probe {
        self.finishes_drawing = true;
        self
    }

    fn log(&self, what: String) {
        if let Some(log) = &self.log {
            log.push(format!("{}: {}", self.name, what));
        }
    }

    fn target_name(&self, id: ViewId) -> String {
        self.log
            .as_ref()
            .map_or_else(|| format!("{:?}", id), |log| log.name(id))
    }

    fn origin(request_local: bool) -> &'static str {
        if request_local {
            "local"
        } else {
            "from parent"
        }
    }
}

impl View for Probe {
    crate::impl_any!();

    fn kind(&self) -> ViewKind {
        self.kind
    }

    fn size_update_test(&self, request: &UpdateRequest<Size>) -> bool {
        let size = request.value();
        size.x >= self.minimum.x && size.y >= self.minimum.y
    }

    fn perform_size_update(&mut self, request: &UpdateRequest<Size>, cx: &mut UpdateCtx) {
        self.log(format!("perform size {}", Probe::origin(request.is_local())));
        cx.set_size(*request.value());
        if self.fills_children {
            for child in cx.children() {
                cx.resize_child(child, *request.value());
            }
        }
        if request.is_local() {
            cx.report(request);
        }
    }

    fn perform_position_update(&mut self, request: &UpdateRequest<Point>, cx: &mut UpdateCtx) {
        self.log(format!("perform position {}", Probe::origin(request.is_local())));
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
        self.log(format!("perform round type {}", Probe::origin(request.is_local())));
        cx.set_round_type(*request.value());
        if request.is_local() {
            cx.report(request);
        }
    }

    fn perform_round_radius_update(&mut self, request: &UpdateRequest<f32>, cx: &mut UpdateCtx) {
        self.log(format!("perform round radius {}", Probe::origin(request.is_local())));
        cx.set_round_radius(*request.value());
        if request.is_local() {
            cx.report(request);
        }
    }

    fn report_size_update(&mut self, request: &UpdateRequest<Size>, cx: &mut UpdateCtx) {
        self.log(format!("report size of {}", self.target_name(request.target())));
        cx.report(request);
    }

    fn report_position_update(&mut self, request: &UpdateRequest<Point>, cx: &mut UpdateCtx) {
        self.log(format!("report position of {}", self.target_name(request.target())));
        cx.report(request);
    }

    fn report_round_type_update(
        &mut self,
        request: &UpdateRequest<RoundType>,
        cx: &mut UpdateCtx,
    ) {
        self.log(format!("report round type of {}", self.target_name(request.target())));
        cx.report(request);
    }

    fn report_round_radius_update(&mut self, request: &UpdateRequest<f32>, cx: &mut UpdateCtx) {
        self.log(format!("report round radius of {}", self.target_name(request.target())));
        cx.report(request);
    }

    fn child_added(&mut self, child: ViewId, _cx: &mut UpdateCtx) {
        self.log(format!("added {}", self.target_name(child)));
    }

    fn child_removed(&mut self, child: ViewId, _cx: &mut UpdateCtx) {
        self.log(format!("removed {}", self.target_name(child)));
    }

    fn preferred_size(&self, _cx: &QueryCtx) -> Size {
        self.preferred
    }

    fn minimum_size(&self, _cx: &QueryCtx) -> Size {
        self.minimum
    }

    fn expand_x(&self, _cx: &QueryCtx) -> bool {
        self.expand.0
    }

    fn expand_y(&self, _cx: &QueryCtx) -> bool {
        self.expand.1
    }

    fn draw(&mut self, cx: &mut DrawCtx) -> Response {
        if let Some(color) = self.color {
            cx.fill(color);
        }
        if self.finishes_drawing {
            Response::Finish
        } else {
            Response::Ignore
        }
    }

    fn perform_mouse_press(&mut self, event: &MouseEvent, cx: &mut EventCtx) -> Response {
        self.log(format!("press at {:?}", (event.location.x, event.location.y)));
        match self.press {
            PressAction::Ignore => return Response::Ignore,
            PressAction::Accept => (),
            PressAction::Resize(size) => cx.resize(size),
            PressAction::DestroySelf => {
                let id = cx.id();
                if let Err(err) = cx.destroy(id) {
                    panic!("could not destroy {:?}: {}", id, err);
                }
            }
        }
        Response::Finish
    }

    fn perform_mouse_release(&mut self, event: &MouseEvent, _cx: &mut EventCtx) -> Response {
        self.log(format!("release at {:?}", (event.location.x, event.location.y)));
        match self.press {
            PressAction::Ignore => Response::Ignore,
            _ => Response::Finish,
        }
    }

    fn perform_mouse_move(&mut self, event: &MouseEvent, _cx: &mut EventCtx) -> Response {
        self.log(format!("move at {:?}", (event.location.x, event.location.y)));
        Response::Ignore
    }

    fn perform_key_press(&mut self, event: &KeyEvent, _cx: &mut EventCtx) -> Response {
        self.log(format!("key {:?}", event.key));
        if self.accepts_keys {
            Response::Finish
        } else {
            Response::Ignore
        }
    }

    fn perform_hover_in(&mut self, _cx: &mut EventCtx) {
        self.log("hover in".to_string());
    }

    fn perform_hover_out(&mut self, _cx: &mut EventCtx) {
        self.log("hover out".to_string());
    }

    fn perform_focus_on(&mut self, _cx: &mut EventCtx) {
        self.log("focus on".to_string());
    }

    fn perform_focus_off(&mut self, _cx: &mut EventCtx) {
        self.log("focus off".to_string());
    }
}

/// One recorded fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    /// Translation of the model matrix.
    pub offset: Vector2<f32>,
    pub size: Size,
    pub color: Color,
}

/// A renderer that records fills.
#[derive(Debug)]
pub struct RecordingRenderer {
    pub frames: usize,
    pub fills: Vec<Fill>,
    matrix: Matrix4<f32>,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        RecordingRenderer {
            frames: 0,
            fills: Vec::new(),
            matrix: Matrix4::identity(),
        }
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self, _size: Size) {
        self.frames += 1;
        self.fills.clear();
    }

    fn set_model_matrix(&mut self, matrix: &Matrix4<f32>) {
        self.matrix = *matrix;
    }

    fn fill_rect(&mut self, size: Size, color: Color, _round_type: RoundType, _radius: f32) {
        self.fills.push(Fill {
            offset: Vector2::new(self.matrix.w.x, self.matrix.w.y),
            size,
            color,
        });
    }
}
