//! Drawing interface.

use crate::color::Color;
use crate::rect::{Point, Size};
use crate::view::{RoundType, ViewId};
use cgmath::{Matrix4, SquareMatrix, Vector2, Vector3, Zero};

/// A drawing backend.
///
/// Views draw in their local coordinate system; the model matrix set before each view’s draw
/// call maps it to window coordinates.
pub trait Renderer {
    /// Called once before drawing the tree.
    fn begin_frame(&mut self, _size: Size) {}

    /// Sets the transform for subsequent drawing calls.
    fn set_model_matrix(&mut self, matrix: &Matrix4<f32>);

    /// Fills a rectangle at the local origin.
    fn fill_rect(&mut self, size: Size, color: Color, round_type: RoundType, round_radius: f32);

    /// Called once after drawing the tree.
    fn end_frame(&mut self) {}
}

/// Passed to [`View::draw`](crate::View::draw).
pub struct DrawCtx<'a> {
    renderer: &'a mut dyn Renderer,
    transforms: Vec<Matrix4<f32>>,
    view: Option<ViewId>,
    size: Size,
    round_type: RoundType,
    round_radius: f32,
}

impl<'a> DrawCtx<'a> {
    pub(crate) fn new(renderer: &'a mut dyn Renderer) -> Self {
        DrawCtx {
            renderer,
            transforms: vec![Matrix4::identity()],
            view: None,
            size: Vector2::zero(),
            round_type: RoundType::empty(),
            round_radius: 0.,
        }
    }

    /// The view being drawn.
    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn round_type(&self) -> RoundType {
        self.round_type
    }

    pub fn round_radius(&self) -> f32 {
        self.round_radius
    }

    /// The current model matrix.
    pub fn transform(&self) -> Matrix4<f32> {
        self.transforms
            .last()
            .cloned()
            .unwrap_or_else(Matrix4::identity)
    }

    pub fn renderer(&mut self) -> &mut dyn Renderer {
        &mut *self.renderer
    }

    /// Fills the view’s area using its corner style.
    pub fn fill(&mut self, color: Color) {
        self.renderer
            .fill_rect(self.size, color, self.round_type, self.round_radius);
    }

    pub(crate) fn pre_draw(
        &mut self,
        view: ViewId,
        position: Point,
        size: Size,
        round_type: RoundType,
        round_radius: f32,
    ) {
        let offset = Vector3::new(position.x as f32, position.y as f32, 0.);
        let transform = self.transform() * Matrix4::from_translation(offset);
        self.transforms.push(transform);
        self.renderer.set_model_matrix(&transform);

        self.view = Some(view);
        self.size = size;
        self.round_type = round_type;
        self.round_radius = round_radius;
    }

    pub(crate) fn post_draw(&mut self) {
        if self.transforms.len() > 1 {
            self.transforms.pop();
        }
        let transform = self.transform();
        self.renderer.set_model_matrix(&transform);
    }
}
