/// Mouse cursor shapes a backend is expected to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    Arrow,
    IBeam,
    Crosshair,
    Hand,
    HorizontalResize,
    VerticalResize,
}

impl Default for CursorShape {
    fn default() -> Self {
        CursorShape::Arrow
    }
}

/// Stack of requested cursor shapes; the top one is shown.
///
/// Views push a shape when the pointer enters them and pop it when it leaves, so nested views can
/// override the cursor and restore their parent’s choice.
#[derive(Debug, Clone, Default)]
pub struct CursorStack {
    stack: Vec<CursorShape>,
}

impl CursorStack {
    pub fn push(&mut self, shape: CursorShape) {
        self.stack.push(shape);
    }

    pub fn pop(&mut self) -> Option<CursorShape> {
        self.stack.pop()
    }

    /// The shape to display: the most recently pushed one, or the arrow.
    pub fn current(&self) -> CursorShape {
        self.stack.last().copied().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
