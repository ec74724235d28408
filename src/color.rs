/// An RGBA color with components between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0., 0., 0., 0.);
    pub const BLACK: Color = Color::new(0., 0., 0., 1.);
    pub const WHITE: Color = Color::new(1., 1., 1., 1.);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    /// Creates an opaque color from a `0xRRGGBB` value.
    pub fn from_rgb(rgb: u32) -> Color {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.;
        Color::new(channel(16), channel(8), channel(0), 1.)
    }

    pub fn with_alpha(self, a: f32) -> Color {
        Color { a, ..self }
    }

    /// Moves each channel towards white (positive amounts) or black (negative amounts).
    pub fn shade(self, amount: f32) -> Color {
        let shift = |c: f32| (c + amount).max(0.).min(1.);
        Color::new(shift(self.r), shift(self.g), shift(self.b), self.a)
    }
}
