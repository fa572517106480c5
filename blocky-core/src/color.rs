/// RGBA color with channels clamped to the unit range
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::opaque(1.0, 1.0, 1.0);
    pub const RED: Rgba = Rgba::opaque(1.0, 0.0, 0.0);
    pub const GREEN: Rgba = Rgba::opaque(0.0, 1.0, 0.0);
    pub const BLUE: Rgba = Rgba::opaque(0.0, 0.0, 1.0);

    const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build a color, clamping every channel into [0, 1]. NaN becomes 0.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
            a: clamp_channel(a),
        }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// The same color with every channel clamped like `new`, for values
    /// built from the public fields.
    pub fn clamped(self) -> Self {
        Self::new(self.r, self.g, self.b, self.a)
    }

    /// Replace one channel (0 = red .. 3 = alpha), clamped like `new`.
    /// Out-of-range indices are ignored.
    pub fn with_channel(mut self, index: usize, value: f32) -> Self {
        let value = clamp_channel(value);
        match index {
            0 => self.r = value,
            1 => self.g = value,
            2 => self.b = value,
            3 => self.a = value,
            _ => {}
        }
        self
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// 8-bit RGB, used by backends that present to byte-oriented targets.
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        ]
    }
}

fn clamp_channel(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Rgba {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        c.to_array()
    }
}
