//! Linear-light pixel buffer and display conversion.

use glint_math::{Color, Interval};

/// Row-major buffer of linear RGB pixels, row 0 at the top of the image.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl FrameBuffer {
    /// Create a buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)` with y = 0 at the top.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Reset every pixel to black.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::ZERO);
    }

    /// Resize to the given dimensions, discarding previous contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize((width * height) as usize, Color::ZERO);
    }

    /// Convert to 24-bit RGB bytes in row-major order, row 0 first.
    ///
    /// Each channel is gamma-corrected, clamped to [0, 0.999], and scaled by
    /// 256, keeping the full-white output at 255.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let intensity = Interval::new(0.0, 0.999);
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);

        for color in &self.pixels {
            for channel in [color.x, color.y, color.z] {
                let mapped = linear_to_gamma(channel);
                bytes.push((256.0 * intensity.clamp(mapped)) as u8);
            }
        }

        bytes
    }
}

/// Gamma-2 transform for display: sqrt, with non-positive values pinned to 0.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}
