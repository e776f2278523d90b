//! Equirectangular environment map for rays that leave the scene.

use glint_math::{Color, Vec3};
use std::f32::consts::PI;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading or constructing an environment map.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid environment data: {0}")]
    InvalidData(String),
}

/// A latitude/longitude panorama sampled by outgoing ray direction.
///
/// Texels are 8-bit channels in row-major order with row 0 at the top. `u`
/// runs left to right around the horizon, `v` top (straight up) to bottom
/// (straight down).
pub struct EnvironmentMap {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<u8>,
}

impl EnvironmentMap {
    /// Decode an image file into an RGB environment map.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvironmentError> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        let map = Self::from_raw_parts(width, height, 3, rgb.into_raw())?;
        log::info!(
            "Loaded environment map {} ({}x{})",
            path.display(),
            width,
            height
        );
        Ok(map)
    }

    /// Build a map from already-decoded texel data.
    ///
    /// `data` must hold `width * height * channels` bytes with at least three
    /// channels per texel; only the first three are read back as RGB.
    pub fn from_raw_parts(
        width: u32,
        height: u32,
        channels: u32,
        data: Vec<u8>,
    ) -> Result<Self, EnvironmentError> {
        if width == 0 || height == 0 {
            return Err(EnvironmentError::InvalidData(format!(
                "zero-sized map ({width}x{height})"
            )));
        }
        if channels < 3 {
            return Err(EnvironmentError::InvalidData(format!(
                "{channels} channels per texel, need at least 3"
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(EnvironmentError::InvalidData(format!(
                "{} bytes of texel data, expected {expected}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-texel lookup at texture coordinates `(u, v)`.
    ///
    /// Out-of-range coordinates clamp to the border texels rather than wrap,
    /// so no input can read outside the data.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let x = (u * self.width as f32) as i64;
        let y = (v * self.height as f32) as i64;
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;

        let idx = (x + y * self.width as usize) * self.channels as usize;
        Color::new(
            self.data[idx] as f32 / 255.999,
            self.data[idx + 1] as f32 / 255.999,
            self.data[idx + 2] as f32 / 255.999,
        )
    }

    /// Sample the map in the given outgoing direction.
    ///
    /// The direction is normalized and mapped with the spherical
    /// parameterization `u = 0.5 + atan2(z, x) / 2pi`,
    /// `v = 0.5 - asin(y) / pi`.
    pub fn sample_direction(&self, direction: Vec3) -> Color {
        let unit = direction.normalize();
        let u = 0.5 + unit.z.atan2(unit.x) / (2.0 * PI);
        // Normalization drift can leave |y| a hair above 1; clamp before asin.
        let v = 0.5 - unit.y.clamp(-1.0, 1.0).asin() / PI;
        self.sample(u, v)
    }
}
