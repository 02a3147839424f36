use std::path::Path;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use image::imageops;

use crate::error::ConfigError;

/// RGB texture sampled with repeat wrapping and bilinear filtering.
///
/// Rows are stored bottom-up so that `v = 0` addresses the bottom of the
/// source image.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture2D {
    width: u32,
    height: u32,
    texels: Vec<Vec3>,
}

impl Texture2D {
    /// Wraps tightly packed 8-bit RGB data, first row at `v = 0`.
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> Result<Self, ConfigError> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(ConfigError::TextureSize {
                width,
                height,
                len: data.len(),
            });
        }
        let texels = data
            .chunks_exact(3)
            .map(|rgb| Vec3::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32) / 255.0)
            .collect();
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Single-texel texture of one color.
    pub fn solid(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: vec![color],
        }
    }

    /// Decodes an image file, flipping it so the bottom row is `v = 0`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("unable to decode texture {}", path.display()))?;
        let image = imageops::flip_vertical(&image.into_rgb8());
        let texture = Self::from_rgb8(image.width(), image.height(), image.as_raw())?;
        log::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel at integer coordinates, wrapping in both directions.
    pub fn texel(&self, x: i64, y: i64) -> Vec3 {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        self.texels[y * self.width as usize + x]
    }

    /// Bilinear lookup at `uv`; coordinates outside `[0, 1)` repeat.
    ///
    /// Non-finite coordinates sample as if they were zero.
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        let x = wrap_unit(uv.x) * self.width as f32 - 0.5;
        let y = wrap_unit(uv.y) * self.height as f32 - 0.5;
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);

        let bottom = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), fx);
        let top = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), fx);
        bottom.lerp(top, fy)
    }
}

/// Folds a coordinate into `[0, 1]` before it is scaled to texels.
fn wrap_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.rem_euclid(1.0)
    } else {
        0.0
    }
}
