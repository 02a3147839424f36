use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::error::ConfigError;
use crate::texture::Texture2D;

pub const DEFAULT_SHININESS: f32 = 32.0;

/// Where a base color comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSource {
    Texture(Arc<Texture2D>),
    Flat(Vec3),
    /// No sampler bound; reads as black.
    Unbound,
}

impl ColorSource {
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        match self {
            ColorSource::Texture(texture) => texture.sample(uv),
            ColorSource::Flat(color) => *color,
            ColorSource::Unbound => Vec3::ZERO,
        }
    }
}

/// Per-draw surface description.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse: ColorSource,
    pub specular: ColorSource,
    /// Specular exponent; larger values give a tighter highlight.
    pub shininess: f32,
}

impl Material {
    pub fn textured(diffuse: Arc<Texture2D>, specular: Arc<Texture2D>, shininess: f32) -> Self {
        Self {
            diffuse: ColorSource::Texture(diffuse),
            specular: ColorSource::Texture(specular),
            shininess,
        }
    }

    pub fn flat(color: Vec3, shininess: f32) -> Self {
        Self {
            diffuse: ColorSource::Flat(color),
            specular: ColorSource::Flat(color),
            shininess,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shininess > 0.0 && self.shininess.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::NonPositiveShininess(self.shininess))
        }
    }

    /// Resolves the color sources for one draw call.
    ///
    /// A flat-surface draw replaces both sources with the override color so
    /// no texture is touched per fragment.
    pub fn bind(&self, draw: &DrawParams) -> Material {
        if draw.is_flat_surface {
            Material::flat(draw.flat_color, self.shininess)
        } else {
            self.clone()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: ColorSource::Unbound,
            specular: ColorSource::Unbound,
            shininess: DEFAULT_SHININESS,
        }
    }
}

/// Per-draw switches supplied next to the material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    pub is_flat_surface: bool,
    pub flat_color: Vec3,
}

impl DrawParams {
    /// Draw of the floor surface in `color`.
    pub fn floor(color: Vec3) -> Self {
        Self {
            is_flat_surface: true,
            flat_color: color,
        }
    }
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            is_flat_surface: false,
            flat_color: Vec3::splat(0.5),
        }
    }
}
