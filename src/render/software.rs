use std::path::Path;
use std::thread;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3, Vec4};
use image::RgbImage;
use log::info;

use super::frame::FrameSnapshot;
use crate::material::Material;
use crate::shading::{Fragment, FragmentShader};

/// Output size, worker count and background color of a headless render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub threads: usize,
    pub clear_color: Vec3,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            threads: thread::available_parallelism().map_or(1, |n| n.get()),
            clear_color: Vec3::new(0.1, 0.1, 0.1),
        }
    }
}

/// Square horizontal floor centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorPlane {
    pub height: f32,
    pub half_extent: f32,
    /// World units covered by one texture repeat.
    pub tile_size: f32,
}

impl FloorPlane {
    /// Fragment where a ray from `origin` along `direction` meets the floor.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<Fragment> {
        if direction.y.abs() <= f32::EPSILON {
            return None;
        }
        let t = (self.height - origin.y) / direction.y;
        if !(t > 0.0) {
            return None;
        }
        let position = origin + direction * t;
        if !position.is_finite()
            || position.x.abs() > self.half_extent
            || position.z.abs() > self.half_extent
        {
            return None;
        }
        Some(Fragment {
            position,
            normal: Vec3::Y,
            uv: Vec2::new(position.x, position.z) / self.tile_size.max(f32::EPSILON),
        })
    }
}

impl Default for FloorPlane {
    fn default() -> Self {
        Self {
            height: -3.0,
            half_extent: 25.0,
            tile_size: 1.0,
        }
    }
}

/// Linear RGBA pixels, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec4>,
}

impl Framebuffer {
    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Clamps to `[0, 1]` and quantizes to 8 bits per channel.
    pub fn to_rgb8(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let color = self.pixel(x, y).truncate().clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
            image::Rgb([
                color.x.round() as u8,
                color.y.round() as u8,
                color.z.round() as u8,
            ])
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.to_rgb8()
            .save(path)
            .with_context(|| format!("unable to write {}", path.display()))
    }
}

/// Shades `fragments` on up to `threads` scoped workers.
///
/// Fragments are independent, so each worker takes a contiguous chunk and
/// writes only its own slice of the output.
pub fn shade_fragments(
    shader: &FragmentShader<'_>,
    material: &Material,
    fragments: &[Fragment],
    threads: usize,
) -> Vec<Vec4> {
    let mut output = vec![Vec4::ZERO; fragments.len()];
    if fragments.is_empty() {
        return output;
    }
    let chunk = fragments.len().div_ceil(threads.max(1));
    thread::scope(|scope| {
        for (inputs, outputs) in fragments.chunks(chunk).zip(output.chunks_mut(chunk)) {
            scope.spawn(move || {
                for (fragment, color) in inputs.iter().zip(outputs.iter_mut()) {
                    *color = shader.shade(fragment, material);
                }
            });
        }
    });
    output
}

/// Renders the floor as seen from the snapshot's camera.
///
/// Pixels whose view ray misses the floor keep the clear color.
pub fn render_floor(
    frame: &FrameSnapshot,
    material: &Material,
    floor: &FloorPlane,
    settings: &RenderSettings,
) -> Framebuffer {
    let (width, height) = (settings.width.max(1), settings.height.max(1));
    let inverse = frame.camera.view_proj().inverse();

    let mut hits = Vec::new();
    let mut hit_pixels = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let ndc = Vec2::new(
                2.0 * (x as f32 + 0.5) / width as f32 - 1.0,
                1.0 - 2.0 * (y as f32 + 0.5) / height as f32,
            );
            let near = inverse.project_point3(ndc.extend(-1.0));
            let far = inverse.project_point3(ndc.extend(1.0));
            if let Some(fragment) = floor.intersect(near, far - near) {
                hits.push(fragment);
                hit_pixels.push((y * width + x) as usize);
            }
        }
    }

    let shaded = shade_fragments(&frame.shader(), material, &hits, settings.threads);
    let mut pixels = vec![settings.clear_color.extend(1.0); (width * height) as usize];
    for (index, color) in hit_pixels.into_iter().zip(shaded) {
        pixels[index] = color;
    }
    info!(
        "shaded {} of {} pixels on {} thread(s)",
        hits.len(),
        pixels.len(),
        settings.threads.max(1)
    );

    Framebuffer {
        width,
        height,
        pixels,
    }
}
