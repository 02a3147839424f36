use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::material::Material;

/// Interpolated per-vertex outputs for one rasterized fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Fragment {
    /// Moves an object-space vertex into world space.
    pub fn from_object(model: &Mat4, position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: model.transform_point3(position),
            normal: normal_matrix(model) * normal,
            uv,
        }
    }
}

/// Inverse-transpose of the model's upper 3x3, keeping normals
/// perpendicular under non-uniform scale.
pub fn normal_matrix(model: &Mat4) -> Mat3 {
    Mat3::from_mat4(*model).inverse().transpose()
}

/// Geometry and base colors the light evaluators consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInputs {
    pub position: Vec3,
    pub normal: Vec3,
    /// Unit vector from the surface toward the eye.
    pub view_dir: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl SurfaceInputs {
    pub fn resolve(fragment: &Fragment, eye: Vec3, material: &Material) -> Self {
        Self {
            position: fragment.position,
            normal: fragment.normal.normalize_or_zero(),
            view_dir: (eye - fragment.position).normalize_or_zero(),
            diffuse: material.diffuse.sample(fragment.uv),
            specular: material.specular.sample(fragment.uv),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::material::{ColorSource, DrawParams};
    use crate::texture::Texture2D;

    #[test]
    fn resolve_normalizes_vectors() {
        let fragment = Fragment {
            position: Vec3::ZERO,
            normal: Vec3::new(0.0, 3.0, 0.0),
            uv: Vec2::ZERO,
        };
        let surface = SurfaceInputs::resolve(
            &fragment,
            Vec3::new(0.0, 0.0, 5.0),
            &Material::flat(Vec3::ONE, 8.0),
        );
        assert_eq!(surface.normal, Vec3::Y);
        assert_eq!(surface.view_dir, Vec3::Z);
    }

    #[test]
    fn floor_colors_replace_texture_samples() {
        let texture = Arc::new(Texture2D::solid(Vec3::X));
        let material = Material {
            diffuse: ColorSource::Texture(Arc::clone(&texture)),
            specular: ColorSource::Texture(texture),
            shininess: 32.0,
        };
        let fragment = Fragment {
            position: Vec3::ZERO,
            normal: Vec3::Y,
            uv: Vec2::new(0.5, 0.5),
        };
        let floor = material.bind(&DrawParams::floor(Vec3::splat(0.25)));
        let surface = SurfaceInputs::resolve(&fragment, Vec3::Y, &floor);
        assert_eq!(surface.diffuse, Vec3::splat(0.25));
        assert_eq!(surface.specular, Vec3::splat(0.25));

        let textured = SurfaceInputs::resolve(&fragment, Vec3::Y, &material);
        assert_eq!(textured.diffuse, Vec3::X);
    }

    #[test]
    fn normals_survive_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(50.0, 0.1, 50.0));
        let slanted = Vec3::new(1.0, 1.0, 0.0).normalize();
        let fragment = Fragment::from_object(&model, Vec3::ZERO, slanted, Vec2::ZERO);
        // Surface tangent (1, -1, 0) scales to (50, -0.1, 0).
        let tangent = Vec3::new(50.0, -0.1, 0.0);
        assert!(fragment.normal.dot(tangent).abs() < 1e-4);
    }
}
