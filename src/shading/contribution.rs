//! Per-light radiance terms.
//!
//! Each function returns the light's share of the fragment color. None of
//! them validate their inputs: degenerate attenuation or spot cones must be
//! rejected when the [`LightSet`](crate::LightSet) is built.

use glam::Vec3;

use super::surface::SurfaceInputs;
use crate::light::{AmbientLight, DirectionalLight, Light, PointLight, SpotLight};

/// Lobe parameters shared by every light in one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LobeParams {
    pub shininess: f32,
    /// Share of each dynamic light's color added as ambient; zero when the
    /// scene carries a separate ambient light.
    pub ambient_strength: f32,
}

/// Mirror `incident` about `normal`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Ambient, diffuse and specular terms for one light direction, before
/// intensity, attenuation or cone weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Terms {
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,
}

fn phong_terms(light_dir: Vec3, color: Vec3, surface: &SurfaceInputs, lobe: &LobeParams) -> Terms {
    let diffuse_weight = surface.normal.dot(light_dir).max(0.0);
    let reflect_dir = reflect(-light_dir, surface.normal);
    let specular_weight = surface.view_dir.dot(reflect_dir).max(0.0).powf(lobe.shininess);
    Terms {
        ambient: lobe.ambient_strength * color * surface.diffuse,
        diffuse: diffuse_weight * color * surface.diffuse,
        specular: specular_weight * color * surface.specular,
    }
}

pub fn ambient(light: &AmbientLight, surface: &SurfaceInputs) -> Vec3 {
    light.color * light.intensity * surface.diffuse
}

pub fn directional(light: &DirectionalLight, surface: &SurfaceInputs, lobe: &LobeParams) -> Vec3 {
    let light_dir = (-light.direction).normalize();
    let terms = phong_terms(light_dir, light.color, surface, lobe);
    light.intensity * (terms.ambient + terms.diffuse + terms.specular)
}

pub fn point(light: &PointLight, surface: &SurfaceInputs, lobe: &LobeParams) -> Vec3 {
    let to_light = light.position - surface.position;
    // A fragment sitting on the light has no direction to it.
    let light_dir = to_light.normalize_or_zero();
    let attenuation = light.attenuation.factor(to_light.length());
    let terms = phong_terms(light_dir, light.color, surface, lobe);
    light.intensity * attenuation * (terms.ambient + terms.diffuse + terms.specular)
}

/// Spot contribution; the cone weight applies to diffuse and specular only.
pub fn spot(light: &SpotLight, surface: &SurfaceInputs, lobe: &LobeParams) -> Vec3 {
    let to_light = light.position - surface.position;
    let light_dir = to_light.normalize_or_zero();
    let attenuation = light.attenuation.factor(to_light.length());
    let theta = light_dir.dot((-light.direction).normalize());
    let cone = light.cone.factor(theta);
    let terms = phong_terms(light_dir, light.color, surface, lobe);
    light.intensity * attenuation * (terms.ambient + cone * (terms.diffuse + terms.specular))
}

/// Dispatches on the light variant.
pub fn contribution(light: &Light, surface: &SurfaceInputs, lobe: &LobeParams) -> Vec3 {
    match light {
        Light::Ambient(light) => ambient(light, surface),
        Light::Directional(light) => directional(light, surface, lobe),
        Light::Point(light) => point(light, surface, lobe),
        Light::Spot(light) => spot(light, surface, lobe),
    }
}
