//! Fixed-layout blocks shared with a GPU host.
//!
//! Every record is `#[repr(C)]` and made of 4-byte scalars arranged so no
//! implicit padding is inserted; field order and array sizes are part of the
//! host contract.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::error::ConfigError;
use crate::light::{
    AmbientLight, Attenuation, DirectionalLight, LightKind, PointLight, SpotCone, SpotLight,
};
use crate::light_set::{
    LightCapacity, LightSet, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
};
use crate::material::{DrawParams, Material};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraBlock {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl From<&Camera> for CameraBlock {
    fn from(camera: &Camera) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix().to_cols_array_2d(),
            position: camera.position().extend(1.0).into(),
        }
    }
}

impl CameraBlock {
    pub fn view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.projection)
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct AmbientRecord {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalRecord {
    pub color: [f32; 3],
    pub intensity: f32,
    pub direction: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointRecord {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub _pad: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpotRecord {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
    pub constant: f32,
    pub direction: [f32; 3],
    pub linear: f32,
    pub quadratic: f32,
    pub inner_cutoff: f32,
    pub outer_cutoff: f32,
    pub _pad: f32,
}

/// Whole light buffer: ambient, per-kind arrays, then the active counts in
/// point, spot, directional order.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightSetBlock {
    pub ambient: AmbientRecord,
    pub directional: [DirectionalRecord; MAX_DIRECTIONAL_LIGHTS],
    pub point: [PointRecord; MAX_POINT_LIGHTS],
    pub spot: [SpotRecord; MAX_SPOT_LIGHTS],
    pub point_count: u32,
    pub spot_count: u32,
    pub directional_count: u32,
    pub _pad: u32,
}

impl From<&LightSet> for LightSetBlock {
    fn from(lights: &LightSet) -> Self {
        let mut block = Self::zeroed();
        block.ambient = AmbientRecord {
            color: lights.ambient.color.into(),
            intensity: lights.ambient.intensity,
        };
        for (record, light) in block.directional.iter_mut().zip(lights.directional()) {
            *record = DirectionalRecord {
                color: light.color.into(),
                intensity: light.intensity,
                direction: light.direction.into(),
                _pad: 0.0,
            };
        }
        for (record, light) in block.point.iter_mut().zip(lights.point()) {
            *record = PointRecord {
                color: light.color.into(),
                intensity: light.intensity,
                position: light.position.into(),
                constant: light.attenuation.constant,
                linear: light.attenuation.linear,
                quadratic: light.attenuation.quadratic,
                _pad: [0.0; 2],
            };
        }
        for (record, light) in block.spot.iter_mut().zip(lights.spot()) {
            *record = SpotRecord {
                color: light.color.into(),
                intensity: light.intensity,
                position: light.position.into(),
                constant: light.attenuation.constant,
                direction: light.direction.into(),
                linear: light.attenuation.linear,
                quadratic: light.attenuation.quadratic,
                inner_cutoff: light.cone.inner_cos,
                outer_cutoff: light.cone.outer_cos,
                _pad: 0.0,
            };
        }
        block.point_count = lights.point().len() as u32;
        block.spot_count = lights.spot().len() as u32;
        block.directional_count = lights.directional().len() as u32;
        block
    }
}

impl TryFrom<&LightSetBlock> for LightSet {
    type Error = ConfigError;

    /// Reads a host-written block back. Counts above the buffer sizes are
    /// rejected; light parameters are not validated here.
    fn try_from(block: &LightSetBlock) -> Result<Self, Self::Error> {
        let mut lights = LightSet::new(LightCapacity::STANDARD);
        lights.ambient = AmbientLight {
            color: block.ambient.color.into(),
            intensity: block.ambient.intensity,
        };
        lights.set_active_count(LightKind::Directional, block.directional_count as usize)?;
        lights.set_active_count(LightKind::Point, block.point_count as usize)?;
        lights.set_active_count(LightKind::Spot, block.spot_count as usize)?;

        let (directional, point, spot) = lights.slots_mut();
        for (light, record) in directional.iter_mut().zip(&block.directional) {
            *light = DirectionalLight {
                color: record.color.into(),
                intensity: record.intensity,
                direction: record.direction.into(),
            };
        }
        for (light, record) in point.iter_mut().zip(&block.point) {
            *light = PointLight {
                color: record.color.into(),
                intensity: record.intensity,
                position: record.position.into(),
                attenuation: Attenuation::new(record.constant, record.linear, record.quadratic),
            };
        }
        for (light, record) in spot.iter_mut().zip(&block.spot) {
            *light = SpotLight {
                color: record.color.into(),
                intensity: record.intensity,
                position: record.position.into(),
                direction: record.direction.into(),
                attenuation: Attenuation::new(record.constant, record.linear, record.quadratic),
                cone: SpotCone::new(record.inner_cutoff, record.outer_cutoff),
            };
        }
        Ok(lights)
    }
}

/// Per-draw uniforms: flat-surface switch and material scalars.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawBlock {
    pub flat_color: [f32; 3],
    pub is_flat_surface: u32,
    pub shininess: f32,
    pub _pad: [f32; 3],
}

impl DrawBlock {
    pub fn new(draw: &DrawParams, material: &Material) -> Self {
        Self {
            flat_color: draw.flat_color.into(),
            is_flat_surface: draw.is_flat_surface as u32,
            shininess: material.shininess,
            _pad: [0.0; 3],
        }
    }

    pub fn draw_params(&self) -> DrawParams {
        DrawParams {
            is_flat_surface: self.is_flat_surface != 0,
            flat_color: self.flat_color.into(),
        }
    }
}
