use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::contribution::{self, LobeParams};
use super::surface::{Fragment, SurfaceInputs};
use crate::camera::Camera;
use crate::light_set::LightSet;
use crate::material::Material;

/// How indirect light enters the sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum AmbientModel {
    /// The set's ambient light is added once per fragment.
    #[default]
    Separate,
    /// Each dynamic light adds `strength * color * diffuse` of its own; the
    /// set's ambient light is ignored.
    PerLight { strength: f32 },
}

impl AmbientModel {
    fn per_light_strength(&self) -> f32 {
        match self {
            AmbientModel::Separate => 0.0,
            AmbientModel::PerLight { strength } => *strength,
        }
    }
}

/// Per-fragment evaluator over one frame's camera and lights.
///
/// Holds only shared references, so one instance can shade fragments from
/// any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct FragmentShader<'a> {
    camera: &'a Camera,
    lights: &'a LightSet,
    ambient_model: AmbientModel,
}

impl<'a> FragmentShader<'a> {
    pub fn new(camera: &'a Camera, lights: &'a LightSet) -> Self {
        Self {
            camera,
            lights,
            ambient_model: AmbientModel::Separate,
        }
    }

    pub fn with_ambient_model(mut self, ambient_model: AmbientModel) -> Self {
        self.ambient_model = ambient_model;
        self
    }

    pub fn ambient_model(&self) -> AmbientModel {
        self.ambient_model
    }

    /// Final opaque color of `fragment` drawn with a bound `material`.
    pub fn shade(&self, fragment: &Fragment, material: &Material) -> Vec4 {
        self.radiance(fragment, material).extend(1.0)
    }

    /// Sum of every active light's contribution.
    pub fn radiance(&self, fragment: &Fragment, material: &Material) -> Vec3 {
        let surface = SurfaceInputs::resolve(fragment, self.camera.position(), material);
        let lobe = LobeParams {
            shininess: material.shininess,
            ambient_strength: self.ambient_model.per_light_strength(),
        };

        let mut color = Vec3::ZERO;
        for light in self.lights.directional() {
            color += contribution::directional(light, &surface, &lobe);
        }
        for light in self.lights.point() {
            color += contribution::point(light, &surface, &lobe);
        }
        for light in self.lights.spot() {
            color += contribution::spot(light, &surface, &lobe);
        }
        if self.ambient_model == AmbientModel::Separate {
            color += contribution::ambient(&self.lights.ambient, &surface);
        }
        color
    }
}
