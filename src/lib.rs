//! Forward Blinn/Phong shading core.
//!
//! The crate evaluates the final color of a fragment lit by an ambient term
//! and any number of directional, point and spot lights, up to the
//! capacities of a fixed-size [`LightSet`]. Window and GPU context setup
//! are intentionally kept outside of the crate; the host supplies a
//! [`Camera`], a [`LightSet`] and a bound [`Material`] per draw, optionally
//! through the fixed-layout blocks in [`render::uniforms`].

pub mod camera;
pub mod error;
pub mod light;
pub mod light_set;
pub mod material;
pub mod render;
pub mod scene;
pub mod shading;
pub mod texture;

pub use camera::Camera;
pub use error::{ConfigError, LightError};
pub use light::{
    AmbientLight, Attenuation, DirectionalLight, Light, LightKind, PointLight, SpotCone, SpotLight,
};
pub use light_set::{LightCapacity, LightSet};
pub use material::{ColorSource, DrawParams, Material};
pub use render::{FrameSnapshot, FrameStore};
pub use scene::Scene;
pub use shading::{AmbientModel, Fragment, FragmentShader};
pub use texture::Texture2D;
