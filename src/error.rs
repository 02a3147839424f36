use glam::Vec3;
use thiserror::Error;

use crate::light::LightKind;

/// Problem with a single light's parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LightError {
    #[error("attenuation constant term must be positive, got {0}")]
    NonPositiveConstant(f32),
    #[error("attenuation coefficients must not be negative, got ({constant}, {linear}, {quadratic})")]
    NegativeCoefficient {
        constant: f32,
        linear: f32,
        quadratic: f32,
    },
    #[error("spot cone is degenerate: inner and outer cutoff cosines are both {0}")]
    DegenerateCone(f32),
    #[error("spot cone is inverted: inner cutoff cosine {inner} is below outer cutoff cosine {outer}")]
    InvertedCone { inner: f32, outer: f32 },
    #[error("light direction has zero length")]
    ZeroDirection,
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}

/// Configuration rejected before any fragment is shaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{kind} light {index}: {source}")]
    InvalidLight {
        kind: LightKind,
        index: usize,
        #[source]
        source: LightError,
    },
    #[error("cannot add another {kind} light: capacity of {capacity} reached")]
    CapacityExceeded { kind: LightKind, capacity: usize },
    #[error("{kind} light count {count} exceeds capacity {capacity}")]
    ActiveCountExceedsCapacity {
        kind: LightKind,
        count: usize,
        capacity: usize,
    },
    #[error("camera target coincides with its position {0}")]
    CameraTargetsEye(Vec3),
    #[error("material shininess must be positive, got {0}")]
    NonPositiveShininess(f32),
    #[error("texture is {width}x{height} but {len} bytes of RGB data were supplied")]
    TextureSize { width: u32, height: u32, len: usize },
}
