use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::LightError;

/// Distance falloff `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    /// Falloff factor at `distance` from the light.
    ///
    /// Bounded by `1 / constant` as the distance approaches zero.
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    pub fn validate(&self) -> Result<(), LightError> {
        if !(self.constant.is_finite() && self.linear.is_finite() && self.quadratic.is_finite()) {
            return Err(LightError::NonFinite("attenuation"));
        }
        if self.constant < 0.0 || self.linear < 0.0 || self.quadratic < 0.0 {
            return Err(LightError::NegativeCoefficient {
                constant: self.constant,
                linear: self.linear,
                quadratic: self.quadratic,
            });
        }
        if self.constant <= 0.0 {
            return Err(LightError::NonPositiveConstant(self.constant));
        }
        Ok(())
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::new(1.0, 0.09, 0.032)
    }
}

/// Smooth spot edge between two cutoff cosines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotCone {
    /// Cosine of the inner cutoff angle; full intensity inside it.
    pub inner_cos: f32,
    /// Cosine of the outer cutoff angle; no light outside it.
    pub outer_cos: f32,
}

impl SpotCone {
    pub const fn new(inner_cos: f32, outer_cos: f32) -> Self {
        Self {
            inner_cos,
            outer_cos,
        }
    }

    /// Builds a cone from half-angles in degrees.
    pub fn from_degrees(inner: f32, outer: f32) -> Self {
        Self::new(inner.to_radians().cos(), outer.to_radians().cos())
    }

    /// Weight in `[0, 1]` for a fragment at cosine `theta` off the spot axis.
    ///
    /// The cone must be validated: equal cutoffs divide by zero.
    pub fn factor(&self, theta: f32) -> f32 {
        ((theta - self.outer_cos) / (self.inner_cos - self.outer_cos)).clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<(), LightError> {
        if !(self.inner_cos.is_finite() && self.outer_cos.is_finite()) {
            return Err(LightError::NonFinite("spot cutoff"));
        }
        if self.inner_cos == self.outer_cos {
            return Err(LightError::DegenerateCone(self.inner_cos));
        }
        if self.inner_cos < self.outer_cos {
            return Err(LightError::InvertedCone {
                inner: self.inner_cos,
                outer: self.outer_cos,
            });
        }
        Ok(())
    }
}

impl Default for SpotCone {
    fn default() -> Self {
        Self::from_degrees(12.5, 17.5)
    }
}

/// Uniform light independent of fragment geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.0,
        }
    }
}

/// Infinitely distant light travelling along `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub direction: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            direction: Vec3::NEG_Z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::ZERO,
            attenuation: Attenuation::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub direction: Vec3,
    pub attenuation: Attenuation,
    pub cone: SpotCone,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            attenuation: Attenuation::default(),
            cone: SpotCone::default(),
        }
    }
}

/// Discriminant of [`Light`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LightKind::Ambient => "ambient",
            LightKind::Directional => "directional",
            LightKind::Point => "point",
            LightKind::Spot => "spot",
        })
    }
}

/// Any light the scene can hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl Light {
    pub fn kind(&self) -> LightKind {
        match self {
            Light::Ambient(_) => LightKind::Ambient,
            Light::Directional(_) => LightKind::Directional,
            Light::Point(_) => LightKind::Point,
            Light::Spot(_) => LightKind::Spot,
        }
    }

    pub fn color(&self) -> Vec3 {
        match self {
            Light::Ambient(light) => light.color,
            Light::Directional(light) => light.color,
            Light::Point(light) => light.color,
            Light::Spot(light) => light.color,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient(light) => light.intensity,
            Light::Directional(light) => light.intensity,
            Light::Point(light) => light.intensity,
            Light::Spot(light) => light.intensity,
        }
    }

    /// Checks the parameters the evaluator relies on.
    pub fn validate(&self) -> Result<(), LightError> {
        let (color, intensity) = (self.color(), self.intensity());
        if !color.is_finite() {
            return Err(LightError::NonFinite("color"));
        }
        if !intensity.is_finite() {
            return Err(LightError::NonFinite("intensity"));
        }
        match self {
            Light::Ambient(_) => Ok(()),
            Light::Directional(light) => check_direction(light.direction),
            Light::Point(light) => {
                check_position(light.position)?;
                light.attenuation.validate()
            }
            Light::Spot(light) => {
                check_position(light.position)?;
                check_direction(light.direction)?;
                light.attenuation.validate()?;
                light.cone.validate()
            }
        }
    }
}

impl From<AmbientLight> for Light {
    fn from(light: AmbientLight) -> Self {
        Light::Ambient(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<SpotLight> for Light {
    fn from(light: SpotLight) -> Self {
        Light::Spot(light)
    }
}

fn check_direction(direction: Vec3) -> Result<(), LightError> {
    if !direction.is_finite() {
        return Err(LightError::NonFinite("direction"));
    }
    if direction.length_squared() <= f32::EPSILON {
        return Err(LightError::ZeroDirection);
    }
    Ok(())
}

fn check_position(position: Vec3) -> Result<(), LightError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(LightError::NonFinite("position"))
    }
}
