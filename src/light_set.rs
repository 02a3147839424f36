use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::light::{AmbientLight, DirectionalLight, Light, LightKind, PointLight, SpotLight};

pub const MAX_DIRECTIONAL_LIGHTS: usize = 5;
pub const MAX_POINT_LIGHTS: usize = 10;
pub const MAX_SPOT_LIGHTS: usize = 5;

/// Per-kind limits of a [`LightSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightCapacity {
    pub directional: usize,
    pub point: usize,
    pub spot: usize,
}

impl LightCapacity {
    /// Buffer-backed layout: 5 directional, 10 point, 5 spot.
    pub const STANDARD: Self = Self {
        directional: MAX_DIRECTIONAL_LIGHTS,
        point: MAX_POINT_LIGHTS,
        spot: MAX_SPOT_LIGHTS,
    };

    /// Uniform-array layout: 1 directional, 4 point, 1 spot.
    pub const LEGACY: Self = Self {
        directional: 1,
        point: 4,
        spot: 1,
    };

    pub fn for_kind(&self, kind: LightKind) -> usize {
        match kind {
            LightKind::Ambient => 1,
            LightKind::Directional => self.directional,
            LightKind::Point => self.point,
            LightKind::Spot => self.spot,
        }
    }

    fn clamped(self) -> Self {
        Self {
            directional: self.directional.min(MAX_DIRECTIONAL_LIGHTS),
            point: self.point.min(MAX_POINT_LIGHTS),
            spot: self.spot.min(MAX_SPOT_LIGHTS),
        }
    }
}

impl Default for LightCapacity {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Fixed-capacity light buffer rebuilt by the host once per frame.
///
/// Only the leading `*_count` entries of each array are live; the rest are
/// never read by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSet {
    pub ambient: AmbientLight,
    directional: [DirectionalLight; MAX_DIRECTIONAL_LIGHTS],
    point: [PointLight; MAX_POINT_LIGHTS],
    spot: [SpotLight; MAX_SPOT_LIGHTS],
    directional_count: usize,
    point_count: usize,
    spot_count: usize,
    capacity: LightCapacity,
}

impl LightSet {
    /// Creates an empty set. Capacities above the buffer sizes are clamped.
    pub fn new(capacity: LightCapacity) -> Self {
        Self {
            ambient: AmbientLight::default(),
            directional: Default::default(),
            point: Default::default(),
            spot: Default::default(),
            directional_count: 0,
            point_count: 0,
            spot_count: 0,
            capacity: capacity.clamped(),
        }
    }

    pub fn legacy() -> Self {
        Self::new(LightCapacity::LEGACY)
    }

    /// Builds a validated set from a list of lights.
    ///
    /// An ambient entry replaces the set's ambient term; the last one wins.
    pub fn from_lights<I>(capacity: LightCapacity, lights: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Light>,
    {
        let mut set = Self::new(capacity);
        for light in lights {
            set.push(light)?;
        }
        set.validate()?;
        Ok(set)
    }

    /// Appends a light after the active entries of its kind.
    pub fn push(&mut self, light: Light) -> Result<(), ConfigError> {
        let kind = light.kind();
        let capacity = self.capacity.for_kind(kind);
        let pushed = match light {
            Light::Ambient(ambient) => {
                self.ambient = ambient;
                return Ok(());
            }
            Light::Directional(light) => {
                push_slot(&mut self.directional, &mut self.directional_count, capacity, light)
            }
            Light::Point(light) => {
                push_slot(&mut self.point, &mut self.point_count, capacity, light)
            }
            Light::Spot(light) => push_slot(&mut self.spot, &mut self.spot_count, capacity, light),
        };
        pushed.ok_or(ConfigError::CapacityExceeded { kind, capacity })
    }

    /// Deactivates every dynamic light; the ambient term is kept.
    pub fn clear(&mut self) {
        self.directional_count = 0;
        self.point_count = 0;
        self.spot_count = 0;
    }

    pub fn capacity(&self) -> LightCapacity {
        self.capacity
    }

    pub fn directional(&self) -> &[DirectionalLight] {
        &self.directional[..self.directional_count]
    }

    pub fn point(&self) -> &[PointLight] {
        &self.point[..self.point_count]
    }

    pub fn spot(&self) -> &[SpotLight] {
        &self.spot[..self.spot_count]
    }

    pub fn directional_mut(&mut self) -> &mut [DirectionalLight] {
        &mut self.directional[..self.directional_count]
    }

    pub fn point_mut(&mut self) -> &mut [PointLight] {
        &mut self.point[..self.point_count]
    }

    pub fn spot_mut(&mut self) -> &mut [SpotLight] {
        &mut self.spot[..self.spot_count]
    }

    pub fn active_count(&self, kind: LightKind) -> usize {
        match kind {
            LightKind::Ambient => 1,
            LightKind::Directional => self.directional_count,
            LightKind::Point => self.point_count,
            LightKind::Spot => self.spot_count,
        }
    }

    /// Number of active dynamic lights across all kinds.
    pub fn len(&self) -> usize {
        self.directional_count + self.point_count + self.spot_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active lights in evaluation order, ambient first.
    pub fn iter(&self) -> impl Iterator<Item = Light> + '_ {
        std::iter::once(Light::Ambient(self.ambient))
            .chain(self.directional().iter().copied().map(Light::Directional))
            .chain(self.point().iter().copied().map(Light::Point))
            .chain(self.spot().iter().copied().map(Light::Spot))
    }

    /// Checks every active light against the evaluator's preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Light::Ambient(self.ambient)
            .validate()
            .map_err(|source| ConfigError::InvalidLight {
                kind: LightKind::Ambient,
                index: 0,
                source,
            })?;
        validate_kind(self.directional().iter().copied().map(Light::Directional))?;
        validate_kind(self.point().iter().copied().map(Light::Point))?;
        validate_kind(self.spot().iter().copied().map(Light::Spot))
    }

    /// Sets the active count of one kind without touching the entries.
    ///
    /// Used when decoding a host buffer whose slots were written directly.
    pub(crate) fn set_active_count(
        &mut self,
        kind: LightKind,
        count: usize,
    ) -> Result<(), ConfigError> {
        let capacity = self.capacity.for_kind(kind);
        if count > capacity {
            return Err(ConfigError::ActiveCountExceedsCapacity {
                kind,
                count,
                capacity,
            });
        }
        match kind {
            LightKind::Ambient => {}
            LightKind::Directional => self.directional_count = count,
            LightKind::Point => self.point_count = count,
            LightKind::Spot => self.spot_count = count,
        }
        Ok(())
    }

    pub(crate) fn slots_mut(
        &mut self,
    ) -> (
        &mut [DirectionalLight; MAX_DIRECTIONAL_LIGHTS],
        &mut [PointLight; MAX_POINT_LIGHTS],
        &mut [SpotLight; MAX_SPOT_LIGHTS],
    ) {
        (&mut self.directional, &mut self.point, &mut self.spot)
    }
}

impl Default for LightSet {
    fn default() -> Self {
        Self::new(LightCapacity::STANDARD)
    }
}

fn push_slot<T, const N: usize>(
    slots: &mut [T; N],
    count: &mut usize,
    capacity: usize,
    light: T,
) -> Option<()> {
    if *count >= capacity {
        return None;
    }
    slots[*count] = light;
    *count += 1;
    Some(())
}

fn validate_kind(lights: impl Iterator<Item = Light>) -> Result<(), ConfigError> {
    for (index, light) in lights.enumerate() {
        light.validate().map_err(|source| ConfigError::InvalidLight {
            kind: light.kind(),
            index,
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::error::LightError;
    use crate::light::SpotCone;

    #[test]
    fn push_respects_legacy_capacity() {
        let mut set = LightSet::legacy();
        set.push(DirectionalLight::default().into()).unwrap();
        let err = set.push(DirectionalLight::default().into()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::CapacityExceeded {
                kind: LightKind::Directional,
                capacity: 1
            }
        );
        for _ in 0..4 {
            set.push(PointLight::default().into()).unwrap();
        }
        assert!(set.push(PointLight::default().into()).is_err());
        assert_eq!(set.point().len(), 4);
    }

    #[test]
    fn standard_capacity_fills_every_slot() {
        let mut set = LightSet::default();
        for i in 0..MAX_POINT_LIGHTS {
            set.push(
                PointLight {
                    position: Vec3::splat(i as f32),
                    ..PointLight::default()
                }
                .into(),
            )
            .unwrap();
        }
        assert_eq!(set.active_count(LightKind::Point), MAX_POINT_LIGHTS);
        assert_eq!(set.point()[9].position, Vec3::splat(9.0));
        assert!(set.push(PointLight::default().into()).is_err());
    }

    #[test]
    fn oversized_capacity_is_clamped_to_buffer() {
        let set = LightSet::new(LightCapacity {
            directional: 64,
            point: 64,
            spot: 64,
        });
        assert_eq!(set.capacity(), LightCapacity::STANDARD);
    }

    #[test]
    fn ambient_entry_replaces_ambient_term() {
        let ambient = AmbientLight {
            color: Vec3::new(0.2, 0.3, 0.4),
            intensity: 0.5,
        };
        let set =
            LightSet::from_lights(LightCapacity::STANDARD, [Light::Ambient(ambient)]).unwrap();
        assert_eq!(set.ambient, ambient);
        assert!(set.is_empty());
    }

    #[test]
    fn clear_hides_entries_past_the_count() {
        let mut set = LightSet::default();
        set.push(SpotLight::default().into()).unwrap();
        set.clear();
        assert!(set.spot().is_empty());
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn validation_names_the_offending_light() {
        let bad = SpotLight {
            cone: SpotCone::new(0.9, 0.9),
            ..SpotLight::default()
        };
        let err = LightSet::from_lights(
            LightCapacity::STANDARD,
            [SpotLight::default().into(), bad.into()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidLight {
                kind: LightKind::Spot,
                index: 1,
                source: LightError::DegenerateCone(0.9),
            }
        );
        assert!(err.to_string().contains("spot light 1"));
    }

    #[test]
    fn active_count_above_capacity_is_rejected() {
        let mut set = LightSet::legacy();
        assert!(matches!(
            set.set_active_count(LightKind::Spot, 2),
            Err(ConfigError::ActiveCountExceedsCapacity { count: 2, capacity: 1, .. })
        ));
    }
}
