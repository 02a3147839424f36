use std::sync::Arc;

use parking_lot::RwLock;

use crate::camera::Camera;
use crate::error::ConfigError;
use crate::light_set::LightSet;
use crate::shading::{AmbientModel, FragmentShader};

/// Camera and lights for one frame. Immutable once published.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub camera: Camera,
    pub lights: LightSet,
    pub ambient_model: AmbientModel,
}

impl FrameSnapshot {
    /// Validates the lights before they can reach the evaluator.
    pub fn new(
        camera: Camera,
        lights: LightSet,
        ambient_model: AmbientModel,
    ) -> Result<Self, ConfigError> {
        lights.validate()?;
        Ok(Self {
            camera,
            lights,
            ambient_model,
        })
    }

    pub fn shader(&self) -> FragmentShader<'_> {
        FragmentShader::new(&self.camera, &self.lights).with_ambient_model(self.ambient_model)
    }
}

impl Default for FrameSnapshot {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            lights: LightSet::default(),
            ambient_model: AmbientModel::default(),
        }
    }
}

/// Host-side slot holding the current frame.
///
/// The host replaces the snapshot between frames; shading threads hold an
/// `Arc` to the snapshot they started with and never observe a partial
/// update.
#[derive(Debug, Default)]
pub struct FrameStore {
    slot: Arc<RwLock<Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    frame: u64,
    snapshot: Arc<FrameSnapshot>,
}

impl Clone for FrameStore {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl FrameStore {
    pub fn new(snapshot: FrameSnapshot) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot {
                frame: 0,
                snapshot: Arc::new(snapshot),
            })),
        }
    }

    /// Replaces the current snapshot and returns the new frame number.
    pub fn publish(&self, snapshot: FrameSnapshot) -> u64 {
        let mut slot = self.slot.write();
        slot.snapshot = Arc::new(snapshot);
        slot.frame += 1;
        log::debug!(
            "published frame {} ({} dynamic lights)",
            slot.frame,
            slot.snapshot.lights.len()
        );
        slot.frame
    }

    /// Applies a mutation to a copy of the current snapshot and publishes it
    /// if the result still validates.
    pub fn update<F>(&self, updater: F) -> Result<u64, ConfigError>
    where
        F: FnOnce(&mut FrameSnapshot),
    {
        let mut slot = self.slot.write();
        let mut next = FrameSnapshot::clone(&slot.snapshot);
        updater(&mut next);
        next.lights.validate()?;
        slot.snapshot = Arc::new(next);
        slot.frame += 1;
        Ok(slot.frame)
    }

    /// Returns the snapshot for the frame being shaded.
    pub fn snapshot(&self) -> Arc<FrameSnapshot> {
        Arc::clone(&self.slot.read().snapshot)
    }

    pub fn frame(&self) -> u64 {
        self.slot.read().frame
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::light::{Light, SpotCone, SpotLight};

    #[test]
    fn publish_replaces_snapshot_without_touching_readers() {
        let store = FrameStore::new(FrameSnapshot::default());
        let before = store.snapshot();

        let mut lights = LightSet::default();
        lights.push(Light::Spot(SpotLight::default())).unwrap();
        let next = FrameSnapshot::new(Camera::default(), lights, AmbientModel::Separate).unwrap();
        assert_eq!(store.publish(next), 1);

        assert!(before.lights.is_empty());
        assert_eq!(store.snapshot().lights.spot().len(), 1);
    }

    #[test]
    fn update_rejects_invalid_lights_and_keeps_previous_frame() {
        let mut lights = LightSet::default();
        lights.push(Light::Spot(SpotLight::default())).unwrap();
        let store = FrameStore::new(
            FrameSnapshot::new(Camera::default(), lights, AmbientModel::Separate).unwrap(),
        );

        let err = store.update(|frame| frame.lights.spot_mut()[0].cone = SpotCone::new(0.5, 0.5));
        assert!(err.is_err());
        assert_eq!(store.frame(), 0);
        assert_eq!(store.snapshot().lights.spot()[0].cone, SpotCone::default());

        store
            .update(|frame| frame.lights.spot_mut()[0].position = Vec3::Y)
            .unwrap();
        assert_eq!(store.frame(), 1);
        assert_eq!(store.snapshot().lights.spot()[0].position, Vec3::Y);
    }

    #[test]
    fn clones_share_the_slot() {
        let store = FrameStore::default();
        let other = store.clone();
        other.publish(FrameSnapshot::default());
        assert_eq!(store.frame(), 1);
    }
}
