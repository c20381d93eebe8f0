use serde::{Deserialize, Serialize};

use crate::math::Transform;
use crate::scene::{ObjectHandle, Scene, SceneError};

/// Per-tick transform update for the object at `index` in the tracked list
pub trait UpdatePolicy {
    fn update(&self, transform: &mut Transform, index: usize, time_seconds: f32);
}

/// Spin about X and Y at a speed that grows with the object's index
///
/// The angle is assigned, not accumulated, so calling `update` twice with the
/// same time leaves the same rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinPolicy {
    pub base_speed: f32,
    pub speed_increment: f32,
}

impl SpinPolicy {
    pub const SHAPES: SpinPolicy = SpinPolicy::new(1.0, 0.1);
    pub const SHOWCASE: SpinPolicy = SpinPolicy::new(0.2, 0.1);

    pub const fn new(base_speed: f32, speed_increment: f32) -> Self {
        Self {
            base_speed,
            speed_increment,
        }
    }

    /// Radians per second for the object at `index`
    pub fn speed(&self, index: usize) -> f32 {
        if index == 0 {
            self.base_speed
        } else {
            self.base_speed + index as f32 * self.speed_increment
        }
    }

    pub fn angle(&self, index: usize, time_seconds: f32) -> f32 {
        time_seconds * self.speed(index)
    }
}

impl Default for SpinPolicy {
    fn default() -> Self {
        Self::SHAPES
    }
}

impl UpdatePolicy for SpinPolicy {
    fn update(&self, transform: &mut Transform, index: usize, time_seconds: f32) {
        let angle = self.angle(index, time_seconds);
        transform.rotation.x = angle;
        transform.rotation.y = angle;
    }
}

/// Objects animated every tick, in the order that assigns their index
#[derive(Debug, Clone, Default)]
pub struct TrackedObjects {
    handles: Vec<ObjectHandle>,
}

impl TrackedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: ObjectHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.handles.iter().copied()
    }

    /// Run `policy` over every tracked object
    ///
    /// Fails on the first handle the scene does not know; objects before it
    /// have already been updated.
    pub fn apply(
        &self,
        policy: &dyn UpdatePolicy,
        scene: &mut Scene,
        time_seconds: f32,
    ) -> Result<(), SceneError> {
        for (index, handle) in self.handles.iter().enumerate() {
            let object = scene.object_mut(*handle)?;
            policy.update(&mut object.transform, index, time_seconds);
        }
        Ok(())
    }
}

impl FromIterator<ObjectHandle> for TrackedObjects {
    fn from_iter<I: IntoIterator<Item = ObjectHandle>>(iter: I) -> Self {
        Self {
            handles: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_index_zero_uses_base_speed() {
        let policy = SpinPolicy::new(0.7, 0.3);
        assert_eq!(policy.speed(0), 0.7);
        assert!((policy.speed(2) - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_update_assigns_both_axes() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        t.rotation.z = 0.4;
        SpinPolicy::SHAPES.update(&mut t, 1, 2.0);
        assert!((t.rotation.x - 2.2).abs() < 1e-6);
        assert_eq!(t.rotation.x, t.rotation.y);
        assert_eq!(t.rotation.z, 0.4);
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut t = Transform::IDENTITY;
        SpinPolicy::SHOWCASE.update(&mut t, 3, 4.5);
        let once = t;
        SpinPolicy::SHOWCASE.update(&mut t, 3, 4.5);
        assert_eq!(t, once);
    }

    #[test]
    fn test_zero_time_is_zero_rotation() {
        let mut t = Transform::IDENTITY;
        t.rotation = Vec3::splat(1.0);
        SpinPolicy::SHAPES.update(&mut t, 5, 0.0);
        assert_eq!(t.rotation.x, 0.0);
        assert_eq!(t.rotation.y, 0.0);
    }

    #[test]
    fn test_presets() {
        assert_eq!(SpinPolicy::SHAPES, SpinPolicy::new(1.0, 0.1));
        assert_eq!(SpinPolicy::SHOWCASE, SpinPolicy::new(0.2, 0.1));
        assert_eq!(SpinPolicy::default(), SpinPolicy::SHAPES);
    }

    #[test]
    fn test_empty_tracked_list_is_noop() {
        let mut scene = Scene::default();
        let tracked = TrackedObjects::new();
        assert!(tracked.is_empty());
        tracked.apply(&SpinPolicy::SHAPES, &mut scene, 10.0).unwrap();
    }
}
