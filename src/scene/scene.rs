use slotmap::SlotMap;

use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::model::Model;
use crate::scene::{CameraKey, LightKey, ModelKey};

/// Container of everything the renderer draws from.
///
/// Models are visited in slot order, which is insertion order as long as no
/// model has been removed.
#[derive(Debug, Default)]
pub struct Scene {
    pub models: SlotMap<ModelKey, Model>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub lights: SlotMap<LightKey, Light>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),
        }
    }

    // ========================================================================
    // Models
    // ========================================================================

    pub fn add_model(&mut self, model: Model) -> ModelKey {
        self.models.insert(model)
    }

    pub fn remove_model(&mut self, key: ModelKey) -> Option<Model> {
        self.models.remove(key)
    }

    #[must_use]
    pub fn model(&self, key: ModelKey) -> Option<&Model> {
        self.models.get(key)
    }

    pub fn model_mut(&mut self, key: ModelKey) -> Option<&mut Model> {
        self.models.get_mut(key)
    }

    #[inline]
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    // ========================================================================
    // Cameras
    // ========================================================================

    pub fn add_camera(&mut self, camera: Camera) -> CameraKey {
        self.cameras.insert(camera)
    }

    pub fn remove_camera(&mut self, key: CameraKey) -> Option<Camera> {
        self.cameras.remove(key)
    }

    #[must_use]
    pub fn camera(&self, key: CameraKey) -> Option<&Camera> {
        self.cameras.get(key)
    }

    pub fn camera_mut(&mut self, key: CameraKey) -> Option<&mut Camera> {
        self.cameras.get_mut(key)
    }

    // ========================================================================
    // Lights
    // ========================================================================

    pub fn add_light(&mut self, light: Light) -> LightKey {
        self.lights.insert(light)
    }

    pub fn remove_light(&mut self, key: LightKey) -> Option<Light> {
        self.lights.remove(key)
    }

    #[must_use]
    pub fn light(&self, key: LightKey) -> Option<&Light> {
        self.lights.get(key)
    }

    /// Lights in slot order, for stage routines that upload them.
    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.lights.values()
    }

    #[inline]
    #[must_use]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;

    #[test]
    fn removed_models_are_gone() {
        let mut scene = Scene::new();
        let a = scene.add_model(Model::new(Transform::IDENTITY));
        let b = scene.add_model(Model::new(Transform::IDENTITY));
        assert!(scene.remove_model(a).is_some());
        assert!(scene.model(a).is_none());
        assert!(scene.model(b).is_some());
        assert_eq!(scene.model_count(), 1);
    }

    #[test]
    fn lights_and_cameras_are_stored_by_key() {
        use crate::scene::{Camera, Light, LightKind};

        let mut scene = Scene::new();
        let sun = scene.add_light(Light::new(LightKind::Directional).with_color(glam::Vec3::X));
        let lamp = scene.add_light(Light::new(LightKind::Point { range: 5.0 }));
        let camera = scene.add_camera(Camera::perspective(1.0, 0.1, 10.0));

        assert_eq!(scene.light(sun).map(|l| l.color), Some(glam::Vec3::X));
        assert!(matches!(
            scene.light(lamp).map(|l| l.kind),
            Some(LightKind::Point { .. })
        ));
        assert!(scene.remove_light(sun).is_some());
        assert!(scene.light(sun).is_none());
        assert!(scene.camera(camera).is_some());
    }
}
