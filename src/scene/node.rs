//! Scene nodes.
//!
//! The renderer only needs world-space placement from the scene graph, so it
//! consumes nodes through the narrow [`SceneNode`] trait. [`Transform`] is a
//! standalone TRS implementation for hosts without their own hierarchy.

use glam::{Affine3A, Mat4, Quat, Vec3};

pub trait SceneNode {
    /// Full world transform (scale included).
    fn world_matrix(&self) -> Mat4;

    /// World transform with scale removed.
    fn world_rt(&self) -> Mat4 {
        let (_, rotation, translation) = self.world_matrix().to_scale_rotation_translation();
        Mat4::from_rotation_translation(rotation, translation)
    }

    fn world_position(&self) -> Vec3 {
        self.world_matrix().w_axis.truncate()
    }
}

/// Position / rotation / scale node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotates the node so its -Z axis points at `target`.
    #[must_use]
    pub fn looking_at(mut self, target: Vec3, up: Vec3) -> Self {
        let view = Mat4::look_at_rh(self.position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.rotation = rotation;
        self
    }

    #[inline]
    #[must_use]
    pub fn affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl SceneNode for Transform {
    fn world_matrix(&self) -> Mat4 {
        Mat4::from(self.affine())
    }

    fn world_rt(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    fn world_position(&self) -> Vec3 {
        self.position
    }
}

impl SceneNode for Affine3A {
    fn world_matrix(&self) -> Mat4 {
        Mat4::from(*self)
    }
}

impl SceneNode for Mat4 {
    fn world_matrix(&self) -> Mat4 {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_rt_drops_scale() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_scale(Vec3::splat(4.0));
        let rt = t.world_rt();
        assert_eq!(rt.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
        assert!((rt.x_axis.truncate().length() - 1.0).abs() < 1e-6);
        assert_eq!(t.world_position(), t.world_matrix().w_axis.truncate());
    }

    #[test]
    fn looking_at_faces_target() {
        let t = Transform::from_position(Vec3::new(0.0, 0.0, 5.0)).looking_at(Vec3::ZERO, Vec3::Y);
        let forward = t.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
    }
}
