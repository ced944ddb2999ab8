use std::fmt;

use glam::Vec3;

use super::node::{SceneNode, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Point { range: f32 },
    Spot { range: f32, inner_cone: f32, outer_cone: f32 },
}

pub struct Light {
    node: Box<dyn SceneNode + Send + Sync>,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    #[must_use]
    pub fn new(kind: LightKind) -> Self {
        Self {
            node: Box::new(Transform::IDENTITY),
            kind,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }

    #[must_use]
    pub fn with_node(mut self, node: impl SceneNode + Send + Sync + 'static) -> Self {
        self.node = Box::new(node);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> &dyn SceneNode {
        self.node.as_ref()
    }
}

impl fmt::Debug for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Light")
            .field("kind", &self.kind)
            .field("color", &self.color)
            .field("intensity", &self.intensity)
            .finish_non_exhaustive()
    }
}
