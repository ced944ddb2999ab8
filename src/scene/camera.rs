use std::fmt;

use glam::{Mat4, Vec3, Vec4};

use super::node::{SceneNode, Transform};
use crate::renderer::device::ClearOptions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// `fov_y` in radians.
    Perspective { fov_y: f32 },
    /// Half the visible height in world units.
    Orthographic { half_height: f32 },
}

/// Normalized viewport rectangle (`[0, 1]` on both axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };
}

/// Pixel viewport of an extracted view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

pub struct Camera {
    node: Box<dyn SceneNode + Send + Sync>,
    pub projection: Projection,
    pub near: f32,
    pub far: f32,
    pub rect: Rect,
    pub clear: ClearOptions,
}

impl Camera {
    pub fn perspective(fov_y: f32, near: f32, far: f32) -> Self {
        Self {
            node: Box::new(Transform::IDENTITY),
            projection: Projection::Perspective { fov_y },
            near,
            far,
            rect: Rect::FULL,
            clear: ClearOptions::default(),
        }
    }

    pub fn orthographic(half_height: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Orthographic { half_height },
            ..Self::perspective(std::f32::consts::FRAC_PI_4, near, far)
        }
    }

    #[must_use]
    pub fn with_node(mut self, node: impl SceneNode + Send + Sync + 'static) -> Self {
        self.node = Box::new(node);
        self
    }

    pub fn set_node(&mut self, node: impl SceneNode + Send + Sync + 'static) {
        self.node = Box::new(node);
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> &dyn SceneNode {
        self.node.as_ref()
    }

    /// Builds the per-frame view for a `width` × `height` target.
    #[must_use]
    pub fn extract_view(&self, width: u32, height: u32) -> View {
        let (w, h) = (width as f32, height as f32);
        let viewport = Viewport {
            x: (self.rect.x * w) as i32,
            y: (self.rect.y * h) as i32,
            width: (self.rect.w * w) as u32,
            height: (self.rect.h * h) as u32,
        };

        let aspect = if height == 0 { 1.0 } else { w / h };
        let view = self.node.world_rt().inverse();
        let proj = match self.projection {
            Projection::Perspective { fov_y } => {
                Mat4::perspective_rh_gl(fov_y, aspect, self.near, self.far)
            }
            Projection::Orthographic { half_height } => {
                let x = half_height * aspect;
                Mat4::orthographic_rh_gl(-x, x, -half_height, half_height, self.near, self.far)
            }
        };

        View::new(viewport, self.clear, view, proj)
    }
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Camera")
            .field("projection", &self.projection)
            .field("near", &self.near)
            .field("far", &self.far)
            .field("rect", &self.rect)
            .finish_non_exhaustive()
    }
}

/// Camera state frozen for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub viewport: Viewport,
    pub clear: ClearOptions,
    pub view: Mat4,
    pub proj: Mat4,
    pub view_proj: Mat4,
    pub inv_view_proj: Mat4,
}

impl View {
    #[must_use]
    pub fn new(viewport: Viewport, clear: ClearOptions, view: Mat4, proj: Mat4) -> Self {
        let view_proj = proj * view;
        Self {
            viewport,
            clear,
            view,
            proj,
            view_proj,
            inv_view_proj: view_proj.inverse(),
        }
    }

    /// World-space viewing direction (the camera's -Z axis).
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        let row: Vec4 = self.view.row(2);
        -row.truncate()
    }

    /// World-space camera position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_axes_follow_the_camera_node() {
        let camera = Camera::perspective(1.0, 0.1, 100.0).with_node(
            Transform::from_position(Vec3::new(0.0, 0.0, 10.0)).looking_at(Vec3::ZERO, Vec3::Y),
        );
        let view = camera.extract_view(800, 600);
        assert!((view.position() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
        assert!((view.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(view.viewport.width, 800);
        assert_eq!(view.viewport.height, 600);
    }

    #[test]
    fn rect_scales_viewport() {
        let mut camera = Camera::orthographic(5.0, 0.1, 100.0);
        camera.rect = Rect {
            x: 0.5,
            y: 0.0,
            w: 0.5,
            h: 1.0,
        };
        let view = camera.extract_view(200, 100);
        assert_eq!(
            view.viewport,
            Viewport {
                x: 100,
                y: 0,
                width: 100,
                height: 100
            }
        );
    }
}
