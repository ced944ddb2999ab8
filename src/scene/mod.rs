//! Scene data consumed by the renderer.
//!
//! - [`SceneNode`]: world placement interface (plus the [`Transform`] node)
//! - [`Model`]: node + meshes + materials
//! - [`Camera`] / [`View`]: projection setup and its per-frame extraction
//! - [`Light`]
//! - [`Scene`]: slot-map storage for all of the above

pub mod camera;
pub mod light;
pub mod model;
pub mod node;
pub mod scene;

pub use camera::{Camera, Projection, Rect, View, Viewport};
pub use light::{Light, LightKind};
pub use model::Model;
pub use node::{SceneNode, Transform};
pub use scene::Scene;

use slotmap::new_key_type;

new_key_type! {
    pub struct ModelKey;
    pub struct CameraKey;
    pub struct LightKey;
}
