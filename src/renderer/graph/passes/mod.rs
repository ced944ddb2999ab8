//! Stage Routines
//!
//! A [`StageRoutine`] receives the stage items collected for one stage and
//! decides their order and how they are drawn. The renderer registers
//! [`OpaqueStage`] and [`TransparentStage`] by default; callers may replace
//! them or add routines for other stages
//! (see [`ForwardRenderer::register_stage`](super::ForwardRenderer::register_stage)).

mod opaque;
mod transparent;

pub use opaque::OpaqueStage;
pub use transparent::TransparentStage;

use super::draw::{DrawContext, StageItem};
use crate::scene::{Scene, View};

pub trait StageRoutine {
    /// Routine name (for logging).
    fn name(&self) -> &str;

    /// Orders and draws `items`. The slice belongs to this stage for the
    /// current frame only.
    fn run(&mut self, ctx: &mut DrawContext<'_>, view: &View, scene: &Scene, items: &mut [StageItem]);
}

/// Uploads the `view`, `proj` and `viewProj` matrices.
pub fn set_view_uniforms(ctx: &mut DrawContext<'_>, view: &View) {
    ctx.set_mat4("view", &view.view);
    ctx.set_mat4("proj", &view.proj);
    ctx.set_mat4("viewProj", &view.view_proj);
}
