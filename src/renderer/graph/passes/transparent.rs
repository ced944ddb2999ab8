//! Transparent Stage
//!
//! Alpha-blended geometry is drawn back-to-front within each layer. The
//! depth key is the distance of the model origin along the camera forward
//! axis, recomputed every frame.

use super::{StageRoutine, set_view_uniforms};
use crate::renderer::graph::draw::{DrawContext, StageItem};
use crate::scene::{Scene, View};

#[derive(Debug, Default, Clone, Copy)]
pub struct TransparentStage;

impl TransparentStage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fills `zdist` for every item from its model's world position.
    pub fn compute_depths(view: &View, scene: &Scene, items: &mut [StageItem]) {
        let eye = view.position();
        let forward = view.forward();
        for item in items.iter_mut() {
            item.zdist = scene
                .model(item.model)
                .map_or(0.0, |model| (model.node().world_position() - eye).dot(forward));
        }
    }

    /// Layer ascending, then `zdist` descending, then `seq`.
    pub fn sort(items: &mut [StageItem]) {
        items.sort_unstable_by(|a, b| {
            a.layer
                .cmp(&b.layer)
                .then(b.zdist.total_cmp(&a.zdist))
                .then(a.seq.cmp(&b.seq))
        });
    }
}

impl StageRoutine for TransparentStage {
    fn name(&self) -> &str {
        "Transparent"
    }

    fn run(&mut self, ctx: &mut DrawContext<'_>, view: &View, scene: &Scene, items: &mut [StageItem]) {
        set_view_uniforms(ctx, view);
        Self::compute_depths(view, scene, items);
        Self::sort(items);
        for item in items.iter() {
            ctx.draw_item(scene, item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(layer: i32, zdist: f32, seq: u32) -> StageItem {
        StageItem {
            layer,
            zdist,
            seq,
            ..StageItem::default()
        }
    }

    #[test]
    fn far_items_first_within_a_layer() {
        let mut items = vec![item(0, 5.0, 0), item(0, 10.0, 1), item(-1, 1.0, 2), item(0, 5.0, 3)];
        TransparentStage::sort(&mut items);
        let seqs: Vec<u32> = items.iter().map(|i| i.seq).collect();
        assert_eq!(seqs, vec![2, 1, 0, 3]);
    }
}
