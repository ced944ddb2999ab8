//! Opaque Stage
//!
//! Draws front-to-back insensitive geometry grouped by render state: items
//! are ordered by layer, then by the technique's packed `sort_id` so items
//! sharing a program end up adjacent.

use super::{StageRoutine, set_view_uniforms};
use crate::renderer::graph::draw::{DrawContext, StageItem};
use crate::scene::{Scene, View};

#[derive(Debug, Default, Clone, Copy)]
pub struct OpaqueStage;

impl OpaqueStage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Ascending `(layer, sort_id, seq)`.
    pub fn sort(items: &mut [StageItem]) {
        items.sort_unstable_by(|a, b| {
            a.layer
                .cmp(&b.layer)
                .then(a.sort_id.cmp(&b.sort_id))
                .then(a.seq.cmp(&b.seq))
        });
    }
}

impl StageRoutine for OpaqueStage {
    fn name(&self) -> &str {
        "Opaque"
    }

    fn run(&mut self, ctx: &mut DrawContext<'_>, view: &View, scene: &Scene, items: &mut [StageItem]) {
        set_view_uniforms(ctx, view);
        Self::sort(items);
        for item in items.iter() {
            ctx.draw_item(scene, item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(layer: i32, sort_id: u64, seq: u32) -> StageItem {
        StageItem {
            layer,
            sort_id,
            seq,
            ..StageItem::default()
        }
    }

    #[test]
    fn layer_dominates_then_sort_id_then_seq() {
        let mut items = vec![item(1, 0, 0), item(0, 9, 1), item(0, 3, 3), item(0, 3, 2)];
        OpaqueStage::sort(&mut items);
        let seqs: Vec<u32> = items.iter().map(|i| i.seq).collect();
        assert_eq!(seqs, vec![2, 3, 1, 0]);
    }
}
