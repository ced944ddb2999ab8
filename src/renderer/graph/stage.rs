//! Render Stage Definitions
//!
//! A stage is a named bucket of the frame. Techniques declare the stages they
//! take part in as a [`StageFlags`] mask; the renderer walks the stages it was
//! asked to render in order and hands each stage routine the items that
//! matched its flag.
//!
//! | Stage | Purpose | Ordering |
//! |-------|---------|----------|
//! | `OPAQUE` | Opaque geometry | layer, then state (`sort_id`) |
//! | `TRANSPARENT` | Alpha-blended geometry | layer, then back-to-front |
//! | `SHADOW_CAST` | Shadow casters | caller-registered routine |

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct StageFlags: u32 {
        const OPAQUE      = 1 << 0;
        const TRANSPARENT = 1 << 1;
        const SHADOW_CAST = 1 << 2;
    }
}

impl StageFlags {
    /// Stages rendered by [`ForwardRenderer::render`](super::ForwardRenderer::render).
    pub const DEFAULT_ORDER: [StageFlags; 2] = [StageFlags::OPAQUE, StageFlags::TRANSPARENT];

    /// Stage name (for logging).
    #[must_use]
    pub fn name(self) -> &'static str {
        if self == Self::OPAQUE {
            "Opaque"
        } else if self == Self::TRANSPARENT {
            "Transparent"
        } else if self == Self::SHADOW_CAST {
            "ShadowCast"
        } else {
            "Mixed"
        }
    }
}
