//! Frame organization
//!
//! - [`ForwardRenderer`]: per-frame collection and stage dispatch
//! - [`StageFlags`]: stage membership of techniques
//! - [`DrawItem`] / [`StageItem`]: per-frame queue records
//! - [`DrawContext`]: per-item device command emission
//! - [`StageRoutine`]: per-stage ordering and drawing
//! - [`RecyclePool`] / [`FramePool`]: allocation-free per-frame storage

pub mod draw;
pub mod frame;
pub mod frame_pool;
pub mod passes;
pub mod stage;

pub use draw::{DrawContext, DrawItem, FrameStats, SCRATCH_LEN, StageItem};
pub use frame::ForwardRenderer;
pub use frame_pool::{FramePool, RecyclePool};
pub use passes::{OpaqueStage, StageRoutine, TransparentStage};
pub use stage::StageFlags;
