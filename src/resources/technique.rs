//! Techniques
//!
//! A [`Technique`] describes how a material is drawn in one or more stages:
//! the uniforms it consumes, the passes it runs and the layer it sorts in.
//! Techniques are identified by a [`TechniqueId`] handed out by a
//! [`TechniqueIdAllocator`] owned by the caller.

use xxhash_rust::xxh3::xxh3_64;

use super::param::TechniqueParam;
use super::pass::{Pass, ProgramSource};
use crate::renderer::graph::StageFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TechniqueId(pub(crate) u32);

impl TechniqueId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotonic source of [`TechniqueId`]s.
#[derive(Debug, Default)]
pub struct TechniqueIdAllocator {
    next: u32,
}

impl TechniqueIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> TechniqueId {
        let id = TechniqueId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone)]
pub struct Technique {
    id: TechniqueId,
    stages: StageFlags,
    params: Vec<TechniqueParam>,
    passes: Vec<Pass>,
    layer: i32,
    sort_id: u64,
}

impl Technique {
    pub fn new(
        ids: &mut TechniqueIdAllocator,
        stages: StageFlags,
        params: Vec<TechniqueParam>,
        passes: Vec<Pass>,
    ) -> Self {
        let id = ids.allocate();
        let sort_id = pack_sort_id(id, &passes);
        Self {
            id,
            stages,
            params,
            passes,
            layer: 0,
            sort_id,
        }
    }

    #[must_use]
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> TechniqueId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn stages(&self) -> StageFlags {
        self.stages
    }

    pub fn set_stages(&mut self, stages: StageFlags) {
        self.stages = stages;
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &[TechniqueParam] {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    #[inline]
    #[must_use]
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Opaque-stage sort key.
    ///
    /// Bit layout (MSB → LSB):
    ///
    /// | Bits | Field |
    /// |------|-------|
    /// | 63-60 | pass count (saturated) |
    /// | 59-28 | first pass program identity |
    /// | 27-0 | technique id |
    #[inline]
    #[must_use]
    pub fn sort_id(&self) -> u64 {
        self.sort_id
    }
}

fn pack_sort_id(id: TechniqueId, passes: &[Pass]) -> u64 {
    let pass_bits = (passes.len().min(0xF) as u64) << 60;
    let program = match passes.first().map(|p| &p.program) {
        Some(ProgramSource::Template(name)) => xxh3_64(name.as_bytes()) & 0xFFFF_FFFF,
        Some(ProgramSource::Linked(handle)) => u64::from(handle.id()),
        None => 0,
    };
    let program_bits = program << 28;
    let id_bits = u64::from(id.0) & 0x0FFF_FFFF;
    pass_bits | program_bits | id_bits
}
