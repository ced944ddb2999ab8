//! Render Passes
//!
//! A [`Pass`] is one fixed-function state configuration plus a program
//! reference, executed as exactly one draw call. Blend and stencil state are
//! optional blocks: `None` means the feature stays disabled for the draw.
//!
//! The state blocks reuse `wgpu`'s descriptor types (`BlendState`,
//! `StencilFaceState`) so a real backend can translate them directly.

use wgpu::{BlendState, Color, CompareFunction, Face, StencilFaceState};

use crate::renderer::device::ProgramHandle;

/// Where a pass gets its program from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProgramSource {
    /// Name of a program template, resolved per material options.
    Template(String),
    /// A program linked ahead of time.
    Linked(ProgramHandle),
}

/// Blend state with a constant blend color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendConfig {
    pub state: BlendState,
    pub constant: Color,
}

impl BlendConfig {
    #[must_use]
    pub fn alpha_blending() -> Self {
        Self {
            state: BlendState::ALPHA_BLENDING,
            constant: Color::TRANSPARENT,
        }
    }
}

/// One side of the stencil configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFace {
    pub ops: StencilFaceState,
    pub reference: u32,
    pub read_mask: u32,
    pub write_mask: u32,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            ops: StencilFaceState::IGNORE,
            reference: 0,
            read_mask: 0xFF,
            write_mask: 0xFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StencilConfig {
    pub front: StencilFace,
    pub back: StencilFace,
}

/// Fixed-function state for one draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub program: ProgramSource,
    /// `None` disables culling.
    pub cull_mode: Option<Face>,
    pub blend: Option<BlendConfig>,
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_func: CompareFunction,
    pub stencil: Option<StencilConfig>,
}

impl Pass {
    /// Pass using a program template, with back-face culling and depth
    /// test/write enabled.
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_program(ProgramSource::Template(template.into()))
    }

    /// Pass bound to a pre-linked program.
    #[must_use]
    pub fn linked(program: ProgramHandle) -> Self {
        Self::with_program(ProgramSource::Linked(program))
    }

    fn with_program(program: ProgramSource) -> Self {
        Self {
            program,
            cull_mode: Some(Face::Back),
            blend: None,
            depth_test: true,
            depth_write: true,
            depth_func: CompareFunction::Less,
            stencil: None,
        }
    }

    #[must_use]
    pub fn with_cull_mode(mut self, cull_mode: Option<Face>) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    #[must_use]
    pub fn with_blend(mut self, blend: BlendConfig) -> Self {
        self.blend = Some(blend);
        self
    }

    #[must_use]
    pub fn with_depth(mut self, test: bool, write: bool, func: CompareFunction) -> Self {
        self.depth_test = test;
        self.depth_write = write;
        self.depth_func = func;
        self
    }

    #[must_use]
    pub fn with_stencil(mut self, stencil: StencilConfig) -> Self {
        self.stencil = Some(stencil);
        self
    }

    /// Template name, when the program is resolved on demand.
    #[must_use]
    pub fn template_name(&self) -> Option<&str> {
        match &self.program {
            ProgramSource::Template(name) => Some(name),
            ProgramSource::Linked(_) => None,
        }
    }
}
