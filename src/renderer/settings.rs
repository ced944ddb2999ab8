//! Renderer Settings
//!
//! Construction-time configuration for [`ForwardRenderer`](super::ForwardRenderer).
//!
//! ```rust,ignore
//! use myth_forward::renderer::RendererSettings;
//!
//! let settings = RendererSettings {
//!     default_texture_2d: Some(white),
//!     draw_item_capacity: 1024,
//!     ..Default::default()
//! };
//! ```

use rustc_hash::FxHashMap;

use crate::renderer::device::TextureHandle;
use crate::renderer::pipeline::{DEFAULT_SHADER_HEADER, ProgramLibSettings, TemplateDecl};

#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Line prepended to every program template stage.
    pub shader_header: String,

    /// Bound to 2D texture parameters that have neither a material value nor
    /// a declared default.
    pub default_texture_2d: Option<TextureHandle>,
    /// Cube-map counterpart of `default_texture_2d`.
    pub default_texture_cube: Option<TextureHandle>,

    /// Initial draw-item records.
    pub draw_item_capacity: usize,
    /// Initial stage-item records per stage list.
    pub stage_item_capacity: usize,
    /// Stage-item lists kept in the per-frame ring.
    pub frame_pool_size: usize,
    /// 64-scalar scratch buffers kept for array uniforms.
    pub scratch_pool_size: usize,

    /// Templates registered after the built-ins.
    pub templates: Vec<TemplateDecl>,
    /// Chunks merged over the built-ins.
    pub chunks: FxHashMap<String, String>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            shader_header: DEFAULT_SHADER_HEADER.to_owned(),
            default_texture_2d: None,
            default_texture_cube: None,
            draw_item_capacity: 100,
            stage_item_capacity: 100,
            frame_pool_size: 16,
            scratch_pool_size: 8,
            templates: Vec::new(),
            chunks: FxHashMap::default(),
        }
    }
}

impl RendererSettings {
    /// Splits off the program library part.
    pub(crate) fn program_lib_settings(&mut self) -> ProgramLibSettings {
        ProgramLibSettings {
            header: self.shader_header.clone(),
            templates: std::mem::take(&mut self.templates),
            chunks: std::mem::take(&mut self.chunks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = RendererSettings::default();
        assert_eq!(settings.shader_header, "precision highp float;\n");
        assert_eq!(settings.draw_item_capacity, 100);
        assert_eq!(settings.stage_item_capacity, 100);
        assert_eq!(settings.frame_pool_size, 16);
        assert!(settings.default_texture_2d.is_none());
    }

    #[test]
    fn program_lib_settings_take_the_declarations() {
        let mut settings = RendererSettings::default();
        settings.chunks.insert("x".into(), "y".into());
        let lib = settings.program_lib_settings();
        assert_eq!(lib.chunks.len(), 1);
        assert!(settings.chunks.is_empty());
        assert_eq!(lib.header, settings.shader_header);
    }
}
