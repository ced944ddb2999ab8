//! Myth Forward
//!
//! Shader-variant templating, program caching and a frame-scoped forward
//! render queue on top of an abstract [`GraphicsDevice`].
//!
//! ```rust,ignore
//! use myth_forward::prelude::*;
//!
//! let mut renderer = ForwardRenderer::new(device, RendererSettings::default())?;
//! let view = camera.extract_view(1280, 720);
//! let stats = renderer.render(&view, &scene);
//! ```

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod template;

pub use errors::{DeviceError, ForwardError, Result, TemplateError};
pub use renderer::device::{GraphicsDevice, RecordingDevice};
pub use renderer::graph::{ForwardRenderer, FrameStats, StageFlags};
pub use renderer::pipeline::ProgramLib;
pub use renderer::settings::RendererSettings;
pub use resources::{Material, Mesh, Pass, ShaderOptions, Technique};
pub use scene::{Camera, Model, Scene, View};
pub use template::{Template, Value};

pub mod prelude {
    pub use crate::errors::{ForwardError, Result};
    pub use crate::renderer::device::{
        ClearOptions, GraphicsDevice, IndexBufferHandle, ProgramHandle, TextureHandle,
        VertexBufferHandle,
    };
    pub use crate::renderer::graph::{ForwardRenderer, FrameStats, StageFlags, StageRoutine};
    pub use crate::renderer::settings::RendererSettings;
    pub use crate::resources::{
        BlendConfig, Material, Mesh, ParamType, ParamValue, Pass, ShaderOptions, Technique,
        TechniqueIdAllocator, TechniqueParam,
    };
    pub use crate::scene::{Camera, Model, Scene, SceneNode, Transform, View};
}
