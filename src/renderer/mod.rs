//! Rendering
//!
//! - [`device`]: the command interface a backend implements
//! - [`pipeline`]: program templates, variants and their cache
//! - [`graph`]: the per-frame forward queue
//! - [`settings`]: renderer configuration

pub mod device;
pub mod graph;
pub mod pipeline;
pub mod settings;

pub use device::{
    ClearOptions, DeviceCall, GraphicsDevice, IndexBufferHandle, ProgramHandle, RecordingDevice,
    TextureHandle, UniformData, UniformValue, VertexBufferHandle,
};
pub use graph::{ForwardRenderer, FrameStats, StageFlags};
pub use pipeline::ProgramLib;
pub use settings::RendererSettings;
