pub mod material;
pub mod mesh;
pub mod param;
pub mod pass;
pub mod shader_options;
pub mod technique;

pub use material::Material;
pub use mesh::Mesh;
pub use param::{ParamType, ParamValue, TechniqueParam};
pub use pass::{BlendConfig, Pass, ProgramSource, StencilConfig, StencilFace};
pub use shader_options::{OptionValue, ShaderOptions};
pub use technique::{Technique, TechniqueId, TechniqueIdAllocator};
