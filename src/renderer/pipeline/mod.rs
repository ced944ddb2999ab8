//! Program pipeline
//!
//! - variant_key: option bit layout and `ShaderOptions` → `VariantKey`
//! - program_lib: template registry, chunk library and program cache
//! - builtin: embedded templates and chunks

pub mod builtin;
pub mod program_lib;
pub mod variant_key;

pub use program_lib::{
    DEFAULT_SHADER_HEADER, ProgramLib, ProgramLibSettings, ProgramTemplate, TemplateDecl,
    TemplateId,
};
pub use variant_key::{OptionKind, OptionSpec, ResolvedOption, VariantKey, derive_key, resolve_options};
