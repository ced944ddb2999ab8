//! Program Library
//!
//! Owns the registered program templates, the chunk library used as
//! partials, and the cache of linked program variants.
//!
//! # Lifecycle
//!
//! ```text
//! define(name, vert, frag, options)   parse once, fix option bit layout
//!            │
//! key(name, options)                  ShaderOptions → VariantKey
//!            │
//! program(device, name, options)      (TemplateId, VariantKey) cache lookup
//!            │  miss
//!            ▼
//!   render vert/frag with chunks → device.compile_and_link → cache insert
//! ```
//!
//! Cache entries are keyed by `(TemplateId, VariantKey)`, so equal keys from
//! different templates never collide. Entries are never evicted; a failed
//! compile stores nothing.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::builtin;
use super::variant_key::{OptionSpec, ResolvedOption, VariantKey, derive_key, resolve_options};
use crate::errors::{ForwardError, Result};
use crate::renderer::device::{GraphicsDevice, ProgramHandle};
use crate::resources::ShaderOptions;
use crate::template::{Context, Template, Value, Writer};

/// Default line prepended to every vertex and fragment template.
pub const DEFAULT_SHADER_HEADER: &str = "precision highp float;\n";

/// Library-assigned template identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(u32);

impl TemplateId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source form of a program template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDecl {
    pub name: String,
    pub vert: String,
    pub frag: String,
    pub options: Vec<OptionSpec>,
}

/// Construction options for [`ProgramLib`].
#[derive(Debug, Clone)]
pub struct ProgramLibSettings {
    /// Prepended to both stages of every template.
    pub header: String,
    /// Registered after the built-in templates.
    pub templates: Vec<TemplateDecl>,
    /// Merged over the built-in chunks; same names override.
    pub chunks: FxHashMap<String, String>,
}

impl Default for ProgramLibSettings {
    fn default() -> Self {
        Self {
            header: DEFAULT_SHADER_HEADER.to_owned(),
            templates: Vec::new(),
            chunks: FxHashMap::default(),
        }
    }
}

/// A registered template: both stages pre-compiled and the option layout
/// fixed.
#[derive(Debug)]
pub struct ProgramTemplate {
    id: TemplateId,
    name: String,
    vert: Template,
    frag: Template,
    options: Vec<ResolvedOption>,
}

impl ProgramTemplate {
    #[inline]
    #[must_use]
    pub fn id(&self) -> TemplateId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &[ResolvedOption] {
        &self.options
    }

    /// Render view for one variant: every supplied option, with declared
    /// flags normalized to booleans.
    fn view(&self, values: &ShaderOptions) -> Value {
        let mut view: BTreeMap<String, Value> = values
            .iter()
            .map(|(name, value)| (name.to_owned(), Value::from(value)))
            .collect();
        for opt in self.options.iter().filter(|opt| opt.is_flag()) {
            if let Some(value) = values.get(&opt.name) {
                view.insert(opt.name.clone(), Value::Bool(value.is_truthy()));
            }
        }
        Value::from(view)
    }
}

pub struct ProgramLib {
    header: String,
    templates: FxHashMap<String, ProgramTemplate>,
    chunks: FxHashMap<String, String>,
    cache: FxHashMap<(TemplateId, VariantKey), ProgramHandle>,
    writer: Writer,
    next_id: u32,
}

impl ProgramLib {
    /// Registers the built-in templates, then `settings.templates`; the chunk
    /// library is the built-in chunks overlaid with `settings.chunks`.
    pub fn new(settings: ProgramLibSettings) -> Result<Self> {
        let ProgramLibSettings {
            header,
            templates,
            chunks,
        } = settings;

        let mut lib = Self {
            header,
            templates: FxHashMap::default(),
            chunks: builtin::chunks()?,
            cache: FxHashMap::default(),
            writer: Writer::new(),
            next_id: 0,
        };

        for decl in builtin::templates()?.into_iter().chain(templates) {
            lib.define(&decl.name, &decl.vert, &decl.frag, &decl.options)?;
        }
        lib.chunks.extend(chunks);

        Ok(lib)
    }

    /// Registers a template.
    ///
    /// Redefining an existing name is logged and ignored; the existing id is
    /// returned. Syntax errors in either stage are returned and nothing is
    /// stored.
    pub fn define(
        &mut self,
        name: &str,
        vert: &str,
        frag: &str,
        options: &[OptionSpec],
    ) -> Result<TemplateId> {
        if let Some(existing) = self.templates.get(name) {
            log::warn!("Failed to define shader {name}: already exists.");
            return Ok(existing.id);
        }

        let vert = Template::compile(&format!("{}{vert}", self.header))?;
        let frag = Template::compile(&format!("{}{frag}", self.header))?;
        let options = resolve_options(name, options);

        let id = TemplateId(self.next_id);
        self.next_id += 1;

        self.templates.insert(
            name.to_owned(),
            ProgramTemplate {
                id,
                name: name.to_owned(),
                vert,
                frag,
                options,
            },
        );
        log::debug!("Defined program template {name} ({id:?})");
        Ok(id)
    }

    /// Variant key of `options` for template `name`.
    pub fn key(&self, name: &str, options: &ShaderOptions) -> Result<VariantKey> {
        let template = self.get_template(name)?;
        Ok(derive_key(&template.options, options))
    }

    /// Returns the program for `(name, options)`, compiling and linking it on
    /// first use.
    pub fn program(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        options: &ShaderOptions,
    ) -> Result<ProgramHandle> {
        let template = self.get_template(name)?;
        let key = derive_key(&template.options, options);
        let cache_key = (template.id, key);

        if let Some(&program) = self.cache.get(&cache_key) {
            log::trace!("Program cache hit: {name} {key:?}");
            return Ok(program);
        }
        log::trace!("Program cache miss: {name} {key:?}");

        let view = template.view(options);
        let ctx = Context::new(view);
        let vert = self
            .writer
            .render_template(&template.vert, &ctx, &self.chunks)?;
        let frag = self
            .writer
            .render_template(&template.frag, &ctx, &self.chunks)?;

        log::debug!("Compiling program variant {name} {key:?}");
        let program = device.compile_and_link(&vert, &frag).map_err(|err| {
            log::error!("Failed to build program {name} {key:?}: {err}");
            ForwardError::from(err)
        })?;

        self.cache.insert(cache_key, program);
        Ok(program)
    }

    fn get_template(&self, name: &str) -> Result<&ProgramTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| ForwardError::UnknownTemplate(name.to_owned()))
    }

    #[must_use]
    pub fn template(&self, name: &str) -> Option<&ProgramTemplate> {
        self.templates.get(name)
    }

    #[must_use]
    pub fn template_id(&self, name: &str) -> Option<TemplateId> {
        self.templates.get(name).map(|t| t.id)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Number of linked variants held by the cache.
    #[inline]
    #[must_use]
    pub fn program_count(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn chunk(&self, name: &str) -> Option<&str> {
        self.chunks.get(name).map(String::as_str)
    }

    /// Adds or replaces a chunk. Variants already in the cache keep the
    /// source they were built with.
    pub fn add_chunk(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.chunks.insert(name.into(), source.into());
        self.writer.clear_cache();
    }

    #[inline]
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::device::{DeviceCall, RecordingDevice};

    fn lib() -> ProgramLib {
        ProgramLib::new(ProgramLibSettings::default()).unwrap()
    }

    #[test]
    fn builtins_are_registered() {
        let lib = lib();
        assert!(lib.contains("simple"));
        assert!(lib.chunk("back_face").is_some());
        assert_eq!(lib.program_count(), 0);
    }

    #[test]
    fn duplicate_define_keeps_first() {
        let mut lib = lib();
        let a = lib.define("dup", "a", "a", &[]).unwrap();
        let b = lib.define("dup", "b", "b", &[OptionSpec::flag("x")]).unwrap();
        assert_eq!(a, b);
        assert!(lib.template("dup").unwrap().options().is_empty());
    }

    #[test]
    fn syntax_errors_store_nothing() {
        let mut lib = lib();
        assert!(matches!(
            lib.define("bad", "{{#open}}", "", &[]),
            Err(ForwardError::Template(_))
        ));
        assert!(!lib.contains("bad"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let lib = lib();
        assert!(matches!(
            lib.key("nope", &ShaderOptions::new()),
            Err(ForwardError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn sources_are_prefixed_and_rendered_with_options() {
        let mut lib = lib();
        lib.define(
            "lit",
            "{{#shadow}}#define SHADOW\n{{/shadow}}void main() {}",
            "const int N = {{lightCount}};\n{{> back_face}}",
            &[OptionSpec::flag("shadow"), OptionSpec::range("lightCount", 1, 4)],
        )
        .unwrap();

        let mut device = RecordingDevice::new();
        let options = ShaderOptions::new().with("shadow", 1).with("lightCount", 2);
        lib.program(&mut device, "lit", &options).unwrap();

        let DeviceCall::CompileAndLink { vertex, fragment } = &device.calls()[0] else {
            panic!("expected compile call");
        };
        assert_eq!(vertex, "precision highp float;\n#define SHADOW\nvoid main() {}");
        assert!(fragment.starts_with("precision highp float;\nconst int N = 2;\n"));
        assert!(fragment.contains("gl_FrontFacing"));
    }

    #[test]
    fn equal_keys_in_different_templates_do_not_collide() {
        let mut lib = lib();
        lib.define("a", "", "", &[]).unwrap();
        lib.define("b", "", "", &[]).unwrap();
        let mut device = RecordingDevice::new();
        let pa = lib.program(&mut device, "a", &ShaderOptions::new()).unwrap();
        let pb = lib.program(&mut device, "b", &ShaderOptions::new()).unwrap();
        assert_ne!(pa, pb);
        assert_eq!(lib.program_count(), 2);
    }

    #[test]
    fn custom_header_and_chunk_override() {
        let mut settings = ProgramLibSettings {
            header: "#version 300 es\n".to_owned(),
            ..Default::default()
        };
        settings.chunks.insert("back_face".to_owned(), "// flat".to_owned());
        let mut lib = ProgramLib::new(settings).unwrap();
        assert_eq!(lib.chunk("back_face"), Some("// flat"));

        let mut device = RecordingDevice::new();
        lib.program(&mut device, "simple", &ShaderOptions::new()).unwrap();
        let DeviceCall::CompileAndLink { fragment, .. } = &device.calls()[0] else {
            panic!("expected compile call");
        };
        assert!(fragment.starts_with("#version 300 es\n"));
        assert!(fragment.contains("// flat"));
    }
}
