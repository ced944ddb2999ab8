//! Materials
//!
//! A [`Material`] binds techniques to concrete data: parameter values by
//! name and the shader option set that selects program variants.
//!
//! Options are declared when the material is built ([`Material::with_option`]);
//! afterwards only declared options can be changed, and attempts to touch
//! undeclared ones are logged and ignored.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::param::ParamValue;
use super::shader_options::{OptionValue, ShaderOptions};
use super::technique::Technique;
use crate::renderer::graph::StageFlags;

#[derive(Debug, Clone, Default)]
pub struct Material {
    techniques: Vec<Arc<Technique>>,
    values: FxHashMap<String, ParamValue>,
    options: ShaderOptions,
}

impl Material {
    #[must_use]
    pub fn new(techniques: Vec<Arc<Technique>>) -> Self {
        Self {
            techniques,
            values: FxHashMap::default(),
            options: ShaderOptions::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.set_value(name, value);
        self
    }

    /// Declares an option and its initial value.
    #[must_use]
    pub fn with_option(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.options.set(name, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn techniques(&self) -> &[Arc<Technique>] {
        &self.techniques
    }

    /// Index of the first technique whose stage mask intersects `stage`.
    #[must_use]
    pub fn technique_index(&self, stage: StageFlags) -> Option<usize> {
        self.techniques
            .iter()
            .position(|tech| tech.stages().intersects(stage))
    }

    /// First technique whose stage mask intersects `stage`.
    #[must_use]
    pub fn technique(&self, stage: StageFlags) -> Option<&Technique> {
        self.technique_index(stage)
            .map(|idx| self.techniques[idx].as_ref())
    }

    #[inline]
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.values.insert(name.to_owned(), value.into());
    }

    pub fn remove_value(&mut self, name: &str) -> Option<ParamValue> {
        self.values.remove(name)
    }

    #[must_use]
    pub fn option(&self, name: &str) -> Option<OptionValue> {
        let value = self.options.get(name);
        if value.is_none() {
            log::warn!("Failed to get option {name}, option not found.");
        }
        value
    }

    pub fn set_option(&mut self, name: &str, value: impl Into<OptionValue>) {
        if !self.options.update(name, value) {
            log::warn!("Failed to set option {name}, option not found.");
        }
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &ShaderOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::pass::Pass;
    use crate::resources::technique::TechniqueIdAllocator;

    fn technique(ids: &mut TechniqueIdAllocator, stages: StageFlags) -> Arc<Technique> {
        Arc::new(Technique::new(ids, stages, vec![], vec![Pass::new("simple")]))
    }

    #[test]
    fn first_matching_technique_wins() {
        let mut ids = TechniqueIdAllocator::new();
        let opaque = technique(&mut ids, StageFlags::OPAQUE);
        let both = technique(&mut ids, StageFlags::OPAQUE | StageFlags::TRANSPARENT);
        let material = Material::new(vec![opaque.clone(), both.clone()]);

        assert_eq!(material.technique(StageFlags::OPAQUE).map(Technique::id), Some(opaque.id()));
        assert_eq!(
            material.technique(StageFlags::TRANSPARENT).map(Technique::id),
            Some(both.id())
        );
        assert!(material.technique(StageFlags::SHADOW_CAST).is_none());
    }

    #[test]
    fn undeclared_options_are_ignored() {
        let mut material = Material::default().with_option("useColor", false);
        material.set_option("useColor", true);
        material.set_option("useFog", true);
        assert_eq!(material.option("useColor"), Some(OptionValue::Bool(true)));
        assert_eq!(material.option("useFog"), None);
        assert_eq!(material.options().len(), 1);
    }
}
