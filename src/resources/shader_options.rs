//! Shader Option Sets
//!
//! A [`ShaderOptions`] is the per-material set of option values that selects
//! a program variant: boolean flags (`useTexture`) and small integer ranges
//! (`lightCount`). It is the input of [`ProgramLib::key`] and the render
//! context of the program templates.
//!
//! Entries are kept sorted by name so that identical sets hash identically
//! regardless of insertion order.
//!
//! ```rust,ignore
//! use myth_forward::resources::ShaderOptions;
//!
//! let mut options = ShaderOptions::new();
//! options.set("useTexture", true);
//! options.set("lightCount", 2);
//! ```
//!
//! [`ProgramLib::key`]: crate::renderer::pipeline::ProgramLib::key

use std::hash::BuildHasher;

use crate::template::Value;

/// Value of a single shader option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionValue {
    Bool(bool),
    Int(i32),
}

impl OptionValue {
    /// Flags are enabled by `true` or any non-zero integer.
    #[inline]
    #[must_use]
    pub fn is_truthy(self) -> bool {
        match self {
            OptionValue::Bool(b) => b,
            OptionValue::Int(n) => n != 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_int(self) -> i32 {
        match self {
            OptionValue::Bool(b) => i32::from(b),
            OptionValue::Int(n) => n,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v)
    }
}

impl From<OptionValue> for Value {
    fn from(v: OptionValue) -> Self {
        match v {
            OptionValue::Bool(b) => Value::Bool(b),
            OptionValue::Int(n) => Value::from(n),
        }
    }
}

/// An ordered name → value map of shader options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderOptions {
    entries: Vec<(String, OptionValue)>,
}

impl ShaderOptions {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces an option.
    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) {
        let value = value.into();
        match self.position(name) {
            Ok(idx) => self.entries[idx].1 = value,
            Err(idx) => self.entries.insert(idx, (name.to_owned(), value)),
        }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<OptionValue> {
        self.position(name).ok().map(|idx| self.entries[idx].1)
    }

    /// Replaces the value of an existing option; returns `false` when the
    /// option is not part of the set.
    pub fn update(&mut self, name: &str, value: impl Into<OptionValue>) -> bool {
        match self.position(name) {
            Ok(idx) => {
                self.entries[idx].1 = value.into();
                true
            }
            Err(_) => false,
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Ok(idx) => {
                self.entries.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_ok()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Values from `other` override values in `self`.
    pub fn merge(&mut self, other: &ShaderOptions) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    /// Content hash, independent of insertion order.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        rustc_hash::FxBuildHasher.hash_one(self)
    }

    /// Template view: flags become booleans, ranges numbers.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::map(self.iter())
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(name))
    }
}

impl<'a, V: Into<OptionValue>> FromIterator<(&'a str, V)> for ShaderOptions {
    fn from_iter<I: IntoIterator<Item = (&'a str, V)>>(iter: I) -> Self {
        let mut options = ShaderOptions::new();
        for (name, value) in iter {
            options.set(name, value);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut options = ShaderOptions::new();
        options.set("useTexture", true);
        options.set("lightCount", 3);
        assert_eq!(options.get("useTexture"), Some(OptionValue::Bool(true)));
        assert_eq!(options.get("lightCount"), Some(OptionValue::Int(3)));
        assert!(options.get("useColor").is_none());
    }

    #[test]
    fn update_only_touches_existing_entries() {
        let mut options = ShaderOptions::new().with("useColor", false);
        assert!(options.update("useColor", true));
        assert!(!options.update("useFog", true));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn hash_is_order_independent() {
        let a: ShaderOptions = [("b", 1), ("a", 2)].into_iter().collect();
        let b: ShaderOptions = [("a", 2), ("b", 1)].into_iter().collect();
        assert_eq!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn merge_overrides() {
        let mut a = ShaderOptions::new().with("x", 1).with("y", 2);
        let b = ShaderOptions::new().with("y", 5);
        a.merge(&b);
        assert_eq!(a.get("y"), Some(OptionValue::Int(5)));
        assert_eq!(a.get("x"), Some(OptionValue::Int(1)));
    }
}
