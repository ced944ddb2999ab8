//! Values a template is rendered against.
//!
//! [`Value`] is a small dynamically-typed tree (scalars, lists, records) plus
//! two callable kinds:
//!
//! - [`Value::Computed`] is invoked with the current view whenever it is
//!   looked up, and its result is used in its place.
//! - [`Value::Macro`] is only meaningful as a section: it receives the raw,
//!   unrendered text between the section tags and a sub-render function.
//!
//! All variants are cheap to clone (`Arc` backed).

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::TemplateError;

/// Function invoked with the current view on lookup.
pub type ComputedFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Sub-render callback handed to a [`MacroFn`].
pub type SubRender<'a> = dyn Fn(&str) -> Result<String, TemplateError> + 'a;

/// Section lambda: `(raw inner text, sub-render) -> output`.
pub type MacroFn =
    Arc<dyn Fn(&str, &SubRender<'_>) -> Result<String, TemplateError> + Send + Sync>;

/// A dynamically-typed template value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    List(Arc<[Value]>),
    Map(Arc<BTreeMap<String, Value>>),
    Computed(ComputedFn),
    Macro(MacroFn),
}

impl Value {
    /// Builds a record value from `(key, value)` pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Wraps a closure evaluated against the current view at lookup time.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Value::Computed(Arc::new(f))
    }

    /// Wraps a section lambda.
    pub fn lambda<F>(f: F) -> Self
    where
        F: Fn(&str, &SubRender<'_>) -> Result<String, TemplateError> + Send + Sync + 'static,
    {
        Value::Macro(Arc::new(f))
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `Null`, `false`, `0`, `NaN` and `""` are falsy; everything else,
    /// including an empty list, is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Computed(_) | Value::Macro(_) => true,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Value::List(items) if items.is_empty())
    }

    /// Field access used by name resolution.
    ///
    /// Records are indexed by key, lists by decimal position.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            Value::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Text produced when the value is interpolated.
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Null | Value::Map(_) | Value::Computed(_) | Value::Macro(_) => {
                Cow::Borrowed("")
            }
            Value::Bool(true) => Cow::Borrowed("true"),
            Value::Bool(false) => Cow::Borrowed("false"),
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::String(s) => Cow::Borrowed(s),
            Value::List(items) => {
                let parts: Vec<Cow<'_, str>> = items.iter().map(Value::to_text).collect();
                Cow::Owned(parts.join(","))
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Computed(_) => f.write_str("Computed(..)"),
            Value::Macro(_) => f.write_str("Macro(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Computed(a), Value::Computed(b)) => Arc::ptr_eq(a, b),
            (Value::Macro(a), Value::Macro(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Number(f64::from(v))
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, u8, u16, u32, f32, f64);

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(Arc::new(v))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => Value::from(items),
            serde_json::Value::Object(map) => Value::map(map),
        }
    }
}
