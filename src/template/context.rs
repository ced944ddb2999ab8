//! Scope chain used during rendering.
//!
//! A [`Context`] is one frame of an immutable linked list: its own view value
//! plus a borrowed pointer to the enclosing frame. Each frame memoizes where
//! the names looked up through it resolve, so repeated references inside a
//! loop body walk the chain once per element. Computed values are cached
//! unevaluated and called on every lookup.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use super::value::Value;

pub struct Context<'a> {
    view: Value,
    parent: Option<&'a Context<'a>>,
    cache: RefCell<FxHashMap<String, Value>>,
}

impl<'a> Context<'a> {
    /// Creates a root context.
    #[must_use]
    pub fn new(view: Value) -> Self {
        Self {
            view,
            parent: None,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Creates a child frame whose lookups fall back to `self`.
    #[must_use]
    pub fn push(&self, view: Value) -> Context<'_> {
        Context {
            view,
            parent: Some(self),
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    #[inline]
    #[must_use]
    pub fn view(&self) -> &Value {
        &self.view
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&'a Context<'a>> {
        self.parent
    }

    /// Resolves `name` against the chain.
    ///
    /// - `.` is the current view.
    /// - `a.b.c` locates the innermost frame holding `a` and descends from
    ///   there only; a missing intermediate field yields `Null`.
    /// - Computed values are evaluated with the current view.
    pub fn lookup(&self, name: &str) -> Value {
        let cached = self.cache.borrow().get(name).cloned();
        let value = match cached {
            Some(hit) => hit,
            None => {
                let value = if name == "." {
                    self.view.clone()
                } else {
                    let (head, rest) = match name.split_once('.') {
                        Some((head, rest)) => (head, Some(rest)),
                        None => (name, None),
                    };
                    self.resolve(head, rest)
                };
                self.cache
                    .borrow_mut()
                    .insert(name.to_owned(), value.clone());
                value
            }
        };

        match value {
            Value::Computed(f) => f(&self.view),
            other => other,
        }
    }

    fn resolve(&self, head: &str, rest: Option<&str>) -> Value {
        let mut frame = Some(self);
        while let Some(ctx) = frame {
            if let Some(first) = ctx.view.get(head) {
                let Some(rest) = rest else {
                    return first.clone();
                };
                let mut current = first;
                for segment in rest.split('.') {
                    match current.get(segment) {
                        Some(next) => current = next,
                        None => return Value::Null,
                    }
                }
                return current.clone();
            }
            frame = ctx.parent;
        }
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn plain_names_fall_back_to_parent() {
        let root = Context::new(json!({ "a": 1, "b": 2 }).into());
        let child = root.push(json!({ "a": 10 }).into());
        assert_eq!(child.lookup("a"), Value::from(10));
        assert_eq!(child.lookup("b"), Value::from(2));
        assert!(child.lookup("c").is_null());
    }

    #[test]
    fn dotted_names_do_not_fall_back_per_segment() {
        let root = Context::new(json!({ "a": { "b": { "c": 1 } } }).into());
        let child = root.push(json!({ "a": { "x": 1 } }).into());
        assert!(child.lookup("a.b.c").is_null());
        assert_eq!(root.lookup("a.b.c"), Value::from(1));
        // First segment missing locally: the parent is consulted.
        let other = root.push(json!({ "z": 0 }).into());
        assert_eq!(other.lookup("a.b.c"), Value::from(1));
    }

    #[test]
    fn dot_is_current_view() {
        let root = Context::new(Value::from("outer"));
        let child = root.push(Value::from("inner"));
        assert_eq!(child.lookup("."), Value::from("inner"));
    }

    #[test]
    fn computed_values_see_current_view() {
        let view = Value::map([
            ("n", Value::from(4)),
            (
                "double",
                Value::computed(|view| {
                    let n = match view.get("n") {
                        Some(Value::Number(n)) => *n,
                        _ => 0.0,
                    };
                    Value::from(n * 2.0)
                }),
            ),
        ]);
        let ctx = Context::new(view);
        assert_eq!(ctx.lookup("double"), Value::from(8));
    }

    #[test]
    fn computed_values_run_on_every_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let view = Value::map([(
            "tick",
            Value::computed(move |_| Value::from(counter.fetch_add(1, Ordering::Relaxed))),
        )]);
        let ctx = Context::new(view);
        assert_eq!(ctx.lookup("tick"), Value::from(0));
        assert_eq!(ctx.lookup("tick"), Value::from(1));
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }
}
