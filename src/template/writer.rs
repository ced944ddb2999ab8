//! Renders compiled templates against a [`Context`].
//!
//! The [`Writer`] owns a parse cache keyed by `(source, delimiters)`, so
//! partials and lambda sub-renders are compiled once and reused across calls.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::Xxh3;

use super::context::Context;
use super::value::Value;
use super::{Node, Tags, Template};
use crate::errors::TemplateError;

/// Named template fragments available to `{{> name}}` tags.
pub trait PartialSource {
    fn partial(&self, name: &str) -> Option<&str>;
}

impl PartialSource for () {
    fn partial(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl<S: BuildHasher> PartialSource for HashMap<String, String, S> {
    fn partial(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl PartialSource for BTreeMap<String, String> {
    fn partial(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<P: PartialSource + ?Sized> PartialSource for &P {
    fn partial(&self, name: &str) -> Option<&str> {
        (**self).partial(name)
    }
}

#[derive(Default)]
pub struct Writer {
    cache: RefCell<FxHashMap<u128, Arc<Template>>>,
}

impl Writer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct `(source, delimiters)` pairs compiled so far.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Compiles `source`, reusing a previous compilation when available.
    pub fn parse(&self, source: &str, tags: &Tags) -> Result<Arc<Template>, TemplateError> {
        let key = cache_key(source, tags);
        if let Some(template) = self.cache.borrow().get(&key) {
            return Ok(Arc::clone(template));
        }

        let template = Arc::new(Template::compile_with_tags(source, tags.clone())?);
        self.cache.borrow_mut().insert(key, Arc::clone(&template));
        Ok(template)
    }

    /// Parses (or reuses) `source` and renders it against `view`.
    pub fn render(
        &self,
        source: &str,
        view: &Value,
        partials: &dyn PartialSource,
    ) -> Result<String, TemplateError> {
        let template = self.parse(source, &Tags::default())?;
        self.render_template(&template, &Context::new(view.clone()), partials)
    }

    /// Renders an already compiled template in `ctx`.
    pub fn render_template(
        &self,
        template: &Template,
        ctx: &Context<'_>,
        partials: &dyn PartialSource,
    ) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(template.source().len());
        self.render_nodes(template.nodes(), template.source(), ctx, partials, &mut out)?;
        Ok(out)
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        source: &str,
        ctx: &Context<'_>,
        partials: &dyn PartialSource,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Variable { name, escaped } => {
                    let value = ctx.lookup(name);
                    let text = value.to_text();
                    if *escaped {
                        escape_html_into(&text, out);
                    } else {
                        out.push_str(&text);
                    }
                }
                Node::Section {
                    name,
                    inverted: true,
                    children,
                    ..
                } => {
                    let value = ctx.lookup(name);
                    if !value.is_truthy() || value.is_empty_list() {
                        self.render_nodes(children, source, ctx, partials, out)?;
                    }
                }
                Node::Section {
                    name,
                    inverted: false,
                    children,
                    inner,
                    tags,
                } => {
                    let value = ctx.lookup(name);
                    if !value.is_truthy() {
                        continue;
                    }
                    match &value {
                        Value::List(items) => {
                            for item in items.iter() {
                                let frame = ctx.push(item.clone());
                                self.render_nodes(children, source, &frame, partials, out)?;
                            }
                        }
                        Value::Macro(f) => {
                            let raw = &source[inner.clone()];
                            let sub = |text: &str| -> Result<String, TemplateError> {
                                let template = self.parse(text, tags)?;
                                self.render_template(&template, ctx, partials)
                            };
                            out.push_str(&f(raw, &sub)?);
                        }
                        Value::Bool(_) => {
                            self.render_nodes(children, source, ctx, partials, out)?;
                        }
                        _ => {
                            let frame = ctx.push(value.clone());
                            self.render_nodes(children, source, &frame, partials, out)?;
                        }
                    }
                }
                Node::Partial { name, indentation } => {
                    let Some(partial) = partials.partial(name) else {
                        continue;
                    };
                    let text = match indentation {
                        Some(indent) => Cow::Owned(indent_partial(partial, indent)),
                        None => Cow::Borrowed(partial),
                    };
                    let template = self.parse(&text, &Tags::default())?;
                    self.render_nodes(template.nodes(), template.source(), ctx, partials, out)?;
                }
            }
        }
        Ok(())
    }
}

fn cache_key(source: &str, tags: &Tags) -> u128 {
    let mut hasher = Xxh3::new();
    hasher.update(source.as_bytes());
    hasher.update(&[0]);
    hasher.update(tags.open.as_bytes());
    hasher.update(&[0]);
    hasher.update(tags.close.as_bytes());
    hasher.digest128()
}

/// Prefixes every non-empty line of `text` with the space and tab
/// characters of `indentation`.
fn indent_partial(text: &str, indentation: &str) -> String {
    let indent: String = indentation
        .chars()
        .filter(|c| matches!(c, ' ' | '\t'))
        .collect();
    let mut out = String::with_capacity(text.len() + indent.len() * 4);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if !line.is_empty() {
            out.push_str(&indent);
        }
        out.push_str(line);
    }
    out
}

fn escape_html_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            c => out.push(c),
        }
    }
}

/// HTML-escapes `text` the same way escaped `{{name}}` tags do.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(text, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_the_full_character_set() {
        assert_eq!(
            escape_html(r#"<a href="/x" title='y'>&`=</a>"#),
            "&lt;a href&#x3D;&quot;&#x2F;x&quot; title&#x3D;&#39;y&#39;&gt;&amp;&#x60;&#x3D;&lt;&#x2F;a&gt;"
        );
    }

    #[test]
    fn indent_skips_empty_lines() {
        assert_eq!(indent_partial("a\n\nb\n", "  "), "  a\n\n  b\n");
    }

    #[test]
    fn parse_cache_is_keyed_by_source_and_tags() {
        let writer = Writer::new();
        let a = writer.parse("{{x}}", &Tags::default()).expect("parse");
        let b = writer.parse("{{x}}", &Tags::default()).expect("parse");
        assert!(Arc::ptr_eq(&a, &b));

        let tags = Tags::new("<%", "%>");
        writer.parse("{{x}}", &tags).expect("parse");
        assert_eq!(writer.cached_len(), 2);
    }

    #[test]
    fn partials_render_in_current_context() {
        let mut partials = HashMap::new();
        partials.insert("item".to_owned(), "[{{.}}]".to_owned());
        let view = Value::map([("xs", Value::from(vec![1, 2]))]);
        let out = Writer::new()
            .render("{{#xs}}{{> item}}{{/xs}}{{> missing}}", &view, &partials)
            .expect("render");
        assert_eq!(out, "[1][2]");
    }
}
