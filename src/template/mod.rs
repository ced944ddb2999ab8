//! Logic-less text templates used to synthesize shader source.
//!
//! The syntax is the familiar mustache dialect:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `{{name}}` | HTML-escaped interpolation |
//! | `{{{name}}}`, `{{&name}}` | Raw interpolation |
//! | `{{#name}}..{{/name}}` | Section (conditional / loop / lambda) |
//! | `{{^name}}..{{/name}}` | Inverted section |
//! | `{{>name}}` | Partial |
//! | `{{!comment}}` | Comment |
//! | `{{=<% %>=}}` | Delimiter change |
//!
//! Lines holding only non-output tags are removed entirely, so shader
//! templates can put `{{#flag}}` on its own line without leaving blank lines
//! in the generated code.
//!
//! ```rust,ignore
//! use myth_forward::template::{Template, Value};
//!
//! let tmpl = Template::compile("{{#useColor}}uniform vec4 color;{{/useColor}}")?;
//! let src = tmpl.render(&Value::map([("useColor", true)]), &())?;
//! ```

mod context;
mod parser;
mod scanner;
mod value;
mod writer;

use std::ops::Range;
use std::sync::Arc;

pub use context::Context;
pub use value::{ComputedFn, MacroFn, SubRender, Value};
pub use writer::{PartialSource, Writer, escape_html};

use crate::errors::TemplateError;

/// Opening and closing tag delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tags {
    pub open: String,
    pub close: String,
}

impl Default for Tags {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

impl Tags {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Parses the body of a delimiter change tag, e.g. `<% %>`.
    pub fn from_spec(spec: &str) -> Result<Self, TemplateError> {
        let mut parts = spec.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(open), Some(close), None) => Ok(Self::new(open, close)),
            _ => Err(TemplateError::InvalidTags(spec.to_owned())),
        }
    }
}

/// One instruction of a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Variable {
        name: String,
        escaped: bool,
    },
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
        /// Byte range of the unrendered section body in the template source.
        inner: Range<usize>,
        /// Delimiters in effect where the section was opened.
        tags: Tags,
    },
    /// `indentation` is set only for standalone partial tags.
    Partial {
        name: String,
        indentation: Option<String>,
    },
}

/// A compiled template: the source text and its instruction tree.
#[derive(Debug, Clone)]
pub struct Template {
    source: Arc<str>,
    tags: Tags,
    nodes: Vec<Node>,
}

impl Template {
    /// Compiles `source` with the default `{{ }}` delimiters.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        Self::compile_with_tags(source, Tags::default())
    }

    pub fn compile_with_tags(source: &str, tags: Tags) -> Result<Self, TemplateError> {
        let nodes = parser::parse(source, &tags)?;
        Ok(Self {
            source: Arc::from(source),
            tags,
            nodes,
        })
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    #[must_use]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Renders against `view` with a throwaway [`Writer`].
    pub fn render(
        &self,
        view: &Value,
        partials: &dyn PartialSource,
    ) -> Result<String, TemplateError> {
        Writer::new().render_template(self, &Context::new(view.clone()), partials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn render(src: &str, view: serde_json::Value) -> String {
        Template::compile(src)
            .expect("compile")
            .render(&view.into(), &())
            .expect("render")
    }

    #[test]
    fn section_and_inverted_section_are_complementary() {
        let src = "{{#flag}}A{{/flag}}{{^flag}}B{{/flag}}";
        assert_eq!(render(src, json!({ "flag": true })), "A");
        assert_eq!(render(src, json!({ "flag": false })), "B");
        assert_eq!(render(src, json!({})), "B");
    }

    #[test]
    fn list_sections_iterate_elements() {
        assert_eq!(
            render("{{#items}}{{.}},{{/items}}", json!({ "items": [1, 2, 3] })),
            "1,2,3,"
        );
        assert_eq!(render("{{#items}}x{{/items}}", json!({ "items": [] })), "");
        assert_eq!(
            render("{{^items}}none{{/items}}", json!({ "items": [] })),
            "none"
        );
    }

    #[test]
    fn record_sections_push_a_scope() {
        let view = json!({ "light": { "count": 4 }, "count": 1 });
        assert_eq!(render("{{#light}}{{count}}{{/light}}{{count}}", view), "41");
    }

    #[test]
    fn zero_and_empty_string_are_falsy() {
        let view = json!({ "n": 0, "s": "" });
        assert_eq!(render("{{#n}}x{{/n}}{{#s}}y{{/s}}{{^n}}z{{/n}}", view), "z");
    }

    #[test]
    fn escaping_and_raw_output() {
        let view = json!({ "v": "a<b" });
        assert_eq!(render("{{v}} {{{v}}} {{&v}}", view), "a&lt;b a<b a<b");
    }

    #[test]
    fn dotted_names_resolve() {
        let view = json!({ "a": { "b": { "c": "deep" } } });
        assert_eq!(render("{{a.b.c}}|{{a.x.c}}", view), "deep|");
    }

    #[test]
    fn comments_render_nothing() {
        assert_eq!(render("a{{! ignored }}b", json!({})), "ab");
    }

    #[test]
    fn lambda_sections_receive_raw_text() {
        let view = Value::map([
            ("name", Value::from("x")),
            (
                "wrap",
                Value::lambda(|raw, render| Ok(format!("<{}>({})", raw, render(raw)?))),
            ),
        ]);
        let out = Template::compile("{{#wrap}}hi {{name}}{{/wrap}}")
            .expect("compile")
            .render(&view, &())
            .expect("render");
        assert_eq!(out, "<hi {{name}}>(hi x)");
    }

    #[test]
    fn lambda_sub_render_keeps_changed_delimiters() {
        let view = Value::map([
            ("name", Value::from("x")),
            ("wrap", Value::lambda(|raw, render| render(raw))),
        ]);
        let out = Template::compile("{{=<% %>=}}<%#wrap%><%name%>{{name}}<%/wrap%>")
            .expect("compile")
            .render(&view, &())
            .expect("render");
        assert_eq!(out, "x{{name}}");
    }

    #[test]
    fn standalone_partials_are_indented() {
        let mut partials = HashMap::new();
        partials.insert("decl".to_owned(), "float a;\nfloat b;\n".to_owned());
        let out = Template::compile("void main() {\n  {{> decl}}\n}")
            .expect("compile")
            .render(&Value::Null, &partials)
            .expect("render");
        assert_eq!(out, "void main() {\n  float a;\n  float b;\n}");
    }

    #[test]
    fn standalone_section_lines_leave_no_blank_lines() {
        let src = "a\n{{#f}}\nb\n{{/f}}\nc\n";
        assert_eq!(render(src, json!({ "f": true })), "a\nb\nc\n");
        assert_eq!(render(src, json!({ "f": false })), "a\nc\n");
    }
}
