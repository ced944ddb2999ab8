//! Template Engine Tests
//!
//! Tests for:
//! - Sections over records, lists and falsy values
//! - Standalone-line trimming and delimiter changes
//! - Dotted lookup through the context chain
//! - Lambdas, computed values and partials
//! - Writer parse cache and parse errors

use std::collections::HashMap;

use serde_json::json;

use myth_forward::template::{Template, Value, Writer};
use myth_forward::TemplateError;

fn render(source: &str, view: serde_json::Value) -> String {
    Template::compile(source)
        .and_then(|t| t.render(&Value::from(view), &()))
        .unwrap()
}

// ============================================================================
// Sections
// ============================================================================

#[test]
fn section_round_trip_keeps_surrounding_text() {
    let out = render("A{{#flag}}/B{{/flag}}/C", json!({ "flag": true }));
    assert_eq!(out, "A/B/C");
    let out = render("A{{#flag}}/B{{/flag}}/C", json!({ "flag": false }));
    assert_eq!(out, "A/C");
}

#[test]
fn list_sections_iterate_items() {
    let out = render("{{#items}}{{.}},{{/items}}", json!({ "items": [1, 2, 3] }));
    assert_eq!(out, "1,2,3,");

    let out = render(
        "{{#people}}{{name}} {{/people}}",
        json!({ "people": [{ "name": "ann" }, { "name": "bo" }] }),
    );
    assert_eq!(out, "ann bo ");
}

#[test]
fn empty_list_renders_nothing_but_is_not_inverted() {
    assert_eq!(render("[{{#xs}}x{{/xs}}]", json!({ "xs": [] })), "[]");
    assert_eq!(render("[{{^xs}}none{{/xs}}]", json!({ "xs": [] })), "[none]");
    assert_eq!(render("[{{^xs}}none{{/xs}}]", json!({ "xs": [1] })), "[]");
}

#[test]
fn zero_and_empty_string_are_falsy() {
    assert_eq!(render("{{#n}}yes{{/n}}", json!({ "n": 0 })), "");
    assert_eq!(render("{{#s}}yes{{/s}}", json!({ "s": "" })), "");
    assert_eq!(render("{{#n}}{{n}}{{/n}}", json!({ "n": 4 })), "4");
}

#[test]
fn standalone_section_lines_are_removed() {
    let source = "begin\n  {{#on}}\n  body\n  {{/on}}\nend\n";
    assert_eq!(render(source, json!({ "on": true })), "begin\n  body\nend\n");
    assert_eq!(render(source, json!({ "on": false })), "begin\nend\n");
}

// ============================================================================
// Variables
// ============================================================================

#[test]
fn escaped_and_raw_variables() {
    let view = json!({ "s": "<a & 'b'>" });
    assert_eq!(render("{{s}}", view.clone()), "&lt;a &amp; &#39;b&#39;&gt;");
    assert_eq!(render("{{{s}}}", view.clone()), "<a & 'b'>");
    assert_eq!(render("{{& s}}", view), "<a & 'b'>");
}

#[test]
fn missing_names_render_empty() {
    assert_eq!(render("[{{nope}}]", json!({})), "[]");
    assert_eq!(render("[{{a.b.c}}]", json!({ "a": {} })), "[]");
}

#[test]
fn dotted_names_descend_from_first_match() {
    let view = json!({
        "a": { "b": { "c": "deep" } },
        "outer": { "x": 1 },
        "inner": { "outer": {} }
    });
    assert_eq!(render("{{a.b.c}}", view.clone()), "deep");
    // `outer` resolves in the innermost frame, which has no `x`.
    assert_eq!(render("{{#inner}}[{{outer.x}}]{{/inner}}", view), "[]");
}

#[test]
fn comments_and_delimiter_changes() {
    assert_eq!(render("a{{! ignored }}b", json!({})), "ab");
    assert_eq!(
        render("{{=<% %>=}}<% v %>{{v}}", json!({ "v": 1 })),
        "1{{v}}"
    );
}

// ============================================================================
// Lambdas, computed values, partials
// ============================================================================

#[test]
fn lambdas_receive_raw_text_and_can_render_it() {
    let view = Value::map([
        ("name", Value::from("world")),
        (
            "bold",
            Value::lambda(|text, render| Ok(format!("<b>{}</b>", render(text)?))),
        ),
    ]);
    let out = Template::compile("{{#bold}}hi {{name}}{{/bold}}")
        .and_then(|t| t.render(&view, &()))
        .unwrap();
    assert_eq!(out, "<b>hi world</b>");
}

#[test]
fn computed_values_see_the_current_view() {
    let view = Value::map([
        ("first", Value::from("Ada")),
        (
            "greeting",
            Value::computed(|view| {
                let name = view.get("first").map(|v| v.to_text().into_owned()).unwrap_or_default();
                Value::from(format!("Hello {name}"))
            }),
        ),
    ]);
    let out = Template::compile("{{greeting}}")
        .and_then(|t| t.render(&view, &()))
        .unwrap();
    assert_eq!(out, "Hello Ada");
}

#[test]
fn standalone_partials_are_indented() {
    let mut partials = HashMap::new();
    partials.insert("body".to_owned(), "x = 1;\ny = 2;\n".to_owned());
    let out = Template::compile("main {\n  {{> body}}\n}\n")
        .and_then(|t| t.render(&Value::Null, &partials))
        .unwrap();
    assert_eq!(out, "main {\n  x = 1;\n  y = 2;\n}\n");
}

// ============================================================================
// Writer
// ============================================================================

#[test]
fn writer_caches_parsed_sources() {
    let writer = Writer::new();
    let view = Value::from(json!({ "v": 2 }));
    assert_eq!(writer.render("{{v}}", &view, &()).unwrap(), "2");
    assert_eq!(writer.render("{{v}}", &view, &()).unwrap(), "2");
    assert_eq!(writer.cached_len(), 1);
    writer.clear_cache();
    assert_eq!(writer.cached_len(), 0);
}

#[test]
fn malformed_templates_are_rejected() {
    assert!(matches!(
        Template::compile("{{#a}}open"),
        Err(TemplateError::UnclosedSection { .. })
    ));
    assert!(matches!(
        Template::compile("{{/a}}"),
        Err(TemplateError::UnopenedSection { .. })
    ));
    assert!(matches!(
        Template::compile("{{#a}}{{/b}}"),
        Err(TemplateError::MismatchedSection { .. })
    ));
    assert!(matches!(
        Template::compile("{{oops"),
        Err(TemplateError::UnclosedTag { .. })
    ));
}
