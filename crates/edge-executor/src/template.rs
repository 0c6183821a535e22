//! Named sub-templates with field placeholders.
//!
//! Syntax:
//! - `{{field}}` inserts the payload field, HTML-escaped
//! - `{{{field}}}` inserts it unescaped (for markup produced by another template)
//! - `{{.}}` refers to the payload itself, for scalar payloads

use std::collections::HashMap;

use edge_core::RenderError;
use edge_streaming::escape_html;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Escaped(String),
    Raw(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template. An unterminated `{{` is kept as literal text.
    pub fn parse(name: impl Into<String>, source: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(open) = rest.find("{{") {
            text.push_str(&rest[..open]);
            let tag = &rest[open..];
            let (raw, skip, close) = if tag.starts_with("{{{") {
                (true, 3, "}}}")
            } else {
                (false, 2, "}}")
            };

            let Some(end) = tag[skip..].find(close) else {
                text.push_str(tag);
                rest = "";
                break;
            };

            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            let field = tag[skip..skip + end].trim().to_string();
            segments.push(if raw {
                Segment::Raw(field)
            } else {
                Segment::Escaped(field)
            });
            rest = &tag[skip + end + close.len()..];
        }

        text.push_str(rest);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Self {
            name: name.into(),
            segments,
        }
    }

    /// Template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields the template reads, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Escaped(f) | Segment::Raw(f) => Some(f.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Apply the template to a payload.
    ///
    /// Fails if the payload lacks a field the template reads.
    pub fn render(&self, payload: &Value) -> Result<String, RenderError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Escaped(f) => out.push_str(&escape_html(&self.lookup(payload, f)?)),
                Segment::Raw(f) => out.push_str(&self.lookup(payload, f)?),
            }
        }
        Ok(out)
    }

    fn lookup(&self, payload: &Value, field: &str) -> Result<String, RenderError> {
        if field == "." {
            return Ok(display(payload));
        }

        let object = payload.as_object().ok_or_else(|| RenderError::NotAnObject {
            template: self.name.clone(),
        })?;

        object
            .get(field)
            .map(display)
            .ok_or_else(|| RenderError::MissingField {
                template: self.name.clone(),
                field: field.to_string(),
            })
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Named templates, built once and then only read.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<String, Template>,
}

impl TemplateSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and add a template.
    pub fn with(mut self, name: &str, source: &str) -> Self {
        self.templates
            .insert(name.to_string(), Template::parse(name, source));
        self
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Result<&Template, RenderError> {
        self.templates
            .get(name)
            .ok_or_else(|| RenderError::UnknownTemplate(name.to_string()))
    }

    /// Render a named template.
    pub fn render(&self, name: &str, payload: &Value) -> Result<String, RenderError> {
        self.get(name)?.render(payload)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escaped_and_raw_fields() {
        let t = Template::parse("card", "<div>{{name}}</div>{{{body}}}");
        let html = t
            .render(&json!({"name": "<Tom & Jerry>", "body": "<b>ok</b>"}))
            .unwrap();
        assert_eq!(html, "<div>&lt;Tom &amp; Jerry&gt;</div><b>ok</b>");
        assert_eq!(t.fields().collect::<Vec<_>>(), ["name", "body"]);
    }

    #[test]
    fn test_missing_field_is_render_error() {
        let t = Template::parse("product", "<li>{{name}}: {{description}}</li>");
        let err = t.render(&json!({"name": "Product 1"})).unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingField {
                template: "product".into(),
                field: "description".into()
            }
        );
    }

    #[test]
    fn test_scalar_payload() {
        let t = Template::parse("category", "<li>{{ . }}</li>");
        assert_eq!(t.render(&json!("Category 1")).unwrap(), "<li>Category 1</li>");

        let named = Template::parse("needs_object", "{{name}}");
        assert!(matches!(
            named.render(&json!(3)),
            Err(RenderError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_static_template_ignores_payload() {
        let t = Template::parse("static", "<p>Signed in</p>");
        assert_eq!(t.render(&Value::Null).unwrap(), "<p>Signed in</p>");
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        let t = Template::parse("odd", "a {{ b");
        assert_eq!(t.render(&Value::Null).unwrap(), "a {{ b");
    }

    #[test]
    fn test_template_set_lookup() {
        let set = TemplateSet::new().with("greeting", "Hi {{who}}");
        assert_eq!(set.render("greeting", &json!({"who": "you"})).unwrap(), "Hi you");
        assert_eq!(
            set.render("missing", &Value::Null),
            Err(RenderError::UnknownTemplate("missing".into()))
        );
        assert_eq!(set.len(), 1);
    }
}
