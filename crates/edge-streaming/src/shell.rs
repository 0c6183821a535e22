//! Page shell with section placeholders.

use crate::html::escape_html;
use crate::placeholder::{render_placeholder, wrap_filled};
use crate::section::Section;

/// Head content for the shell.
#[derive(Debug, Clone, Default)]
pub struct HeadContent {
    /// Page title.
    pub title: Option<String>,
    /// Meta tags.
    pub meta: Vec<(String, String)>,
    /// Link tags (stylesheets, etc.).
    pub links: Vec<String>,
    /// Inline scripts in head.
    pub scripts: Vec<String>,
}

impl HeadContent {
    /// Create new head content with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Add a meta tag.
    pub fn with_meta(mut self, name: &str, content: &str) -> Self {
        self.meta.push((name.to_string(), content.to_string()));
        self
    }

    /// Add a stylesheet link.
    pub fn with_stylesheet(mut self, href: &str) -> Self {
        self.links.push(format!(
            r#"<link rel="stylesheet" href="{}">"#,
            escape_html(href)
        ));
        self
    }

    /// Add inline CSS styles.
    pub fn with_style(mut self, css: &str) -> Self {
        self.links.push(format!("<style>{}</style>", css));
        self
    }

    /// Add an inline script.
    pub fn with_script(mut self, js: &str) -> Self {
        self.scripts.push(js.to_string());
        self
    }

    /// Render head content to HTML.
    pub fn render(&self) -> String {
        let mut html = String::from("<meta charset=\"utf-8\">\n");

        if let Some(title) = &self.title {
            html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
        }

        for (name, content) in &self.meta {
            html.push_str(&format!(
                r#"<meta name="{}" content="{}">"#,
                escape_html(name),
                escape_html(content)
            ));
            html.push('\n');
        }

        for link in &self.links {
            html.push_str(link);
            html.push('\n');
        }

        for script in &self.scripts {
            html.push_str(&format!("<script>{}</script>\n", script));
        }

        html
    }
}

/// Static page chrome wrapped around the sections.
///
/// Built once per request and not modified after it has been emitted.
#[derive(Debug, Clone)]
pub struct Shell {
    /// Include doctype declaration.
    pub doctype: bool,
    /// Head content.
    pub head: HeadContent,
    /// HTML before sections (opening body, wrapper divs, etc.).
    pub body_start: String,
    /// HTML after sections (closing tags).
    pub body_end: String,
}

impl Shell {
    /// Create a new shell with basic structure.
    pub fn new(head: HeadContent) -> Self {
        Self {
            doctype: true,
            head,
            body_start: "<body>\n<main>\n".to_string(),
            body_end: "</main>\n</body>\n</html>\n".to_string(),
        }
    }

    /// Set custom body start HTML.
    pub fn with_body_start(mut self, html: impl Into<String>) -> Self {
        self.body_start = html.into();
        self
    }

    /// Set custom body end HTML.
    pub fn with_body_end(mut self, html: impl Into<String>) -> Self {
        self.body_end = html.into();
        self
    }

    fn render_head(&self) -> String {
        let mut html = String::new();

        if self.doctype {
            html.push_str("<!DOCTYPE html>\n");
        }

        html.push_str("<html>\n<head>\n");
        html.push_str(&self.head.render());
        html.push_str("</head>\n");
        html.push_str(&self.body_start);

        html
    }

    /// Render the opening part of the page: chrome plus one placeholder per
    /// section, in the order given.
    pub fn render_opening(&self, sections: &[Section]) -> String {
        let mut html = self.render_head();
        for section in sections {
            html.push_str(&render_placeholder(section));
        }
        html
    }

    /// Render the closing part of the shell (after sections).
    pub fn render_closing(&self) -> String {
        self.body_end.clone()
    }

    /// Render a complete page with every section already filled in.
    pub fn render_document(&self, sections: &[(&Section, String)]) -> String {
        let mut html = self.render_head();
        for (section, body) in sections {
            html.push_str(&wrap_filled(&section.id, body));
        }
        html.push_str(&self.body_end);
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Section> {
        vec![
            Section::builder("a").build(),
            Section::builder("b").build(),
            Section::builder("c").build(),
        ]
    }

    #[test]
    fn test_opening_has_placeholders_in_order() {
        let shell = Shell::new(HeadContent::new("Test"));
        let html = shell.render_opening(&sections());

        let a = html.find(r#"data-placeholder="a""#).unwrap();
        let b = html.find(r#"data-placeholder="b""#).unwrap();
        let c = html.find(r#"data-placeholder="c""#).unwrap();
        assert!(a < b && b < c);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(!html.contains("</html>"));
    }

    #[test]
    fn test_document_inlines_sections_without_placeholders() {
        let shell = Shell::new(HeadContent::new("Test"));
        let s = sections();
        let html =
            shell.render_document(&[(&s[0], "<p>A</p>".into()), (&s[1], "<p>B</p>".into())]);

        assert!(!html.contains("data-placeholder"));
        assert!(html.find("<p>A</p>").unwrap() < html.find("<p>B</p>").unwrap());
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_head_escapes_title() {
        let head = HeadContent::new("A & B").with_meta("viewport", "width=device-width");
        let html = head.render();
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains(r#"<meta name="viewport" content="width=device-width">"#));
    }
}
