//! Page templates, parsed once per process.

use std::sync::OnceLock;

use edge_sdk::edge_executor::TemplateSet;

/// The process-wide template set. Read-only after first use.
pub fn templates() -> &'static TemplateSet {
    static TEMPLATES: OnceLock<TemplateSet> = OnceLock::new();
    TEMPLATES.get_or_init(build)
}

fn build() -> TemplateSet {
    TemplateSet::new()
        .with(
            "profile_signed_in",
            r#"<div class="profile profile--signed-in">
    <p>Welcome back!</p>
    <a href="/account">Your account</a>
</div>"#,
        )
        .with(
            "profile_signed_out",
            r#"<div class="profile profile--signed-out">
    <a href="/login">Sign in</a>
</div>"#,
        )
        .with(
            "products",
            r#"<h2>Products</h2>
<ul class="products" data-count="{{count}}">{{{items}}}</ul>"#,
        )
        .with(
            "product",
            r#"
    <li class="product"><h3>{{name}}</h3><p>{{description}}</p></li>"#,
        )
        .with(
            "categories",
            r#"<h2>Categories</h2>
<ul class="categories">{{{items}}}</ul>"#,
        )
        .with(
            "category",
            r#"
    <li class="category">{{.}}</li>"#,
        )
}

/// CSS for the page chrome, placeholders and sections.
pub const PAGE_STYLES: &str = r#"
* { box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; background: #f5f5f5; }
.site-header { background: #333; color: white; padding: 1rem 2rem; }
.page { max-width: 960px; margin: 0 auto; padding: 2rem; display: grid; gap: 1rem; }
.section { background: white; border-radius: 8px; padding: 1.5rem; }
.section--loading { color: #888; }
.skeleton { height: 4rem; border-radius: 4px; background: linear-gradient(90deg, #eee 25%, #f5f5f5 50%, #eee 75%); background-size: 200% 100%; animation: shimmer 1.2s infinite; }
@keyframes shimmer { from { background-position: 200% 0; } to { background-position: -200% 0; } }
.loading-label { font-size: 0.875rem; margin: 0.5rem 0 0; }
.products { list-style: none; padding: 0; display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 1rem; }
.product h3 { margin: 0 0 0.25rem; }
.categories { padding-left: 1.25rem; }
.request-info { font-size: 0.75rem; color: #666; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_templates_built_once() {
        assert!(std::ptr::eq(templates(), templates()));
        assert_eq!(templates().len(), 6);
    }

    #[test]
    fn test_product_template_escapes() {
        let html = templates()
            .render("product", &json!({"name": "<b>", "description": "a & b"}))
            .unwrap();
        assert!(html.contains("<h3>&lt;b&gt;</h3>"));
        assert!(html.contains("a &amp; b"));
    }
}
