//! Categories section.

use edge_sdk::edge_core::RenderError;
use edge_sdk::edge_executor::{ListRenderer, TemplateSet};
use edge_sdk::edge_streaming::Section;

/// Categories section definition.
pub fn categories_section() -> Section {
    Section::builder("categories").label("categories").build()
}

/// Renderer for the category names.
pub fn categories_renderer(templates: &TemplateSet) -> Result<ListRenderer<String>, RenderError> {
    Ok(ListRenderer::from_set(templates, "categories", "category")?
        .with_empty(r#"<h2>Categories</h2><p class="empty">No categories.</p>"#))
}
