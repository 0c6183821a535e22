//! Products section.

use edge_sdk::edge_core::RenderError;
use edge_sdk::edge_executor::{ListRenderer, TemplateSet};
use edge_sdk::edge_streaming::Section;

use crate::data::Product;

/// Products section definition.
pub fn products_section() -> Section {
    Section::builder("products").label("products").build()
}

/// Renderer for the product list.
pub fn products_renderer(templates: &TemplateSet) -> Result<ListRenderer<Product>, RenderError> {
    Ok(ListRenderer::from_set(templates, "products", "product")?
        .with_empty(r#"<h2>Products</h2><p class="empty">No products yet.</p>"#))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::demo_products;
    use crate::templates::templates;
    use edge_sdk::edge_executor::SectionRenderer;

    #[test]
    fn test_products_in_order() {
        let html = products_renderer(templates())
            .unwrap()
            .render(&demo_products())
            .unwrap();
        assert!(html.contains(r#"data-count="6""#));
        let first = html.find("Product 1 Description").unwrap();
        let last = html.find("Product 6 Description").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_no_products() {
        let html = products_renderer(templates()).unwrap().render(&vec![]).unwrap();
        assert!(html.contains("No products yet."));
    }
}
