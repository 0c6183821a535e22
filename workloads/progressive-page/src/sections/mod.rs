//! Section definitions and renderers for the page.

mod categories;
mod products;
mod profile;

use std::sync::Arc;

use edge_sdk::edge_core::RenderError;
use edge_sdk::edge_executor::{FlagRenderer, ListRenderer, TemplateSet};
use edge_sdk::edge_streaming::Section;

use crate::data::Product;

pub use categories::*;
pub use products::*;
pub use profile::*;

/// Renderers for every section, shared across requests.
#[derive(Clone)]
pub struct Renderers {
    pub profile: Arc<FlagRenderer>,
    pub products: Arc<ListRenderer<Product>>,
    pub categories: Arc<ListRenderer<String>>,
}

impl Renderers {
    /// Build every renderer from the template set.
    pub fn from_templates(templates: &TemplateSet) -> Result<Self, RenderError> {
        Ok(Self {
            profile: Arc::new(profile_renderer(templates)?),
            products: Arc::new(products_renderer(templates)?),
            categories: Arc::new(categories_renderer(templates)?),
        })
    }
}

/// Sections in document order.
pub fn page_sections() -> [Section; 3] {
    [profile_section(), products_section(), categories_section()]
}
