//! Profile section: signed-in greeting or sign-in prompt.

use edge_sdk::edge_core::RenderError;
use edge_sdk::edge_executor::{FlagRenderer, TemplateSet};
use edge_sdk::edge_streaming::Section;

/// Profile section definition.
pub fn profile_section() -> Section {
    Section::builder("profile").label("profile").build()
}

/// Renderer for the signed-in flag.
pub fn profile_renderer(templates: &TemplateSet) -> Result<FlagRenderer, RenderError> {
    FlagRenderer::from_set(templates, "profile_signed_in", "profile_signed_out")
}
