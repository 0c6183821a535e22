//! Placeholder markup for sections that have not loaded yet.

use crate::html::escape_html;
use crate::section::{Section, SectionId};

/// Render the loading skeleton for a section.
///
/// The `data-placeholder` attribute carries the slot id so client script
/// can find the slot once the section's markup arrives.
pub fn render_placeholder(section: &Section) -> String {
    let id = escape_html(section.id.as_str());
    format!(
        r#"<div id="slot-{id}" data-placeholder="{id}" class="section section--loading" aria-busy="true">
    <div class="skeleton"></div>
    <p class="loading-label">Loading {label}&hellip;</p>
</div>
"#,
        id = id,
        label = escape_html(&section.label),
    )
}

/// Wrap rendered section markup so it addresses its placeholder.
pub fn wrap_filled(id: &SectionId, html: &str) -> String {
    let id = escape_html(id.as_str());
    format!(
        r#"<section id="section-{id}" data-fills="{id}" class="section">
{html}
</section>
"#,
        id = id,
        html = html
    )
}

/// Inline script that moves each filled section into its placeholder.
///
/// Sections arrive after the whole skeleton, so without this script they
/// render below it.
pub fn swap_script() -> &'static str {
    r#"(function() {
  function swap(node) {
    var id = node.getAttribute('data-fills');
    var slot = document.querySelector('[data-placeholder="' + id + '"]');
    if (slot) { slot.replaceWith(node); }
  }
  new MutationObserver(function(records) {
    records.forEach(function(r) {
      r.addedNodes.forEach(function(n) {
        if (n.nodeType === 1 && n.hasAttribute('data-fills')) { swap(n); }
      });
    });
  }).observe(document.documentElement, { childList: true, subtree: true });
})();"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_addressable_and_loading() {
        let section = Section::builder("products").label("Products").build();
        let html = render_placeholder(&section);

        assert!(html.contains(r#"data-placeholder="products""#));
        assert!(html.contains(r#"id="slot-products""#));
        assert!(html.contains("section--loading"));
        assert!(html.contains(r#"aria-busy="true""#));
        assert!(html.trim_end().ends_with("</div>"));
    }

    #[test]
    fn test_placeholder_escapes_label() {
        let section = Section::builder("x").label("<b>").build();
        assert!(render_placeholder(&section).contains("Loading &lt;b&gt;"));
    }

    #[test]
    fn test_wrap_filled_targets_slot() {
        let html = wrap_filled(&SectionId::new("profile"), "<p>hi</p>");
        assert!(html.starts_with(r#"<section id="section-profile" data-fills="profile""#));
        assert!(html.contains("<p>hi</p>"));
    }
}
