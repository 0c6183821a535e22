//! Section renderers.
//!
//! A renderer turns one section's payload into markup. Rendering is pure:
//! no waiting and no side effects.

use std::marker::PhantomData;

use edge_core::RenderError;
use serde::Serialize;
use serde_json::{json, Value};

use crate::template::{Template, TemplateSet};

/// Produce markup for a typed payload.
pub trait SectionRenderer: Send + Sync {
    /// Payload this renderer accepts.
    type Payload: Send + Sync + 'static;

    /// Render the payload.
    fn render(&self, payload: &Self::Payload) -> Result<String, RenderError>;
}

/// Renderer for a boolean payload.
#[derive(Debug, Clone)]
pub struct FlagRenderer {
    when_set: Template,
    when_unset: Template,
}

impl FlagRenderer {
    /// Create a flag renderer from two templates.
    pub fn new(when_set: Template, when_unset: Template) -> Self {
        Self {
            when_set,
            when_unset,
        }
    }

    /// Create a flag renderer from templates in a set.
    pub fn from_set(
        set: &TemplateSet,
        when_set: &str,
        when_unset: &str,
    ) -> Result<Self, RenderError> {
        Ok(Self::new(
            set.get(when_set)?.clone(),
            set.get(when_unset)?.clone(),
        ))
    }
}

impl SectionRenderer for FlagRenderer {
    type Payload = bool;

    fn render(&self, payload: &bool) -> Result<String, RenderError> {
        let template = if *payload {
            &self.when_set
        } else {
            &self.when_unset
        };
        template.render(&json!({ "value": payload }))
    }
}

/// Renderer for a list payload.
///
/// Each item is serialized and applied to the `item` template. The joined
/// markup reaches the `list` template as the raw field `items`, along with
/// `count`. An empty list renders `empty` instead.
pub struct ListRenderer<T> {
    list: Template,
    item: Template,
    empty: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> ListRenderer<T> {
    /// Create a list renderer.
    pub fn new(list: Template, item: Template) -> Self {
        Self {
            list,
            item,
            empty: String::new(),
            _item: PhantomData,
        }
    }

    /// Create a list renderer from templates in a set.
    pub fn from_set(set: &TemplateSet, list: &str, item: &str) -> Result<Self, RenderError> {
        Ok(Self::new(set.get(list)?.clone(), set.get(item)?.clone()))
    }

    /// Markup rendered when the list is empty.
    pub fn with_empty(mut self, html: impl Into<String>) -> Self {
        self.empty = html.into();
        self
    }
}

impl<T> SectionRenderer for ListRenderer<T>
where
    T: Serialize + Send + Sync + 'static,
{
    type Payload = Vec<T>;

    fn render(&self, payload: &Vec<T>) -> Result<String, RenderError> {
        if payload.is_empty() {
            return Ok(self.empty.clone());
        }

        let mut items = String::new();
        for item in payload {
            let value: Value =
                serde_json::to_value(item).map_err(|e| RenderError::Payload(e.to_string()))?;
            items.push_str(&self.item.render(&value)?);
        }

        self.list
            .render(&json!({ "items": items, "count": payload.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Item {
        name: &'static str,
    }

    fn list() -> ListRenderer<Item> {
        ListRenderer::new(
            Template::parse("list", "<ul data-count=\"{{count}}\">{{{items}}}</ul>"),
            Template::parse("item", "<li>{{name}}</li>"),
        )
        .with_empty("<p>None</p>")
    }

    #[test]
    fn test_flag_chooses_template() {
        let r = FlagRenderer::new(
            Template::parse("in", "<p>Welcome back</p>"),
            Template::parse("out", "<a href=\"/login\">Sign in</a>"),
        );
        assert_eq!(r.render(&true).unwrap(), "<p>Welcome back</p>");
        assert!(r.render(&false).unwrap().contains("Sign in"));
    }

    #[test]
    fn test_list_renders_items_in_order() {
        let html = list()
            .render(&vec![Item { name: "a" }, Item { name: "<b>" }])
            .unwrap();
        assert_eq!(html, "<ul data-count=\"2\"><li>a</li><li>&lt;b&gt;</li></ul>");
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(list().render(&vec![]).unwrap(), "<p>None</p>");
    }

    #[test]
    fn test_item_shape_mismatch_surfaces() {
        let r: ListRenderer<&str> = ListRenderer::new(
            Template::parse("list", "{{{items}}}"),
            Template::parse("item", "{{name}}"),
        );
        assert!(matches!(
            r.render(&vec!["x"]),
            Err(RenderError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_from_set_unknown_template() {
        let set = TemplateSet::new().with("in", "x");
        assert_eq!(
            FlagRenderer::from_set(&set, "in", "out").unwrap_err(),
            RenderError::UnknownTemplate("out".into())
        );
    }
}
