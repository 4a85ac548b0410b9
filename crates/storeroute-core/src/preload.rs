//! Server-preloaded route data embedded in a rendered page.
//!
//! Templates use one of two styles:
//! - new: `data-model-type` / `data-model-id` attributes on the root (`<body>`) element;
//! - old: an element with id `url-resolver` holding handwritten JSON `{"type": .., "id": ..}`.

use std::collections::HashMap;

use crate::route::{ResolvedRoute, RouteId, RouteType};

/// Element id used by old-style templates.
pub const RESOLVER_ELEMENT_ID: &str = "url-resolver";

const MODEL_TYPE: &str = "model-type";
const MODEL_ID: &str = "model-id";

/// Preload-relevant parts of a page: root data attributes and the resolver element text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    /// Root element data attributes, keyed without the `data-` prefix.
    data_attributes: HashMap<String, String>,
    resolver_script: Option<String>,
}

impl PageData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_attribute(mut self, name: &str, value: &str) -> Self {
        self.data_attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_resolver_script(mut self, text: &str) -> Self {
        self.resolver_script = Some(text.to_string());
        self
    }

    pub fn data_attribute(&self, name: &str) -> Option<&str> {
        self.data_attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn resolver_script(&self) -> Option<&str> {
        self.resolver_script.as_deref()
    }

    /// Extracts preload data from rendered HTML. Missing pieces are simply absent.
    pub fn from_html(html: &str) -> Self {
        let mut page = PageData::new();
        let dom = match tl::parse(html, tl::ParserOptions::default().track_ids()) {
            Ok(dom) => dom,
            Err(e) => {
                tracing::debug!("page not parsed for preload: {:?}", e);
                return page;
            }
        };
        let parser = dom.parser();

        let body = dom
            .query_selector("body")
            .and_then(|mut found| found.next())
            .and_then(|handle| handle.get(parser))
            .and_then(|node| node.as_tag());
        if let Some(body) = body {
            for (key, value) in body.attributes().iter() {
                let key = key.to_ascii_lowercase();
                let Some(name) = key.strip_prefix("data-") else {
                    continue;
                };
                let value = value.map(|v| decode_entities(&v)).unwrap_or_default();
                page.data_attributes.insert(name.to_string(), value);
            }
        }

        let resolver = dom
            .get_element_by_id(RESOLVER_ELEMENT_ID)
            .and_then(|handle| handle.get(parser))
            .and_then(|node| node.as_tag());
        if let Some(element) = resolver {
            let text = element.inner_text(parser);
            // Script text is raw; any other element's text carries entities.
            let text = if element.name().as_utf8_str().eq_ignore_ascii_case("script") {
                text.trim().to_string()
            } else {
                decode_entities(text.trim())
            };
            page.resolver_script = Some(text);
        }
        page
    }

    /// The preloaded route, new style first. Malformed old-style JSON is
    /// logged in debug builds and treated as no preload.
    pub fn preloaded_route(&self) -> Option<ResolvedRoute> {
        if let Some(route) = self.route_from_data_attributes() {
            return Some(route);
        }
        let text = self.resolver_script.as_deref()?;
        match serde_json::from_str::<ResolvedRoute>(text) {
            Ok(route) => Some(route.normalized()),
            Err(e) => {
                if cfg!(debug_assertions) {
                    tracing::error!("unable to read preload {:?}: {}", text, e);
                }
                None
            }
        }
    }

    /// A non-empty model type decides on its own: a missing model id still
    /// yields the route, with an empty text id. Unknown type names cannot be
    /// represented and fall through to the old style.
    fn route_from_data_attributes(&self) -> Option<ResolvedRoute> {
        let model_type = self.data_attribute(MODEL_TYPE).filter(|t| !t.is_empty())?;
        let Some(route_type) = RouteType::parse(model_type) else {
            tracing::debug!("ignoring preload with unknown model type {:?}", model_type);
            return None;
        };
        let model_id = self.data_attribute(MODEL_ID).unwrap_or_else(|| {
            tracing::debug!("preload of type {} has no model id", route_type);
            ""
        });
        Some(ResolvedRoute {
            route_type,
            id: RouteId::from_text(model_id),
        })
    }
}

fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}
