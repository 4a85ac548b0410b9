//! Resolved route descriptor: content type plus backend identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of storefront content a URL path maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteType {
    #[serde(rename = "PRODUCT")]
    Product,
    #[serde(rename = "CATEGORY")]
    Category,
    #[serde(rename = "CMS_PAGE")]
    CmsPage,
    #[serde(rename = "NOTFOUND")]
    NotFound,
}

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::Product => "PRODUCT",
            RouteType::Category => "CATEGORY",
            RouteType::CmsPage => "CMS_PAGE",
            RouteType::NotFound => "NOTFOUND",
        }
    }

    /// Parses the wire name; unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PRODUCT" => Some(RouteType::Product),
            "CATEGORY" => Some(RouteType::Category),
            "CMS_PAGE" => Some(RouteType::CmsPage),
            "NOTFOUND" => Some(RouteType::NotFound),
            _ => None,
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Backend node id. Some backends return numeric ids, others strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteId {
    Number(i64),
    Text(String),
}

impl RouteId {
    /// Builds an id from its textual form, casting digit-only strings to numbers.
    pub fn from_text(s: &str) -> Self {
        if is_digits(s) {
            if let Ok(n) = s.parse::<i64>() {
                return RouteId::Number(n);
            }
        }
        RouteId::Text(s.to_string())
    }

    /// Casts a digit-only `Text` id to `Number`; everything else is returned unchanged.
    pub fn normalized(self) -> Self {
        match self {
            RouteId::Text(s) if is_digits(&s) => match s.parse::<i64>() {
                Ok(n) => RouteId::Number(n),
                Err(_) => RouteId::Text(s),
            },
            other => other,
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl From<i64> for RouteId {
    fn from(n: i64) -> Self {
        RouteId::Number(n)
    }
}

impl From<i32> for RouteId {
    fn from(n: i32) -> Self {
        RouteId::Number(n.into())
    }
}

impl From<&str> for RouteId {
    fn from(s: &str) -> Self {
        RouteId::Text(s.to_string())
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteId::Number(n) => write!(f, "{}", n),
            RouteId::Text(s) => f.write_str(s),
        }
    }
}

/// Result of resolving a URL path: `{ "type": ..., "id": ... }` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    #[serde(rename = "type")]
    pub route_type: RouteType,
    pub id: RouteId,
}

impl ResolvedRoute {
    pub fn new(route_type: RouteType, id: impl Into<RouteId>) -> Self {
        Self {
            route_type,
            id: id.into(),
        }
    }

    /// Sentinel returned when the route cannot be resolved (offline miss, unknown URL).
    pub fn not_found() -> Self {
        Self::new(RouteType::NotFound, -1)
    }

    pub fn is_not_found(&self) -> bool {
        self.route_type == RouteType::NotFound
    }

    pub(crate) fn normalized(self) -> Self {
        Self {
            route_type: self.route_type,
            id: self.id.normalized(),
        }
    }
}
