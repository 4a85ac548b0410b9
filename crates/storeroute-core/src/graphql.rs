//! `urlResolver` GraphQL query: request body construction and response envelope parsing.
//!
//! The route never lands raw in the query text: it travels as a `$url`
//! variable, or as an escaped string literal in `QueryMode::Inline`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::error::ResolveError;
use crate::route::ResolvedRoute;

pub const GRAPHQL_PATH: &str = "/graphql";

const VARIABLES_QUERY: &str =
    "query ResolveUrl($url: String!) { urlResolver(url: $url) { type id } }";

/// How the route is passed to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Operation with a `$url: String!` variable.
    #[default]
    Variables,
    /// Anonymous query with the route as an escaped string literal.
    Inline,
}

/// GraphQL endpoint for `api_base`. The path is absolute, so any path on the base is replaced.
pub fn endpoint(api_base: &str) -> Result<Url, ResolveError> {
    Url::parse(api_base)
        .and_then(|base| base.join(GRAPHQL_PATH))
        .map_err(|source| ResolveError::InvalidApiBase {
            base: api_base.to_string(),
            source,
        })
}

/// JSON request body for resolving `route`.
pub fn request_body(route: &str, mode: QueryMode) -> Value {
    match mode {
        QueryMode::Variables => json!({
            "query": VARIABLES_QUERY,
            "variables": { "url": route },
        }),
        QueryMode::Inline => json!({
            "query": format!(
                "{{ urlResolver(url: \"{}\") {{ type id }} }}",
                escape_string_literal(route)
            ),
        }),
    }
}

/// Escapes `s` for use inside a double-quoted GraphQL string.
pub fn escape_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Parses a response body as JSON whatever the HTTP status; GraphQL servers
/// report most failures inside the envelope.
pub fn parse_envelope(status: u32, body: &[u8]) -> Result<Value, ResolveError> {
    serde_json::from_slice(body).map_err(|source| ResolveError::MalformedResponse { status, source })
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

fn error_messages(envelope: &Value) -> Vec<String> {
    envelope
        .get("errors")
        .cloned()
        .and_then(|errors| serde_json::from_value::<Vec<GraphqlError>>(errors).ok())
        .map(|errors| errors.into_iter().map(|e| e.message).collect())
        .unwrap_or_default()
}

/// Extracts `data.urlResolver`. A `null` resolver (unknown URL) is `NOTFOUND`.
pub fn route_from_envelope(envelope: &Value) -> Result<ResolvedRoute, ResolveError> {
    let data = match envelope.get("data") {
        Some(data) if !data.is_null() => data,
        _ => {
            let messages = error_messages(envelope);
            return Err(if messages.is_empty() {
                ResolveError::MissingData
            } else {
                ResolveError::Graphql(messages)
            });
        }
    };
    match data.get("urlResolver") {
        None => Err(ResolveError::MissingData),
        Some(Value::Null) => {
            let messages = error_messages(envelope);
            if !messages.is_empty() {
                tracing::debug!("urlResolver is null with errors: {}", messages.join("; "));
            }
            Ok(ResolvedRoute::not_found())
        }
        Some(resolver) => serde_json::from_value::<ResolvedRoute>(resolver.clone())
            .map(ResolvedRoute::normalized)
            .map_err(ResolveError::InvalidRoute),
    }
}
