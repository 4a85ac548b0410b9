//! Error types for route resolution, storage and header handling.

use std::path::PathBuf;

/// Failure of a `RouteResolver::resolve` call. Only the remote path can fail;
/// preload and cache problems are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid API base {base:?}: {source}")]
    InvalidApiBase {
        base: String,
        #[source]
        source: url::ParseError,
    },
    #[error("GraphQL request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("malformed GraphQL response (HTTP {status}): {source}")]
    MalformedResponse {
        status: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error("GraphQL response has no data")]
    MissingData,
    #[error("GraphQL errors: {}", .0.join("; "))]
    Graphql(Vec<String>),
    #[error("urlResolver payload is not a valid route: {0}")]
    InvalidRoute(#[source] serde_json::Error),
}

/// Network-level failure below the GraphQL layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("transfer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Failure of a `KeyValueStore` backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage key {0:?} is not valid")]
    InvalidKey(String),
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejected custom header input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("invalid header name {0:?}")]
    InvalidName(String),
    #[error("invalid value for header {0:?}")]
    InvalidValue(String),
    #[error("expected `Name: value`, got {0:?}")]
    MalformedLine(String),
    #[error("custom headers must be a map of strings")]
    NotAMap,
}
