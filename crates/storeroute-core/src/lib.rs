pub mod config;
pub mod logging;

pub mod cache;
pub mod connectivity;
pub mod error;
pub mod graphql;
pub mod headers;
pub mod preload;
pub mod resolver;
pub mod route;
pub mod storage;
pub mod transport;

/// XDG prefix shared by the config file, route cache, cookie jar and log.
pub const APP_NAME: &str = "storeroute";

pub use error::{HeaderError, ResolveError, StorageError, TransportError};
pub use resolver::{ResolveRequest, RouteResolver};
pub use route::{ResolvedRoute, RouteId, RouteType};
