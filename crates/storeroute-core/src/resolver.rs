//! Route resolution: page preload, then route cache, then one GraphQL query.
//!
//! The preload is consulted only on the first `resolve` call of a resolver
//! instance. Offline resolutions never touch the network; a cache miss
//! while offline yields the `NOTFOUND` sentinel.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::cache::RouteCache;
use crate::connectivity::Connectivity;
use crate::error::ResolveError;
use crate::graphql::{self, QueryMode};
use crate::headers::{with_default_headers, HeaderSet};
use crate::preload::PageData;
use crate::route::ResolvedRoute;
use crate::storage::KeyValueStore;
use crate::transport::{Transport, TransportRequest};

/// One resolution: the URL path plus where and how to ask the backend.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// URL path as requested, e.g. `/shoes.html`. Used verbatim as the cache key.
    pub route: String,
    /// Backend base URL.
    pub api_base: String,
    /// Headers applied on top of the defaults.
    pub custom_headers: Option<HeaderSet>,
}

impl ResolveRequest {
    pub fn new(route: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            api_base: api_base.into(),
            custom_headers: None,
        }
    }

    pub fn with_headers(mut self, headers: Option<HeaderSet>) -> Self {
        self.custom_headers = headers;
        self
    }
}

pub struct RouteResolver<S, T> {
    cache: RouteCache<S>,
    transport: T,
    connectivity: Box<dyn Connectivity>,
    page: Option<PageData>,
    preload_attempted: AtomicBool,
    query_mode: QueryMode,
}

impl<S: KeyValueStore, T: Transport> RouteResolver<S, T> {
    /// Online resolver without page data.
    pub fn new(store: S, transport: T) -> Self {
        Self {
            cache: RouteCache::new(store),
            transport,
            connectivity: Box::new(true),
            page: None,
            preload_attempted: AtomicBool::new(false),
            query_mode: QueryMode::default(),
        }
    }

    pub fn with_page(mut self, page: PageData) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_connectivity(mut self, connectivity: impl Connectivity + 'static) -> Self {
        self.connectivity = Box::new(connectivity);
        self
    }

    pub fn with_query_mode(mut self, mode: QueryMode) -> Self {
        self.query_mode = mode;
        self
    }

    pub fn cache(&self) -> &RouteCache<S> {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves `request.route`. Errors come only from the network path
    /// (invalid base URL, transport failure, unusable response); they are
    /// not retried and nothing is cached for them.
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<ResolvedRoute, ResolveError> {
        if let Some(route) = self.take_preload() {
            tracing::debug!("resolved {:?} from page preload: {:?}", request.route, route);
            return Ok(route);
        }

        if let Some(route) = self.cache.lookup(&request.route) {
            tracing::debug!("resolved {:?} from cache: {:?}", request.route, route);
            return Ok(route);
        }

        if !self.connectivity.is_online() {
            tracing::info!("offline and {:?} is not cached", request.route);
            return Ok(ResolvedRoute::not_found());
        }

        self.fetch(request).await
    }

    /// Page preload on the first call only; later calls see `None` even if
    /// the page carries preload data.
    fn take_preload(&self) -> Option<ResolvedRoute> {
        if self.preload_attempted.swap(true, Ordering::AcqRel) {
            return None;
        }
        self.page.as_ref()?.preloaded_route()
    }

    async fn fetch(&self, request: &ResolveRequest) -> Result<ResolvedRoute, ResolveError> {
        let url = graphql::endpoint(&request.api_base)?;
        let body = graphql::request_body(&request.route, self.query_mode).to_string();
        let headers = with_default_headers(request.custom_headers.as_ref());
        tracing::debug!("querying {} for {:?}", url, request.route);

        let response = self
            .transport
            .post(TransportRequest {
                url,
                headers,
                body: body.into_bytes(),
            })
            .await?;

        let envelope = graphql::parse_envelope(response.status, &response.body)?;
        let route = graphql::route_from_envelope(&envelope)?;

        // Caching is best effort; the resolved value stands either way.
        if let Err(e) = self.cache.insert(&request.route, &envelope) {
            tracing::warn!("failed to cache {:?}: {}", request.route, e);
        }
        Ok(route)
    }
}
