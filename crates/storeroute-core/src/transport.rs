//! HTTP transport for the GraphQL POST.
//!
//! `CurlTransport` uses the curl crate (libcurl easy interface). Transfers
//! block, so each one runs on tokio's blocking pool.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use url::Url;

use crate::config::StorerouteConfig;
use crate::error::TransportError;
use crate::headers::HeaderSet;

/// Outbound POST: target, complete header set, body bytes.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: Url,
    pub headers: HeaderSet,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// Sends one request and returns the raw response. Implementations do not retry.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

const MAX_REDIRECTS: u32 = 10;

/// libcurl-backed transport.
///
/// All transfers go through one easy handle, so cookies set by the backend
/// are sent on every later request (clones share the handle too). With a
/// jar path the cookies also survive the process. Redirects are followed;
/// 307/308 resend the POST body, 301-303 switch to GET as browsers do.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    cookie_jar: Option<PathBuf>,
    session: Arc<Mutex<curl::easy::Easy>>,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
            cookie_jar: None,
            session: Arc::new(Mutex::new(curl::easy::Easy::new())),
        }
    }
}

impl CurlTransport {
    /// Timeouts from the config; cookies persist in `cookie_jar`, or in the
    /// state dir jar when the config leaves it unset.
    pub fn from_config(cfg: &StorerouteConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            cookie_jar: cfg.cookie_jar_path(),
            ..Self::default()
        }
    }

    pub fn with_cookie_jar(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_jar = Some(path.into());
        self
    }

    pub fn cookie_jar(&self) -> Option<&Path> {
        self.cookie_jar.as_deref()
    }

    /// Runs the transfer in the current thread. Transfers on one session are serialized.
    fn perform(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut body = Vec::new();

        let mut easy = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        // Reset clears options from the previous transfer but keeps the cookie store.
        easy.reset();
        easy.url(request.url.as_str())?;
        easy.post(true)?;
        easy.post_fields_copy(&request.body)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        match &self.cookie_jar {
            Some(path) => {
                easy.cookie_file(path)?;
                easy.cookie_jar(path)?;
            }
            // Empty name turns on the cookie engine without reading a file.
            None => easy.cookie_file("")?,
        }

        let mut list = curl::easy::List::new();
        for (k, v) in request.headers.iter() {
            list.append(&format!("{}: {}", k, v))?;
        }
        list.append("Expect:")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        if self.cookie_jar.is_some() {
            // The jar is otherwise only written when the handle is dropped.
            easy.cookie_list("FLUSH")?;
        }
        tracing::debug!(
            "POST {} returned HTTP {} ({} bytes)",
            request.url,
            status,
            body.len()
        );
        Ok(TransportResponse { status, body })
    }
}

impl Transport for CurlTransport {
    fn post(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        let transport = self.clone();
        async move { tokio::task::spawn_blocking(move || transport.perform(&request)).await? }
    }
}
