//! `storeroute resolve <route>...` – resolve URL paths through preload, cache and backend.

use anyhow::{Context, Result};
use std::path::PathBuf;
use storeroute_core::config::StorerouteConfig;
use storeroute_core::graphql::QueryMode;
use storeroute_core::headers::{custom_or_warn, HeaderSet};
use storeroute_core::preload::PageData;
use storeroute_core::storage::FileStore;
use storeroute_core::transport::CurlTransport;
use storeroute_core::{ResolveRequest, ResolvedRoute, RouteResolver};

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub api_base: Option<String>,
    pub headers: Vec<String>,
    pub offline: bool,
    pub page: Option<PathBuf>,
    pub inline_query: bool,
    pub json: bool,
}

pub async fn run_resolve(
    cfg: &StorerouteConfig,
    store: FileStore,
    routes: &[String],
    opts: &ResolveOptions,
) -> Result<()> {
    let api_base = opts.api_base.as_deref().unwrap_or(&cfg.api_base);
    let custom_headers = merge_custom_headers(cfg.custom_headers(), &opts.headers);
    let query_mode = if opts.inline_query {
        QueryMode::Inline
    } else {
        cfg.query_mode
    };

    let mut resolver = RouteResolver::new(store, CurlTransport::from_config(cfg))
        .with_connectivity(!opts.offline)
        .with_query_mode(query_mode);
    if let Some(path) = &opts.page {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("read page: {}", path.display()))?;
        resolver = resolver.with_page(PageData::from_html(&html));
    }

    let mut failed = 0usize;
    for route in routes {
        let request =
            ResolveRequest::new(route.as_str(), api_base).with_headers(custom_headers.clone());
        match resolver.resolve(&request).await {
            Ok(resolved) => println!("{}", format_line(route, &resolved, opts.json)),
            Err(e) => {
                failed += 1;
                tracing::error!("resolving {:?} failed: {}", route, e);
                eprintln!("{}: {:#}", route, anyhow::Error::new(e));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} route(s) failed to resolve", failed, routes.len());
    }
    Ok(())
}

/// Config headers overlaid with `-H` lines. Malformed `-H` input drops all
/// custom headers, leaving only the defaults.
fn merge_custom_headers(base: Option<HeaderSet>, lines: &[String]) -> Option<HeaderSet> {
    if lines.is_empty() {
        return base;
    }
    let cli = custom_or_warn(HeaderSet::parse_lines(lines))?;
    let mut merged = base.unwrap_or_default();
    merged.merge(&cli);
    Some(merged)
}

fn format_line(route: &str, resolved: &ResolvedRoute, json: bool) -> String {
    if json {
        serde_json::json!({
            "route": route,
            "type": resolved.route_type,
            "id": resolved.id,
        })
        .to_string()
    } else {
        format!("{:<40} {:<10} {}", route, resolved.route_type, resolved.id)
    }
}
