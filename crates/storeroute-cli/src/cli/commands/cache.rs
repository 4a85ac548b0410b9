//! `storeroute cache list|show|clear` – inspect the on-disk route cache.

use anyhow::{Context, Result};
use storeroute_core::cache::RouteCache;
use storeroute_core::storage::FileStore;

pub fn run_cache_list(store: FileStore) -> Result<()> {
    let cache = RouteCache::new(store);
    let routes = cache.routes();
    if routes.is_empty() {
        println!("No cached routes.");
        return Ok(());
    }
    println!("{:<40} {:<10} {}", "ROUTE", "TYPE", "ID");
    for route in routes {
        match cache.lookup(&route) {
            Some(resolved) => {
                println!("{:<40} {:<10} {}", route, resolved.route_type, resolved.id)
            }
            None => println!("{:<40} {:<10} -", route, "?"),
        }
    }
    Ok(())
}

pub fn run_cache_show(store: FileStore, route: &str) -> Result<()> {
    let cache = RouteCache::new(store);
    match cache.entry(route) {
        Some(envelope) => {
            let pretty =
                serde_json::to_string_pretty(&envelope).context("format cached envelope")?;
            println!("{}", pretty);
        }
        None => println!("{} is not cached.", route),
    }
    Ok(())
}

pub fn run_cache_clear(store: FileStore) -> Result<()> {
    let dir = store.dir().to_path_buf();
    let cache = RouteCache::new(store);
    let count = cache.routes().len();
    cache.clear()?;
    tracing::info!("cleared {} cached route(s) in {}", count, dir.display());
    println!("Cleared {} cached route(s).", count);
    Ok(())
}
