//! CLI for the storeroute URL resolver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storeroute_core::config;
use storeroute_core::storage::FileStore;

use commands::{run_cache_clear, run_cache_list, run_cache_show, run_resolve, ResolveOptions};

/// Top-level CLI for the storeroute URL resolver.
#[derive(Debug, Parser)]
#[command(name = "storeroute")]
#[command(about = "storeroute: resolve storefront URL paths to backend content", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/storeroute/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve one or more URL paths (e.g. /shoes.html) to content type and id.
    Resolve {
        /// URL paths to resolve, in order.
        #[arg(required = true)]
        routes: Vec<String>,

        /// Backend base URL (overrides `api_base` from the config).
        #[arg(long, value_name = "URL")]
        api_base: Option<String>,

        /// Extra request header, `Name: value`. Repeatable.
        #[arg(short = 'H', long = "header", value_name = "HEADER")]
        headers: Vec<String>,

        /// Answer from the route cache only; uncached routes are NOTFOUND.
        #[arg(long)]
        offline: bool,

        /// Rendered page whose embedded preload answers the first route.
        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,

        /// Send the route inline in the query text instead of as a variable.
        #[arg(long)]
        inline_query: bool,

        /// Print one JSON object per route.
        #[arg(long)]
        json: bool,
    },

    /// Inspect or clear the route cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// List cached routes.
    List,
    /// Print the cached response envelope for a route.
    Show {
        /// URL path as it was resolved.
        route: String,
    },
    /// Remove every cached route.
    Clear,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_or_init_at(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!(
            "loaded config: api_base={} query_mode={:?} headers={:?}",
            cfg.api_base,
            cfg.query_mode,
            cfg.headers.keys().collect::<Vec<_>>()
        );

        let cache_dir = match &cfg.cache_dir {
            Some(dir) => dir.clone(),
            None => FileStore::default_dir()?,
        };
        let store = FileStore::open(&cache_dir)?;

        match cli.command {
            CliCommand::Resolve {
                routes,
                api_base,
                headers,
                offline,
                page,
                inline_query,
                json,
            } => {
                let opts = ResolveOptions {
                    api_base,
                    headers,
                    offline,
                    page,
                    inline_query,
                    json,
                };
                run_resolve(&cfg, store, &routes, &opts).await?;
            }
            CliCommand::Cache { action } => match action {
                CacheAction::List => run_cache_list(store)?,
                CacheAction::Show { route } => run_cache_show(store, &route)?,
                CacheAction::Clear => run_cache_clear(store)?,
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
