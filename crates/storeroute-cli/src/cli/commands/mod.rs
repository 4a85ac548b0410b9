//! CLI command handlers. Each command is in its own file.

mod cache;
mod resolve;

pub use cache::{run_cache_clear, run_cache_list, run_cache_show};
pub use resolve::{run_resolve, ResolveOptions};
