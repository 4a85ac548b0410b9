use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::graphql::QueryMode;
use crate::headers::{custom_or_warn, HeaderSet};

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_timeout_secs() -> u64 {
    30
}

const COOKIE_JAR_FILE: &str = "cookies.txt";

/// Global configuration loaded from `~/.config/storeroute/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct StorerouteConfig {
    /// Storefront backend base URL; requests go to `<origin>/graphql`.
    pub api_base: String,
    /// Seconds allowed for the TCP/TLS connect phase.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds allowed for the whole request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// "variables" (default) or "inline".
    #[serde(default)]
    pub query_mode: QueryMode,
    /// Cookie jar file; `~/.local/state/storeroute/cookies.txt` when unset.
    #[serde(default)]
    pub cookie_jar: Option<PathBuf>,
    /// Optional route cache directory; defaults to the XDG state dir.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Extra request headers, e.g. `Store = "default"`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for StorerouteConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".to_string(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            query_mode: QueryMode::default(),
            cookie_jar: None,
            cache_dir: None,
            headers: BTreeMap::new(),
        }
    }
}

impl StorerouteConfig {
    /// Configured headers as a typed set. Invalid entries discard the whole
    /// table with a warning.
    pub fn custom_headers(&self) -> Option<HeaderSet> {
        if self.headers.is_empty() {
            return None;
        }
        custom_or_warn(HeaderSet::try_from_pairs(&self.headers))
    }

    /// Configured cookie jar, else the default jar in the XDG state dir.
    pub fn cookie_jar_path(&self) -> Option<PathBuf> {
        self.cookie_jar.clone().or_else(default_cookie_jar)
    }
}

/// Header values often carry tokens, so only their names are printed.
impl fmt::Debug for StorerouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorerouteConfig")
            .field("api_base", &self.api_base)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("timeout_secs", &self.timeout_secs)
            .field("query_mode", &self.query_mode)
            .field("cookie_jar", &self.cookie_jar)
            .field("cache_dir", &self.cache_dir)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn default_cookie_jar() -> Option<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(crate::APP_NAME).ok()?;
    Some(xdg_dirs.get_state_home().join(COOKIE_JAR_FILE))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(crate::APP_NAME)?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<StorerouteConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<StorerouteConfig> {
    if !path.exists() {
        let default_cfg = StorerouteConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: StorerouteConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = StorerouteConfig::default();
        assert_eq!(cfg.api_base, "http://localhost:8080");
        assert_eq!(cfg.connect_timeout_secs, 15);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.query_mode, QueryMode::Variables);
        assert!(cfg.custom_headers().is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = StorerouteConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: StorerouteConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.api_base, cfg.api_base);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
        assert_eq!(parsed.query_mode, cfg.query_mode);
    }

    #[test]
    fn config_toml_minimal() {
        let cfg: StorerouteConfig = toml::from_str(r#"api_base = "https://shop.test""#).unwrap();
        assert_eq!(cfg.api_base, "https://shop.test");
        assert_eq!(cfg.connect_timeout_secs, 15);
        assert!(cfg.cookie_jar.is_none());
        assert!(cfg.headers.is_empty());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            api_base = "https://shop.test"
            timeout_secs = 5
            query_mode = "inline"
            cookie_jar = "/tmp/jar.txt"

            [headers]
            Store = "default"
            Authorization = "Bearer t"
        "#;
        let cfg: StorerouteConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.query_mode, QueryMode::Inline);
        assert_eq!(cfg.cookie_jar, Some(PathBuf::from("/tmp/jar.txt")));
        let headers = cfg.custom_headers().unwrap();
        assert_eq!(headers.get("store"), Some("default"));
        assert_eq!(headers.get("authorization"), Some("Bearer t"));
    }

    #[test]
    fn invalid_header_table_is_dropped() {
        let mut cfg = StorerouteConfig::default();
        cfg.headers.insert("Bad Name".to_string(), "x".to_string());
        assert!(cfg.custom_headers().is_none());
    }

    #[test]
    fn debug_output_hides_header_values() {
        let mut cfg = StorerouteConfig::default();
        cfg.headers
            .insert("Authorization".to_string(), "Bearer s3cret".to_string());
        let printed = format!("{:?}", cfg);
        assert!(printed.contains("Authorization"));
        assert!(printed.contains("http://localhost:8080"));
        assert!(!printed.contains("s3cret"));
    }

    #[test]
    fn cookie_jar_defaults_to_state_dir() {
        let mut cfg = StorerouteConfig::default();
        let jar = cfg.cookie_jar_path().unwrap();
        assert!(jar.ends_with("storeroute/cookies.txt"));

        cfg.cookie_jar = Some(PathBuf::from("/tmp/jar.txt"));
        assert_eq!(cfg.cookie_jar_path(), Some(PathBuf::from("/tmp/jar.txt")));
    }

    #[test]
    fn load_or_init_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg/config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.api_base, StorerouteConfig::default().api_base);

        fs::write(&path, "api_base = \"https://other.test\"\n").unwrap();
        assert_eq!(load_or_init_at(&path).unwrap().api_base, "https://other.test");
    }
}
