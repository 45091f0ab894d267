// Host configuration
//
// Loaded in order of precedence:
// 1. Command-line flags (highest priority)
// 2. Config file (--config PATH, else ./softnav.toml when present)
// 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use navigation::EngineConfig;
use net::FetchOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "softnav.toml";

/// Network settings for the fetch runtime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Overrides the built-in `softnav/<version>` user agent.
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: 10,
        }
    }
}

impl NetConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        let mut opts = FetchOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            ..FetchOptions::default()
        };
        if let Some(ua) = &self.user_agent {
            opts.user_agent = ua.clone();
        }
        opts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Used when RUST_LOG is unset: trace, debug, info, warn, error
    pub log_level: String,
    pub net: NetConfig,
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            net: NetConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_layers_over_defaults() {
        let cfg = Config::from_toml(
            r##"
            log_level = "debug"

            [net]
            timeout_secs = 3

            [engine]
            content_selector = "#content"
            cache_capacity = 4
            "##,
        )
        .unwrap();

        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.net.fetch_options().timeout, Duration::from_secs(3));
        assert_eq!(cfg.engine.content_selector, "#content");
        assert_eq!(cfg.engine.cache_capacity, 4);
        assert_eq!(cfg.engine.theme_key, "theme");
        assert!(cfg.engine.animate_transitions);
    }

    #[test]
    fn load_reads_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[net]\nuser_agent = \"tester/1\"").unwrap();

        let cfg = Config::load(Some(file.path())).unwrap();
        assert_eq!(cfg.net.fetch_options().user_agent, "tester/1");
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(Config::from_toml("log_level = [").is_err());
    }
}
