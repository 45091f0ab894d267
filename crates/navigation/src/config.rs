use serde::Deserialize;

pub const DEFAULT_CACHE_CAPACITY: usize = 10;
pub const DEFAULT_CONTENT_SELECTOR: &str = "main";
pub const DEFAULT_THEME_KEY: &str = "theme";

/// Engine knobs. Every field has a default so partial config files work.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of parsed documents kept for instant revisits (FIFO). 0 disables caching.
    pub cache_capacity: usize,
    /// Simple selector for the root content container swapped on navigation.
    pub content_selector: String,
    /// Session-store key holding the theme preference.
    pub theme_key: String,
    /// When false the swap is never animated, even if the platform could.
    pub animate_transitions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
            animate_transitions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: EngineConfig = toml::from_str(r##"content_selector = "#content""##).unwrap();
        assert_eq!(cfg.content_selector, "#content");
        assert_eq!(cfg.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(cfg.animate_transitions);
    }
}
