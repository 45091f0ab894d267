use std::collections::HashMap;
use std::fmt;

/// Session-scoped key/value store (the page's `sessionStorage`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStore {
    values: HashMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

/// Two-valued theme preference. Anything but `light` reads as `Dark`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Class tokens that carry theme state.
    pub const TOKENS: [&'static str; 2] = ["dark", "light"];

    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_token(class: &str) -> bool {
        Self::TOKENS.contains(&class)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_unknown_theme_is_dark() {
        assert_eq!(Theme::from_value(None), Theme::Dark);
        assert_eq!(Theme::from_value(Some("sepia")), Theme::Dark);
        assert_eq!(Theme::from_value(Some("light")), Theme::Light);
    }

    #[test]
    fn store_round_trips_values() {
        let mut store = SessionStore::new();
        assert_eq!(store.get("theme"), None);
        store.set("theme", Theme::Light.token());
        assert_eq!(store.get("theme"), Some("light"));
        assert_eq!(store.remove("theme").as_deref(), Some("light"));
        assert_eq!(store.get("theme"), None);
    }
}
