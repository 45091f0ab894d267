use crate::platform::Platform;
use core_types::NavTrigger;

/// Keeps platform history in step with completed navigations.
#[derive(Debug, Default)]
pub struct HistoryBridge {
    installed: bool,
}

impl HistoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `url` for click navigations. Popstate already moved the cursor.
    /// Returns `true` if an entry was pushed.
    pub fn record<P: Platform>(&self, platform: &mut P, url: &str, trigger: NavTrigger) -> bool {
        match trigger {
            NavTrigger::Click => {
                platform.push_history(url);
                true
            }
            NavTrigger::Popstate => false,
        }
    }

    /// Subscribe to back/forward once. Later calls are no-ops.
    pub fn install<P: Platform>(&mut self, platform: &mut P) -> bool {
        if self.installed {
            return false;
        }
        platform.listen_popstate();
        self.installed = true;
        true
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessPlatform;

    #[test]
    fn only_clicks_push_entries() {
        let mut platform = HeadlessPlatform::new("https://site/");
        let bridge = HistoryBridge::new();
        assert!(bridge.record(&mut platform, "https://site/a", NavTrigger::Click));
        assert!(!bridge.record(&mut platform, "https://site/", NavTrigger::Popstate));
        assert_eq!(platform.history(), ["https://site/", "https://site/a"]);
    }

    #[test]
    fn install_is_idempotent() {
        let mut platform = HeadlessPlatform::new("https://site/");
        let mut bridge = HistoryBridge::new();
        assert!(bridge.install(&mut platform));
        assert!(!bridge.install(&mut platform));
        assert_eq!(platform.popstate_listeners, 1);
    }
}
