//! Host seam: history, location, view transitions and page events.

use bus::CoreEvent;
use core_types::RequestId;
use std::sync::mpsc::Sender;

/// Page-wide notifications fired by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Fired once per successful soft navigation, after widget reinit.
    NavigationComplete { url: String },
}

pub trait Platform {
    fn push_history(&mut self, url: &str);

    /// Hard navigation. Unloads the page.
    fn assign_location(&mut self, url: &str);

    fn dispatch(&mut self, event: PageEvent);

    fn supports_view_transitions(&self) -> bool;

    fn prefers_reduced_motion(&self) -> bool;

    /// Start an animated transition. The host answers with
    /// `CoreEvent::TransitionUpdate` and then `CoreEvent::TransitionFinished`
    /// carrying `id`.
    fn start_view_transition(&mut self, id: RequestId);

    fn skip_view_transition(&mut self, _id: RequestId) {}

    /// Subscribe to back/forward notifications.
    fn listen_popstate(&mut self) {}
}

/// In-memory platform for the CLI host and tests.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    entries: Vec<String>,
    index: usize,
    pub locations: Vec<String>,
    pub events: Vec<PageEvent>,
    pub started_transitions: Vec<RequestId>,
    pub skipped_transitions: Vec<RequestId>,
    pub popstate_listeners: usize,
    view_transitions: bool,
    reduced_motion: bool,
    evt_tx: Option<Sender<CoreEvent>>,
}

impl HeadlessPlatform {
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            entries: vec![initial_url.into()],
            ..Self::default()
        }
    }

    /// Report view transitions as supported. Without an event sender the
    /// caller delivers the transition events itself.
    pub fn with_view_transitions(mut self) -> Self {
        self.view_transitions = true;
        self
    }

    /// Support view transitions and complete them over `tx`.
    pub fn with_event_sender(mut self, tx: Sender<CoreEvent>) -> Self {
        self.view_transitions = true;
        self.evt_tx = Some(tx);
        self
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.reduced_motion = on;
    }

    // -- History Stack ---
    pub fn history(&self) -> &[String] {
        &self.entries
    }

    pub fn history_index(&self) -> usize {
        self.index
    }

    pub fn current_entry(&self) -> Option<&str> {
        self.entries.get(self.index).map(String::as_str)
    }

    /// Move the cursor back and return the URL to hand to `handle_popstate`.
    pub fn back(&mut self) -> Option<String> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.current_entry().map(str::to_string)
    }

    pub fn forward(&mut self) -> Option<String> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.current_entry().map(str::to_string)
    }

    fn post(&self, event: CoreEvent) {
        if let Some(tx) = &self.evt_tx
            && tx.send(event).is_err()
        {
            log::warn!(target: "navigation.platform", "event channel closed");
        }
    }
}

impl Platform for HeadlessPlatform {
    fn push_history(&mut self, url: &str) {
        // truncate forward branch
        self.entries.truncate(self.index + 1);
        self.entries.push(url.to_string());
        self.index = self.entries.len() - 1;
    }

    fn assign_location(&mut self, url: &str) {
        log::info!(target: "navigation.platform", "location.assign({url})");
        self.locations.push(url.to_string());
    }

    fn dispatch(&mut self, event: PageEvent) {
        self.events.push(event);
    }

    fn supports_view_transitions(&self) -> bool {
        self.view_transitions
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn start_view_transition(&mut self, id: RequestId) {
        self.started_transitions.push(id);
        self.post(CoreEvent::TransitionUpdate { request_id: id });
        self.post(CoreEvent::TransitionFinished { request_id: id });
    }

    fn skip_view_transition(&mut self, id: RequestId) {
        self.skipped_transitions.push(id);
    }

    fn listen_popstate(&mut self) {
        self.popstate_listeners += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn push_truncates_forward_branch() {
        let mut p = HeadlessPlatform::new("https://site/");
        p.push_history("https://site/a");
        p.push_history("https://site/b");
        assert_eq!(p.back().as_deref(), Some("https://site/a"));
        p.push_history("https://site/c");
        assert_eq!(p.history(), ["https://site/", "https://site/a", "https://site/c"]);
        assert_eq!(p.forward(), None);
        assert_eq!(p.back().as_deref(), Some("https://site/a"));
        assert_eq!(p.forward().as_deref(), Some("https://site/c"));
    }

    #[test]
    fn back_stops_at_first_entry() {
        let mut p = HeadlessPlatform::new("https://site/");
        assert_eq!(p.back(), None);
        assert_eq!(p.history_index(), 0);
    }

    #[test]
    fn transitions_complete_over_sender() {
        let (tx, rx) = mpsc::channel();
        let mut p = HeadlessPlatform::new("https://site/").with_event_sender(tx);
        assert!(p.supports_view_transitions());
        p.start_view_transition(7);
        assert!(matches!(rx.try_recv(), Ok(CoreEvent::TransitionUpdate { request_id: 7 })));
        assert!(matches!(rx.try_recv(), Ok(CoreEvent::TransitionFinished { request_id: 7 })));
    }
}
