//! Navigation orchestration.
//!
//! Invariants:
//! - At most one pipeline run is in flight. A request arriving while one is
//!   in flight is dropped, not queued.
//! - `nav_gen` is the request generation. Every asynchronous completion is
//!   gated through `is_current`, so events from cancelled or older runs are
//!   ignored.
//! - The engine never stays busy after a failure: every failure path returns
//!   to `Idle` before assigning the location.

use crate::cache::PageCache;
use crate::config::EngineConfig;
use crate::fetcher::{BusFetcher, DocumentFetcher};
use crate::history::HistoryBridge;
use crate::page::Page;
use crate::platform::Platform;
use crate::reconciler::DomReconciler;
use crate::reinit::{ReinitRegistry, ReinitReport, Stage, WidgetHooks};
use crate::transition::TransitionRunner;
use bus::{CoreCommand, CoreEvent};
use core_types::{NavTrigger, RequestId};
use html::{Selector, SelectorError};
use std::sync::mpsc;

mod nav;

/// Result of asking the engine to navigate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Ignored(IgnoreReason),
    /// Suspended on a fetch or a view transition.
    Pending(RequestId),
    Completed,
    /// Soft navigation failed; the location was assigned.
    HardNavigation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    SameUrl,
    Busy,
    InvalidUrl,
}

/// What the host should do with the original click event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
    PreventDefault,
    Default,
}

#[derive(Debug, Clone)]
struct InFlight {
    id: RequestId,
    /// Normalized form; the cache key.
    key: String,
    /// Absolute URL as requested.
    target: String,
    trigger: NavTrigger,
}

#[derive(Debug)]
enum NavState {
    Idle,
    Fetching(InFlight),
    Transitioning(InFlight),
}

pub struct NavigationEngine<P: Platform> {
    config: EngineConfig,
    page: Page,
    platform: P,

    cache: PageCache,
    fetcher: Option<Box<dyn DocumentFetcher>>,
    reconciler: DomReconciler,
    transition: TransitionRunner,
    history: HistoryBridge,
    registry: ReinitRegistry,

    state: NavState,
    nav_gen: RequestId,
}

impl<P: Platform> NavigationEngine<P> {
    /// Build an engine over `page`. Fails if the content selector is invalid.
    pub fn new(config: EngineConfig, page: Page, mut platform: P) -> Result<Self, SelectorError> {
        let container = Selector::parse(&config.content_selector)?;
        let mut history = HistoryBridge::new();
        history.install(&mut platform);
        Ok(Self {
            cache: PageCache::new(config.cache_capacity),
            reconciler: DomReconciler::new(container, config.theme_key.clone()),
            transition: TransitionRunner::new(config.animate_transitions),
            history,
            registry: ReinitRegistry::new(),
            fetcher: None,
            state: NavState::Idle,
            nav_gen: 0,
            config,
            page,
            platform,
        })
    }

    // -- Setup Methods ---
    pub fn set_bus_sender(&mut self, tx: mpsc::Sender<CoreCommand>) {
        self.fetcher = Some(Box::new(BusFetcher::new(tx)));
    }

    pub fn set_fetcher(&mut self, fetcher: Box<dyn DocumentFetcher>) {
        self.fetcher = Some(fetcher);
    }

    /// Register or replace a widget. Returns `true` if `name` was replaced.
    pub fn register_widget(&mut self, name: impl Into<String>, stage: Stage, hooks: WidgetHooks) -> bool {
        self.registry.register(name, stage, hooks)
    }

    pub fn unregister_widget(&mut self, name: &str) -> bool {
        self.registry.unregister(name)
    }

    /// Run every widget hook against the current page, as on first load.
    pub fn reinit_widgets(&mut self) -> ReinitReport {
        self.registry.run_all(&mut self.page)
    }

    // -- Accessors ---
    pub fn is_navigating(&self) -> bool {
        !matches!(self.state, NavState::Idle)
    }

    pub fn nav_gen(&self) -> RequestId {
        self.nav_gen
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn registry(&self) -> &ReinitRegistry {
        &self.registry
    }

    // -- Event Handling ---
    /// Resume a suspended run. Returns `None` when the event does not belong
    /// to the run in flight.
    pub fn on_core_event(&mut self, evt: CoreEvent) -> Option<NavOutcome> {
        match evt {
            CoreEvent::DocumentFetched {
                request_id,
                document,
                ..
            } if self.is_fetching(request_id) => Some(self.on_document_fetched(*document)),

            CoreEvent::FetchFailed {
                request_id, error, ..
            } if self.is_fetching(request_id) => Some(self.on_fetch_failed(error)),

            CoreEvent::TransitionUpdate { request_id } if self.is_transitioning(request_id) => {
                Some(self.on_transition_update(request_id))
            }

            CoreEvent::TransitionFinished { request_id } if self.is_transitioning(request_id) => {
                Some(self.on_transition_finished(request_id))
            }

            other => {
                log::debug!(
                    target: "navigation.pipeline",
                    "ignoring stale event for request {} (current {})",
                    other.request_id(),
                    self.nav_gen
                );
                None
            }
        }
    }

    fn is_current(&self, request_id: RequestId) -> bool {
        request_id == self.nav_gen
    }

    fn is_fetching(&self, request_id: RequestId) -> bool {
        matches!(&self.state, NavState::Fetching(f) if f.id == request_id) && self.is_current(request_id)
    }

    fn is_transitioning(&self, request_id: RequestId) -> bool {
        matches!(&self.state, NavState::Transitioning(f) if f.id == request_id)
            && self.is_current(request_id)
    }
}
