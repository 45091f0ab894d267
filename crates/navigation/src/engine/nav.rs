use super::{ClickDisposition, IgnoreReason, InFlight, NavOutcome, NavState, NavigationEngine};
use crate::error::{FetchError, NavError};
use crate::interceptor::{self, ClickModifiers, LinkDecision};
use crate::page::Page;
use crate::platform::{PageEvent, Platform};
use crate::transition::{Completion, DomMutation};
use crate::url_norm;
use core_types::{NavTrigger, RequestId};
use html::{Id, ParsedDocument};
use std::sync::Arc;
use url::Url;

const TARGET: &str = "navigation.pipeline";

impl<P: Platform> NavigationEngine<P> {
    // -- Navigation Methods ---
    pub fn navigate(&mut self, url: &str, trigger: NavTrigger) -> NavOutcome {
        let resolved = self
            .page
            .base_url()
            .and_then(|base| url_norm::resolve(&base, url));
        let target = match resolved {
            Ok(target) => target,
            Err(err) => {
                log::warn!(target: TARGET, "ignoring navigation to {url:?}: {err}");
                return NavOutcome::Ignored(IgnoreReason::InvalidUrl);
            }
        };
        let key = url_norm::normalize(&target);
        if url_norm::normalize_str(&self.page.url).as_deref() == Some(key.as_str()) {
            log::debug!(target: TARGET, "already at {key}");
            return NavOutcome::Ignored(IgnoreReason::SameUrl);
        }
        if self.is_navigating() {
            log::debug!(target: TARGET, "busy; dropping {} navigation to {key}", trigger.as_str());
            return NavOutcome::Ignored(IgnoreReason::Busy);
        }

        self.nav_gen = self.nav_gen.wrapping_add(1);
        let flight = InFlight {
            id: self.nav_gen,
            key,
            target: target.into(),
            trigger,
        };
        log::info!(target: TARGET, "navigating to {} ({})", flight.target, trigger.as_str());

        if let Some(document) = self.cache.get(&flight.key).map(|c| Arc::clone(&c.document)) {
            log::info!(target: TARGET, "cache hit for {}", flight.key);
            return self.begin_transition(flight, document);
        }
        log::info!(target: TARGET, "cache miss for {}", flight.key);

        let Some(fetcher) = self.fetcher.as_mut() else {
            return self.fail(flight, NavError::NoFetcher);
        };
        if let Err(err) = fetcher.fetch(flight.id, &flight.target) {
            return self.fail(flight, err.into());
        }
        let id = flight.id;
        self.state = NavState::Fetching(flight);
        NavOutcome::Pending(id)
    }

    /// Classify a click on `target` and soft-navigate when it is intercepted.
    pub fn handle_click(&mut self, target: Id, mods: ClickModifiers) -> ClickDisposition {
        self.click(target, mods).0
    }

    /// Like `handle_click`, also returning the navigation outcome when the
    /// click was intercepted.
    pub fn click(&mut self, target: Id, mods: ClickModifiers) -> (ClickDisposition, Option<NavOutcome>) {
        let (Ok(page_url), Ok(base)) = (Url::parse(&self.page.url), self.page.base_url()) else {
            return (ClickDisposition::Default, None);
        };
        match interceptor::classify_click(&self.page.dom, target, &page_url, &base, mods) {
            LinkDecision::Intercept(url) => {
                let outcome = self.navigate(url.as_str(), NavTrigger::Click);
                (ClickDisposition::PreventDefault, Some(outcome))
            }
            LinkDecision::Skip(reason) => {
                log::debug!(target: TARGET, "click not intercepted: {}", reason.as_str());
                (ClickDisposition::Default, None)
            }
        }
    }

    /// Back/forward landed on `url`; the platform already moved its cursor.
    pub fn handle_popstate(&mut self, url: &str) -> NavOutcome {
        self.navigate(url, NavTrigger::Popstate)
    }

    /// Abort the run in flight. Returns `false` when idle.
    ///
    /// A fetch is abandoned with the page untouched. A transition is skipped
    /// and the run completes so DOM, history and widgets agree.
    pub fn cancel(&mut self) -> bool {
        match std::mem::replace(&mut self.state, NavState::Idle) {
            NavState::Idle => false,
            NavState::Fetching(flight) => {
                if let Some(fetcher) = self.fetcher.as_mut() {
                    fetcher.cancel(flight.id);
                }
                log::info!(target: TARGET, "cancelled fetch of {}", flight.target);
                true
            }
            NavState::Transitioning(flight) => {
                log::info!(target: TARGET, "skipping transition to {}", flight.target);
                match self.transition.skip(&mut self.platform, &mut self.page) {
                    Some(Err(err)) => {
                        self.fail(flight, err.into());
                    }
                    _ => self.finish(flight),
                }
                true
            }
        }
    }

    // -- Pipeline Stages ---
    pub(super) fn on_document_fetched(&mut self, document: ParsedDocument) -> NavOutcome {
        let NavState::Fetching(flight) = std::mem::replace(&mut self.state, NavState::Idle) else {
            return NavOutcome::Ignored(IgnoreReason::Busy);
        };
        let document = Arc::new(document);
        self.cache.put(&flight.key, Arc::clone(&document));
        self.begin_transition(flight, document)
    }

    pub(super) fn on_fetch_failed(&mut self, error: FetchError) -> NavOutcome {
        let NavState::Fetching(flight) = std::mem::replace(&mut self.state, NavState::Idle) else {
            return NavOutcome::Ignored(IgnoreReason::Busy);
        };
        self.fail(flight, error.into())
    }

    pub(super) fn on_transition_update(&mut self, id: RequestId) -> NavOutcome {
        match self.transition.on_update(id, &mut self.page) {
            Ok(()) => NavOutcome::Pending(id),
            Err(err) => {
                self.platform.skip_view_transition(id);
                let NavState::Transitioning(flight) = std::mem::replace(&mut self.state, NavState::Idle)
                else {
                    return NavOutcome::Ignored(IgnoreReason::Busy);
                };
                self.fail(flight, err.into())
            }
        }
    }

    pub(super) fn on_transition_finished(&mut self, id: RequestId) -> NavOutcome {
        let NavState::Transitioning(flight) = std::mem::replace(&mut self.state, NavState::Idle) else {
            return NavOutcome::Ignored(IgnoreReason::Busy);
        };
        match self.transition.on_finished(id, &mut self.page) {
            Ok(()) => {
                self.finish(flight);
                NavOutcome::Completed
            }
            Err(err) => self.fail(flight, err.into()),
        }
    }

    // -- Internal Helpers ---
    fn begin_transition(&mut self, mut flight: InFlight, document: Arc<ParsedDocument>) -> NavOutcome {
        // Location and history follow the URL the document was served from.
        if document.url != flight.target && Url::parse(&document.url).is_ok() {
            log::debug!(target: TARGET, "{} was served from {}", flight.target, document.url);
            flight.target = document.url.clone();
        }
        let reconciler = self.reconciler.clone();
        let mutation: DomMutation = Box::new(move |page: &mut Page| reconciler.apply(page, &document));
        match self
            .transition
            .run(flight.id, &mut self.platform, &mut self.page, mutation)
        {
            Completion::Done(Ok(())) => {
                self.finish(flight);
                NavOutcome::Completed
            }
            Completion::Done(Err(err)) => self.fail(flight, err.into()),
            Completion::Pending => {
                let id = flight.id;
                self.state = NavState::Transitioning(flight);
                NavOutcome::Pending(id)
            }
        }
    }

    /// History, widgets, scroll, completion event. Runs after the swap.
    fn finish(&mut self, flight: InFlight) {
        self.page.url = flight.target.clone();
        self.history
            .record(&mut self.platform, &flight.target, flight.trigger);

        let report = self.registry.run_all(&mut self.page);
        if !report.is_clean() {
            log::warn!(
                target: TARGET,
                "{} of {} widget hooks failed after navigating to {}",
                report.failures.len(),
                report.ran.len(),
                flight.target
            );
        }

        self.page.scroll_to(0.0, 0.0);
        self.platform.dispatch(PageEvent::NavigationComplete {
            url: flight.target.clone(),
        });
        self.state = NavState::Idle;
        log::info!(target: TARGET, "navigation {} to {} complete", flight.id, flight.target);
    }

    /// Fall back to a full page load.
    fn fail(&mut self, flight: InFlight, err: NavError) -> NavOutcome {
        log::warn!(
            target: TARGET,
            "soft navigation to {} failed ({err}); falling back to hard navigation",
            flight.target
        );
        self.state = NavState::Idle;
        self.platform.assign_location(&flight.target);
        NavOutcome::HardNavigation
    }
}
