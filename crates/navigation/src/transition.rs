use crate::error::ReconcileError;
use crate::page::Page;
use crate::platform::Platform;
use core_types::RequestId;

/// The DOM swap run inside a transition.
pub type DomMutation = Box<dyn FnOnce(&mut Page) -> Result<(), ReconcileError>>;

/// What `TransitionRunner::run` did with the mutation.
#[derive(Debug, PartialEq, Eq)]
pub enum Completion {
    /// Ran synchronously; the signal is already resolved.
    Done(Result<(), ReconcileError>),
    /// Waiting on the platform's `TransitionUpdate` / `TransitionFinished`.
    Pending,
}

struct PendingTransition {
    id: RequestId,
    mutation: Option<DomMutation>,
}

/// Wraps a DOM mutation in the platform's animated transition, or runs it
/// immediately when animation is unavailable or unwanted.
pub struct TransitionRunner {
    animate: bool,
    pending: Option<PendingTransition>,
}

impl TransitionRunner {
    pub fn new(animate: bool) -> Self {
        Self {
            animate,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn run<P: Platform>(
        &mut self,
        id: RequestId,
        platform: &mut P,
        page: &mut Page,
        mutation: DomMutation,
    ) -> Completion {
        if !self.animate || !platform.supports_view_transitions() || platform.prefers_reduced_motion() {
            log::debug!(target: "navigation.transition", "swap {id} without animation");
            return Completion::Done(mutation(page));
        }
        self.pending = Some(PendingTransition {
            id,
            mutation: Some(mutation),
        });
        platform.start_view_transition(id);
        Completion::Pending
    }

    /// Old state captured: run the mutation. A failed mutation drops the
    /// pending transition.
    pub fn on_update(&mut self, id: RequestId, page: &mut Page) -> Result<(), ReconcileError> {
        let result = self.apply_pending(id, page);
        if result.is_err() {
            self.pending = None;
        }
        result
    }

    /// Visual phase over. Runs the mutation if no update arrived first.
    pub fn on_finished(&mut self, id: RequestId, page: &mut Page) -> Result<(), ReconcileError> {
        let result = self.apply_pending(id, page);
        if self.pending.as_ref().is_some_and(|p| p.id == id) {
            self.pending = None;
        }
        result
    }

    /// Abandon the animation, making sure the mutation has run.
    pub fn skip<P: Platform>(&mut self, platform: &mut P, page: &mut Page) -> Option<Result<(), ReconcileError>> {
        let mut pending = self.pending.take()?;
        platform.skip_view_transition(pending.id);
        Some(pending.mutation.take().map_or(Ok(()), |m| m(page)))
    }

    fn apply_pending(&mut self, id: RequestId, page: &mut Page) -> Result<(), ReconcileError> {
        match self.pending.as_mut() {
            Some(p) if p.id == id => p.mutation.take().map_or(Ok(()), |m| m(page)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessPlatform;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting(counter: &Rc<Cell<u32>>) -> DomMutation {
        let counter = Rc::clone(counter);
        Box::new(move |page: &mut Page| {
            counter.set(counter.get() + 1);
            page.set_title("swapped");
            Ok(())
        })
    }

    fn page() -> Page {
        Page::parse("https://site/", "<head><title>old</title></head><main></main>")
    }

    #[test]
    fn unsupported_primitive_runs_synchronously() {
        let runs = Rc::new(Cell::new(0));
        let mut platform = HeadlessPlatform::new("https://site/");
        let mut page = page();
        let mut runner = TransitionRunner::new(true);

        assert_eq!(runner.run(1, &mut platform, &mut page, counting(&runs)), Completion::Done(Ok(())));
        assert_eq!(runs.get(), 1);
        assert!(platform.started_transitions.is_empty());
    }

    #[test]
    fn reduced_motion_and_config_disable_animation() {
        let runs = Rc::new(Cell::new(0));
        let mut page = page();

        let mut platform = HeadlessPlatform::new("https://site/").with_view_transitions();
        platform.set_reduced_motion(true);
        let mut runner = TransitionRunner::new(true);
        assert!(matches!(runner.run(1, &mut platform, &mut page, counting(&runs)), Completion::Done(_)));

        let mut platform = HeadlessPlatform::new("https://site/").with_view_transitions();
        let mut runner = TransitionRunner::new(false);
        assert!(matches!(runner.run(2, &mut platform, &mut page, counting(&runs)), Completion::Done(_)));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn animated_swap_waits_for_update() {
        let runs = Rc::new(Cell::new(0));
        let mut platform = HeadlessPlatform::new("https://site/").with_view_transitions();
        let mut page = page();
        let mut runner = TransitionRunner::new(true);

        assert_eq!(runner.run(4, &mut platform, &mut page, counting(&runs)), Completion::Pending);
        assert_eq!(platform.started_transitions, [4]);
        assert_eq!(runs.get(), 0);

        // An update for another id is ignored.
        runner.on_update(3, &mut page).unwrap();
        assert_eq!(runs.get(), 0);

        runner.on_update(4, &mut page).unwrap();
        assert_eq!(runs.get(), 1);
        assert_eq!(page.title().as_deref(), Some("swapped"));

        runner.on_finished(4, &mut page).unwrap();
        assert_eq!(runs.get(), 1);
        assert!(!runner.is_pending());
    }

    #[test]
    fn finished_without_update_still_mutates() {
        let runs = Rc::new(Cell::new(0));
        let mut platform = HeadlessPlatform::new("https://site/").with_view_transitions();
        let mut page = page();
        let mut runner = TransitionRunner::new(true);

        runner.run(1, &mut platform, &mut page, counting(&runs));
        runner.on_finished(1, &mut page).unwrap();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn skip_applies_pending_mutation_once() {
        let runs = Rc::new(Cell::new(0));
        let mut platform = HeadlessPlatform::new("https://site/").with_view_transitions();
        let mut page = page();
        let mut runner = TransitionRunner::new(true);

        runner.run(9, &mut platform, &mut page, counting(&runs));
        assert_eq!(runner.skip(&mut platform, &mut page), Some(Ok(())));
        assert_eq!(runs.get(), 1);
        assert_eq!(platform.skipped_transitions, [9]);
        assert_eq!(runner.skip(&mut platform, &mut page), None);
    }
}
