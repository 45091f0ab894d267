//! Ordered widget reinitialization after each swap.
//!
//! Invariants:
//! - Hooks run by `Stage`, then by first registration within a stage.
//! - A failing or panicking hook is recorded and never stops the others.

use crate::error::WidgetError;
use crate::page::Page;
use html::{Id, Node};
use std::any::Any;
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};

pub type Hook = Box<dyn FnMut(&mut Page) -> Result<(), WidgetError>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    ThemeToggle,
    ThemeTransition,
    Content,
    Background,
}

pub enum WidgetHooks {
    /// State tied to replaced nodes: `cleanup` then `init`.
    Lifecycle { init: Hook, cleanup: Hook },
    /// Re-scan the new DOM only.
    Refresh(Hook),
}

impl WidgetHooks {
    pub fn refresh(f: impl FnMut(&mut Page) -> Result<(), WidgetError> + 'static) -> Self {
        WidgetHooks::Refresh(Box::new(f))
    }

    pub fn lifecycle(
        init: impl FnMut(&mut Page) -> Result<(), WidgetError> + 'static,
        cleanup: impl FnMut(&mut Page) -> Result<(), WidgetError> + 'static,
    ) -> Self {
        WidgetHooks::Lifecycle {
            init: Box::new(init),
            cleanup: Box::new(cleanup),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookPhase {
    Cleanup,
    Init,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub widget: String,
    pub phase: HookPhase,
    pub error: WidgetError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReinitReport {
    /// Widgets whose hooks were invoked, in run order.
    pub ran: Vec<String>,
    pub failures: Vec<HookFailure>,
}

impl ReinitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Entry {
    name: String,
    stage: Stage,
    hooks: WidgetHooks,
}

#[derive(Default)]
pub struct ReinitRegistry {
    entries: Vec<Entry>,
}

impl ReinitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace `name`. A replaced widget keeps its slot.
    /// Returns `true` when an earlier registration was replaced.
    pub fn register(&mut self, name: impl Into<String>, stage: Stage, hooks: WidgetHooks) -> bool {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.stage = stage;
            entry.hooks = hooks;
            return true;
        }
        self.entries.push(Entry { name, stage, hooks });
        false
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Widget names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.run_order()
            .into_iter()
            .map(|i| self.entries[i].name.as_str())
            .collect()
    }

    pub fn run_all(&mut self, page: &mut Page) -> ReinitReport {
        let mut report = ReinitReport::default();
        for i in self.run_order() {
            let entry = &mut self.entries[i];
            match &mut entry.hooks {
                WidgetHooks::Lifecycle { init, cleanup } => {
                    run_hook(&entry.name, HookPhase::Cleanup, cleanup, page, &mut report);
                    run_hook(&entry.name, HookPhase::Init, init, page, &mut report);
                }
                WidgetHooks::Refresh(refresh) => {
                    run_hook(&entry.name, HookPhase::Refresh, refresh, page, &mut report);
                }
            }
            report.ran.push(entry.name.clone());
        }
        report
    }

    fn run_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        // stable: registration order within a stage
        order.sort_by_key(|&i| self.entries[i].stage);
        order
    }
}

fn run_hook(name: &str, phase: HookPhase, hook: &mut Hook, page: &mut Page, report: &mut ReinitReport) {
    let result = match catch_unwind(AssertUnwindSafe(|| hook(page))) {
        Ok(result) => result,
        Err(payload) => Err(WidgetError::Panicked(panic_message(payload.as_ref()))),
    };
    if let Err(error) = result {
        log::warn!(target: "navigation.reinit", "widget `{name}` {phase:?} failed: {error}");
        report.failures.push(HookFailure {
            widget: name.to_string(),
            phase,
            error,
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Listener bindings keyed by (node, event). Binding twice is a no-op.
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    bound: HashSet<(Id, &'static str)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the pair was already bound.
    pub fn bind(&mut self, node: Id, event: &'static str) -> bool {
        self.bound.insert((node, event))
    }

    pub fn is_bound(&self, node: Id, event: &'static str) -> bool {
        self.bound.contains(&(node, event))
    }

    pub fn unbind(&mut self, node: Id, event: &'static str) -> bool {
        self.bound.remove(&(node, event))
    }

    /// Forget bindings whose node is no longer in `root`.
    pub fn retain_live(&mut self, root: &Node) {
        self.bound
            .retain(|(id, _)| html::dom_utils::find_node_by_id(root, *id).is_some());
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}
