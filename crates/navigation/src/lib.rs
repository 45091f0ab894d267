//! Soft navigation: intercept same-origin link clicks and back/forward,
//! fetch the target page, swap the live content inside a view transition,
//! then reinitialize the widgets whose DOM was replaced.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod history;
pub mod interceptor;
pub mod page;
pub mod platform;
pub mod reconciler;
pub mod reinit;
pub mod session;
pub mod transition;
pub mod url_norm;

pub use cache::{CachedDocument, PageCache};
pub use config::EngineConfig;
pub use engine::{ClickDisposition, IgnoreReason, NavOutcome, NavigationEngine};
pub use error::{FetchError, NavError, ReconcileError, WidgetError};
pub use fetcher::{BusFetcher, DocumentFetcher};
pub use interceptor::{ClickModifiers, LinkDecision, SkipReason};
pub use page::Page;
pub use platform::{HeadlessPlatform, PageEvent, Platform};
pub use reinit::{Bindings, ReinitReport, ReinitRegistry, Stage, WidgetHooks};
pub use session::{SessionStore, Theme};

pub use core_types::{NavTrigger, RequestId};
