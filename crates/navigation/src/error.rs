pub use net::FetchError;

/// The live page or the fetched document cannot be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("no element matches content selector `{selector}` in the {side} document")]
    MissingContainer {
        selector: String,
        side: DocumentSide,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSide {
    Live,
    Fetched,
}

impl std::fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DocumentSide::Live => "live",
            DocumentSide::Fetched => "fetched",
        })
    }
}

/// A pipeline failure. Every variant ends in a hard navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("reconcile failed: {0}")]
    Reconcile(#[from] ReconcileError),
    #[error("no document fetcher attached")]
    NoFetcher,
}

/// A widget hook failed. Isolated per hook; never aborts the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("{0}")]
    Failed(String),
    #[error("panicked: {0}")]
    Panicked(String),
}

impl WidgetError {
    pub fn failed(msg: impl Into<String>) -> Self {
        WidgetError::Failed(msg.into())
    }
}
