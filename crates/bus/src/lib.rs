use core_types::RequestId;
use html::ParsedDocument;
use net::FetchError;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug)]
pub enum CoreCommand {
    // Network requests
    FetchDocument { request_id: RequestId, url: String },
    CancelRequest { request_id: RequestId },
}

#[derive(Debug)]
pub enum CoreEvent {
    // Network -> engine
    DocumentFetched {
        request_id: RequestId,
        url: String,
        document: Box<ParsedDocument>,
    },
    FetchFailed {
        request_id: RequestId,
        url: String,
        error: FetchError,
    },

    // Platform view transition -> engine
    /// The old state has been captured; the DOM update may run now.
    TransitionUpdate { request_id: RequestId },
    /// The visual phase of the transition is over.
    TransitionFinished { request_id: RequestId },
}

impl CoreEvent {
    pub fn request_id(&self) -> RequestId {
        match self {
            CoreEvent::DocumentFetched { request_id, .. }
            | CoreEvent::FetchFailed { request_id, .. }
            | CoreEvent::TransitionUpdate { request_id }
            | CoreEvent::TransitionFinished { request_id } => *request_id,
        }
    }
}

pub struct Bus {
    pub cmd_tx: Sender<CoreCommand>,
    pub cmd_rx: Receiver<CoreCommand>,
    pub evt_tx: Sender<CoreEvent>, // shareable for runtimes and the platform
    pub evt_rx: Receiver<CoreEvent>,
}

impl Bus {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        Self {
            cmd_tx,
            cmd_rx,
            evt_tx,
            evt_rx,
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
