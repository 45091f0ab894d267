use crate::error::FetchError;
use bus::CoreCommand;
use core_types::RequestId;
use std::sync::mpsc::Sender;

/// Starts document fetches. Results come back as `CoreEvent::DocumentFetched`
/// or `CoreEvent::FetchFailed` carrying the same `request_id`.
pub trait DocumentFetcher {
    fn fetch(&mut self, request_id: RequestId, url: &str) -> Result<(), FetchError>;

    fn cancel(&mut self, request_id: RequestId);
}

/// Fetches through the network runtime over the command bus.
#[derive(Debug, Clone)]
pub struct BusFetcher {
    cmd_tx: Sender<CoreCommand>,
}

impl BusFetcher {
    pub fn new(cmd_tx: Sender<CoreCommand>) -> Self {
        Self { cmd_tx }
    }
}

impl DocumentFetcher for BusFetcher {
    fn fetch(&mut self, request_id: RequestId, url: &str) -> Result<(), FetchError> {
        self.cmd_tx
            .send(CoreCommand::FetchDocument {
                request_id,
                url: url.to_string(),
            })
            .map_err(|_| FetchError::Disconnected)
    }

    fn cancel(&mut self, request_id: RequestId) {
        if self.cmd_tx.send(CoreCommand::CancelRequest { request_id }).is_err() {
            log::debug!(target: "navigation.fetch", "runtime gone; cancel of {request_id} dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn fetch_and_cancel_become_commands() {
        let (tx, rx) = mpsc::channel();
        let mut fetcher = BusFetcher::new(tx);
        fetcher.fetch(3, "https://site/a").unwrap();
        fetcher.cancel(3);

        assert!(matches!(
            rx.try_recv(),
            Ok(CoreCommand::FetchDocument { request_id: 3, ref url }) if url == "https://site/a"
        ));
        assert!(matches!(rx.try_recv(), Ok(CoreCommand::CancelRequest { request_id: 3 })));
    }

    #[test]
    fn closed_runtime_is_a_disconnect() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut fetcher = BusFetcher::new(tx);
        assert_eq!(fetcher.fetch(1, "https://site/"), Err(FetchError::Disconnected));
    }
}
