use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, Sender},
};
use std::thread::{self, JoinHandle};

use bus::{CoreCommand, CoreEvent};
use core_types::RequestId;
use html::{ParsedDocument, is_html};
use net::{FetchError, FetchOptions, FetchResult, fetch_text};

/// Serve `FetchDocument` commands until every command sender is dropped.
pub fn start_net_runtime(
    cmd_rx: Receiver<CoreCommand>,
    evt_tx: Sender<CoreEvent>,
    opts: FetchOptions,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // one cancel flag per in-flight request_id
        let mut cancels: HashMap<RequestId, Arc<AtomicBool>> = HashMap::new();

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                CoreCommand::FetchDocument { request_id, url } => {
                    // Flags no worker holds anymore belong to finished requests.
                    cancels.retain(|_, flag| Arc::strong_count(flag) > 1);
                    let cancel = cancels
                        .entry(request_id)
                        .or_insert_with(|| Arc::new(AtomicBool::new(false)))
                        .clone();

                    log::debug!(target: "runtime_net", "fetch #{request_id} {url}");
                    let evt_tx = evt_tx.clone();
                    fetch_text(
                        url,
                        opts.clone(),
                        cancel,
                        Arc::new(move |result: FetchResult| {
                            let _ = evt_tx.send(document_event(request_id, result));
                        }),
                    );
                }

                CoreCommand::CancelRequest { request_id } => {
                    if let Some(flag) = cancels.remove(&request_id) {
                        flag.store(true, Ordering::Release);
                        log::debug!(target: "runtime_net", "cancelled #{request_id}");
                    }
                }
            }
        }
    })
}

/// Turn a raw fetch result into the engine-facing event: parse successful
/// HTML responses, report everything else as a failure.
pub fn document_event(request_id: RequestId, result: FetchResult) -> CoreEvent {
    let FetchResult {
        url,
        requested_url,
        status,
        content_type,
        body,
        error,
        ..
    } = result;

    let failure = match (error, status) {
        (Some(error), _) => Some(error),
        (None, Some(s)) if !(200..300).contains(&s) => Some(FetchError::Status(s)),
        (None, None) => Some(FetchError::Transport("response without status".into())),
        (None, Some(_)) => match content_type {
            Some(ct) if !is_html(Some(ct.as_str())) => Some(FetchError::NotHtml(ct)),
            _ => None,
        },
    };
    if let Some(error) = failure {
        return CoreEvent::FetchFailed {
            request_id,
            url: requested_url,
            error,
        };
    }

    CoreEvent::DocumentFetched {
        request_id,
        url: requested_url,
        document: Box::new(ParsedDocument::parse(url, &body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(content_type: Option<&str>, body: &str) -> FetchResult {
        FetchResult {
            url: "https://site/final".into(),
            requested_url: "https://site/asked".into(),
            status: Some(200),
            content_type: content_type.map(str::to_string),
            body: body.into(),
            duration_ms: 1,
            error: None,
        }
    }

    #[test]
    fn html_response_is_parsed() {
        let evt = document_event(7, ok(Some("text/html; charset=utf-8"), "<title>T</title>"));
        match evt {
            CoreEvent::DocumentFetched {
                request_id,
                url,
                document,
            } => {
                assert_eq!(request_id, 7);
                assert_eq!(url, "https://site/asked");
                assert_eq!(document.url, "https://site/final");
                assert_eq!(document.title(), Some("T"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_content_type_is_treated_as_html() {
        let evt = document_event(1, ok(None, "<p>x</p>"));
        assert!(matches!(evt, CoreEvent::DocumentFetched { .. }));
    }

    #[test]
    fn non_html_and_http_errors_fail() {
        let evt = document_event(2, ok(Some("application/pdf"), "%PDF"));
        assert!(matches!(
            evt,
            CoreEvent::FetchFailed {
                request_id: 2,
                error: FetchError::NotHtml(_),
                ..
            }
        ));

        let mut not_found = ok(Some("text/html"), "");
        not_found.status = Some(404);
        not_found.error = Some(FetchError::Status(404));
        match document_event(3, not_found) {
            CoreEvent::FetchFailed { error, .. } => assert_eq!(error, FetchError::Status(404)),
            other => panic!("unexpected {other:?}"),
        }

        let mut redirect = ok(Some("text/html"), "");
        redirect.status = Some(304);
        assert!(matches!(
            document_event(4, redirect),
            CoreEvent::FetchFailed {
                error: FetchError::Status(304),
                ..
            }
        ));
    }

    #[test]
    fn cancelled_fetch_is_reported_as_failure() {
        let mut cancelled = ok(Some("text/html"), "<p>late</p>");
        cancelled.error = Some(FetchError::Cancelled);
        match document_event(5, cancelled) {
            CoreEvent::FetchFailed { request_id, url, error } => {
                assert_eq!(request_id, 5);
                assert_eq!(url, "https://site/asked");
                assert_eq!(error, FetchError::Cancelled);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn runtime_exits_when_command_senders_drop() {
        let (cmd_tx, cmd_rx) = std::sync::mpsc::channel();
        let (evt_tx, evt_rx) = std::sync::mpsc::channel();
        let handle = start_net_runtime(cmd_rx, evt_tx, FetchOptions::default());
        cmd_tx
            .send(CoreCommand::CancelRequest { request_id: 99 })
            .unwrap();
        drop(cmd_tx);
        handle.join().unwrap();
        assert!(evt_rx.try_recv().is_err());
    }
}
