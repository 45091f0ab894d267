use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("not an HTML document: {0}")]
    NotHtml(String),
    #[error("failed to read body: {0}")]
    Body(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("fetch runtime disconnected")]
    Disconnected,
}

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: concat!("softnav/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub url: String,           // final URL after redirects
    pub requested_url: String, // what we asked for
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub body: String,
    pub duration_ms: u128,
    pub error: Option<FetchError>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status.is_some_and(|s| (200..300).contains(&s))
    }

    fn failed(requested_url: &str, start: Instant, status: Option<u16>, error: FetchError) -> Self {
        Self {
            url: requested_url.to_string(),
            requested_url: requested_url.to_string(),
            status,
            content_type: None,
            body: String::new(),
            duration_ms: start.elapsed().as_millis(),
            error: Some(error),
        }
    }
}

pub type FetchCallback = Arc<dyn Fn(FetchResult) + Send + Sync>;

/// Fetch `url` on a worker thread and hand the result to `cb`.
///
/// `cb` runs exactly once. If `cancel` is set before the request starts or by
/// the time the response is read, the result is `FetchError::Cancelled` and
/// any response body is discarded.
pub fn fetch_text(url: String, opts: FetchOptions, cancel: Arc<AtomicBool>, cb: FetchCallback) {
    thread::spawn(move || {
        let start = Instant::now();
        if cancel.load(Ordering::Acquire) {
            cb(FetchResult::failed(&url, start, None, FetchError::Cancelled));
            return;
        }
        let result = fetch_blocking(&url, &opts);
        if cancel.load(Ordering::Acquire) {
            log::debug!(target: "net", "dropping cancelled response for {url}");
            cb(FetchResult::failed(&url, start, result.status, FetchError::Cancelled));
            return;
        }
        cb(result);
    });
}

/// Synchronous GET. Non-2xx responses come back with `status` set and `error`
/// describing the HTTP failure; transport failures leave `status` empty.
pub fn fetch_blocking(url: &str, opts: &FetchOptions) -> FetchResult {
    let start = Instant::now();
    let agent = ureq::AgentBuilder::new()
        .timeout(opts.timeout)
        .user_agent(&opts.user_agent)
        .build();

    let resp = match agent.get(url).set("Accept", ACCEPT_HTML).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(code, _)) => {
            return FetchResult::failed(url, start, Some(code), FetchError::Status(code));
        }
        Err(ureq::Error::Transport(err)) => {
            return FetchResult::failed(url, start, None, FetchError::Transport(err.to_string()));
        }
    };

    let status = resp.status();
    let final_url = resp.get_url().to_string();
    let content_type = resp.header("content-type").map(str::to_string);
    match resp.into_string() {
        Ok(body) => {
            log::debug!(
                target: "net",
                "GET {url} -> {status} ({} bytes, {} ms)",
                body.len(),
                start.elapsed().as_millis()
            );
            FetchResult {
                url: final_url,
                requested_url: url.to_string(),
                status: Some(status),
                content_type,
                body,
                duration_ms: start.elapsed().as_millis(),
                error: None,
            }
        }
        Err(err) => FetchResult::failed(url, start, Some(status), FetchError::Body(err.to_string())),
    }
}
