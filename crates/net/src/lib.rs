//! Blocking HTTP for the viewer: fragment GETs and raw-byte uploads.
//!
//! Every call runs on its own thread and reports through a callback, so the
//! caller's event loop never blocks on the network.
use std::io::Read;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use url::Url;

pub const USER_AGENT: &str = concat!("report-viewer/", env!("CARGO_PKG_VERSION"));

const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

pub struct FetchResult {
    pub url: String,           // final URL after redirects
    pub requested_url: String, // what we asked for
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub duration_ms: u128,
}

/// 2xx.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

#[derive(Debug, Error)]
pub enum NetError {
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("reading response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

pub type NetCallback = Arc<dyn Fn(Result<FetchResult, NetError>) + Send + Sync>;

/// Resolves a (possibly relative) reference against the page's base URL.
pub fn resolve(base: &Url, reference: &str) -> Result<Url, NetError> {
    base.join(reference).map_err(|source| NetError::InvalidUrl {
        url: reference.to_string(),
        source,
    })
}

/// `<base><path>?name=<file name>`, with the name query-encoded.
pub fn upload_url(base: &Url, path: &str, file_name: &str) -> Result<Url, NetError> {
    let mut url = resolve(base, path)?;
    url.query_pairs_mut().clear().append_pair("name", file_name);
    Ok(url)
}

#[derive(Clone)]
pub struct NetClient {
    agent: ureq::Agent,
}

impl NetClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }

    pub fn get_text(&self, url: &str) -> Result<FetchResult, NetError> {
        let started = Instant::now();
        let outcome = self.agent.get(url).call();
        finish(url, started, outcome)
    }

    /// PUTs `bytes` as `application/octet-stream`. Non-success statuses still
    /// come back as `Ok` with their body.
    pub fn put_bytes(&self, url: &str, bytes: &[u8]) -> Result<FetchResult, NetError> {
        let started = Instant::now();
        let outcome = self
            .agent
            .put(url)
            .set("Content-Type", "application/octet-stream")
            .send_bytes(bytes);
        finish(url, started, outcome)
    }
}

impl Default for NetClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

fn finish(
    requested_url: &str,
    started: Instant,
    outcome: Result<ureq::Response, ureq::Error>,
) -> Result<FetchResult, NetError> {
    let resp = match outcome {
        Ok(resp) => resp,
        // 4xx/5xx still carry a rendered body.
        Err(ureq::Error::Status(_, resp)) => resp,
        Err(ureq::Error::Transport(t)) => {
            return Err(NetError::Transport {
                url: requested_url.to_string(),
                message: t.to_string(),
            });
        }
    };

    let status = resp.status();
    let final_url = resp.get_url().to_string();
    let content_type = resp.header("content-type").map(str::to_string);

    let mut buf = Vec::new();
    resp.into_reader()
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut buf)
        .map_err(|source| NetError::Body {
            url: requested_url.to_string(),
            source,
        })?;

    let result = FetchResult {
        url: final_url,
        requested_url: requested_url.to_string(),
        status,
        content_type,
        body: String::from_utf8_lossy(&buf).into_owned(),
        duration_ms: started.elapsed().as_millis(),
    };
    log::debug!(
        target: "net",
        "{} -> {} ({} bytes, {} ms)",
        result.requested_url,
        result.status,
        buf.len(),
        result.duration_ms
    );
    Ok(result)
}

pub fn fetch_text(client: &NetClient, url: String, cb: NetCallback) {
    let client = client.clone();
    thread::spawn(move || cb(client.get_text(&url)));
}

pub fn upload_bytes(client: &NetClient, url: String, bytes: Vec<u8>, cb: NetCallback) {
    let client = client.clone();
    thread::spawn(move || cb(client.put_bytes(&url, &bytes)));
}
