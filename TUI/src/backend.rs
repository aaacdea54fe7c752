// Backend communication with the third-party generation endpoints over HTTP

use std::sync::mpsc::{self, Receiver, Sender};

use thiserror::Error;
use tokio::runtime::Runtime;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::config::Config;

pub type RequestId = u64;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("offline mode: network tools are disabled")]
    Offline,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint returned HTTP {0}")]
    Status(u16),
    #[error("request cancelled")]
    Cancelled,
}

/// Successful payload of a finished request
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Image { url: String, bytes: Vec<u8> },
}

/// Completion delivered to the UI loop
#[derive(Debug)]
pub struct BackendEvent {
    pub id: RequestId,
    pub result: Result<Reply, BackendError>,
}

/// Cancellation scope for the requests of one mounted widget.
///
/// Dropping the scope cancels every request started under it, so a reply
/// can never land in a widget that has been replaced.
pub struct RequestScope {
    token: CancellationToken,
    _guard: DropGuard,
}

impl RequestScope {
    pub fn new() -> Self {
        let token = CancellationToken::new();
        let guard = token.clone().drop_guard();
        Self {
            token,
            _guard: guard,
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

/// `GET {endpoint}/{prompt}` returning plain text.
pub fn text_url(endpoint: &str, prompt: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(prompt)
    )
}

/// `GET {endpoint}/prompt/{prompt}?width=..&height=..&seed=..` returning image bytes.
pub fn image_url(endpoint: &str, prompt: &str, width: u32, height: u32, seed: i64) -> String {
    format!(
        "{}/prompt/{}?width={}&height={}&seed={}",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(prompt),
        width,
        height,
        seed
    )
}

pub struct Backend {
    runtime: Runtime,
    client: reqwest::Client,
    text_endpoint: String,
    image_endpoint: String,
    offline: bool,
    request_id: RequestId,
    tx: Sender<BackendEvent>,
    rx: Receiver<BackendEvent>,
}

impl Backend {
    pub fn new(config: &Config) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("toolifast-net")
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::channel();

        Ok(Self {
            runtime,
            client: reqwest::Client::new(),
            text_endpoint: config.text_endpoint.clone(),
            image_endpoint: config.image_endpoint.clone(),
            offline: config.offline,
            request_id: 0,
            tx,
            rx,
        })
    }

    pub fn image_endpoint(&self) -> &str {
        &self.image_endpoint
    }

    fn next_id(&mut self) -> RequestId {
        self.request_id += 1;
        self.request_id
    }

    /// Ask the text endpoint for a reply to `prompt`.
    pub fn generate_text(&mut self, prompt: &str, scope: &RequestScope) -> RequestId {
        let url = text_url(&self.text_endpoint, prompt);
        let client = self.client.clone();
        self.spawn(scope, async move {
            let response = client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(BackendError::Status(response.status().as_u16()));
            }
            Ok(Reply::Text(response.text().await?))
        })
    }

    /// Fetch the image behind `url`, as built by [`image_url`].
    pub fn fetch_image(&mut self, url: String, scope: &RequestScope) -> RequestId {
        let client = self.client.clone();
        self.spawn(scope, async move {
            let response = client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(BackendError::Status(response.status().as_u16()));
            }
            let bytes = response.bytes().await?.to_vec();
            Ok(Reply::Image { url, bytes })
        })
    }

    fn spawn<F>(&mut self, scope: &RequestScope, request: F) -> RequestId
    where
        F: std::future::Future<Output = Result<Reply, BackendError>> + Send + 'static,
    {
        let id = self.next_id();
        let tx = self.tx.clone();

        if self.offline {
            let _ = tx.send(BackendEvent {
                id,
                result: Err(BackendError::Offline),
            });
            return id;
        }

        let token = scope.token();
        self.runtime.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => Err(BackendError::Cancelled),
                result = request => result,
            };

            match result {
                Err(BackendError::Cancelled) => {
                    tracing::debug!(id, "request cancelled, reply dropped");
                }
                result => {
                    if let Err(e) = &result {
                        tracing::warn!(id, error = %e, "generation request failed");
                    }
                    // the receiver only disappears at shutdown
                    let _ = tx.send(BackendEvent { id, result });
                }
            }
        });

        tracing::debug!(id, "request started");
        id
    }

    /// Drain all completions that arrived since the last call.
    pub fn poll(&self) -> Vec<BackendEvent> {
        self.rx.try_iter().collect()
    }
}
