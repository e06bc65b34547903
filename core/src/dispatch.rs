//! Timeout-bounded execution of a composed `HttpRequest`.
//!
//! # Design
//! `Dispatcher::send` is the one place where I/O happens and the one place
//! where failures turn into data: every outcome, including timeouts and
//! malformed URLs, comes back as a `FetchResult`. The transport sits behind
//! the `Transport` trait so the dispatcher's clock, timeout, and
//! normalization can be exercised without a network.
//!
//! The dispatcher holds no per-call state. Each `send` owns its own clock
//! and its own timeout; dropping the transport future on timeout is what
//! aborts the in-flight call. There are no retries.

use std::error::Error as _;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Executes one HTTP exchange.
///
/// Implementations buffer the whole response body and report any status
/// code, 4xx and 5xx included, as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.as_str());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.append(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let message = describe(&err);
    if err.is_builder() {
        TransportError::InvalidRequest(message)
    } else if err.is_connect() {
        TransportError::Connect(message)
    } else {
        TransportError::Network(message)
    }
}

/// The error message followed by each of its sources, `: `-separated.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    pub timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// The normalized outcome of one send.
///
/// `status == 0` exactly when `error` is set: the exchange never completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchResult {
    pub fn completed(response: HttpResponse, elapsed_ms: u64) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
            elapsed_ms,
            error: None,
        }
    }

    pub fn failed(error: &TransportError, elapsed_ms: u64) -> Self {
        Self {
            status: 0,
            headers: Headers::new(),
            body: String::new(),
            elapsed_ms,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Sends composed requests through a `Transport` with a fixed timeout.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    config: DispatchConfig,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            config: DispatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Execute `request`, never failing. GET requests and empty bodies are
    /// sent without a body.
    pub async fn send(&self, request: &HttpRequest) -> FetchResult {
        let outgoing;
        let drop_body = match &request.body {
            Some(body) => request.method == HttpMethod::Get || body.is_empty(),
            None => false,
        };
        let request = if drop_body {
            outgoing = HttpRequest {
                body: None,
                ..request.clone()
            };
            &outgoing
        } else {
            request
        };

        debug!(method = %request.method, url = without_query(&request.url), "dispatching request");
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.config.timeout, self.transport.execute(request))
            .await
            .unwrap_or_else(|_| Err(TransportError::Timeout(self.config.timeout.as_millis() as u64)));
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(response) => {
                info!(status = response.status, elapsed_ms, "request completed");
                FetchResult::completed(response, elapsed_ms)
            }
            Err(err) => {
                warn!(error = %err, elapsed_ms, "request failed");
                FetchResult::failed(&err, elapsed_ms)
            }
        }
    }
}

/// Query strings may carry an API key; keep them out of the logs.
fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}
