//! Transport seam between the dispatcher and the network.
//!
//! Unique responsibility: perform one HTTP exchange and hand back the status,
//! content type and a lazy body stream. Connection management, TLS and timeouts
//! belong to the implementation; [`HttpTransport`] is the `reqwest` one.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream::BoxStream};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    libpod_config::LibpodClientConfig, libpod_error::LibpodError, libpod_operation::HttpMethod,
};

/// Lazy response body: a sequence of byte chunks ending when the connection closes.
pub type BodyStream = BoxStream<'static, Result<Bytes, LibpodError>>;

/// One request as handed to a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request path, e.g. `/libpod/pods/web/json`.
    pub path: String,
    /// Encoded query parameters.
    pub query: Vec<(String, String)>,
    /// JSON request body.
    pub body: Option<Value>,
    /// Whether the response body is an open-ended stream.
    pub streaming: bool,
    /// Cancellation token of the call, if any.
    pub cancel: Option<CancellationToken>,
}

/// Response head plus lazy body.
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Response body.
    pub body: BodyStream,
}

impl TransportResponse {
    /// Response with a streamed body.
    #[must_use]
    pub fn new(status: u16, content_type: Option<String>, body: BodyStream) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    /// Response whose body is a single chunk (empty bodies yield no chunk).
    #[must_use]
    pub fn from_bytes(status: u16, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        let chunks = if body.is_empty() { Vec::new() } else { vec![Ok(body)] };
        Self::new(
            status,
            content_type.map(str::to_owned),
            futures::stream::iter(chunks).boxed(),
        )
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Performs HTTP exchanges on behalf of the dispatcher.
///
/// Implementations return `Err` only when no response status was obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request and return the response head with a lazy body.
    async fn issue(&self, request: TransportRequest) -> Result<TransportResponse, LibpodError>;
}

/// `reqwest`-backed transport over TCP.
pub struct HttpTransport {
    cfg: LibpodClientConfig,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a new transport from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cfg: LibpodClientConfig) -> Result<Self, LibpodError> {
        // No client-wide timeout: it would cut stats streams short.
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .no_proxy()
            .build()?;

        Ok(Self { cfg, http })
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub const fn config(&self) -> &LibpodClientConfig {
        &self.cfg
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn issue(&self, request: TransportRequest) -> Result<TransportResponse, LibpodError> {
        let mut url =
            reqwest::Url::parse(&self.cfg.url_for(&request.path)).map_err(LibpodError::transport)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        let mut builder = self.http.request(request.method.into(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if !request.streaming && self.cfg.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(self.cfg.timeout_ms));
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Ok(TransportResponse::new(status, content_type, response_chunks(resp)))
    }
}

fn response_chunks(resp: reqwest::Response) -> BodyStream {
    futures::stream::try_unfold(resp, |mut resp| async move {
        let chunk = resp.chunk().await?;
        Ok::<_, LibpodError>(chunk.map(|chunk| (chunk, resp)))
    })
    .boxed()
}
