//! Request dispatch and status interpretation.
//!
//! Unique responsibility: turn one [`OperationDescriptor`] plus call options into
//! exactly one HTTP exchange and exactly one outcome:
//! - listed success status: decoded payload, or a [`PodStream`] for streaming operations,
//! - other status: [`LibpodError::Api`] with the table message (or "unexpected status"),
//! - no status at all: the transport error, untouched,
//! - cancellation token fired: [`LibpodError::Cancelled`], never a late success.
//!
//! This layer never retries and never caches.

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    libpod_decoder::{PodStream, cancellable, collect_body, decode_payload, error_message},
    libpod_error::LibpodError,
    libpod_operation::{OperationDescriptor, StatusClass},
    libpod_options::CallOptions,
    libpod_transport::{Transport, TransportRequest},
};

/// Successful outcome of a pod operation.
#[derive(Debug)]
pub enum PodResponse {
    /// Decoded body of a buffered operation (`null` for empty bodies).
    Payload(Value),
    /// Live body of a streaming operation.
    Stream(PodStream),
}

impl PodResponse {
    /// Borrow the payload of a buffered operation.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match self {
            Self::Payload(value) => Some(value),
            Self::Stream(_) => None,
        }
    }

    /// Take the payload of a buffered operation.
    #[must_use]
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Self::Payload(value) => Some(value),
            Self::Stream(_) => None,
        }
    }

    /// Take the stream of a streaming operation.
    #[must_use]
    pub fn into_stream(self) -> Option<PodStream> {
        match self {
            Self::Stream(stream) => Some(stream),
            Self::Payload(_) => None,
        }
    }
}

/// Runs operations against a [`Transport`].
///
/// Holds no per-call state: concurrent dispatches share nothing but the transport.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    /// Create a dispatcher over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Perform one call.
    ///
    /// # Errors
    ///
    /// Returns a transport error when no response was obtained, [`LibpodError::Cancelled`]
    /// when the call's token fired first, and a domain error for non-success statuses
    /// or undecodable bodies.
    #[tracing::instrument(
        name = "pod_dispatch",
        skip_all,
        fields(operation = descriptor.name, pod_id = %pod_id, method = %descriptor.method)
    )]
    pub async fn dispatch(
        &self,
        descriptor: &'static OperationDescriptor,
        pod_id: &str,
        options: CallOptions,
    ) -> Result<PodResponse, LibpodError> {
        let Some(token) = options.cancel.clone() else {
            return self.exchange(descriptor, pod_id, options).await;
        };

        if token.is_cancelled() {
            debug!("cancelled before dispatch");
            return Err(LibpodError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Err(LibpodError::Cancelled),
            outcome = self.exchange(descriptor, pod_id, options) => outcome,
        };

        // A token fired while the exchange was completing still wins.
        if token.is_cancelled() {
            debug!("cancelled while in flight");
            return Err(LibpodError::Cancelled);
        }
        outcome
    }

    async fn exchange(
        &self,
        descriptor: &'static OperationDescriptor,
        pod_id: &str,
        options: CallOptions,
    ) -> Result<PodResponse, LibpodError> {
        let request = TransportRequest {
            method: descriptor.method,
            path: descriptor.path(pod_id),
            query: options.query_pairs(),
            body: options.body,
            streaming: descriptor.is_stream,
            cancel: options.cancel,
        };
        let cancel = request.cancel.clone();

        let response = self.transport.issue(request).await?;
        let status = response.status;
        debug!(status, "response received");

        match descriptor.classify(status) {
            StatusClass::Success if descriptor.is_stream => {
                let body = match cancel {
                    Some(token) => cancellable(response.body, token),
                    None => response.body,
                };
                Ok(PodResponse::Stream(PodStream::new(status, body)))
            }
            StatusClass::Success => {
                let body = collect_body(response.body).await?;
                decode_payload(status, response.content_type.as_deref(), &body).map(PodResponse::Payload)
            }
            StatusClass::Failure { reason, listed } => {
                if !listed {
                    warn!(status, "status not listed for operation");
                }
                // The error body is best effort: a broken body must not hide the status.
                let body = collect_body(response.body).await.unwrap_or_default();
                Err(LibpodError::Api {
                    status,
                    reason,
                    message: error_message(&body),
                })
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libpod_operation::PodOperation;
    use crate::libpod_transport::TransportResponse;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedTransport {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn issue(&self, _request: TransportRequest) -> Result<TransportResponse, LibpodError> {
            Ok(TransportResponse::from_bytes(
                self.status,
                Some("application/json"),
                self.body,
            ))
        }
    }

    fn dispatcher(status: u16, body: &'static str) -> Dispatcher {
        Dispatcher::new(Arc::new(FixedTransport { status, body }))
    }

    #[tokio::test]
    async fn test_success_payload() {
        let response = dispatcher(200, r#"{"Id":"abc"}"#)
            .dispatch(PodOperation::Inspect.descriptor(), "abc", CallOptions::new())
            .await
            .unwrap();
        assert_eq!(response.payload(), Some(&json!({"Id": "abc"})));
    }

    #[tokio::test]
    async fn test_listed_failure() {
        let err = dispatcher(304, "")
            .dispatch(PodOperation::Start.descriptor(), "abc", CallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LibpodError::Api { status: 304, reason: "pod already started", message: None }
        ));
    }

    #[tokio::test]
    async fn test_unlisted_status_is_generic_failure() {
        let err = dispatcher(418, r#"{"message":"teapot"}"#)
            .dispatch(PodOperation::Pause.descriptor(), "abc", CallOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(418));
        assert_eq!(err.to_string(), "(HTTP code 418) unexpected status - teapot");
    }

    #[tokio::test]
    async fn test_stream_operation_returns_stream() {
        let response = dispatcher(200, "[]\n")
            .dispatch(PodOperation::Stats.descriptor(), "abc", CallOptions::new())
            .await
            .unwrap();
        assert!(response.payload().is_none());
        assert!(response.into_stream().is_some());
    }
}
