//! Pod handle and client factory.
//!
//! A [`Pod`] is an immutable (transport, identifier) pair. Every operation is a
//! one-line call into the shared [`Dispatcher`]; none carries logic of its own.
//!
//! Two delivery modes run the same dispatch future:
//! - `pod.start(None).await` returns the outcome,
//! - `pod.call_with_callback(PodOperation::Start, None, |outcome| ..)` spawns the
//!   call and hands the outcome to the callback exactly once.

use std::{fmt, sync::Arc};

use tokio::task::JoinHandle;

use crate::{
    libpod_config::LibpodClientConfig,
    libpod_dispatcher::{Dispatcher, PodResponse},
    libpod_error::LibpodError,
    libpod_operation::PodOperation,
    libpod_options::{CallOptions, OperationDefaults},
    libpod_transport::{HttpTransport, Transport},
};

/// Outcome of one pod operation.
pub type PodResult = Result<PodResponse, LibpodError>;

/// Factory for [`Pod`] handles sharing one transport.
#[derive(Clone, Debug)]
pub struct LibpodClient {
    dispatcher: Dispatcher,
    defaults: Arc<OperationDefaults>,
}

impl LibpodClient {
    /// Create a client over HTTP from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cfg: LibpodClientConfig) -> Result<Self, LibpodError> {
        let transport = HttpTransport::new(cfg)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, LibpodError> {
        Self::new(LibpodClientConfig::from_env()?)
    }

    /// Create a client over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
            defaults: Arc::new(OperationDefaults::default()),
        }
    }

    /// Replace the per-operation default options handed to new pods.
    #[must_use]
    pub fn with_defaults(mut self, defaults: OperationDefaults) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    /// Handle for the pod with the given name or ID. The identifier is not validated.
    #[must_use]
    pub fn pod(&self, id: impl Into<String>) -> Pod {
        Pod {
            dispatcher: self.dispatcher.clone(),
            defaults: Arc::clone(&self.defaults),
            id: id.into(),
        }
    }
}

/// Handle to one pod. Cheap to clone; calls on the same handle are independent.
#[derive(Clone)]
pub struct Pod {
    dispatcher: Dispatcher,
    defaults: Arc<OperationDefaults>,
    id: String,
}

impl Pod {
    /// Handle for `id` over the given transport, with empty defaults.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, id: impl Into<String>) -> Self {
        LibpodClient::with_transport(transport).pod(id)
    }

    /// Pod name or ID this handle is bound to.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Run `operation` and return its outcome.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub async fn call(&self, operation: PodOperation, options: Option<CallOptions>) -> PodResult {
        let options = self.defaults.resolve(operation, options);
        self.dispatcher
            .dispatch(operation.descriptor(), &self.id, options)
            .await
    }

    /// Run `operation` on the current tokio runtime and pass the outcome to
    /// `callback` exactly once.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call_with_callback<F>(
        &self,
        operation: PodOperation,
        options: Option<CallOptions>,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(PodResult) + Send + 'static,
    {
        let pod = self.clone();
        tokio::spawn(async move {
            let outcome = pod.call(operation, options).await;
            callback(outcome);
        })
    }

    /// `GET /libpod/pods/{id}/json`.
    ///
    /// # Errors
    ///
    /// 404 no such pod, 500 server error.
    pub async fn inspect(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Inspect, options).await
    }

    /// `POST /libpod/pods/{id}/start`.
    ///
    /// # Errors
    ///
    /// 304 pod already started, 404 no such pod, 500 server error.
    pub async fn start(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Start, options).await
    }

    /// `POST /libpod/pods/{id}/stop`.
    ///
    /// # Errors
    ///
    /// 304 pod already stopped, 404 no such pod, 500 server error.
    pub async fn stop(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Stop, options).await
    }

    /// `POST /libpod/pods/{id}/restart`.
    ///
    /// # Errors
    ///
    /// 404 no such pod, 500 server error.
    pub async fn restart(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Restart, options).await
    }

    /// `POST /libpod/pods/{id}/pause`.
    ///
    /// # Errors
    ///
    /// 404 no such pod, 500 server error.
    pub async fn pause(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Pause, options).await
    }

    /// `POST /libpod/pods/{id}/unpause`.
    ///
    /// # Errors
    ///
    /// 404 no such pod, 500 server error.
    pub async fn unpause(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Unpause, options).await
    }

    /// `POST /libpod/pods/{id}/kill`.
    ///
    /// # Errors
    ///
    /// 404 no such pod, 409 conflict, 500 server error.
    pub async fn kill(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Kill, options).await
    }

    /// `DELETE /libpod/pods/{id}`.
    ///
    /// # Errors
    ///
    /// 404 no such pod, 500 server error.
    pub async fn remove(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Remove, options).await
    }

    /// `GET /libpod/pods/{id}/stats`, answered with a [`crate::PodStream`].
    ///
    /// # Errors
    ///
    /// 404 no such pod, 500 server error.
    pub async fn stats(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Stats, options).await
    }

    /// `GET /libpod/pods/{id}/top`.
    ///
    /// # Errors
    ///
    /// 404 no such pod, 500 server error.
    pub async fn top(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Top, options).await
    }

    /// `GET /libpod/pods/{id}/exists`. Success is 204 only.
    ///
    /// # Errors
    ///
    /// 404 no such pod, 500 server error.
    pub async fn exists(&self, options: Option<CallOptions>) -> PodResult {
        self.call(PodOperation::Exists, options).await
    }
}

impl fmt::Debug for Pod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pod").field(&self.id).finish()
    }
}
