//! Declarative table of libpod pod operations.
//!
//! Unique responsibility: describe each REST call (method, path, status table,
//! streaming flag) as static data. Dispatch logic lives in `libpod_dispatcher`;
//! adding an operation means adding one descriptor row here.
//!
//! REST surface (prefix `/libpod/pods/`):
//! - GET `{id}/json`, `{id}/stats` (stream), `{id}/top`, `{id}/exists`
//! - POST `{id}/start`, `{id}/stop`, `{id}/restart`, `{id}/pause`, `{id}/unpause`, `{id}/kill`
//! - DELETE `{id}`

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Path prefix shared by every pod endpoint.
pub const POD_PATH_PREFIX: &str = "/libpod/pods/";

/// Reason attached to statuses missing from an operation's table.
pub const UNEXPECTED_STATUS: &str = "unexpected status";

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Upper-case method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// Entry of a status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The status means the call succeeded.
    Success,
    /// The status is a known failure with the given message.
    Failure(&'static str),
}

/// Result of looking up a status code in a descriptor's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Listed as success.
    Success,
    /// Failure, either listed or unknown.
    Failure {
        /// Table message, or [`UNEXPECTED_STATUS`].
        reason: &'static str,
        /// Whether the status was listed in the table.
        listed: bool,
    },
}

/// Static description of one REST call against a pod.
#[derive(Debug, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Operation name, used in logs.
    pub name: &'static str,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path appended after `/libpod/pods/{id}` (empty for the pod resource itself).
    pub path_suffix: &'static str,
    /// Status code → outcome table.
    pub statuses: &'static [(u16, StatusOutcome)],
    /// Whether the response body is an open-ended stream.
    pub is_stream: bool,
}

impl OperationDescriptor {
    /// Build the request path for the given pod identifier.
    ///
    /// The identifier is inserted verbatim.
    #[must_use]
    pub fn path(&self, pod_id: &str) -> String {
        format!("{POD_PATH_PREFIX}{pod_id}{}", self.path_suffix)
    }

    /// Table entry for `status`, if listed.
    #[must_use]
    pub fn outcome(&self, status: u16) -> Option<StatusOutcome> {
        self.statuses
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, outcome)| *outcome)
    }

    /// Classify a response status. Unknown codes are failures, never panics.
    #[must_use]
    pub fn classify(&self, status: u16) -> StatusClass {
        match self.outcome(status) {
            Some(StatusOutcome::Success) => StatusClass::Success,
            Some(StatusOutcome::Failure(reason)) => StatusClass::Failure {
                reason,
                listed: true,
            },
            None => StatusClass::Failure {
                reason: UNEXPECTED_STATUS,
                listed: false,
            },
        }
    }
}

const OK: StatusOutcome = StatusOutcome::Success;
const NO_SUCH_POD: StatusOutcome = StatusOutcome::Failure("no such pod");
const SERVER_ERROR: StatusOutcome = StatusOutcome::Failure("server error");

const GET_STATUSES: &[(u16, StatusOutcome)] = &[(200, OK), (404, NO_SUCH_POD), (500, SERVER_ERROR)];
const ACTION_STATUSES: &[(u16, StatusOutcome)] =
    &[(200, OK), (204, OK), (404, NO_SUCH_POD), (500, SERVER_ERROR)];

static INSPECT: OperationDescriptor = OperationDescriptor {
    name: "inspect",
    method: HttpMethod::Get,
    path_suffix: "/json",
    statuses: GET_STATUSES,
    is_stream: false,
};

static START: OperationDescriptor = OperationDescriptor {
    name: "start",
    method: HttpMethod::Post,
    path_suffix: "/start",
    statuses: &[
        (200, OK),
        (204, OK),
        (304, StatusOutcome::Failure("pod already started")),
        (404, NO_SUCH_POD),
        (500, SERVER_ERROR),
    ],
    is_stream: false,
};

static STOP: OperationDescriptor = OperationDescriptor {
    name: "stop",
    method: HttpMethod::Post,
    path_suffix: "/stop",
    statuses: &[
        (200, OK),
        (204, OK),
        (304, StatusOutcome::Failure("pod already stopped")),
        (404, NO_SUCH_POD),
        (500, SERVER_ERROR),
    ],
    is_stream: false,
};

static RESTART: OperationDescriptor = OperationDescriptor {
    name: "restart",
    method: HttpMethod::Post,
    path_suffix: "/restart",
    statuses: ACTION_STATUSES,
    is_stream: false,
};

static PAUSE: OperationDescriptor = OperationDescriptor {
    name: "pause",
    method: HttpMethod::Post,
    path_suffix: "/pause",
    statuses: ACTION_STATUSES,
    is_stream: false,
};

static UNPAUSE: OperationDescriptor = OperationDescriptor {
    name: "unpause",
    method: HttpMethod::Post,
    path_suffix: "/unpause",
    statuses: ACTION_STATUSES,
    is_stream: false,
};

static KILL: OperationDescriptor = OperationDescriptor {
    name: "kill",
    method: HttpMethod::Post,
    path_suffix: "/kill",
    statuses: &[
        (200, OK),
        (204, OK),
        (404, NO_SUCH_POD),
        (409, StatusOutcome::Failure("conflict")),
        (500, SERVER_ERROR),
    ],
    is_stream: false,
};

static REMOVE: OperationDescriptor = OperationDescriptor {
    name: "remove",
    method: HttpMethod::Delete,
    path_suffix: "",
    statuses: ACTION_STATUSES,
    is_stream: false,
};

static STATS: OperationDescriptor = OperationDescriptor {
    name: "stats",
    method: HttpMethod::Get,
    path_suffix: "/stats",
    statuses: GET_STATUSES,
    is_stream: true,
};

static TOP: OperationDescriptor = OperationDescriptor {
    name: "top",
    method: HttpMethod::Get,
    path_suffix: "/top",
    statuses: GET_STATUSES,
    is_stream: false,
};

static EXISTS: OperationDescriptor = OperationDescriptor {
    name: "exists",
    method: HttpMethod::Get,
    path_suffix: "/exists",
    statuses: &[(204, OK), (404, NO_SUCH_POD), (500, SERVER_ERROR)],
    is_stream: false,
};

/// The pod operations exposed by the libpod API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodOperation {
    /// Inspect the pod.
    Inspect,
    /// Start the pod.
    Start,
    /// Stop the pod.
    Stop,
    /// Restart the pod.
    Restart,
    /// Pause the pod.
    Pause,
    /// Unpause the pod.
    Unpause,
    /// Send a signal to the pod's containers.
    Kill,
    /// Remove the pod.
    Remove,
    /// Stream resource usage statistics.
    Stats,
    /// List processes running in the pod.
    Top,
    /// Check whether the pod exists.
    Exists,
}

impl PodOperation {
    /// Every operation, in table order.
    pub const ALL: [Self; 11] = [
        Self::Inspect,
        Self::Start,
        Self::Stop,
        Self::Restart,
        Self::Pause,
        Self::Unpause,
        Self::Kill,
        Self::Remove,
        Self::Stats,
        Self::Top,
        Self::Exists,
    ];

    /// Static descriptor for this operation.
    #[must_use]
    pub fn descriptor(self) -> &'static OperationDescriptor {
        match self {
            Self::Inspect => &INSPECT,
            Self::Start => &START,
            Self::Stop => &STOP,
            Self::Restart => &RESTART,
            Self::Pause => &PAUSE,
            Self::Unpause => &UNPAUSE,
            Self::Kill => &KILL,
            Self::Remove => &REMOVE,
            Self::Stats => &STATS,
            Self::Top => &TOP,
            Self::Exists => &EXISTS,
        }
    }

    /// Operation name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for PodOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown operation name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pod operation: {0}")]
pub struct ParseOperationError(pub String);

impl FromStr for PodOperation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.name() == wanted)
            .ok_or_else(|| ParseOperationError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_interpolate_identifier() {
        assert_eq!(PodOperation::Inspect.descriptor().path("web"), "/libpod/pods/web/json");
        assert_eq!(PodOperation::Remove.descriptor().path("web"), "/libpod/pods/web");
        assert_eq!(PodOperation::Stats.descriptor().path("a1b2"), "/libpod/pods/a1b2/stats");
    }

    #[test]
    fn test_methods_match_rest_surface() {
        for op in PodOperation::ALL {
            let expected = match op {
                PodOperation::Inspect | PodOperation::Stats | PodOperation::Top | PodOperation::Exists => {
                    HttpMethod::Get
                }
                PodOperation::Remove => HttpMethod::Delete,
                _ => HttpMethod::Post,
            };
            assert_eq!(op.descriptor().method, expected, "{op}");
        }
    }

    #[test]
    fn test_only_stats_streams() {
        for op in PodOperation::ALL {
            assert_eq!(op.descriptor().is_stream, op == PodOperation::Stats, "{op}");
        }
    }

    #[test]
    fn test_classify_listed_codes() {
        let start = PodOperation::Start.descriptor();
        assert_eq!(start.classify(200), StatusClass::Success);
        assert_eq!(start.classify(204), StatusClass::Success);
        assert_eq!(
            start.classify(304),
            StatusClass::Failure {
                reason: "pod already started",
                listed: true
            }
        );
        assert_eq!(
            PodOperation::Kill.descriptor().classify(409),
            StatusClass::Failure {
                reason: "conflict",
                listed: true
            }
        );
    }

    #[test]
    fn test_classify_unknown_code() {
        for op in PodOperation::ALL {
            for code in [0, 101, 302, 418, 503, 999] {
                assert_eq!(
                    op.descriptor().classify(code),
                    StatusClass::Failure {
                        reason: UNEXPECTED_STATUS,
                        listed: false
                    },
                    "{op} {code}"
                );
            }
        }
    }

    #[test]
    fn test_exists_only_accepts_no_content() {
        let exists = PodOperation::Exists.descriptor();
        assert_eq!(exists.classify(204), StatusClass::Success);
        assert!(matches!(exists.classify(200), StatusClass::Failure { listed: false, .. }));
    }

    #[test]
    fn test_parse_operation_names() {
        assert_eq!("stats".parse::<PodOperation>(), Ok(PodOperation::Stats));
        assert_eq!(" Unpause ".parse::<PodOperation>(), Ok(PodOperation::Unpause));
        assert_eq!(
            "prune".parse::<PodOperation>(),
            Err(ParseOperationError("prune".to_string()))
        );
        for op in PodOperation::ALL {
            assert_eq!(op.to_string().parse::<PodOperation>(), Ok(op));
        }
    }
}
