//! Per-call options and per-operation defaults.
//!
//! Unique responsibility: turn what the caller supplied (maybe nothing) into the
//! canonical options of one call. Resolution is pure: no I/O, no globals.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::libpod_operation::PodOperation;

/// Options of a single call: query parameters, optional JSON body and an
/// optional cancellation token.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Query parameters. Strings are sent raw, other values as JSON text.
    pub query: BTreeMap<String, Value>,
    /// JSON request body.
    pub body: Option<Value>,
    /// Cancels the call (and its stream, if any) when fired.
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the JSON request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// True when no parameter, body or token is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.body.is_none() && self.cancel.is_none()
    }

    /// Merge these options over `defaults`: keys set here win, other default
    /// keys are kept.
    #[must_use]
    pub fn merged_over(self, defaults: &Self) -> Self {
        let mut query = defaults.query.clone();
        query.extend(self.query);
        Self {
            query,
            body: self.body.or_else(|| defaults.body.clone()),
            cancel: self.cancel.or_else(|| defaults.cancel.clone()),
        }
    }

    /// Query parameters encoded as string pairs. `null` values are skipped.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .filter_map(|(key, value)| {
                let encoded = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), encoded))
            })
            .collect()
    }
}

/// Default options for each operation, owned by the client and its pods.
#[derive(Debug, Clone, Default)]
pub struct OperationDefaults {
    per_operation: HashMap<PodOperation, CallOptions>,
}

impl OperationDefaults {
    /// Defaults with every operation empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the defaults of one operation.
    #[must_use]
    pub fn with(mut self, operation: PodOperation, options: CallOptions) -> Self {
        self.per_operation.insert(operation, options);
        self
    }

    /// Defaults of one operation, if any were set.
    #[must_use]
    pub fn get(&self, operation: PodOperation) -> Option<&CallOptions> {
        self.per_operation.get(&operation)
    }

    /// Resolve what a caller supplied for `operation` into the call's options.
    #[must_use]
    pub fn resolve(&self, operation: PodOperation, supplied: Option<CallOptions>) -> CallOptions {
        resolve_options(self.get(operation), supplied)
    }
}

/// Canonical options of a call.
///
/// - nothing supplied: the operation's defaults (empty unless configured),
/// - options supplied: merged over the defaults, not replacing them.
#[must_use]
pub fn resolve_options(defaults: Option<&CallOptions>, supplied: Option<CallOptions>) -> CallOptions {
    match (defaults, supplied) {
        (None, None) => CallOptions::default(),
        (Some(defaults), None) => defaults.clone(),
        (None, Some(supplied)) => supplied,
        (Some(defaults), Some(supplied)) => supplied.merged_over(defaults),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nothing_supplied_yields_empty_options() {
        let options = resolve_options(None, None);
        assert!(options.is_empty());
    }

    #[test]
    fn test_supplied_options_merge_over_defaults() {
        let defaults = CallOptions::new().with_query("t", 10).with_query("force", false);
        let supplied = CallOptions::new().with_query("force", true);

        let options = resolve_options(Some(&defaults), Some(supplied));
        assert_eq!(options.query.get("t"), Some(&json!(10)));
        assert_eq!(options.query.get("force"), Some(&json!(true)));
    }

    #[test]
    fn test_supplied_body_and_token_win() {
        let default_token = CancellationToken::new();
        let defaults = CallOptions::new()
            .with_body(json!({"a": 1}))
            .with_cancel(default_token.clone());
        let own_token = CancellationToken::new();
        let supplied = CallOptions::new()
            .with_body(json!({"b": 2}))
            .with_cancel(own_token.clone());

        let options = supplied.merged_over(&defaults);
        assert_eq!(options.body, Some(json!({"b": 2})));

        own_token.cancel();
        assert!(options.cancel.is_some_and(|t| t.is_cancelled()));
        assert!(!default_token.is_cancelled());
    }

    #[test]
    fn test_defaults_kept_when_nothing_overrides() {
        let defaults = CallOptions::new().with_body(json!({"signal": "SIGKILL"}));
        let options = CallOptions::new().merged_over(&defaults);
        assert_eq!(options.body, Some(json!({"signal": "SIGKILL"})));
    }

    #[test]
    fn test_query_pairs_encoding() {
        let options = CallOptions::new()
            .with_query("signal", "SIGTERM")
            .with_query("t", 5)
            .with_query("force", true)
            .with_query("skipped", Value::Null)
            .with_query("filters", json!({"name": ["web"]}));

        assert_eq!(
            options.query_pairs(),
            vec![
                ("filters".to_string(), r#"{"name":["web"]}"#.to_string()),
                ("force".to_string(), "true".to_string()),
                ("signal".to_string(), "SIGTERM".to_string()),
                ("t".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_operation_defaults_are_per_operation() {
        let defaults = OperationDefaults::new()
            .with(PodOperation::Stop, CallOptions::new().with_query("t", 3));

        let stop = defaults.resolve(PodOperation::Stop, None);
        assert_eq!(stop.query.get("t"), Some(&json!(3)));

        let start = defaults.resolve(PodOperation::Start, None);
        assert!(start.is_empty());
    }
}
