//! Response body decoding.
//!
//! Buffered operations collect the whole body and decode it into a JSON value.
//! Streaming operations hand out a [`PodStream`] instead, a lazy chunk sequence
//! that can be re-framed into newline-delimited JSON events.

use std::{
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, stream::BoxStream};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{libpod_error::LibpodError, libpod_transport::BodyStream};

/// Read a body stream to the end.
///
/// # Errors
///
/// Returns the first error reported by the stream.
pub async fn collect_body(mut body: BodyStream) -> Result<Bytes, LibpodError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

/// Decode a buffered success body.
///
/// Empty bodies decode to `null`. Bodies declared as JSON must parse; other
/// bodies are parsed when they happen to be JSON and kept as text otherwise.
///
/// # Errors
///
/// Returns [`LibpodError::Decode`] when a JSON body is malformed.
pub fn decode_payload(
    status: u16,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Value, LibpodError> {
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if is_json(content_type) {
        return serde_json::from_slice(trimmed).map_err(|source| LibpodError::Decode { status, source });
    }
    Ok(serde_json::from_slice(trimmed)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())))
}

/// Server-side message of an error body: the `message` field of a JSON body,
/// or the trimmed text of a non-JSON one.
#[must_use]
pub fn error_message(body: &[u8]) -> Option<String> {
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(trimmed) {
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned),
        Ok(Value::String(text)) => Some(text),
        Ok(_) => None,
        Err(_) => Some(String::from_utf8_lossy(trimmed).into_owned()),
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let mime = ct.split(';').next().unwrap_or_default().trim();
        mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
    })
}

/// Wrap a body so that firing `token` ends it with one [`LibpodError::Cancelled`].
#[must_use]
pub fn cancellable(body: BodyStream, token: CancellationToken) -> BodyStream {
    futures::stream::unfold(Some((body, token)), |state| async move {
        let Some((mut body, token)) = state else {
            return None;
        };
        tokio::select! {
            biased;
            () = token.cancelled() => {
                tracing::debug!("stream cancelled");
                Some((Err(LibpodError::Cancelled), None))
            }
            item = body.next() => item.map(|item| (item, Some((body, token)))),
        }
    })
    .boxed()
}

/// Live response body of a streaming operation.
///
/// Chunks are produced lazily as they arrive and the sequence ends when the
/// connection closes. Dropping the stream releases the connection.
pub struct PodStream {
    status: u16,
    body: BodyStream,
}

impl PodStream {
    /// Wrap a response body.
    #[must_use]
    pub fn new(status: u16, body: BodyStream) -> Self {
        Self { status, body }
    }

    /// Status code of the response that opened the stream.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Re-frame the chunks into newline-delimited JSON values.
    ///
    /// Blank lines are skipped and a trailing line without newline is still decoded.
    #[must_use]
    pub fn json_lines(self) -> BoxStream<'static, Result<Value, LibpodError>> {
        self.decode_lines()
    }

    /// Re-frame the chunks into newline-delimited JSON documents of type `T`.
    #[must_use]
    pub fn decode_lines<T>(self) -> BoxStream<'static, Result<T, LibpodError>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let state = LineState {
            status: self.status,
            body: self.body,
            buf: BytesMut::new(),
            done: false,
        };
        futures::stream::unfold(state, |mut st| async move {
            let Some(line) = st.next_line().await else {
                return None;
            };
            let status = st.status;
            let item = line.and_then(|line| {
                serde_json::from_slice::<T>(&line).map_err(|source| LibpodError::Decode { status, source })
            });
            Some((item, st))
        })
        .boxed()
    }
}

impl Stream for PodStream {
    type Item = Result<Bytes, LibpodError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().body.poll_next_unpin(cx)
    }
}

impl fmt::Debug for PodStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodStream")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

struct LineState {
    status: u16,
    body: BodyStream,
    buf: BytesMut,
    done: bool,
}

impl LineState {
    /// Next non-blank line, an error from the body, or `None` at the end.
    async fn next_line(&mut self) -> Option<Result<Bytes, LibpodError>> {
        loop {
            if let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
                let line = self.buf.split_to(pos + 1);
                let text = line.trim_ascii();
                if text.is_empty() {
                    continue;
                }
                return Some(Ok(Bytes::copy_from_slice(text)));
            }

            if self.done {
                let rest = self.buf.split();
                let text = rest.trim_ascii();
                if text.is_empty() {
                    return None;
                }
                return Some(Ok(Bytes::copy_from_slice(text)));
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    self.done = true;
                    self.buf.clear();
                    return Some(Err(err));
                }
                None => self.done = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use serde_json::json;

    fn chunks(parts: &[&'static str]) -> BodyStream {
        let items: Vec<Result<Bytes, LibpodError>> =
            parts.iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))).collect();
        futures::stream::iter(items).boxed()
    }

    #[test]
    fn test_empty_body_decodes_to_null() {
        assert_eq!(decode_payload(204, None, b"").unwrap(), Value::Null);
        assert_eq!(decode_payload(200, Some("application/json"), b" \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_json_body_decodes() {
        let value = decode_payload(200, Some("application/json; charset=utf-8"), br#"{"Id":"abc"}"#).unwrap();
        assert_eq!(value, json!({"Id": "abc"}));
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let err = decode_payload(200, Some("application/json"), b"{bad").unwrap_err();
        assert!(matches!(err, LibpodError::Decode { status: 200, .. }));
    }

    #[test]
    fn test_untyped_body_falls_back_to_text() {
        assert_eq!(decode_payload(200, None, b"[1,2]").unwrap(), json!([1, 2]));
        assert_eq!(
            decode_payload(200, Some("text/plain"), b"OK").unwrap(),
            Value::String("OK".to_string())
        );
    }

    #[test]
    fn test_error_message_extraction() {
        let body = br#"{"cause":"no such pod","message":"no pod with name or ID web found","response":404}"#;
        assert_eq!(error_message(body).as_deref(), Some("no pod with name or ID web found"));
        assert_eq!(error_message(b"").as_deref(), None);
        assert_eq!(error_message(b"{}").as_deref(), None);
        assert_eq!(error_message(b"boom\n").as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_collect_body_concatenates_chunks() {
        let bytes = collect_body(chunks(&["ab", "cd", "e"])).await.unwrap();
        assert_eq!(&bytes[..], b"abcde");
    }

    #[tokio::test]
    async fn test_json_lines_reframe_split_chunks() {
        let stream = PodStream::new(200, chunks(&["{\"a\":", "1}\n\n{\"a\"", ":2}\n{\"a\":3}"]));
        let values: Vec<Value> = stream.json_lines().try_collect().await.unwrap();
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 3})]);
    }

    #[tokio::test]
    async fn test_json_lines_reports_bad_line_and_continues() {
        let stream = PodStream::new(200, chunks(&["nope\n", "{\"a\":1}\n"]));
        let items: Vec<Result<Value, LibpodError>> = stream.json_lines().collect().await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Err(LibpodError::Decode { status: 200, .. })));
        assert_eq!(items[1].as_ref().ok(), Some(&json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_pod_stream_yields_raw_chunks() {
        let stream = PodStream::new(200, chunks(&["x", "y"]));
        assert_eq!(stream.status(), 200);
        let raw: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert_eq!(raw, vec![Bytes::from_static(b"x"), Bytes::from_static(b"y")]);
    }

    #[tokio::test]
    async fn test_cancellable_ends_with_cancelled() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<Result<Bytes, LibpodError>>();
        let token = CancellationToken::new();
        let mut body = cancellable(rx.boxed(), token.clone());

        tx.unbounded_send(Ok(Bytes::from_static(b"first"))).unwrap();
        assert_eq!(body.next().await.unwrap().unwrap(), Bytes::from_static(b"first"));

        token.cancel();
        assert!(matches!(body.next().await, Some(Err(LibpodError::Cancelled))));
        assert!(body.next().await.is_none());
    }
}
