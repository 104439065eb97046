//! Byte stream draining and piping
//!
//! Every helper works on a fallible stream of [`Bytes`] chunks, so response
//! bodies, multipart forms and caller-supplied streams share one code path.
//! Streams are pulled, never pushed: nothing is read before the helper polls,
//! and after the first error no further chunk is polled.

use std::pin::pin;

use bytes::{Bytes, BytesMut};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::error::{self, BoxError};
use crate::http::encoding::RawEncoding;

/// Pipe every chunk of `source` into `destination`.
///
/// Resolves with the number of bytes copied once `source` ends. The
/// destination is flushed but left open; finalizing it is up to the caller.
///
/// # Errors
///
/// Returns a body error carrying the first failure of either side.
pub async fn copy_to<S, E, K>(source: S, destination: &mut K) -> crate::Result<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
    K: Sink<Bytes> + Unpin,
    K::Error: Into<BoxError>,
{
    let mut source = pin!(source);
    let mut copied: u64 = 0;

    while let Some(chunk) = source.next().await {
        let chunk = chunk.map_err(error::body)?;
        copied += chunk.len() as u64;
        destination.feed(chunk).await.map_err(error::body)?;
    }

    destination.flush().await.map_err(error::body)?;
    tracing::trace!(copied, "stream copy finished");
    Ok(copied)
}

/// Collect `source` into one contiguous buffer, chunks in arrival order.
///
/// # Errors
///
/// Returns a body error if the stream fails; partial data is dropped.
pub async fn read_as_buffer<S, E>(source: S) -> crate::Result<Bytes>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let mut source = pin!(source);

    let Some(first) = source.next().await else {
        return Ok(Bytes::new());
    };
    let first = first.map_err(error::body)?;

    // single-chunk bodies are handed back without copying
    let Some(second) = source.next().await else {
        return Ok(first);
    };
    let second = second.map_err(error::body)?;

    let mut buffer = BytesMut::with_capacity(first.len() + second.len());
    buffer.extend_from_slice(&first);
    buffer.extend_from_slice(&second);

    while let Some(chunk) = source.next().await {
        buffer.extend_from_slice(&chunk.map_err(error::body)?);
    }

    Ok(buffer.freeze())
}

/// Collect `source` and decode it with a raw encoding (UTF-8 by default).
///
/// # Errors
///
/// Returns a body error if the stream fails.
pub async fn read_as_string<S, E>(source: S, encoding: Option<RawEncoding>) -> crate::Result<String>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let buffer = read_as_buffer(source).await?;
    Ok(encoding.unwrap_or_default().decode(&buffer))
}

/// Collect `source`, decode it and parse the text as JSON.
///
/// # Errors
///
/// Returns a body error if the stream fails, or a decode error if the text
/// is not valid JSON for `T`.
pub async fn read_as_json<T, S, E>(source: S, encoding: Option<RawEncoding>) -> crate::Result<T>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let text = read_as_string(source, encoding).await?;
    serde_json::from_str(&text).map_err(error::decode)
}

#[cfg(test)]
mod tests {
    use std::io;

    use futures::stream;

    use super::*;

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes, io::Error>> + use<> {
        let items: Vec<Result<Bytes, io::Error>> =
            parts.iter().map(|p| Ok(Bytes::from_static(p))).collect();
        stream::iter(items)
    }

    fn failing_after(part: &'static [u8]) -> impl Stream<Item = Result<Bytes, io::Error>> {
        stream::iter(vec![
            Ok(Bytes::from_static(part)),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away")),
            Ok(Bytes::from_static(b"never seen")),
        ])
    }

    #[tokio::test]
    async fn test_read_as_buffer_concatenates_in_order() {
        let buffer = read_as_buffer(chunks(&[b"ab", b"", b"cd", b"e"])).await.expect("read");
        assert_eq!(&buffer[..], b"abcde");
    }

    #[tokio::test]
    async fn test_read_as_buffer_empty_stream() {
        let buffer = read_as_buffer(chunks(&[])).await.expect("read");
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_read_as_buffer_propagates_error() {
        let err = read_as_buffer(failing_after(b"partial")).await.expect_err("stream fails");
        assert!(err.is_body());
    }

    #[tokio::test]
    async fn test_read_as_string_with_encoding() {
        let text = read_as_string(chunks(&[b"\x00\xff"]), Some(RawEncoding::Hex)).await.expect("read");
        assert_eq!(text, "00ff");

        let text = read_as_string(chunks(&[b"po", b"ng"]), None).await.expect("read");
        assert_eq!(text, "pong");
    }

    #[tokio::test]
    async fn test_read_as_json() {
        let value: serde_json::Value = read_as_json(chunks(&[b"{\"a\":", b"[1,2]}"]), None)
            .await
            .expect("json");
        assert_eq!(value, serde_json::json!({ "a": [1, 2] }));

        let err = read_as_json::<serde_json::Value, _, _>(chunks(&[b"{\"a\":"]), None)
            .await
            .expect_err("truncated json");
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_copy_to_leaves_destination_open() {
        let (mut tx, rx) = futures::channel::mpsc::channel::<Bytes>(4);
        let copied = copy_to(chunks(&[b"hello ", b"world"]), &mut tx).await.expect("copy");
        assert_eq!(copied, 11);
        assert!(!tx.is_closed());

        tx.close_channel();
        let received: Vec<Bytes> = rx.collect().await;
        assert_eq!(received.concat(), b"hello world");
    }

    #[tokio::test]
    async fn test_copy_to_source_error_wins() {
        let mut sink: Vec<Bytes> = Vec::new();
        let err = copy_to(failing_after(b"first"), &mut sink).await.expect_err("source fails");
        assert!(err.is_body());
        assert_eq!(sink, vec![Bytes::from_static(b"first")]);
    }

    #[tokio::test]
    async fn test_copy_to_sink_error() {
        let (mut tx, rx) = futures::channel::mpsc::channel::<Bytes>(1);
        drop(rx);
        let err = copy_to(chunks(&[b"x"]), &mut tx).await.expect_err("sink closed");
        assert!(err.is_body());
    }
}
