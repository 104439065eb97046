//! Request execution
//!
//! One call is one exchange: resolve the URL, dial, send the head and body,
//! and hand back a [`Response`] as soon as the response head arrives. Body
//! draining is left to the caller.

use std::future::Future;

use bytes::Bytes;
use futures::channel::{mpsc, oneshot};
use futures::{SinkExt, future};
use http::header::{HOST, USER_AGENT};
use http::{HeaderMap, HeaderValue, Request};
use http_body::Frame;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Incoming;
use url::{Position, Url};

use super::core::HttpClient;
use crate::connect::{self, OutgoingBody};
use crate::error::{self, BoxError};
use crate::http::{BodyStream, RequestBody, RequestOptions, Response};
use crate::stream::copy_to;

/// Frame sent in place of the remaining body when the source stream fails.
#[derive(Debug, thiserror::Error)]
#[error("request body stream failed")]
struct BodyAborted;

/// Error half of a piped request body.
type BodyFailure = oneshot::Receiver<crate::Error>;

impl HttpClient {
    /// Execute one request and resolve once the response head has arrived.
    ///
    /// # Errors
    ///
    /// - builder errors for invalid URLs, headers or body encodings
    /// - connect errors when the origin cannot be reached or TLS fails
    /// - timeout errors when the configured deadline elapses first
    /// - body errors when a streamed body fails before the response arrives
    /// - request errors for any other protocol failure
    pub async fn execute(&self, mut options: RequestOptions) -> crate::Result<Response> {
        if let Some(err) = options.error.take() {
            return Err(err);
        }
        let url = options.resolve_url()?;
        let timeout = options.timeout.or(self.config.timeout);

        let exchange = self.exchange(options, url.clone());
        match timeout {
            Some(duration) => with_timeout(duration, exchange)
                .await
                .map_err(|e| e.with_url(url)),
            None => exchange.await.map_err(|e| e.with_url(url)),
        }
    }

    async fn exchange(&self, options: RequestOptions, url: Url) -> crate::Result<Response> {
        let RequestOptions {
            body,
            method,
            headers,
            tls,
            ..
        } = options;

        let mut headers = self.merge_default_headers(headers);
        let (body, failure) = match body {
            None => (empty_body(), None),
            Some(RequestBody::Bytes(bytes)) => (full_body(bytes), None),
            Some(RequestBody::Text { text, encoding }) => {
                (full_body(Bytes::from(encoding.encode(&text)?)), None)
            }
            Some(RequestBody::Stream(stream)) => {
                let (stream_headers, body, failure) = pipe_body(stream);
                headers.extend(stream_headers);
                (body, Some(failure))
            }
        };
        self.fill_required_headers(&mut headers, &url)?;

        let mut request = Request::builder()
            .method(method)
            .uri(origin_form(&url)?)
            .body(body)
            .map_err(error::builder)?;
        *request.headers_mut() = headers;

        tracing::debug!(method = %request.method(), url = %url, "issuing request");

        let tls_config = || self.tls_config(tls.as_ref());
        let mut sender = connect::connect(&url, self.config.connect_timeout, tls_config).await?;
        let send = sender.send_request(request);
        let res = dispatch(send, failure).await?;

        tracing::debug!(status = %res.status(), url = %url, "response headers received");
        Ok(Response::from_hyper(res, url))
    }

    /// Request headers win; defaults fill in names the request does not set.
    fn merge_default_headers(&self, mut headers: HeaderMap) -> HeaderMap {
        let defaults = &self.config.default_headers;
        for name in defaults.keys() {
            if headers.contains_key(name) {
                continue;
            }
            for value in defaults.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        headers
    }

    fn fill_required_headers(&self, headers: &mut HeaderMap, url: &Url) -> crate::Result<()> {
        if !headers.contains_key(HOST) {
            let host = url.host_str().ok_or_else(|| error::url_bad_scheme(url.clone()))?;
            let host = match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_owned(),
            };
            headers.insert(HOST, HeaderValue::from_str(&host).map_err(error::builder)?);
        }
        if !headers.contains_key(USER_AGENT) {
            let user_agent =
                HeaderValue::from_str(&self.config.user_agent).map_err(error::builder)?;
            headers.insert(USER_AGENT, user_agent);
        }
        Ok(())
    }
}

/// Execute a request with the global client.
///
/// # Errors
///
/// See [`HttpClient::execute`].
pub async fn request(options: RequestOptions) -> crate::Result<Response> {
    super::global_client().execute(options).await
}

async fn with_timeout<F, T>(duration: std::time::Duration, fut: F) -> crate::Result<T>
where
    F: Future<Output = crate::Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(error::timeout()),
    }
}

/// Wait for the response head, failing early if a piped body breaks first.
async fn dispatch<F>(send: F, failure: Option<BodyFailure>) -> crate::Result<http::Response<Incoming>>
where
    F: Future<Output = hyper::Result<http::Response<Incoming>>>,
{
    let Some(mut failure) = failure else {
        return send.await.map_err(error::request);
    };

    tokio::pin!(send);
    tokio::select! {
        res = &mut send => match res {
            Ok(res) => Ok(res),
            // the pump reports before it aborts the body, so a stream failure is already here
            Err(e) => match failure.try_recv() {
                Ok(Some(body_err)) => Err(body_err),
                _ => Err(error::request(e)),
            },
        },
        Ok(body_err) = &mut failure => Err(body_err),
    }
}

fn origin_form(url: &Url) -> crate::Result<http::Uri> {
    url[Position::BeforePath..Position::AfterQuery]
        .parse()
        .map_err(error::builder)
}

fn empty_body() -> OutgoingBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync()
}

fn full_body(bytes: Bytes) -> OutgoingBody {
    Full::new(bytes).map_err(|never| match never {}).boxed_unsync()
}

/// Pipe a body stream into the request on its own task.
///
/// The body ends only after the copy succeeds. On failure the error is
/// reported through the returned receiver, then the body is aborted so the
/// request is never finalized.
fn pipe_body(stream: BodyStream) -> (HeaderMap, OutgoingBody, BodyFailure) {
    let (headers, source) = stream.into_parts();
    let (mut tx, rx) = mpsc::channel::<Result<Frame<Bytes>, BoxError>>(8);
    let (failure_tx, failure_rx) = oneshot::channel();

    tokio::spawn(async move {
        let copied = {
            let mut sink = (&mut tx)
                .with(|chunk: Bytes| future::ready(Ok::<_, mpsc::SendError>(Ok(Frame::data(chunk)))));
            copy_to(source, &mut sink).await
        };
        match copied {
            Ok(bytes) => tracing::trace!(bytes, "request body piped"),
            Err(e) => {
                tracing::debug!("request body stream failed: {e}");
                let _ = failure_tx.send(e);
                let _ = tx.send(Err(Box::new(BodyAborted) as BoxError)).await;
            }
        }
    });

    let body = StreamBody::new(rx).boxed_unsync();
    (headers, body, failure_rx)
}
