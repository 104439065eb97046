//! # wxhttp client
//!
//! A single-shot HTTP/1.1 client: every call dials a fresh connection, sends
//! one request and hands back a [`Response`] as soon as the response head
//! arrives.
//!
//! ## Features
//!
//! - **Flexible request bodies**: bytes, text in an explicit encoding, byte
//!   streams, and streaming multipart forms
//! - **Charset-aware decoding** of response bodies via `encoding_rs`
//! - **Single-use bodies**: a response body is read once as a buffer, text,
//!   JSON or raw stream
//! - **Rustls TLS** with bundled or native root certificates
//!
//! ## Usage
//!
//! ```no_run
//! use wxhttp_client::{RequestOptions, request};
//!
//! # async fn run() -> wxhttp_client::Result<()> {
//! let mut res = request(
//!     RequestOptions::get("/ping").base_url("http://127.0.0.1:8080"),
//! )
//! .await?;
//! assert_eq!(res.read_as_string(None).await?, "pong");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod connect;
pub mod error;
pub mod http;
pub mod multipart;
pub mod stream;

// Prelude with canonical types
pub mod prelude;

pub use crate::prelude::*;
