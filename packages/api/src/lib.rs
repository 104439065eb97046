//! # wxhttp
//!
//! Calls to JSON APIs that answer with an `errcode`/`errmsg` envelope, built
//! on [`wxhttp_client`].
//!
//! ```no_run
//! use wxhttp::{ApiClient, ApiOptions};
//!
//! # async fn run() -> Result<(), wxhttp::ApiError> {
//! let api = ApiClient::default();
//! let token = api
//!     .call(
//!         ApiOptions::get("/cgi-bin/token")
//!             .query("grant_type", "client_credential")
//!             .query("appid", "wx0000000000000000")
//!             .query("secret", "secret"),
//!     )
//!     .await?;
//! println!("{:?}", token.data.get("access_token"));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod client;
pub mod error;
pub mod options;
pub mod types;

pub use client::{ApiClient, WECHAT_API_BASE, raw, request};
pub use error::ApiError;
pub use options::ApiOptions;
pub use types::{ApiFailure, ApiResult, Expirable};

// Re-export important types from client package
pub use wxhttp_client::{Form, HttpClient, HttpConfig, Part, Response};
