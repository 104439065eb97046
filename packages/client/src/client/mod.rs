//! HTTP client and request execution
//!
//! [`HttpClient`] carries configuration; [`execute`](HttpClient::execute)
//! performs one exchange per call.

pub mod core;
mod execute;

pub use core::{HttpClient, global_client, init_global_client};
pub use execute::request;
