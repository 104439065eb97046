//! multipart/form-data
//!
//! A [`Form`] is a streaming request body that knows its own headers: the
//! boundary `content-type` and, when every part has a known size, the
//! `content-length`. Those headers are merged onto the request before the
//! first body byte is written.

mod form;
mod part;
mod types;

pub use types::{Form, Part};
