//! HTTP request and response types
//!
//! Request descriptors, URL resolution, charset handling and the response
//! wrapper.

pub mod encoding;
pub mod into_url;
pub mod request;
pub mod response;
pub mod url;

pub use self::encoding::{Charset, RawEncoding, resolve_charset};
pub use self::into_url::IntoUrl;
pub use self::request::{BodyStream, ByteStream, RequestBody, RequestOptions};
pub use self::response::Response;
pub use self::url::Params;
