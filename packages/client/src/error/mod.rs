mod classification;
mod constructors;
mod helpers;
mod types;

pub(crate) use constructors::*;
pub use helpers::{BadScheme, BodyConsumed, MalformedCharset, TimedOut, UnknownCharset};
pub use types::{BoxError, Error, Result};
