use url::Url;

use crate::error;

/// A trait to try to convert some type into a `Url` usable as a request base.
///
/// This trait is "sealed", such that only types within this crate can
/// implement it.
pub trait IntoUrl: IntoUrlSealed {}

impl IntoUrl for Url {}
impl IntoUrl for String {}
impl IntoUrl for &str {}
impl IntoUrl for &String {}

pub trait IntoUrlSealed {
    /// Besides parsing as a valid `Url`, the `Url` must have a host, in that
    /// it makes sense to use in a network request.
    ///
    /// # Errors
    ///
    /// Returns a builder error if the string is malformed or the URL has no host.
    fn into_url(self) -> crate::Result<Url>;
}

impl IntoUrlSealed for Url {
    fn into_url(self) -> crate::Result<Url> {
        if self.has_host() {
            Ok(self)
        } else {
            Err(error::url_bad_scheme(self))
        }
    }
}

impl IntoUrlSealed for &str {
    fn into_url(self) -> crate::Result<Url> {
        Url::parse(self).map_err(error::builder)?.into_url()
    }
}

impl IntoUrlSealed for &String {
    fn into_url(self) -> crate::Result<Url> {
        (&**self).into_url()
    }
}

impl IntoUrlSealed for String {
    fn into_url(self) -> crate::Result<Url> {
        (&*self).into_url()
    }
}
