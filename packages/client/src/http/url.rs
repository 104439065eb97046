//! URL resolution and query parameter handling

use serde::Serialize;
use url::Url;

use crate::error;

/// Query parameters attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// Ordered key/value pairs, percent-encoded and appended one by one.
    /// Repeated keys stay repeated.
    Pairs(Vec<(String, String)>),
    /// A pre-encoded query string appended as is.
    ///
    /// Characters that may not appear in a query (spaces, `<`, `>`, `#`,
    /// non-ASCII, ...) are percent-encoded on the way in; everything else,
    /// including existing escapes, `&` and `=`, is kept byte for byte.
    Raw(String),
}

impl Params {
    /// Build pair parameters from any iterator of key/value pairs.
    pub fn pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Params::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }

    /// Build raw parameters from an already encoded query string.
    pub fn raw<S: Into<String>>(query: S) -> Self {
        Params::Raw(query.into())
    }

    /// Flatten a serializable struct or map into pair parameters.
    ///
    /// Only flat key/value shapes are supported, as for
    /// `application/x-www-form-urlencoded` bodies.
    ///
    /// # Errors
    ///
    /// Returns a builder error if `value` has nested structure.
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> crate::Result<Self> {
        let encoded = serde_urlencoded::to_string(value).map_err(error::builder)?;
        Ok(Params::Pairs(
            url::form_urlencoded::parse(encoded.as_bytes())
                .into_owned()
                .collect(),
        ))
    }

    /// Append a single pair, turning raw parameters into `raw&key=value`.
    #[must_use]
    pub fn append<K: Into<String>, V: ToString>(self, key: K, value: V) -> Self {
        match self {
            Params::Pairs(mut pairs) => {
                pairs.push((key.into(), value.to_string()));
                Params::Pairs(pairs)
            }
            Params::Raw(raw) => {
                let pair = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair(&key.into(), &value.to_string())
                    .finish();
                if raw.is_empty() {
                    Params::Raw(pair)
                } else {
                    Params::Raw(format!("{raw}&{pair}"))
                }
            }
        }
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params::pairs(iter)
    }
}

impl From<&str> for Params {
    fn from(query: &str) -> Self {
        Params::Raw(query.to_owned())
    }
}

impl From<String> for Params {
    fn from(query: String) -> Self {
        Params::Raw(query)
    }
}

/// Resolve `url` against an optional base.
///
/// A relative `url` is joined onto `base` by standard URL resolution; an
/// absolute `url` ignores `base` entirely.
///
/// # Errors
///
/// Returns a builder error if `url` is relative without a base, or if the
/// result cannot be parsed.
pub fn resolve_url(url: &str, base: Option<&Url>) -> crate::Result<Url> {
    let resolved = match base {
        Some(base) => base.join(url),
        None => Url::parse(url),
    };
    resolved.map_err(|e| error::builder(format!("invalid request url {url:?}: {e}")))
}

/// Append query parameters to a resolved URL.
pub fn apply_params(mut url: Url, params: Option<&Params>) -> Url {
    match params {
        Some(Params::Pairs(pairs)) if !pairs.is_empty() => {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
            drop(query);
        }
        Some(Params::Raw(raw)) if !raw.is_empty() => {
            let query = match url.query() {
                Some(existing) => format!("{existing}&{raw}"),
                None => raw.clone(),
            };
            url.set_query(Some(&query));
        }
        _ => {}
    }
    url
}

/// Check if URL uses the secure scheme
#[inline]
#[must_use]
pub fn is_secure_scheme(url: &Url) -> bool {
    url.scheme() == "https"
}

/// Extract port from URL with default fallback
#[inline]
#[must_use]
pub fn extract_port(url: &Url) -> u16 {
    url.port_or_known_default()
        .unwrap_or(if is_secure_scheme(url) { 443 } else { 80 })
}
