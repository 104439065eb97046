//! API result envelope

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The common result envelope: `errcode`, `errmsg`, and endpoint fields.
///
/// Endpoint-specific fields are flattened into `T`. With the default `T`
/// every extra field lands in a JSON map, so any object deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T = Map<String, Value>> {
    #[serde(default, deserialize_with = "lenient_errcode")]
    pub errcode: i64,
    #[serde(default, deserialize_with = "lenient_errmsg")]
    pub errmsg: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResult<T> {
    /// Returns true if the envelope reports success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errcode == 0
    }
}

/// Fields shared by results that expire, such as access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expirable {
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// A domain failure: the API answered with a non-zero `errcode`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("api error {errcode}: {errmsg}")]
pub struct ApiFailure {
    pub errcode: i64,
    pub errmsg: String,
    /// The complete response object
    pub result: Value,
}

impl ApiFailure {
    /// Classify a parsed response.
    ///
    /// Returns `Some` when the value is an object whose `errcode` is truthy:
    /// a non-zero number, `true`, a non-empty string, or any array or object.
    #[must_use]
    pub fn from_result(result: &Value) -> Option<Self> {
        let errcode = result.as_object()?.get("errcode")?;
        if !is_truthy(errcode) {
            return None;
        }
        Some(Self {
            errcode: errcode_number(errcode),
            errmsg: result
                .get("errmsg")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            result: result.clone(),
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// -1 marks a truthy errcode that carries no usable number
#[allow(clippy::cast_possible_truncation)]
fn errcode_number(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(-1),
        Value::Bool(true) => 1,
        Value::String(s) => s.trim().parse().unwrap_or(-1),
        _ => -1,
    }
}

/// Falsy values read as 0; truthy ones as their numeric code or -1.
fn lenient_errcode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(if is_truthy(&value) { errcode_number(&value) } else { 0 })
}

fn lenient_errmsg<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
