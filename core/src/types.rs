//! Data shapes exchanged with the remote API.
//!
//! # Design
//! Outgoing data is a flat JSON object (`Params`). Absent values are
//! `Value::Null`, which is also what a serialized `Option::None` becomes, so
//! callers can build params from their own structs and let `purify` drop the
//! unset fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ErrorKind, RequestError};

/// Key-value request data, sent as query parameters or as a body.
pub type Params = Map<String, Value>;

/// Serialize any struct or map into `Params`.
///
/// Values that do not serialize to a JSON object are rejected.
pub fn params<T: Serialize + ?Sized>(value: &T) -> Result<Params, RequestError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RequestError::new(
            ErrorKind::Encode,
            format!("request data must be an object, got {other}"),
        )),
        Err(e) => Err(RequestError::new(ErrorKind::Encode, e.to_string())),
    }
}

/// Deserialize an unwrapped payload into `R`.
pub fn decode<R: DeserializeOwned>(value: Value) -> Result<R, RequestError> {
    serde_json::from_value(value).map_err(|e| RequestError::new(ErrorKind::Decode, e.to_string()))
}

/// Copy of `data` without the entries whose value is null.
///
/// Empty strings, zero and `false` are kept.
pub fn purify(data: &Params) -> Params {
    data.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Outer structure of every response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl ResponseEnvelope {
    pub const OK: &'static str = "OK";

    pub fn is_ok(&self) -> bool {
        self.status == Self::OK
    }
}
