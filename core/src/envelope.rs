//! Response envelope unwrapping and failure normalization.
//!
//! # Design
//! A successful round-trip still has to pass the envelope check: only an
//! envelope with status `"OK"` yields data. Everything else, including
//! transport failures, is funnelled through `normalize` so callers see one
//! error shape.

use std::sync::Arc;

use log::warn;
use serde_json::Value;

use crate::error::{ErrorKind, RequestError, TransportError};
use crate::http::HttpResponse;
use crate::types::ResponseEnvelope;

/// Response hook that turns a successful transport response into data.
pub type Unwrapper = Arc<dyn Fn(&HttpResponse) -> Result<Value, RequestError> + Send + Sync>;

/// The default response hook: accept `"OK"` envelopes, reject the rest.
pub fn unwrap_response(response: &HttpResponse) -> Result<Value, RequestError> {
    let envelope = decode_envelope(response)?;
    unwrap_envelope(envelope)
}

pub fn unwrap_envelope(envelope: ResponseEnvelope) -> Result<Value, RequestError> {
    if envelope.is_ok() {
        return Ok(envelope.data);
    }
    let message = envelope.message.unwrap_or_default();
    Err(RequestError::new(ErrorKind::Envelope, message)
        .with_status(envelope.status)
        .with_data(envelope.data))
}

fn decode_envelope(response: &HttpResponse) -> Result<ResponseEnvelope, RequestError> {
    serde_json::from_str(&response.body).map_err(|e| {
        RequestError::new(ErrorKind::Decode, format!("malformed response envelope: {e}"))
            .with_status(response.status_text())
            .with_data(Value::String(response.body.clone()))
    })
}

/// Anything that can go wrong between sending the request and holding data.
#[derive(Debug, Clone)]
pub enum Failure {
    /// No usable response arrived.
    Transport(TransportError),
    /// A response arrived with a status outside 2xx.
    Status(HttpResponse),
    /// The response hook rejected a successful response.
    Unwrapped(RequestError),
}

/// Reduce any `Failure` to a `RequestError`.
///
/// Errors already produced by a response hook pass through. A failed
/// response whose body is an envelope with a status is unwrapped so the
/// envelope's own message and status win; an `"OK"` envelope inside a failed
/// response is still reported as a transport error.
pub fn normalize(failure: Failure) -> RequestError {
    let error = match failure {
        Failure::Unwrapped(error) => error,
        Failure::Transport(error) => {
            let kind = if error.is_cancelled() {
                ErrorKind::SessionLost
            } else {
                ErrorKind::Transport
            };
            RequestError::new(kind, error.message)
        }
        Failure::Status(response) => normalize_status(response),
    };
    warn!("request failed: {:?} {}", error.kind, error.message);
    error
}

fn normalize_status(response: HttpResponse) -> RequestError {
    let message = format!("Request failed with status code {}", response.status);
    if let Ok(envelope) = serde_json::from_str::<ResponseEnvelope>(&response.body) {
        if !envelope.status.is_empty() && !envelope.is_ok() {
            if let Err(error) = unwrap_envelope(envelope) {
                return error;
            }
        }
    }
    let data = serde_json::from_str(&response.body).unwrap_or(Value::String(response.body.clone()));
    RequestError::new(ErrorKind::Transport, message)
        .with_status(response.status_text())
        .with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn ok_envelope_yields_inner_data() {
        let data = unwrap_response(&response(200, r#"{"status":"OK","data":{"x":1}}"#)).unwrap();
        assert_eq!(data, json!({"x": 1}));
    }

    #[test]
    fn non_ok_envelope_is_an_envelope_error() {
        let err = unwrap_response(&response(200, r#"{"status":"ERR","message":"bad"}"#)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Envelope);
        assert_eq!(err.message, "bad");
        assert_eq!(err.response_status.as_deref(), Some("ERR"));
        assert_eq!(err.response_data, Value::Null);
    }

    #[test]
    fn non_envelope_body_is_a_decode_error() {
        let err = unwrap_response(&response(200, "<html>")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Decode);
        assert_eq!(err.response_data, json!("<html>"));
    }

    #[test]
    fn hook_errors_pass_through_unchanged() {
        let original = RequestError::new(ErrorKind::Envelope, "bad").with_status("ERR");
        assert_eq!(normalize(Failure::Unwrapped(original.clone())), original);
    }

    #[test]
    fn failed_response_with_envelope_uses_envelope_fields() {
        let body = r#"{"status":"SERVER_ERROR","message":"boom","data":{"trace":"t"}}"#;
        let err = normalize(Failure::Status(response(500, body)));
        assert_eq!(err.kind, ErrorKind::Envelope);
        assert_eq!(err.message, "boom");
        assert_eq!(err.response_status.as_deref(), Some("SERVER_ERROR"));
        assert_eq!(err.response_data, json!({"trace": "t"}));
    }

    #[test]
    fn failed_response_with_ok_envelope_stays_an_error() {
        let err = normalize(Failure::Status(response(502, r#"{"status":"OK","data":1}"#)));
        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.response_status.as_deref(), Some("Bad Gateway"));
    }

    #[test]
    fn failed_response_without_envelope_uses_status_text() {
        let err = normalize(Failure::Status(response(503, "down")));
        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.message, "Request failed with status code 503");
        assert_eq!(err.response_status.as_deref(), Some("Service Unavailable"));
        assert_eq!(err.response_data, json!("down"));
    }

    #[test]
    fn cancelled_transport_is_session_lost() {
        let err = normalize(Failure::Transport(TransportError::cancelled("Network Error")));
        assert!(err.is_session_lost());
        assert_eq!(err.message, "Network Error");
        assert!(err.response_status.is_none());
    }

    #[test]
    fn other_transport_failures_are_transport_errors() {
        let err = normalize(Failure::Transport(TransportError::new(408, "timeout")));
        assert_eq!(err.kind, ErrorKind::Transport);
    }
}
