//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! facade builds an `HttpRequest`, hands it to the host's `Transport`, and
//! interprets the `HttpResponse` it gets back. The facade never opens a
//! socket itself, which keeps it deterministic and lets a browser host, a
//! native host, or a test double sit behind the same trait.

use std::time::Duration;

use serde_json::Value;

use crate::error::TransportError;
use crate::query::stringify_query;
use crate::types::Params;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload, either structured JSON or an already-encoded form body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(String),
}

impl RequestBody {
    /// Render the body as it goes on the wire.
    pub fn encode(&self) -> String {
        match self {
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Form(encoded) => encoded.clone(),
        }
    }
}

/// An HTTP request described as plain data.
///
/// `params` are query parameters still in structured form; use `full_url`
/// to get the URL with them appended.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Option<Params>,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn full_url(&self) -> String {
        let query = match &self.params {
            Some(params) => stringify_query(params),
            None => return self.url.clone(),
        };
        if query.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.url)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Canonical reason phrase for the status, or an empty string.
    pub fn status_text(&self) -> &'static str {
        http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("")
    }
}

/// Executes one `HttpRequest` on behalf of the facade.
///
/// Implementations return every response the peer produced, whatever its
/// status, and reserve `Err` for requests that produced no usable response.
/// A request that was cancelled or blocked must be reported with status 0.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(params: Option<Params>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost:3000/api/echo".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            params,
            body: None,
            timeout: None,
        }
    }

    #[test]
    fn full_url_without_params_is_the_url() {
        assert_eq!(request(None).full_url(), "http://localhost:3000/api/echo");
    }

    #[test]
    fn full_url_appends_encoded_params() {
        let params = json!({"q": "a b", "page": 2}).as_object().cloned();
        assert_eq!(
            request(params).full_url(),
            "http://localhost:3000/api/echo?page=2&q=a+b"
        );
    }

    #[test]
    fn full_url_extends_existing_query() {
        let mut req = request(json!({"b": 2}).as_object().cloned());
        req.url.push_str("?a=1");
        assert_eq!(req.full_url(), "http://localhost:3000/api/echo?a=1&b=2");
    }

    #[test]
    fn header_lookup_ignores_case() {
        assert_eq!(request(None).header("content-type"), Some("application/json"));
        assert_eq!(request(None).header("accept"), None);
    }

    #[test]
    fn json_body_encodes_as_json_text() {
        let body = RequestBody::Json(json!({"a": 1}));
        assert_eq!(body.encode(), r#"{"a":1}"#);
        assert_eq!(RequestBody::Form("a=1".to_string()).encode(), "a=1");
    }

    #[test]
    fn status_text_uses_canonical_reason() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(!response.is_success());
        assert_eq!(response.status_text(), "Internal Server Error");
    }
}
