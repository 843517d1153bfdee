//! Error types for the request facade.
//!
//! # Design
//! Every failure that leaves `Facade::request` is a `RequestError`, whether
//! it started in the transport, in the response envelope, or in the facade
//! itself. The `kind` tag says where it came from; `response_status` and
//! `response_data` carry what the peer reported, when it reported anything.
//! `TransportError` is the narrower type a `Transport` implementation
//! returns when no usable response exists at all.

use serde_json::Value;
use thiserror::Error;

/// Where a `RequestError` originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure, or a response outside the 2xx range.
    Transport,
    /// The transport succeeded but the envelope status was not `"OK"`.
    Envelope,
    /// The transport reported status 0: the request was cancelled or blocked
    /// by an authentication redirect.
    SessionLost,
    /// The response body was not a readable envelope.
    Decode,
    /// A URL template placeholder had no value.
    Template,
    /// The outgoing data could not be serialized.
    Encode,
}

/// The single error shape returned by every facade operation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct RequestError {
    pub kind: ErrorKind,
    pub message: String,
    /// Envelope status for envelope errors, HTTP status text for transport errors.
    pub response_status: Option<String>,
    pub response_data: Value,
}

impl RequestError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            response_status: None,
            response_data: Value::Null,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.response_status = Some(status.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.response_data = data;
        self
    }

    pub fn is_session_lost(&self) -> bool {
        self.kind == ErrorKind::SessionLost
    }
}

/// A transport-level failure with no usable response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport failed with status {status}: {message}")]
pub struct TransportError {
    /// 0 when the request never completed (network error, cancellation,
    /// blocked cross-origin redirect).
    pub status: u16,
    pub message: String,
}

impl TransportError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A request that was cancelled before any response arrived.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == 0
    }
}

/// Errors raised while loading `FacadeConfig` from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown build mode {0:?}, expected \"development\" or \"production\"")]
    UnknownBuildMode(String),

    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
