//! Request facade for a browser application's JSON API.
//!
//! # Overview
//! Wraps a host-supplied HTTP transport with URL resolution, request-data
//! purification, response-envelope unwrapping, session-loss detection and
//! templated endpoints. Every call either yields the `data` of an `"OK"`
//! envelope or fails with a single `RequestError` shape.
//!
//! # Design
//! - The host executes the I/O: the facade builds an `HttpRequest`, a
//!   `Transport` implementation sends it.
//! - Page side effects of session loss go through `SessionHost`; the
//!   `SessionMonitor` that drives them is shared, not global.
//! - No retries, caching or timeouts of its own; timeouts are passed to the
//!   transport as given.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod query;
pub mod resolve;
pub mod session;
pub mod template;
pub mod types;

pub use client::{Facade, Interface, InterfaceConfig, RequestOptions};
pub use config::{BuildMode, FacadeConfig, SessionConfig};
pub use envelope::{unwrap_response, Unwrapper};
pub use error::{ConfigError, ErrorKind, RequestError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};
pub use query::stringify_query;
pub use resolve::{BaseUrlResolver, UrlResolver};
pub use session::{SessionHost, SessionLostDialog, SessionMonitor};
pub use template::UrlTemplate;
pub use types::{decode, params, purify, Params, ResponseEnvelope};
