//! The request facade: one call in, one envelope payload or one error out.
//!
//! # Design
//! `Facade` owns the host's `Transport`, a `UrlResolver` and a shared
//! `SessionMonitor`. `request` runs the same pipeline for every call:
//!
//! 1. resolve the URL and merge headers (caller headers win);
//! 2. purify the data and attach it as query params (GET) or body;
//! 3. form-encode the body for form POSTs;
//! 4. execute once, with no retries;
//! 5. on a transport failure let the session monitor look at it, then
//!    normalize; on success run the response hook, normalizing its errors.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::config::FacadeConfig;
use crate::envelope::{normalize, unwrap_response, Failure, Unwrapper};
use crate::error::{ConfigError, RequestError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};
use crate::query::{stringify_query, FORM_CONTENT_TYPE};
use crate::resolve::{BaseUrlResolver, UrlResolver};
use crate::session::{SessionHost, SessionMonitor};
use crate::template::UrlTemplate;
use crate::types::{purify, Params};

const CONTENT_TYPE: &str = "Content-Type";

/// Per-call options. Everything except `unwrap_response` is handed to the
/// transport unchanged.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    /// Replaces the default envelope check.
    pub unwrap_response: Option<Unwrapper>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Send the body as `application/x-www-form-urlencoded`.
    pub fn form(self) -> Self {
        self.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn unwrap_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HttpResponse) -> Result<Value, RequestError> + Send + Sync + 'static,
    {
        self.unwrap_response = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("unwrap_response", &self.unwrap_response.is_some())
            .finish()
    }
}

/// Request facade over a host-supplied transport.
///
/// Resolves URLs, shapes request data, executes each call exactly once
/// through `T`, and reduces the outcome to either the payload of an `"OK"`
/// envelope or a `RequestError`. Transport failures are shown to the shared
/// `SessionMonitor` before they are returned.
pub struct Facade<T> {
    transport: T,
    resolver: Box<dyn UrlResolver + Send + Sync>,
    session: Arc<SessionMonitor>,
    content_type: String,
}

impl<T: Transport> Facade<T> {
    /// Build a facade that shares `session` with other facades on the page.
    pub fn new(
        transport: T,
        resolver: impl UrlResolver + Send + Sync + 'static,
        session: Arc<SessionMonitor>,
    ) -> Self {
        Self {
            transport,
            resolver: Box::new(resolver),
            session,
            content_type: FacadeConfig::default().content_type,
        }
    }

    /// Build a facade and a fresh session monitor from `config`.
    pub fn from_config(
        transport: T,
        config: FacadeConfig,
        host: Arc<dyn SessionHost>,
    ) -> Result<Self, ConfigError> {
        let resolver = BaseUrlResolver::try_new(&config.base_url)?;
        let session = Arc::new(SessionMonitor::new(config.session, host));
        Ok(Self {
            transport,
            resolver: Box::new(resolver),
            session,
            content_type: config.content_type,
        })
    }

    pub fn session(&self) -> &Arc<SessionMonitor> {
        &self.session
    }

    pub fn get(&self, url: &str, data: Option<&Params>, options: RequestOptions) -> Result<Value, RequestError> {
        self.request(HttpMethod::Get, url, data, options)
    }

    pub fn post(&self, url: &str, data: Option<&Params>, options: RequestOptions) -> Result<Value, RequestError> {
        self.request(HttpMethod::Post, url, data, options)
    }

    /// Send one request and return the payload of its `"OK"` envelope.
    pub fn request(
        &self,
        method: HttpMethod,
        url: &str,
        data: Option<&Params>,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        let RequestOptions {
            headers,
            timeout,
            unwrap_response: hook,
        } = options;
        let request = self.build_request(method, url, data, headers, timeout);
        debug!("{} {}", request.method, request.full_url());

        let response = match self.transport.execute(&request) {
            Ok(response) => response,
            Err(error) => {
                self.session.on_transport_failure(error.status);
                return Err(normalize(Failure::Transport(error)));
            }
        };
        if !response.is_success() {
            return Err(normalize(Failure::Status(response)));
        }

        let unwrapped = match &hook {
            Some(hook) => hook(&response),
            None => unwrap_response(&response),
        };
        unwrapped.map_err(|error| normalize(Failure::Unwrapped(error)))
    }

    /// Compile a URL template into a reusable endpoint.
    pub fn create_interface(&self, config: InterfaceConfig) -> Interface<'_, T> {
        Interface {
            facade: self,
            method: config.method,
            template: UrlTemplate::parse(&config.url_template),
            options: config.options,
        }
    }

    fn build_request(
        &self,
        method: HttpMethod,
        url: &str,
        data: Option<&Params>,
        extra_headers: Vec<(String, String)>,
        timeout: Option<Duration>,
    ) -> HttpRequest {
        let mut headers = vec![(CONTENT_TYPE.to_string(), self.content_type.clone())];
        for (name, value) in extra_headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        let mut request = HttpRequest {
            method,
            url: self.resolver.resolve(url),
            headers,
            params: None,
            body: None,
            timeout,
        };

        if let Some(data) = data.filter(|data| !data.is_empty()) {
            let data = purify(data);
            if method == HttpMethod::Get {
                request.params = Some(data);
            } else if is_form_post(&request) {
                request.body = Some(RequestBody::Form(stringify_query(&data)));
            } else {
                request.body = Some(RequestBody::Json(Value::Object(data)));
            }
        }
        request
    }
}

fn is_form_post(request: &HttpRequest) -> bool {
    request.method == HttpMethod::Post
        && request
            .header(CONTENT_TYPE)
            .is_some_and(|value| value.eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Endpoint description for `Facade::create_interface`.
#[derive(Debug, Clone)]
pub struct InterfaceConfig {
    pub method: HttpMethod,
    /// URL with `{name}` placeholders filled from the call data.
    pub url_template: String,
    pub options: RequestOptions,
}

impl InterfaceConfig {
    pub fn new(method: HttpMethod, url_template: impl Into<String>) -> Self {
        Self {
            method,
            url_template: url_template.into(),
            options: RequestOptions::default(),
        }
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// A templated endpoint bound to a facade.
pub struct Interface<'a, T> {
    facade: &'a Facade<T>,
    method: HttpMethod,
    template: UrlTemplate,
    options: RequestOptions,
}

impl<T: Transport> Interface<'_, T> {
    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }

    /// Fill the template from `data` and send the remaining keys.
    pub fn call(&self, data: &Params) -> Result<Value, RequestError> {
        if self.template.is_literal() {
            return self
                .facade
                .request(self.method, self.template.as_str(), Some(data), self.options.clone());
        }
        let url = self.template.expand(data)?;
        let residual = self.template.residual(data);
        self.facade.request(self.method, &url, Some(&residual), self.options.clone())
    }
}
