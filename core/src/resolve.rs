//! URL resolution.

use url::Url;

use crate::error::ConfigError;

/// Turns the URL a caller wrote into the URL the transport should hit.
pub trait UrlResolver {
    fn resolve(&self, raw: &str) -> String;
}

impl<F> UrlResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Prefixes relative URLs with a fixed base; absolute URLs pass through.
///
/// Only URLs with a host count as absolute, so `users:7` is still a path.
/// An empty base returns relative URLs unchanged, which is what a browser
/// host wants when requests go to the page's own origin.
#[derive(Debug, Clone, Default)]
pub struct BaseUrlResolver {
    base_url: String,
}

impl BaseUrlResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Like `new`, but rejects a non-empty base that is not an absolute URL.
    pub fn try_new(base_url: &str) -> Result<Self, ConfigError> {
        if !base_url.is_empty() {
            Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(Self::new(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl UrlResolver for BaseUrlResolver {
    fn resolve(&self, raw: &str) -> String {
        if self.base_url.is_empty() || Url::parse(raw).is_ok_and(|url| url.has_host()) {
            return raw.to_string();
        }
        format!("{}/{}", self.base_url, raw.trim_start_matches('/'))
    }
}
