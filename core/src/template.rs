//! URL templates with `{name}` placeholders.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ErrorKind, RequestError};
use crate::query::scalar;
use crate::types::Params;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"))
}

/// A parsed URL template such as `/users/{id}/orders/{order}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    source: String,
    names: Vec<String>,
}

impl UrlTemplate {
    pub fn parse(source: &str) -> Self {
        let names = placeholder()
            .captures_iter(source)
            .map(|caps| caps[1].to_string())
            .collect();
        Self {
            source: source.to_string(),
            names,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True when the template has no placeholders.
    pub fn is_literal(&self) -> bool {
        self.names.is_empty()
    }

    /// Substitute every placeholder from `data`.
    ///
    /// A placeholder whose key is missing or null is an error.
    pub fn expand(&self, data: &Params) -> Result<String, RequestError> {
        if self.is_literal() {
            return Ok(self.source.clone());
        }
        if let Some(missing) = self
            .names
            .iter()
            .find(|name| data.get(*name).map_or(true, |value| value.is_null()))
        {
            return Err(RequestError::new(
                ErrorKind::Template,
                format!("no value for placeholder {{{missing}}} in {}", self.source),
            ));
        }
        let url = placeholder().replace_all(&self.source, |caps: &regex::Captures<'_>| {
            data.get(&caps[1]).map(scalar).unwrap_or_default()
        });
        Ok(url.into_owned())
    }

    /// `data` without the keys consumed by placeholders.
    pub fn residual(&self, data: &Params) -> Params {
        data.iter()
            .filter(|(key, _)| !self.names.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn map(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn finds_placeholders_in_order() {
        let template = UrlTemplate::parse("/users/{id}/orders/{order_id}");
        assert_eq!(template.names(), ["id", "order_id"]);
        assert!(!template.is_literal());
        assert!(UrlTemplate::parse("/login").is_literal());
    }

    #[test]
    fn expands_and_strips_path_variables() {
        let template = UrlTemplate::parse("/user/{id}");
        let data = map(json!({"id": 7, "name": "x"}));
        assert_eq!(template.expand(&data).unwrap(), "/user/7");
        assert_eq!(template.residual(&data), map(json!({"name": "x"})));
    }

    #[test]
    fn string_values_are_inserted_verbatim() {
        let template = UrlTemplate::parse("/repos/{owner}/{repo}");
        let data = map(json!({"owner": "rust-lang", "repo": "cargo"}));
        assert_eq!(template.expand(&data).unwrap(), "/repos/rust-lang/cargo");
        assert!(template.residual(&data).is_empty());
    }

    #[test]
    fn missing_or_null_placeholder_fails() {
        let template = UrlTemplate::parse("/user/{id}");
        let err = template.expand(&map(json!({"name": "x"}))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Template);
        assert!(err.message.contains("{id}"));
        assert!(template.expand(&map(json!({"id": null}))).is_err());
    }

    #[test]
    fn repeated_placeholder_is_substituted_everywhere() {
        let template = UrlTemplate::parse("/{v}/x/{v}");
        assert_eq!(template.expand(&map(json!({"v": 1}))).unwrap(), "/1/x/1");
    }
}
