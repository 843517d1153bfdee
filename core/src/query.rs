//! `application/x-www-form-urlencoded` encoding of request data.

use serde_json::Value;
use url::form_urlencoded;

use crate::types::Params;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Encode `data` as a query string.
///
/// Arrays repeat their key once per element, nested objects are sent as JSON
/// text and nulls are skipped.
pub fn stringify_query(data: &Params) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in data {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|item| !item.is_null()) {
                    serializer.append_pair(key, &scalar(item));
                }
            }
            other => {
                serializer.append_pair(key, &scalar(other));
            }
        }
    }
    serializer.finish()
}

/// Text form of a single value, as used in query strings and URL templates.
pub(crate) fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(value: Value) -> String {
        stringify_query(value.as_object().unwrap())
    }

    #[test]
    fn encodes_scalars() {
        assert_eq!(encode(json!({"a": 1, "b": 2})), "a=1&b=2");
        assert_eq!(encode(json!({"flag": false, "name": "x y&z"})), "flag=false&name=x+y%26z");
    }

    #[test]
    fn repeats_array_keys() {
        assert_eq!(encode(json!({"id": [1, 2, null]})), "id=1&id=2");
    }

    #[test]
    fn nested_objects_become_json() {
        assert_eq!(encode(json!({"f": {"k": 1}})), "f=%7B%22k%22%3A1%7D");
    }

    #[test]
    fn skips_nulls_and_handles_empty() {
        assert_eq!(encode(json!({"a": null})), "");
        assert_eq!(encode(json!({})), "");
    }
}
