//! Cache Key Module
//!
//! Deterministic identifiers for `(endpoint, args)` pairs.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

// == Cache Key ==
/// Canonical key of a cached request.
///
/// Object args are serialized with their fields sorted at every depth, so
/// `{"page":1,"limit":10}` and `{"limit":10,"page":1}` share one key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a query call.
    pub fn new(endpoint: &str, args: &Value) -> Self {
        let mut key = String::with_capacity(endpoint.len() + 16);
        key.push_str(endpoint);
        key.push('(');
        write_canonical(args, &mut key);
        key.push(')');
        Self(key)
    }

    /// Key never shared with any other call; used for mutations.
    pub fn unique(endpoint: &str, request_id: u64) -> Self {
        Self(format!("{}#{}", endpoint, request_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(name.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_format() {
        let key = CacheKey::new("getAllEtudiants", &json!({"page": 1, "limit": 10, "search": ""}));
        assert_eq!(
            key.as_str(),
            r#"getAllEtudiants({"limit":10,"page":1,"search":""})"#
        );
        assert_eq!(CacheKey::new("getEtudiant", &json!(42)).as_str(), "getEtudiant(42)");
        assert_eq!(CacheKey::new("ping", &Value::Null).as_str(), "ping(null)");
    }

    #[test]
    fn test_key_order_independent_for_nested_objects() {
        let a = CacheKey::new("q", &json!({"filter": {"b": 2, "a": 1}, "page": 1}));
        let b = CacheKey::new("q", &json!({"page": 1, "filter": {"a": 1, "b": 2}}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_distinguishes_endpoint_and_values() {
        let args = json!({"page": 1});
        assert_ne!(CacheKey::new("a", &args), CacheKey::new("b", &args));
        assert_ne!(
            CacheKey::new("a", &json!({"page": 1})),
            CacheKey::new("a", &json!({"page": 2}))
        );
        assert_ne!(CacheKey::new("a", &json!(1)), CacheKey::new("a", &json!("1")));
    }

    #[test]
    fn test_array_order_is_significant() {
        assert_ne!(
            CacheKey::new("a", &json!([1, 2])),
            CacheKey::new("a", &json!([2, 1]))
        );
    }

    #[test]
    fn test_unique_keys() {
        assert_ne!(CacheKey::unique("addEtudiant", 1), CacheKey::unique("addEtudiant", 2));
    }
}
