//! Query-string encoding.

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Query parameters as a JSON object. Key order is insertion order.
pub type QueryParams = Map<String, Value>;

/// Encode `query` as an `application/x-www-form-urlencoded` string.
///
/// Returns `None` when no query was supplied. `null` values drop their key
/// entirely; arrays produce one `key=value` pair per non-null element, in
/// order. Floats with no fractional part render without one (`1.0` is
/// `1`). The result may be empty when every value was `null`.
pub fn encode_query(query: Option<&QueryParams>) -> Option<String> {
    let query = query?;
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter_map(stringify) {
                    serializer.append_pair(key, &item);
                }
            }
            other => {
                if let Some(text) = stringify(other) {
                    serializer.append_pair(key, &text);
                }
            }
        }
    }
    Some(serializer.finish())
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        }),
        nested => Some(nested.to_string()),
    }
}
