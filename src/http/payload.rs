//! Turning a successful response body into the value handed to the caller.

use serde_json::Value;

/// A value that can be pulled out of an HTTP 200 body.
///
/// An empty payload is treated by the retry loop exactly like a parse
/// failure and is retried.
pub trait Payload: Sized {
    fn extract(body: String) -> Result<Self, String>;

    fn is_empty(&self) -> bool;
}

impl Payload for Value {
    fn extract(body: String) -> Result<Self, String> {
        serde_json::from_str(&body).map_err(|e| format!("invalid JSON body: {}", e))
    }

    fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
        }
    }
}

impl Payload for String {
    fn extract(body: String) -> Result<Self, String> {
        Ok(body)
    }

    fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}
