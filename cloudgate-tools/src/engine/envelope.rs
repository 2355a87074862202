//! The fixed response envelope every invocation produces

use serde::Serialize;
use serde_json::Value;

/// Outcome of one invocation, identical across the CLI and tool-call
/// surfaces.
///
/// `results` is present only on success with data; empty collections
/// normalize to an omitted field so callers can treat "no results" and
/// "nothing to say" the same way.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseEnvelope {
    /// HTTP-style status code
    pub status: u16,
    /// Human-readable outcome, "Success" on the happy path
    pub message: String,
    /// Operation payload, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    /// Wall-clock duration of the invocation in milliseconds
    pub duration: u64,
}

impl ResponseEnvelope {
    /// Successful envelope; empty payloads are normalized away
    pub fn success(results: Option<Value>, duration: u64) -> Self {
        Self {
            status: 200,
            message: "Success".to_string(),
            results: results.filter(|value| !Self::is_empty_payload(value)),
            duration,
        }
    }

    /// Failed envelope; never carries results
    pub fn failure(status: u16, message: impl Into<String>, duration: u64) -> Self {
        Self {
            status,
            message: message.into(),
            results: None,
            duration,
        }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_empty_payload(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}
