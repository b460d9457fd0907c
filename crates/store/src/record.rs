use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The single persisted record: a non-negative counter and when it last changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub counter: u64,
    pub timestamp: String,
}

impl StateRecord {
    pub fn new(counter: u64, timestamp: impl Into<String>) -> Self {
        Self {
            counter,
            timestamp: timestamp.into(),
        }
    }

    /// Accepts a value only if `counter` is an integer >= 0 and `timestamp` is
    /// a string. Other fields are ignored.
    pub fn validate(value: &Value) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| format!("expected a JSON object, found {}", type_name(value)))?;

        let counter = match object.get("counter") {
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| format!("counter must be a non-negative integer, found {n}"))?,
            Some(other) => {
                return Err(format!(
                    "counter must be a non-negative integer, found {}",
                    type_name(other)
                ))
            }
            None => return Err("missing field: counter".to_string()),
        };

        let timestamp = match object.get("timestamp") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(format!(
                    "timestamp must be a string, found {}",
                    type_name(other)
                ))
            }
            None => return Err("missing field: timestamp".to_string()),
        };

        Ok(Self { counter, timestamp })
    }

    /// The next record in the increment workflow.
    pub fn incremented(&self) -> Option<Self> {
        Some(Self {
            counter: self.counter.checked_add(1)?,
            timestamp: now_timestamp(),
        })
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
