//! Event - the unit of data routed from producers to consumers

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Kind tag that asks display consumers to stop
pub const SHUTDOWN_KIND: &str = "shutdown";

/// A kind tag plus an opaque payload.
///
/// Consumers interpret the payload themselves; the dispatcher never looks
/// inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Event {
    pub fn new(kind: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Event asking display consumers to stop
    pub fn shutdown() -> Self {
        Self::new(SHUTDOWN_KIND, Value::Null)
    }

    pub fn is_shutdown(&self) -> bool {
        self.kind == SHUTDOWN_KIND
    }

    /// Payload as plain text: strings raw, everything else as compact JSON
    pub fn payload_text(&self) -> String {
        match &self.payload {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Text frame sent to dashboard clients: `<kind>:<payload>\n`
    pub fn frame(&self) -> String {
        format!("{}:{}\n", self.kind, self.payload_text())
    }

    /// Parse a producer line of the form `kind:payload`.
    ///
    /// The payload is read as JSON when it parses, otherwise kept as text.
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (kind, payload) = match line.split_once(':') {
            Some((kind, payload)) => (kind.trim(), payload.trim()),
            None => (line.trim(), ""),
        };

        if kind.is_empty() {
            return Err(Error::InvalidEvent(format!("missing kind in {:?}", line)));
        }

        let payload = if payload.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(payload).unwrap_or_else(|_| Value::String(payload.to_string()))
        };

        Ok(Self::new(kind, payload))
    }
}
