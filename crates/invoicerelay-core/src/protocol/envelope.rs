//! Wire envelope (JSON text frame).
//!
//! The envelope keeps `data` and any other top-level members as plain JSON.
//! Only adapters and listeners look inside; the channel routes by `kind` alone.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RelayError, Result};

/// Unit of wire exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message kind (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Server-assigned ISO-8601 timestamp on inbound events. Any non-string
    /// value makes the whole frame malformed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Remaining top-level members. Servers often put domain fields here
    /// instead of under `data`.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Envelope {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: None,
            timestamp: None,
            fields: Map::new(),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Parse one text frame.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| RelayError::MalformedMessage(format!("invalid envelope json: {e}")))
    }

    /// Serialize for the wire.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| RelayError::MalformedMessage(format!("json encode failed: {e}")))
    }

    /// Decode the payload into a typed event.
    ///
    /// Members of an object `data` are merged with the top-level members
    /// (top level wins), and `data`/`timestamp` stay available under their
    /// own names.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut merged = Map::new();
        if let Some(Value::Object(inner)) = &self.data {
            merged.extend(inner.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(data) = &self.data {
            merged.insert("data".into(), data.clone());
        }
        if let Some(ts) = &self.timestamp {
            merged.insert("timestamp".into(), Value::String(ts.clone()));
        }

        serde_json::from_value(Value::Object(merged)).map_err(|e| {
            RelayError::MalformedMessage(format!("{} payload mismatch: {e}", self.kind))
        })
    }
}
