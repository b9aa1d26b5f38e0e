//! Decoded store response
//!
//! Every answer from the store is a single JSON object with a `type`
//! discriminator and, on failure, an optional `message`. The remaining fields
//! depend on the action and are extracted on demand with [`ResponseEnvelope::payload`].

use biostore_core::protocol::{attr, status};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

/// Outcome reported in the `type` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    Error,
    Unauthorized,
    /// A `type` value this client does not know; treated as a failure
    Other(String),
    /// No `type` field at all
    Missing,
}

impl ResponseStatus {
    fn from_field(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => ResponseStatus::Missing,
            Some(Value::String(s)) => match s.as_str() {
                status::OK => ResponseStatus::Ok,
                status::ERROR => ResponseStatus::Error,
                status::UNAUTHORIZED => ResponseStatus::Unauthorized,
                other => ResponseStatus::Other(other.to_string()),
            },
            Some(other) => ResponseStatus::Other(other.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ResponseStatus::Ok)
    }

    /// The raw `type` value, if the store sent one
    pub fn as_reported(&self) -> Option<&str> {
        match self {
            ResponseStatus::Ok => Some(status::OK),
            ResponseStatus::Error => Some(status::ERROR),
            ResponseStatus::Unauthorized => Some(status::UNAUTHORIZED),
            ResponseStatus::Other(value) => Some(value),
            ResponseStatus::Missing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    status: ResponseStatus,
    message: Option<String>,
    raw: Value,
    /// Response text exactly as received
    body: String,
}

impl ResponseEnvelope {
    pub fn from_object(object: Map<String, Value>) -> Self {
        let body = Value::Object(object.clone()).to_string();
        Self::with_body(object, body)
    }

    fn with_body(object: Map<String, Value>, body: String) -> Self {
        let status = ResponseStatus::from_field(object.get(attr::TYPE));
        let message = match object.get(attr::MESSAGE) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self {
            status,
            message,
            raw: Value::Object(object),
            body,
        }
    }

    /// Parse a response body; anything but a single JSON object is rejected
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_str(body)?;
        Ok(Self::with_body(object, body.to_string()))
    }

    /// The response text as received
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn status(&self) -> &ResponseStatus {
        &self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// Decode the action-specific fields into `T`
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.raw)
    }

    /// Message to fail with, or `None` when the store reported success.
    ///
    /// Falls back to the response text as received when the store sent no
    /// `message` or no `type` at all.
    pub fn failure_message(&self) -> Option<String> {
        if self.status.is_ok() {
            return None;
        }
        match (&self.status, &self.message) {
            (ResponseStatus::Missing, _) | (_, None) => Some(self.body.clone()),
            (_, Some(message)) => Some(message.clone()),
        }
    }
}

impl fmt::Display for ResponseEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}
