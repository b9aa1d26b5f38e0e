//! Bearer token issued by the store

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque credential the store issued to a user.
///
/// The value is never inspected locally; only the store can validate it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    username: Option<String>,
    value: Option<String>,
}

impl Token {
    pub fn new(username: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            value: Some(value.into()),
        }
    }

    /// Build a token from parts that may be absent
    pub fn from_parts(username: Option<String>, value: Option<String>) -> Self {
        Self { username, value }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

// Keeps credentials out of logs.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("username", &self.username)
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
