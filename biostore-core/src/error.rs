//! Unified error handling for the biostore client
//!
//! Every failure surfaced to callers is one of a small set of kinds: transport
//! problems, access denied by the store, a broken protocol contract, rejected
//! local input, or configuration problems. Each carries an [`ErrorContext`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

pub type BiostoreResult<T> = Result<T, BiostoreError>;

/// Error context providing additional information for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata (acting username, action name, ...)
    pub metadata: HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the biostore client
#[derive(Error, Debug)]
pub enum BiostoreError {
    /// The exchange with the store could not complete, or its body was not a JSON object
    #[error("Error during connection to server: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// The store answered with a non-`ok` status
    #[error("Access denied: {message}")]
    AccessDenied {
        message: String,
        /// Status reported by the store (`error`, `unauthorized`, ...), if any
        status: Option<String>,
        context: ErrorContext,
    },

    /// The store claimed success but the payload is missing something required
    #[error("Protocol error: {message}")]
    ProtocolContract {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl BiostoreError {
    pub fn transport<E>(message: impl Into<String>, source: E, context: ErrorContext) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BiostoreError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
            context: context.with_suggestion("Check network connectivity and the store URL"),
        }
    }

    pub fn access_denied(
        message: impl Into<String>,
        status: Option<String>,
        context: ErrorContext,
    ) -> Self {
        BiostoreError::AccessDenied {
            message: message.into(),
            status,
            context,
        }
    }

    pub fn protocol_contract(
        message: impl Into<String>,
        field: Option<&str>,
        context: ErrorContext,
    ) -> Self {
        BiostoreError::ProtocolContract {
            message: message.into(),
            field: field.map(str::to_string),
            context: context.with_suggestion("Check that the store supports this protocol version"),
        }
    }

    pub fn invalid_argument(message: impl Into<String>, field: Option<&str>, component: &str) -> Self {
        BiostoreError::InvalidArgument {
            message: message.into(),
            field: field.map(str::to_string),
            context: ErrorContext::new(component),
        }
    }

    /// The bare message, without the kind prefix added by `Display`
    pub fn message(&self) -> &str {
        match self {
            BiostoreError::Transport { message, .. }
            | BiostoreError::AccessDenied { message, .. }
            | BiostoreError::ProtocolContract { message, .. }
            | BiostoreError::InvalidArgument { message, .. }
            | BiostoreError::Config { message, .. } => message,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            BiostoreError::Transport { context, .. }
            | BiostoreError::AccessDenied { context, .. }
            | BiostoreError::ProtocolContract { context, .. }
            | BiostoreError::InvalidArgument { context, .. }
            | BiostoreError::Config { context, .. } => context,
        }
    }

    pub fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            BiostoreError::Transport { context, .. }
            | BiostoreError::AccessDenied { context, .. }
            | BiostoreError::ProtocolContract { context, .. }
            | BiostoreError::InvalidArgument { context, .. }
            | BiostoreError::Config { context, .. } => context,
        }
    }

    /// Attribute the error to a higher-level operation performed for `username`
    pub fn in_operation(mut self, operation: &str, username: Option<&str>) -> Self {
        let context = self.context_mut();
        context.operation = Some(operation.to_string());
        if let Some(username) = username {
            context
                .metadata
                .insert("username".to_string(), username.to_string());
        }
        self
    }

    /// Whether the store refused the request or answered in a way that cannot be trusted
    pub fn is_security_failure(&self) -> bool {
        matches!(
            self,
            BiostoreError::AccessDenied { .. } | BiostoreError::ProtocolContract { .. }
        )
    }

    /// Only transport failures may succeed on a later attempt; nothing here retries them.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BiostoreError::Transport { .. })
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let context = self.context();
        let username = context.metadata.get("username").map(String::as_str).unwrap_or("");
        let operation = context.operation.as_deref().unwrap_or("");
        match self {
            BiostoreError::InvalidArgument { .. } | BiostoreError::Config { .. } => {
                warn!(
                    error_id = %context.error_id,
                    operation,
                    error = %self,
                    "Rejected before contacting the store"
                );
            }
            _ => {
                error!(
                    error_id = %context.error_id,
                    operation,
                    username,
                    error = %self,
                    "While {} {}: {}",
                    operation,
                    username,
                    self.message()
                );
            }
        }
    }
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $operation:expr) => {
        $crate::BiostoreError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new("config")
                .with_operation($operation)
                .with_suggestion("Check your configuration file"),
        }
    };
    ($msg:expr, $operation:expr, $source:expr) => {
        $crate::BiostoreError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new("config")
                .with_operation($operation)
                .with_suggestion("Check your configuration file"),
        }
    };
}
