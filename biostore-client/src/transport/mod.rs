//! Session transport: one form-encoded POST per action, JSON back
//!
//! [`BiostoreConnector`] is the seam between the connection provider and the
//! network. [`HttpConnector`] is the real implementation; tests substitute
//! their own.

use crate::envelope::ResponseEnvelope;
use async_trait::async_trait;
use biostore_core::protocol::attr;
use biostore_core::{BiostoreResult, ConnectionConfig, ErrorContext};
use std::collections::BTreeMap;
use std::time::Duration;
use url::form_urlencoded;

pub mod http;

pub use http::HttpConnector;

/// Action parameters, name -> value
pub type Parameters = BTreeMap<String, String>;

/// Build a [`Parameters`] map from literal pairs
pub fn parameters<const N: usize>(pairs: [(&str, &str); N]) -> Parameters {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Sends one action to the store and returns its decoded answer
#[async_trait]
pub trait BiostoreConnector: Send + Sync {
    /// Perform `action` on behalf of `username`.
    ///
    /// `username` keys the session cookie; `None` or an empty name opts out
    /// of cookie reuse. Fails with a transport error when the exchange cannot
    /// complete or the body is not a JSON object; the store's own status is
    /// left for the caller to classify.
    async fn exchange(
        &self,
        username: Option<&str>,
        action: &str,
        parameters: &Parameters,
    ) -> BiostoreResult<ResponseEnvelope>;
}

/// `action=<action>[&serverName=<name>]&<parameters...>`, UTF-8 form encoded
pub fn encode_form(action: &str, server_name: Option<&str>, parameters: &Parameters) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair(attr::ACTION, action);
    if let Some(server_name) = server_name {
        serializer.append_pair(attr::SERVER_NAME, server_name);
    }
    for (name, value) in parameters {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

/// Cookie key for `username`; anonymous calls get none
pub(crate) fn session_key(username: Option<&str>) -> Option<&str> {
    username.filter(|name| !name.is_empty())
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ConnectionConfig) -> BiostoreResult<reqwest::Client> {
    let timeout = Duration::from_secs(config.timeout_seconds);

    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(|e| {
            biostore_core::config_error!(
                format!("Failed to create HTTP client: {}", e),
                "create_client",
                e
            )
        })
}

pub(crate) fn transport_context(action: &str, username: Option<&str>) -> ErrorContext {
    ErrorContext::new("http_connector")
        .with_operation(action)
        .with_metadata("username", username.unwrap_or(""))
}
