//! HTTP implementation of the session transport

use super::{
    create_http_client, encode_form, session_key, transport_context, BiostoreConnector,
    Parameters,
};
use crate::cookies::{cookie_header_from_set_cookie, SessionCookieStore};
use crate::envelope::ResponseEnvelope;
use async_trait::async_trait;
use biostore_core::{BiostoreError, BiostoreResult, ConnectionConfig};
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use tracing::{debug, info};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Talks to the store over HTTP(S)
pub struct HttpConnector {
    client: reqwest::Client,
    endpoint_url: String,
    server_name: Option<String>,
    cookies: SessionCookieStore,
}

impl HttpConnector {
    /// Create a connector with its own cookie store
    pub fn new(config: &ConnectionConfig) -> BiostoreResult<Self> {
        Self::with_cookie_store(config, SessionCookieStore::new())
    }

    /// Create a connector sharing `cookies` with other connectors
    pub fn with_cookie_store(
        config: &ConnectionConfig,
        cookies: SessionCookieStore,
    ) -> BiostoreResult<Self> {
        config.validate()?;
        let client = create_http_client(config)?;

        info!(
            endpoint = %config.endpoint_url,
            server_name = config.server_name.as_deref().unwrap_or(""),
            "Created biostore HTTP connector"
        );

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
            server_name: config.server_name.clone(),
            cookies,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn cookie_store(&self) -> &SessionCookieStore {
        &self.cookies
    }
}

#[async_trait]
impl BiostoreConnector for HttpConnector {
    async fn exchange(
        &self,
        username: Option<&str>,
        action: &str,
        parameters: &Parameters,
    ) -> BiostoreResult<ResponseEnvelope> {
        let session_user = session_key(username);
        let body = encode_form(action, self.server_name.as_deref(), parameters);

        debug!(
            action,
            username = session_user.unwrap_or(""),
            "Sending request to {}",
            self.endpoint_url
        );

        let mut request = self
            .client
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);

        if let Some(user) = session_user {
            if let Some(cookie) = self.cookies.get(user).await {
                request = request.header(COOKIE, cookie);
            }
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("Request to {} timed out", self.endpoint_url)
            } else {
                format!("Failed to send request to {}: {}", self.endpoint_url, e)
            };
            BiostoreError::transport(message, e, transport_context(action, username))
        })?;

        if let Some(user) = session_user {
            let set_cookies = response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok());
            if let Some(cookie_header) = cookie_header_from_set_cookie(set_cookies) {
                self.cookies.store(user, cookie_header).await;
            }
        }

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            BiostoreError::transport(
                format!("Failed to read response body: {}", e),
                e,
                transport_context(action, username),
            )
        })?;

        let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
            BiostoreError::transport(
                format!("Response body is not valid UTF-8: {}", e),
                e,
                transport_context(action, username),
            )
        })?;

        let envelope = ResponseEnvelope::parse(&text).map_err(|e| {
            BiostoreError::transport(
                format!("HTTP {} response is not a JSON object: {}", status.as_u16(), e),
                e,
                transport_context(action, username),
            )
        })?;

        debug!(action, status = ?envelope.status(), "Received response");
        Ok(envelope)
    }
}
