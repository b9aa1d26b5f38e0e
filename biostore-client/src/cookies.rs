//! Per-user session cookies
//!
//! The store keeps server-side session state behind a cookie. Replaying the
//! last cookie seen for a user lets later requests resume that session.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared username -> `Cookie` header map.
///
/// Clones share the same underlying map. Entries are replaced on every
/// exchange that returns `Set-Cookie` and are never removed.
#[derive(Debug, Clone, Default)]
pub struct SessionCookieStore {
    cookies: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, username: &str) -> Option<String> {
        self.cookies.read().await.get(username).cloned()
    }

    /// Remember `cookie_header` for `username`, replacing any previous value
    pub async fn store(&self, username: &str, cookie_header: String) {
        debug!(username, "Storing session cookie");
        self.cookies
            .write()
            .await
            .insert(username.to_string(), cookie_header);
    }

    pub async fn len(&self) -> usize {
        self.cookies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cookies.read().await.is_empty()
    }
}

/// Build a `Cookie` header from `Set-Cookie` values.
///
/// Only the `name=value` part of each cookie is kept; attributes such as
/// `Path` or `Expires` are dropped. Returns `None` if nothing remains.
pub fn cookie_header_from_set_cookie<'a, I>(set_cookies: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let cookies: Vec<&str> = set_cookies
        .into_iter()
        .filter_map(|cookie| cookie.split(';').next())
        .map(str::trim)
        .filter(|cookie| !cookie.is_empty())
        .collect();

    if cookies.is_empty() {
        None
    } else {
        Some(cookies.join("; "))
    }
}
