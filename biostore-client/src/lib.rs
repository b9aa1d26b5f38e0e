//! # Biostore Client
//!
//! Talks to the biostore permission service: logs users in, issues and
//! refreshes bearer tokens, lists and creates projects, and manages project
//! membership.
//!
//! ```no_run
//! use biostore_client::ConnectionProvider;
//! use biostore_core::ConnectionConfig;
//!
//! # async fn demo() -> biostore_core::BiostoreResult<()> {
//! let provider = ConnectionProvider::new(&ConnectionConfig::default())?;
//! let token = provider.issue_token("alice", "secret").await?;
//! for project in provider.project_list(&token).await? {
//!     println!("{}", project);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cookies;
pub mod envelope;
pub mod provider;
pub mod transport;

pub use cookies::SessionCookieStore;
pub use envelope::{ResponseEnvelope, ResponseStatus};
pub use provider::ConnectionProvider;
pub use transport::{BiostoreConnector, HttpConnector, Parameters};
