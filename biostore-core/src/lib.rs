//! Biostore Core - value types and shared infrastructure
//!
//! Defines the permission model, project and token types, the authorization
//! record produced by a login, and the error/config/logging layers used by
//! `biostore-client`.

pub mod config;
pub mod error;
pub mod logging;
pub mod permission;
pub mod project;
pub mod protocol;
pub mod token;
pub mod user_permissions;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use permission::Permission;
pub use project::{Project, ProjectRecord, ProjectUser, ProjectUserRecord};
pub use protocol::{ProtocolSpec, ProtocolVersion};
pub use token::Token;
pub use user_permissions::{LoginRecord, PermissionGrant, UserPermissions};

// Re-export commonly used external types
pub use tracing;
