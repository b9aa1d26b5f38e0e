//! Wire vocabulary of the store and the per-version differences
//!
//! The store's contract has evolved; instead of one adapter per generation
//! the differences live in a small static table selected by [`ProtocolVersion`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod action {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const GET_PROJECT_LIST: &str = "getProjectList";
    pub const CREATE_PROJECT: &str = "createProject";
    pub const ADD_TO_PROJECT: &str = "addToProject";
    pub const REFRESH_JW_TOKEN: &str = "refreshJWToken";
    pub const CHANGE_ROLE_IN_PROJECT: &str = "changeRoleInProject";
    pub const PROJECT_USERS: &str = "projectUsers";
}

/// Request parameter and response field names
pub mod attr {
    pub const ACTION: &str = "action";
    pub const SERVER_NAME: &str = "serverName";
    pub const JWTOKEN: &str = "jwtoken";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const IP: &str = "ip";
    pub const SUDO: &str = "sudo";
    pub const USER: &str = "user";
    pub const ROLE: &str = "role";
    pub const PROJECT_NAME: &str = "projectName";
    pub const PERMISSION: &str = "permission";
    pub const TYPE: &str = "type";
    pub const MESSAGE: &str = "message";
    pub const PROJECT_USERS: &str = "projectUsers";
}

/// Values of the response `type` discriminator
pub mod status {
    pub const OK: &str = "ok";
    pub const ERROR: &str = "error";
    pub const UNAUTHORIZED: &str = "unauthorized";
}

/// Generation of the store's wire contract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// Project list piggybacks on `login` and arrives in `permissions`
    #[default]
    V1,
    /// Dedicated `getProjectList` action answering with `projectList`
    V2,
}

/// Per-version request/response names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolSpec {
    pub project_list_action: &'static str,
    pub project_list_field: &'static str,
}

const V1_SPEC: ProtocolSpec = ProtocolSpec {
    project_list_action: action::LOGIN,
    project_list_field: "permissions",
};

const V2_SPEC: ProtocolSpec = ProtocolSpec {
    project_list_action: action::GET_PROJECT_LIST,
    project_list_field: "projectList",
};

impl ProtocolVersion {
    pub fn spec(self) -> &'static ProtocolSpec {
        match self {
            ProtocolVersion::V1 => &V1_SPEC,
            ProtocolVersion::V2 => &V2_SPEC,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V1 => write!(f, "v1"),
            ProtocolVersion::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" | "1" => Ok(ProtocolVersion::V1),
            "v2" | "2" => Ok(ProtocolVersion::V2),
            _ => Err(format!("Unknown protocol version: {}", s)),
        }
    }
}
