//! Projects and project membership as reported by the store

use crate::error::{BiostoreError, BiostoreResult};
use crate::permission::Permission;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path prefixes under which the store keeps project containers
pub const PROJECT_PATH_PREFIXES: [&str; 2] = ["data/Collaboration/", "data/Projects/"];

/// Project entry as it appears in the store's permission list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub permissions: Permission,
}

/// A project the user has access to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    name: String,
    permission: Permission,
}

impl Project {
    pub fn new(name: impl Into<String>, permission: Permission) -> Self {
        Self {
            name: name.into(),
            permission,
        }
    }

    /// Build a project from a store record.
    ///
    /// Returns `None` for records that are not project containers: empty
    /// paths, foreign prefixes, or a bare prefix without a project name.
    pub fn from_record(record: &ProjectRecord) -> Option<Self> {
        let name = project_name(&record.path)?;
        Some(Self::new(name, record.permissions))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Rendered permission labels, e.g. `["Info", "Read"]`
    pub fn permission_labels(&self) -> Vec<&'static str> {
        self.permission.labels()
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.permission)
    }
}

/// Whether `path` names something inside one of the project containers
pub fn is_project_path(path: &str) -> bool {
    project_name(path).is_some()
}

/// Strip the project container prefix from `path`
pub fn project_name(path: &str) -> Option<&str> {
    PROJECT_PATH_PREFIXES
        .iter()
        .find_map(|prefix| path.strip_prefix(prefix))
        .filter(|name| !name.is_empty())
}

/// Membership entry as it appears in the store's `projectUsers` list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUserRecord {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub role: String,
}

/// A member of a project and the role they hold.
///
/// Ordering is by user, then role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectUser {
    user: String,
    role: String,
}

impl ProjectUser {
    /// Fails with [`BiostoreError::InvalidArgument`] if either field is empty.
    pub fn new(user: impl Into<String>, role: impl Into<String>) -> BiostoreResult<Self> {
        let user = user.into();
        let role = role.into();
        if user.is_empty() || role.is_empty() {
            let field = if user.is_empty() { "user" } else { "role" };
            return Err(BiostoreError::invalid_argument(
                "User and role must be not null and not empty",
                Some(field),
                "project_user",
            ));
        }
        Ok(Self { user, role })
    }

    /// Lenient counterpart of [`ProjectUser::new`]: incomplete records yield `None`.
    pub fn from_record(record: &ProjectUserRecord) -> Option<Self> {
        if record.user.is_empty() || record.role.is_empty() {
            return None;
        }
        Some(Self {
            user: record.user.clone(),
            role: record.role.clone(),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn role(&self) -> &str {
        &self.role
    }
}

impl fmt::Display for ProjectUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.user, self.role)
    }
}
