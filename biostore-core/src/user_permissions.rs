//! Authorization record produced by a password login

use crate::error::{BiostoreError, BiostoreResult, ErrorContext};
use crate::permission::Permission;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Path of the wildcard entry that stands for blanket admin rights
pub const ROOT_PATH: &str = "/";
/// Prefix of the synthetic entries recording group membership
pub const GROUP_PATH_PREFIX: &str = "groups/";
/// How long grants from a login are considered valid
pub const MAX_PERMISSION_DAYS: i64 = 365;

/// `{"path": ..., "permissions": ...}` entry of a login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPermissionRecord {
    pub path: String,
    pub permissions: Permission,
}

/// `{"name": ..., "value": ...}` entry of the `limits` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitRecord {
    pub name: String,
    pub value: i64,
}

/// `{"name": ...}` entry of the `products` and `groups` lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRecord {
    pub name: String,
}

/// Payload of a successful `login` response.
///
/// `permissions` entries stay undecoded until they are needed; admins never
/// read them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRecord {
    #[serde(default)]
    pub permissions: Vec<Value>,
    #[serde(default)]
    pub limits: Vec<LimitRecord>,
    #[serde(default)]
    pub products: Vec<NamedRecord>,
    #[serde(default)]
    pub groups: Vec<NamedRecord>,
    #[serde(default)]
    pub admin: Option<bool>,
}

/// A single grant in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub permission: Permission,
    /// User the grant was issued to
    pub grantee: String,
    pub auxiliary: String,
    /// Informational only, never checked
    pub expires_at: DateTime<Utc>,
}

/// What a user may do, as reported by the store at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermissions {
    username: String,
    products: Vec<String>,
    limits: HashMap<String, i64>,
    admin: bool,
    grants: HashMap<String, PermissionGrant>,
}

impl UserPermissions {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            products: Vec::new(),
            limits: HashMap::new(),
            admin: false,
            grants: HashMap::new(),
        }
    }

    /// Build the registry from a login payload.
    ///
    /// Admins get a single wildcard grant instead of per-path grants; every
    /// group adds a read grant on `groups/<name>`. A malformed `permissions`
    /// entry of a non-admin login is a protocol error.
    pub fn from_login(username: impl Into<String>, login: &LoginRecord) -> BiostoreResult<Self> {
        let mut result = Self::new(username);
        result.products = login.products.iter().map(|p| p.name.clone()).collect();
        result.limits = login
            .limits
            .iter()
            .map(|limit| (limit.name.clone(), limit.value))
            .collect();
        result.admin = login.admin.unwrap_or(false);

        let expires_at = Utc::now() + Duration::days(MAX_PERMISSION_DAYS);
        if result.admin {
            result.grant(ROOT_PATH, Permission::ADMIN, expires_at);
        } else {
            for entry in &login.permissions {
                let record = PathPermissionRecord::deserialize(entry).map_err(|e| {
                    BiostoreError::protocol_contract(
                        format!("Malformed permission entry {}: {}", entry, e),
                        Some("permissions"),
                        ErrorContext::new("user_permissions"),
                    )
                })?;
                result.grant(&record.path, record.permissions, expires_at);
            }
        }
        for group in &login.groups {
            result.grant(
                &format!("{}{}", GROUP_PATH_PREFIX, group.name),
                Permission::READ,
                expires_at,
            );
        }

        Ok(result)
    }

    /// Record a grant for `path`, replacing any previous one
    pub fn grant(&mut self, path: &str, permission: Permission, expires_at: DateTime<Utc>) {
        let grant = PermissionGrant {
            permission,
            grantee: self.username.clone(),
            auxiliary: String::new(),
            expires_at,
        };
        self.grants.insert(path.to_string(), grant);
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn limits(&self) -> &HashMap<String, i64> {
        &self.limits
    }

    pub fn limit(&self, name: &str) -> Option<i64> {
        self.limits.get(name).copied()
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn grants(&self) -> &HashMap<String, PermissionGrant> {
        &self.grants
    }

    pub fn permission(&self, path: &str) -> Option<Permission> {
        self.grants.get(path).map(|grant| grant.permission)
    }

    /// Names of the groups the user belongs to
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = self
            .grants
            .keys()
            .filter_map(|path| path.strip_prefix(GROUP_PATH_PREFIX))
            .collect();
        groups.sort_unstable();
        groups
    }
}
