//! Caller identity and privilege checks
//!
//! The hub does not decide who holds which privilege. It asks an
//! [`Authorizer`] and resolves the caller's principal from the token,
//! falling back to the configured default user.

use std::collections::HashSet;

/// Identity token presented by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthToken {
    /// Authenticated principal, if any
    pub principal: Option<String>,
}

impl AuthToken {
    /// Create a token for a principal
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(principal.into()),
        }
    }

    /// Create a token without a principal
    pub fn anonymous() -> Self {
        Self { principal: None }
    }
}

/// System-level privileges checked by the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemPrivilege {
    /// Create any processor and connect any session to any processor
    ControlProcessor,
}

/// Capability check consulted before mutating operations
pub trait Authorizer: Send + Sync {
    /// Whether the caller holds `privilege`
    fn has_privilege(&self, token: Option<&AuthToken>, privilege: SystemPrivilege) -> bool;
}

/// Resolve the caller principal, falling back to `default_user`
pub fn resolve_principal(token: Option<&AuthToken>, default_user: &str) -> String {
    token
        .and_then(|t| t.principal.clone())
        .unwrap_or_else(|| default_user.to_string())
}

/// Authorizer granting every privilege to a fixed set of principals
#[derive(Debug, Clone, Default)]
pub struct PrivilegedUsers {
    users: HashSet<String>,
}

impl PrivilegedUsers {
    /// Create an authorizer with no privileged principals
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant all privileges to `principal`
    pub fn with_user(mut self, principal: impl Into<String>) -> Self {
        self.users.insert(principal.into());
        self
    }
}

impl Authorizer for PrivilegedUsers {
    fn has_privilege(&self, token: Option<&AuthToken>, _privilege: SystemPrivilege) -> bool {
        token
            .and_then(|t| t.principal.as_ref())
            .is_some_and(|p| self.users.contains(p))
    }
}
