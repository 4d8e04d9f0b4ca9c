//! Permission evaluation and navigation gating
//!
//! All checks fail closed: a missing user is denied, never guessed at.
//!
//! The `"admin"` permission is a super-permission and satisfies every
//! permission check. Roles have no such override; holding the `admin`
//! permission does not grant any role, and an `admin` role grants
//! nothing beyond itself.
//!
//! ## Gate protocol
//!
//! ```text
//! authenticated? ──no──→ RedirectToLogin { return_to }
//!      │yes
//! permission ok? ──no──→ Denied (MissingPermission)
//!      │yes
//! role ok?       ──no──→ Denied (MissingRole)
//!      │yes
//!    Allow
//! ```
//!
//! The gate is evaluated from the current session on every call, so a
//! permission or role change takes effect on the next navigation.

use crate::session::SessionContext;
use crate::types::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Permission token that satisfies every permission check
pub const ADMIN_PERMISSION: &str = "admin";

/// Whether `user` holds `permission`, with the admin override
pub fn has_permission(user: Option<&User>, permission: &str) -> bool {
    let Some(user) = user else {
        return false;
    };
    if user.permissions.contains(ADMIN_PERMISSION) {
        return true;
    }
    user.permissions.contains(permission)
}

/// Whether `user` holds `role`; plain membership, no override
pub fn has_role(user: Option<&User>, role: &str) -> bool {
    user.is_some_and(|user| user.roles.contains(role))
}

/// Whether a user is present and the backing token is still valid
///
/// `token_valid` is only consulted when a user is present.
pub fn is_authenticated(user: Option<&User>, token_valid: impl FnOnce() -> bool) -> bool {
    user.is_some() && token_valid()
}

/// Permission and/or role a destination requires
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AccessRequirement {
    /// Requirement satisfied by any authenticated session
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Why an authenticated session was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum DenialReason {
    MissingPermission { permission: String },
    MissingRole { role: String },
}

/// Result of running the gate for one destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum AccessOutcome {
    /// Render the protected content
    Allow,
    /// Send to login, resuming at `return_to` afterwards
    #[serde(rename_all = "camelCase")]
    RedirectToLogin { return_to: String },
    /// Render a denial view in place; no redirect
    Denied { reason: DenialReason },
}

impl AccessOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessOutcome::Allow)
    }
}

/// Run the gate protocol for `destination`
pub fn guard(
    session: &SessionContext,
    requirement: &AccessRequirement,
    destination: &str,
) -> AccessOutcome {
    if !session.is_authenticated() {
        tracing::debug!(destination, "Unauthenticated, redirecting to login");
        return AccessOutcome::RedirectToLogin {
            return_to: destination.to_string(),
        };
    }

    if let Some(permission) = &requirement.permission {
        if !session.has_permission(permission) {
            tracing::debug!(destination, permission = %permission, "Access denied");
            return AccessOutcome::Denied {
                reason: DenialReason::MissingPermission {
                    permission: permission.clone(),
                },
            };
        }
    }

    if let Some(role) = &requirement.role {
        if !session.has_role(role) {
            tracing::debug!(destination, role = %role, "Access denied");
            return AccessOutcome::Denied {
                reason: DenialReason::MissingRole { role: role.clone() },
            };
        }
    }

    AccessOutcome::Allow
}

/// Reduce a navigation target to the path the table is keyed by
///
/// Drops any query string or fragment and trailing slashes; the root
/// stays `/`.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

/// Whether a registered route governs `path` (itself or a sub-path)
fn covers(route: &str, path: &str) -> bool {
    route == "/"
        || path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Navigation paths and what each requires
///
/// Paths are normalized on registration and lookup. A navigation is
/// governed by the longest registered route equal to it or one of its
/// parent segments, so `/policies/new` inherits `/policies`. Paths no
/// route covers only need an authenticated session.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, AccessRequirement>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the requirement for a path
    pub fn register(&mut self, path: impl Into<String>, requirement: AccessRequirement) {
        let path = path.into();
        self.routes.insert(normalize_path(&path).to_string(), requirement);
    }

    /// Builder form of [`RouteTable::register`]
    pub fn with_route(mut self, path: impl Into<String>, requirement: AccessRequirement) -> Self {
        self.register(path, requirement);
        self
    }

    /// Requirement registered for exactly this path
    pub fn requirement(&self, path: &str) -> Option<&AccessRequirement> {
        self.routes.get(normalize_path(path))
    }

    /// Requirement governing a navigation to `path`, if any route covers it
    pub fn governing(&self, path: &str) -> Option<(&str, &AccessRequirement)> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .filter(|(route, _)| covers(route, path))
            .max_by_key(|(route, _)| route.len())
            .map(|(route, requirement)| (route.as_str(), requirement))
    }

    /// Gate a navigation to `path`
    ///
    /// A redirect carries `path` as given, query string included.
    pub fn check(&self, session: &SessionContext, path: &str) -> AccessOutcome {
        match self.governing(path) {
            Some((_, requirement)) => guard(session, requirement, path),
            None => guard(session, &AccessRequirement::authenticated(), path),
        }
    }

    /// Registered paths the session may currently open, in path order
    pub fn visible_routes(&self, session: &SessionContext) -> Vec<&str> {
        self.routes
            .keys()
            .filter(|path| self.check(session, path).is_allowed())
            .map(String::as_str)
            .collect()
    }
}
