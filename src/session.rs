//! Session context: the explicit authentication state for one client
//!
//! A `SessionContext` is created empty when the console loads, filled on
//! login, and cleared on logout. Callers pass it by reference to the
//! access checks instead of reading a shared global.

use crate::access;
use crate::types::User;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// External signal telling whether the backing session token is valid
pub trait TokenValidator: Send + Sync {
    fn is_token_valid(&self) -> bool;
}

impl<F> TokenValidator for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_token_valid(&self) -> bool {
        self()
    }
}

/// Token that is valid until a fixed instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiringToken {
    expires_at: DateTime<Utc>,
}

impl ExpiringToken {
    pub fn new(expires_at: DateTime<Utc>) -> Self {
        Self { expires_at }
    }

    /// Token expiring `ttl` from now
    pub fn valid_for(ttl: chrono::Duration) -> Self {
        Self::new(Utc::now() + ttl)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl TokenValidator for ExpiringToken {
    fn is_token_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Authentication state for one console session
#[derive(Default)]
pub struct SessionContext {
    session_id: Option<String>,
    user: Option<User>,
    validator: Option<Arc<dyn TokenValidator>>,
}

impl SessionContext {
    /// Create an empty (signed-out) session
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign in, replacing any previous user; returns the new session id
    pub fn login(&mut self, user: User, validator: impl TokenValidator + 'static) -> &str {
        let session_id = format!("sess-{}", uuid::Uuid::new_v4());

        tracing::info!(
            session = %session_id,
            user = %user.id,
            permissions = user.permissions.len(),
            roles = user.roles.len(),
            "Session started"
        );

        self.user = Some(user);
        self.validator = Some(Arc::new(validator));
        self.session_id.insert(session_id).as_str()
    }

    /// Replace the signed-in user's record (e.g., after a role change)
    ///
    /// Returns `false` and changes nothing when signed out.
    pub fn update_user(&mut self, user: User) -> bool {
        match self.user.as_mut() {
            Some(current) => {
                tracing::debug!(user = %user.id, "Session user updated");
                *current = user;
                true
            }
            None => false,
        }
    }

    /// Sign out and forget the user and token
    pub fn logout(&mut self) {
        if let Some(session_id) = self.session_id.take() {
            tracing::info!(session = %session_id, "Session ended");
        }
        self.user = None;
        self.validator = None;
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// User present and token still valid
    pub fn is_authenticated(&self) -> bool {
        access::is_authenticated(self.user(), || {
            self.validator
                .as_ref()
                .is_some_and(|validator| validator.is_token_valid())
        })
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        access::has_permission(self.user(), permission)
    }

    pub fn has_role(&self, role: &str) -> bool {
        access::has_role(self.user(), role)
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("session_id", &self.session_id)
            .field("user", &self.user)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn analyst() -> User {
        User::new("u-1", "alice")
            .with_permission("read")
            .with_role("analyst")
    }

    #[test]
    fn test_new_session_is_signed_out() {
        let session = SessionContext::new();
        assert!(session.user().is_none());
        assert!(session.session_id().is_none());
        assert!(!session.is_authenticated());
        assert!(!session.has_permission("read"));
        assert!(!session.has_role("analyst"));
    }

    #[test]
    fn test_login_assigns_session_id() {
        let mut session = SessionContext::new();
        let id = session.login(analyst(), || true).to_string();

        assert!(id.starts_with("sess-"));
        assert_eq!(session.session_id(), Some(id.as_str()));
        assert!(session.is_authenticated());
        assert!(session.has_permission("read"));
        assert!(session.has_role("analyst"));
    }

    #[test]
    fn test_relogin_rotates_session_id() {
        let mut session = SessionContext::new();
        let first = session.login(analyst(), || true).to_string();
        let second = session.login(analyst(), || true).to_string();
        assert_ne!(first, second);
    }

    #[test]
    fn test_logout_clears_everything() {
        let mut session = SessionContext::new();
        session.login(analyst(), || true);
        session.logout();

        assert!(session.user().is_none());
        assert!(session.session_id().is_none());
        assert!(!session.is_authenticated());
        assert!(!session.has_permission("read"));
    }

    #[test]
    fn test_token_validity_is_live() {
        let valid = Arc::new(AtomicBool::new(true));
        let flag = valid.clone();

        let mut session = SessionContext::new();
        session.login(analyst(), move || flag.load(Ordering::SeqCst));
        assert!(session.is_authenticated());

        valid.store(false, Ordering::SeqCst);
        assert!(!session.is_authenticated());
        // permission checks do not depend on token validity
        assert!(session.has_permission("read"));
    }

    #[test]
    fn test_update_user_reevaluates() {
        let mut session = SessionContext::new();
        session.login(analyst(), || true);
        assert!(!session.has_role("auditor"));

        assert!(session.update_user(analyst().with_role("auditor")));
        assert!(session.has_role("auditor"));

        let mut demoted = analyst();
        demoted.roles.clear();
        session.update_user(demoted);
        assert!(!session.has_role("analyst"));
    }

    #[test]
    fn test_update_user_signed_out_is_noop() {
        let mut session = SessionContext::new();
        assert!(!session.update_user(analyst()));
        assert!(session.user().is_none());
    }

    #[test]
    fn test_expiring_token() {
        let live = ExpiringToken::valid_for(chrono::Duration::minutes(5));
        assert!(live.is_token_valid());
        assert!(live.expires_at() > Utc::now());

        let expired = ExpiringToken::new(Utc::now() - chrono::Duration::seconds(1));
        assert!(!expired.is_token_valid());

        let mut session = SessionContext::new();
        session.login(analyst(), expired);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_debug_hides_validator() {
        let mut session = SessionContext::new();
        session.login(analyst(), || true);
        let debug = format!("{:?}", session);
        assert!(debug.contains("has_validator: true"));
        assert!(debug.contains("alice"));
    }
}
