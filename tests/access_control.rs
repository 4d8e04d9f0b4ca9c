//! Access control integration tests
//!
//! Drives the navigation gate through a full session lifecycle: signed
//! out, login, permission change, token expiry, and logout.

use a3s_watch::{
    guard, has_permission, has_role, AccessOutcome, AccessRequirement, DenialReason,
    ExpiringToken, RouteTable, SessionContext, User, ADMIN_PERMISSION,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn console_routes() -> RouteTable {
    RouteTable::new()
        .with_route("/documents", AccessRequirement::authenticated().with_permission("read"))
        .with_route(
            "/documents/upload",
            AccessRequirement::authenticated().with_permission("create"),
        )
        .with_route("/logs", AccessRequirement::authenticated().with_permission("read"))
        .with_route(
            "/policies",
            AccessRequirement::authenticated().with_permission(ADMIN_PERMISSION),
        )
        .with_route(
            "/users",
            AccessRequirement::authenticated()
                .with_permission(ADMIN_PERMISSION)
                .with_role("user_manager"),
        )
}

fn analyst() -> User {
    User::new("u-10", "dana")
        .with_permission("read")
        .with_role("analyst")
}

fn administrator() -> User {
    User::new("u-1", "root").with_permission(ADMIN_PERMISSION)
}

#[test]
fn test_signed_out_redirect_carries_destination() {
    let routes = console_routes();
    let session = SessionContext::new();

    assert_eq!(
        routes.check(&session, "/documents/upload"),
        AccessOutcome::RedirectToLogin {
            return_to: "/documents/upload".to_string()
        }
    );
    assert!(routes.visible_routes(&session).is_empty());
}

#[test]
fn test_signed_in_without_permission_is_denied_not_redirected() {
    let routes = console_routes();
    let mut session = SessionContext::new();
    session.login(analyst(), ExpiringToken::valid_for(chrono::Duration::hours(1)));

    assert!(routes.check(&session, "/logs").is_allowed());
    assert_eq!(
        routes.check(&session, "/documents/upload"),
        AccessOutcome::Denied {
            reason: DenialReason::MissingPermission {
                permission: "create".to_string()
            }
        }
    );
    assert_eq!(routes.visible_routes(&session), vec!["/documents", "/logs"]);
}

#[test]
fn test_admin_permission_does_not_imply_roles() {
    let routes = console_routes();
    let mut session = SessionContext::new();
    session.login(administrator(), || true);

    assert!(routes.check(&session, "/policies").is_allowed());
    assert!(routes.check(&session, "/documents/upload").is_allowed());
    assert_eq!(
        routes.check(&session, "/users"),
        AccessOutcome::Denied {
            reason: DenialReason::MissingRole {
                role: "user_manager".to_string()
            }
        }
    );

    session.update_user(administrator().with_role("user_manager"));
    assert!(routes.check(&session, "/users").is_allowed());
}

#[test]
fn test_permission_change_applies_on_next_navigation() {
    let routes = console_routes();
    let mut session = SessionContext::new();
    session.login(analyst(), || true);
    assert!(!routes.check(&session, "/documents/upload").is_allowed());

    session.update_user(analyst().with_permission("create"));
    assert!(routes.check(&session, "/documents/upload").is_allowed());

    session.update_user(User::new("u-10", "dana"));
    assert!(!routes.check(&session, "/logs").is_allowed());
}

#[test]
fn test_token_expiry_forces_login() {
    let routes = console_routes();
    let valid = Arc::new(AtomicBool::new(true));
    let flag = valid.clone();

    let mut session = SessionContext::new();
    session.login(analyst(), move || flag.load(Ordering::SeqCst));
    assert!(routes.check(&session, "/logs").is_allowed());

    valid.store(false, Ordering::SeqCst);
    assert_eq!(
        routes.check(&session, "/logs"),
        AccessOutcome::RedirectToLogin {
            return_to: "/logs".to_string()
        }
    );
}

#[test]
fn test_logout_returns_to_redirects() {
    let routes = console_routes();
    let mut session = SessionContext::new();
    session.login(administrator(), || true);
    assert_eq!(routes.visible_routes(&session).len(), 4);

    session.logout();
    assert!(matches!(
        routes.check(&session, "/logs"),
        AccessOutcome::RedirectToLogin { .. }
    ));
}

#[test]
fn test_action_gate_without_route() {
    let mut session = SessionContext::new();
    session.login(analyst(), || true);

    let delete_policy = AccessRequirement::authenticated().with_permission("delete");
    assert!(!guard(&session, &delete_policy, "policy:42/delete").is_allowed());

    let read_logs = AccessRequirement::authenticated().with_role("analyst");
    assert!(guard(&session, &read_logs, "logs:export").is_allowed());
}

#[test]
fn test_admin_override_covers_every_token() {
    let admin = administrator();
    let tokens = ["read", "create", "update", "delete", "export", "x-unknown"];
    for token in tokens {
        assert!(has_permission(Some(&admin), token));
    }

    let user = analyst();
    for token in tokens {
        assert_eq!(
            has_permission(Some(&user), token),
            user.permissions.contains(token)
        );
    }
}

#[test]
fn test_roles_fail_closed() {
    assert!(!has_role(None, "analyst"));
    assert!(!has_role(Some(&administrator()), "analyst"));
    assert!(has_role(Some(&analyst()), "analyst"));
}

#[test]
fn test_near_miss_paths_inherit_route_requirement() {
    let routes = console_routes();
    let mut session = SessionContext::new();
    session.login(analyst(), || true);

    for path in [
        "/policies/",
        "/policies?tab=edit",
        "/policies#x",
        "/policies/new",
        "/users/42/edit",
    ] {
        assert!(
            matches!(routes.check(&session, path), AccessOutcome::Denied { .. }),
            "{}",
            path
        );
    }

    assert!(routes.check(&session, "/logs/?search=drop").is_allowed());
    assert_eq!(
        routes.check(&session, "/documents/upload/"),
        AccessOutcome::Denied {
            reason: DenialReason::MissingPermission {
                permission: "create".to_string()
            }
        }
    );
}
