//! Route authorization guard.
//!
//! Pure, synchronous decisions: given a path and the caller's session
//! assertion, either allow the navigation or name the redirect target. No
//! suspension points, no panics, and never an error - a routing conflict is
//! always resolved as a redirect.
//!
//! The decision is idempotent by construction: applying [`decide`] to its
//! own redirect target with the same assertion always yields
//! [`Decision::Allow`], so redirect chains cannot loop.

use coopworks_core::Role;

use crate::session::SessionAssertion;

/// Member login page.
pub const LOGIN_PATH: &str = "/login";

/// Administrative login page.
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Page shown to administrative roles that open another role's area.
pub const UNAUTHORIZED_PATH: &str = "/admin/unauthorized";

/// What kind of path a navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable by anyone, authenticated or not.
    Public,
    /// Requires some identity, but is not namespaced by partition.
    AuthOnly,
    /// Administrative page shared by all seven administrative roles.
    AdminGeneric,
    /// Administrative area belonging to exactly one role.
    AdminRoleSpecific(Role),
    /// Member-partition page.
    MemberArea,
}

/// Outcome of a guard decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the navigation proceed.
    Allow,
    /// Send the caller elsewhere instead.
    RedirectTo(String),
}

impl Decision {
    fn redirect(path: &str) -> Self {
        Self::RedirectTo(path.to_owned())
    }
}

/// Role-specific administrative prefixes. `/admin/dashboard` is the admin
/// role's own area; the six sub-namespaces belong to the other six roles.
const ADMIN_ROLE_PREFIXES: [(&str, Role); 7] = [
    ("/admin/dashboard", Role::Admin),
    ("/admin/secretary", Role::Secretary),
    ("/admin/chairman", Role::Chairman),
    ("/admin/vice-chairman", Role::ViceChairman),
    ("/admin/manager", Role::Manager),
    ("/admin/treasurer", Role::Treasurer),
    ("/admin/bod", Role::BoardOfDirectors),
];

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
}

/// Bucket a path by who may reach it.
#[must_use]
pub fn classify(path: &str) -> RouteClass {
    let path = normalize(path);

    match path {
        "/" | "/login" | "/register" | "/admin/login" | "/admin/register" => {
            return RouteClass::Public;
        }
        _ => {}
    }

    for (prefix, role) in ADMIN_ROLE_PREFIXES {
        if under(path, prefix) {
            return RouteClass::AdminRoleSpecific(role);
        }
    }

    if under(path, "/admin") {
        return RouteClass::AdminGeneric;
    }

    if under(path, "/dashboard") || under(path, "/driver") || under(path, "/operator") {
        return RouteClass::MemberArea;
    }

    RouteClass::AuthOnly
}

/// Decide whether a navigation may proceed.
///
/// Rules, in order:
/// 1. Public paths are always allowed.
/// 2. No usable identity (anonymous or corrupt pair) on a protected path
///    redirects to the matching login variant.
/// 3. A member role on any administrative path goes back to its own
///    dashboard.
/// 4. An administrative role on another role's specific area goes to the
///    unauthorized page.
/// 5. An administrative role on the member dashboard root goes to its own
///    administrative dashboard.
/// 6. Everything else is allowed.
#[must_use]
pub fn decide(path: &str, assertion: &SessionAssertion) -> Decision {
    let class = classify(path);

    if class == RouteClass::Public {
        return Decision::Allow;
    }

    // Fail closed: a corrupt pair gets the same treatment as no pair.
    let Some(role) = assertion.role() else {
        return match class {
            RouteClass::AdminGeneric | RouteClass::AdminRoleSpecific(_) => {
                Decision::redirect(ADMIN_LOGIN_PATH)
            }
            _ => Decision::redirect(LOGIN_PATH),
        };
    };

    if role.is_member() {
        return match class {
            RouteClass::AdminGeneric | RouteClass::AdminRoleSpecific(_) => {
                Decision::redirect(role.dashboard_path())
            }
            _ => Decision::Allow,
        };
    }

    match class {
        RouteClass::AdminRoleSpecific(owner) if owner != role => {
            Decision::redirect(UNAUTHORIZED_PATH)
        }
        RouteClass::MemberArea if normalize(path) == "/dashboard" => {
            Decision::redirect(role.dashboard_path())
        }
        _ => Decision::Allow,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coopworks_core::AccountId;

    use super::*;

    fn user(role: Role) -> SessionAssertion {
        SessionAssertion::User {
            id: AccountId::from_raw("acct"),
            role,
        }
    }

    #[test]
    fn test_classify_public_paths() {
        for path in ["/", "/login", "/register", "/admin/login", "/admin/register"] {
            assert_eq!(classify(path), RouteClass::Public, "{path}");
        }
    }

    #[test]
    fn test_classify_role_specific_areas() {
        assert_eq!(
            classify("/admin/dashboard"),
            RouteClass::AdminRoleSpecific(Role::Admin)
        );
        assert_eq!(
            classify("/admin/secretary/members/records"),
            RouteClass::AdminRoleSpecific(Role::Secretary)
        );
        assert_eq!(
            classify("/admin/vice-chairman/home"),
            RouteClass::AdminRoleSpecific(Role::ViceChairman)
        );
        assert_eq!(
            classify("/admin/bod/home"),
            RouteClass::AdminRoleSpecific(Role::BoardOfDirectors)
        );
        // "/admin/chairman" must not swallow the vice chairman's area.
        assert_eq!(
            classify("/admin/chairman/home"),
            RouteClass::AdminRoleSpecific(Role::Chairman)
        );
    }

    #[test]
    fn test_classify_generic_and_member_areas() {
        assert_eq!(classify("/admin/loans/records"), RouteClass::AdminGeneric);
        assert_eq!(classify("/admin/unauthorized"), RouteClass::AdminGeneric);
        assert_eq!(classify("/dashboard"), RouteClass::MemberArea);
        assert_eq!(classify("/dashboard/savings"), RouteClass::MemberArea);
        assert_eq!(classify("/driver/dashboard"), RouteClass::MemberArea);
        assert_eq!(classify("/operator/dashboard"), RouteClass::MemberArea);
        assert_eq!(classify("/profile"), RouteClass::AuthOnly);
    }

    #[test]
    fn test_trailing_slash_is_insignificant() {
        assert_eq!(classify("/login/"), RouteClass::Public);
        assert_eq!(classify("/dashboard/"), RouteClass::MemberArea);
    }

    #[test]
    fn test_anonymous_redirected_to_matching_login() {
        let anon = SessionAssertion::Anonymous;
        assert_eq!(
            decide("/admin/loans/records", &anon),
            Decision::RedirectTo("/admin/login".to_owned())
        );
        assert_eq!(
            decide("/profile", &anon),
            Decision::RedirectTo("/login".to_owned())
        );
        assert_eq!(
            decide("/dashboard", &anon),
            Decision::RedirectTo("/login".to_owned())
        );
        assert_eq!(decide("/login", &anon), Decision::Allow);
        assert_eq!(decide("/admin/register", &anon), Decision::Allow);
    }

    #[test]
    fn test_corrupt_assertion_fails_closed() {
        let corrupt = SessionAssertion::Corrupt;
        assert_eq!(
            decide("/admin/dashboard", &corrupt),
            Decision::RedirectTo("/admin/login".to_owned())
        );
        assert_eq!(
            decide("/profile", &corrupt),
            Decision::RedirectTo("/login".to_owned())
        );
        assert_eq!(decide("/", &corrupt), Decision::Allow);
    }

    #[test]
    fn test_member_pushed_out_of_admin_namespace() {
        assert_eq!(
            decide("/admin/loans/records", &user(Role::Member)),
            Decision::RedirectTo("/dashboard".to_owned())
        );
        assert_eq!(
            decide("/admin/secretary/home", &user(Role::Driver)),
            Decision::RedirectTo("/driver/dashboard".to_owned())
        );
        // Admin login/register stay reachable for members (public).
        assert_eq!(decide("/admin/login", &user(Role::Member)), Decision::Allow);
    }

    #[test]
    fn test_member_allowed_in_member_namespace() {
        assert_eq!(decide("/dashboard", &user(Role::Member)), Decision::Allow);
        assert_eq!(
            decide("/operator/dashboard", &user(Role::Operator)),
            Decision::Allow
        );
        assert_eq!(decide("/profile", &user(Role::Driver)), Decision::Allow);
    }

    #[test]
    fn test_admin_roles_cross_role_area_is_unauthorized() {
        assert_eq!(
            decide("/admin/secretary/members/records", &user(Role::Chairman)),
            Decision::RedirectTo("/admin/unauthorized".to_owned())
        );
        assert_eq!(
            decide("/admin/dashboard", &user(Role::Treasurer)),
            Decision::RedirectTo("/admin/unauthorized".to_owned())
        );
    }

    #[test]
    fn test_admin_roles_own_area_and_generic_allowed() {
        assert_eq!(
            decide("/admin/secretary/home", &user(Role::Secretary)),
            Decision::Allow
        );
        assert_eq!(
            decide("/admin/loans/records", &user(Role::Chairman)),
            Decision::Allow
        );
        assert_eq!(
            decide("/admin/unauthorized", &user(Role::Manager)),
            Decision::Allow
        );
    }

    #[test]
    fn test_admin_roles_bounced_from_member_dashboard_root() {
        assert_eq!(
            decide("/dashboard", &user(Role::Secretary)),
            Decision::RedirectTo("/admin/secretary/home".to_owned())
        );
        // Only the root bounces; deeper member pages are not remapped.
        assert_eq!(
            decide("/dashboard/savings", &user(Role::Secretary)),
            Decision::Allow
        );
    }

    #[test]
    fn test_decide_is_idempotent_for_every_path_and_identity() {
        let paths = [
            "/",
            "/login",
            "/register",
            "/admin/login",
            "/admin/register",
            "/admin/dashboard",
            "/admin/secretary/home",
            "/admin/secretary/members/records",
            "/admin/chairman/home",
            "/admin/vice-chairman/home",
            "/admin/manager/home",
            "/admin/treasurer/home",
            "/admin/bod/home",
            "/admin/loans/records",
            "/admin/loans/approvals",
            "/admin/unauthorized",
            "/dashboard",
            "/dashboard/savings",
            "/driver/dashboard",
            "/operator/dashboard",
            "/profile",
            "/settings/notifications",
        ];

        let mut assertions = vec![SessionAssertion::Anonymous, SessionAssertion::Corrupt];
        assertions.extend(Role::ALL.into_iter().map(user));

        for assertion in &assertions {
            for path in paths {
                if let Decision::RedirectTo(target) = decide(path, assertion) {
                    assert_eq!(
                        decide(&target, assertion),
                        Decision::Allow,
                        "loop: {path} -> {target} under {assertion:?}"
                    );
                }
            }
        }
    }
}
