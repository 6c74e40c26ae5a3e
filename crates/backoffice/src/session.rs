//! Client-held session assertion.
//!
//! A session is not a server object: it is a pair of unsigned, percent-
//! encoded cookie values (account id and role) that are always written and
//! cleared together, with a fixed 7-day lifetime. The pair is trusted until
//! the next full application load, which revalidates it against the account
//! store through `GET /api/auth/session`.
//!
//! Known gap, reproduced from the reference behavior: the pair is unsigned
//! and not revalidated per request, so a revoked account can remain
//! "logged in" client-side until the next full reload. See DESIGN.md.

use axum::http::header::{COOKIE, HeaderMap, HeaderName, SET_COOKIE};
use axum::response::AppendHeaders;

use coopworks_core::{AccountId, Identity, Role};

/// Cookie carrying the account id.
pub const ACCOUNT_COOKIE: &str = "coop_uid";

/// Cookie carrying the role.
pub const ROLE_COOKIE: &str = "coop_role";

/// Fixed session lifetime: 7 days.
pub const SESSION_LIFETIME_SECONDS: u64 = 604_800;

/// What the cookie pair asserts about the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAssertion {
    /// Neither half of the pair is present.
    Anonymous,
    /// The pair is present but unusable: one half missing, undecodable, or
    /// a role outside the enumeration. Treated as unauthenticated and
    /// redirected to login (fail closed).
    Corrupt,
    /// A complete, well-formed pair.
    User {
        /// Asserted account id.
        id: AccountId,
        /// Asserted role.
        role: Role,
    },
}

impl SessionAssertion {
    /// The asserted role, if the pair is well-formed.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::User { role, .. } => Some(*role),
            Self::Anonymous | Self::Corrupt => None,
        }
    }
}

fn set_cookie(name: &str, value: &str, max_age: u64) -> String {
    format!(
        "{name}={}; Max-Age={max_age}; Path=/; SameSite=Lax",
        urlencoding::encode(value)
    )
}

/// Headers establishing the session pair for an identity.
///
/// Both halves are written together, path-scoped globally, with the fixed
/// 7-day lifetime.
#[must_use]
pub fn issue(identity: &Identity) -> AppendHeaders<[(HeaderName, String); 2]> {
    AppendHeaders([
        (
            SET_COOKIE,
            set_cookie(
                ACCOUNT_COOKIE,
                identity.id.as_str(),
                SESSION_LIFETIME_SECONDS,
            ),
        ),
        (
            SET_COOKIE,
            set_cookie(ROLE_COOKIE, identity.role.as_str(), SESSION_LIFETIME_SECONDS),
        ),
    ])
}

/// Headers removing the session pair. Used by logout and by the
/// session-restore endpoint when revalidation fails.
#[must_use]
pub fn clear() -> AppendHeaders<[(HeaderName, String); 2]> {
    AppendHeaders([
        (SET_COOKIE, set_cookie(ACCOUNT_COOKIE, "", 0)),
        (SET_COOKIE, set_cookie(ROLE_COOKIE, "", 0)),
    ])
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=')
                && key == name
            {
                return Some(value);
            }
        }
    }
    None
}

/// Read the session pair from request headers.
///
/// The halves are never interpreted independently: a lone half, an
/// undecodable value, or an unrecognized role all yield
/// [`SessionAssertion::Corrupt`].
#[must_use]
pub fn read(headers: &HeaderMap) -> SessionAssertion {
    let id = cookie_value(headers, ACCOUNT_COOKIE);
    let role = cookie_value(headers, ROLE_COOKIE);

    let (id, role) = match (id, role) {
        (None, None) => return SessionAssertion::Anonymous,
        (Some(id), Some(role)) => (id, role),
        _ => return SessionAssertion::Corrupt,
    };

    let (Ok(id), Ok(role)) = (urlencoding::decode(id), urlencoding::decode(role)) else {
        return SessionAssertion::Corrupt;
    };

    if id.is_empty() {
        return SessionAssertion::Corrupt;
    }

    match Role::parse(&role) {
        Ok(role) => SessionAssertion::User {
            id: AccountId::from_raw(id.into_owned()),
            role,
        },
        Err(_) => SessionAssertion::Corrupt,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use coopworks_core::Email;

    use super::*;

    fn identity(role: Role) -> Identity {
        let email = Email::parse("person@coop.example").unwrap();
        Identity {
            id: AccountId::for_email(&email),
            email,
            display_name: None,
            role,
            last_login: None,
        }
    }

    fn request_headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    /// Extract `name=value` from a Set-Cookie line.
    fn cookie_pair(set_cookie: &str) -> &str {
        set_cookie.split(';').next().unwrap()
    }

    #[test]
    fn test_issue_writes_both_halves_with_lifetime() {
        let AppendHeaders([(_, uid), (_, role)]) = issue(&identity(Role::Treasurer));
        assert!(uid.starts_with("coop_uid="));
        assert!(role.starts_with("coop_role="));
        assert!(uid.contains("Max-Age=604800"));
        assert!(role.contains("Max-Age=604800"));
        assert!(uid.contains("Path=/"));
        assert!(role.contains("Path=/"));
    }

    #[test]
    fn test_issue_then_read_roundtrip() {
        let AppendHeaders([(_, uid), (_, role)]) = issue(&identity(Role::BoardOfDirectors));
        // Spaces in the role must be percent-encoded on the wire.
        assert!(role.contains("board%20of%20directors"));

        let cookie = format!("{}; {}", cookie_pair(&uid), cookie_pair(&role));
        let assertion = read(&request_headers(&cookie));
        assert_eq!(
            assertion,
            SessionAssertion::User {
                id: identity(Role::BoardOfDirectors).id,
                role: Role::BoardOfDirectors,
            }
        );
    }

    #[test]
    fn test_clear_expires_both_halves() {
        let AppendHeaders([(_, uid), (_, role)]) = clear();
        assert!(uid.contains("Max-Age=0"));
        assert!(role.contains("Max-Age=0"));
    }

    #[test]
    fn test_reload_after_clear_is_anonymous() {
        // After clear() the browser drops both cookies; a reload sends none.
        assert_eq!(read(&HeaderMap::new()), SessionAssertion::Anonymous);
    }

    #[test]
    fn test_lone_half_is_corrupt() {
        assert_eq!(
            read(&request_headers("coop_uid=abc")),
            SessionAssertion::Corrupt
        );
        assert_eq!(
            read(&request_headers("coop_role=member")),
            SessionAssertion::Corrupt
        );
    }

    #[test]
    fn test_unknown_role_is_corrupt() {
        assert_eq!(
            read(&request_headers("coop_uid=abc; coop_role=superuser")),
            SessionAssertion::Corrupt
        );
    }

    #[test]
    fn test_empty_id_is_corrupt() {
        assert_eq!(
            read(&request_headers("coop_uid=; coop_role=member")),
            SessionAssertion::Corrupt
        );
    }

    #[test]
    fn test_read_tolerates_unrelated_cookies() {
        let cookie = "theme=dark; coop_uid=abc; other=1; coop_role=driver";
        assert_eq!(
            read(&request_headers(cookie)),
            SessionAssertion::User {
                id: AccountId::from_raw("abc"),
                role: Role::Driver,
            }
        );
    }
}
