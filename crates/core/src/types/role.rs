//! The closed role enumeration and the role-to-dashboard resolver.
//!
//! Roles arrive from the store and from session cookies as free text, so the
//! parser normalizes casing and whitespace before matching. Everything that
//! partitions roles (the route guard, the dashboard resolver, registration
//! checks) consumes this one enumeration; there is no string matching against
//! role names anywhere else.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Role`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleParseError {
    /// The input was empty or whitespace-only.
    #[error("role is missing")]
    Missing,
    /// The input is not one of the ten recognized roles.
    #[error("unrecognized role: {0:?}")]
    Unknown(String),
}

/// Classification of an account, fixed to exactly ten values.
///
/// Seven administrative roles gate the `/admin` namespace; three member roles
/// gate the member namespace. A role string outside this set is treated as a
/// hard authentication failure everywhere (fail closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Secretary,
    Chairman,
    ViceChairman,
    Manager,
    Treasurer,
    BoardOfDirectors,
    Member,
    Driver,
    Operator,
}

/// The seven administrative roles.
pub const ADMINISTRATIVE_ROLES: [Role; 7] = [
    Role::Admin,
    Role::Secretary,
    Role::Chairman,
    Role::ViceChairman,
    Role::Manager,
    Role::Treasurer,
    Role::BoardOfDirectors,
];

/// The three member roles.
pub const MEMBER_ROLES: [Role; 3] = [Role::Member, Role::Driver, Role::Operator];

impl Role {
    /// All ten roles, administrative first.
    pub const ALL: [Self; 10] = [
        Self::Admin,
        Self::Secretary,
        Self::Chairman,
        Self::ViceChairman,
        Self::Manager,
        Self::Treasurer,
        Self::BoardOfDirectors,
        Self::Member,
        Self::Driver,
        Self::Operator,
    ];

    /// Parse a role from free text.
    ///
    /// Normalizes by trimming, lowercasing and collapsing interior whitespace
    /// runs, so `"  Board  of Directors "` parses to
    /// [`Role::BoardOfDirectors`].
    ///
    /// # Errors
    ///
    /// Returns [`RoleParseError::Missing`] for empty/whitespace-only input
    /// and [`RoleParseError::Unknown`] for anything outside the ten values.
    pub fn parse(s: &str) -> Result<Self, RoleParseError> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        match normalized.as_str() {
            "" => Err(RoleParseError::Missing),
            "admin" => Ok(Self::Admin),
            "secretary" => Ok(Self::Secretary),
            "chairman" => Ok(Self::Chairman),
            "vice chairman" => Ok(Self::ViceChairman),
            "manager" => Ok(Self::Manager),
            "treasurer" => Ok(Self::Treasurer),
            "board of directors" => Ok(Self::BoardOfDirectors),
            "member" => Ok(Self::Member),
            "driver" => Ok(Self::Driver),
            "operator" => Ok(Self::Operator),
            _ => Err(RoleParseError::Unknown(s.trim().to_owned())),
        }
    }

    /// Canonical lowercase form, as persisted in the store and in the
    /// session cookie.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Secretary => "secretary",
            Self::Chairman => "chairman",
            Self::ViceChairman => "vice chairman",
            Self::Manager => "manager",
            Self::Treasurer => "treasurer",
            Self::BoardOfDirectors => "board of directors",
            Self::Member => "member",
            Self::Driver => "driver",
            Self::Operator => "operator",
        }
    }

    /// Whether this role belongs to the administrative partition.
    #[must_use]
    pub const fn is_administrative(self) -> bool {
        matches!(
            self,
            Self::Admin
                | Self::Secretary
                | Self::Chairman
                | Self::ViceChairman
                | Self::Manager
                | Self::Treasurer
                | Self::BoardOfDirectors
        )
    }

    /// Whether this role belongs to the member partition.
    #[must_use]
    pub const fn is_member(self) -> bool {
        !self.is_administrative()
    }

    /// Canonical landing path for this role.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin/dashboard",
            Self::Secretary => "/admin/secretary/home",
            Self::Chairman => "/admin/chairman/home",
            Self::ViceChairman => "/admin/vice-chairman/home",
            Self::Manager => "/admin/manager/home",
            Self::Treasurer => "/admin/treasurer/home",
            Self::BoardOfDirectors => "/admin/bod/home",
            Self::Driver => "/driver/dashboard",
            Self::Operator => "/operator/dashboard",
            Self::Member => "/dashboard",
        }
    }
}

/// Resolve a free-text role to its landing path.
///
/// Pure and total: unparseable input (including empty) maps to `/login`
/// instead of failing, so callers can hand it anything read from storage.
#[must_use]
pub fn dashboard_path_for(role_text: &str) -> &'static str {
    Role::parse(role_text).map_or("/login", Role::dashboard_path)
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_forms() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn test_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(Role::parse("  Secretary ").unwrap(), Role::Secretary);
        assert_eq!(Role::parse("VICE CHAIRMAN").unwrap(), Role::ViceChairman);
        assert_eq!(
            Role::parse(" Board  of  Directors ").unwrap(),
            Role::BoardOfDirectors
        );
        assert_eq!(Role::parse("\tOperator\n").unwrap(), Role::Operator);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            Role::parse("superuser"),
            Err(RoleParseError::Unknown(_))
        ));
        assert!(matches!(
            Role::parse("vicechairman"),
            Err(RoleParseError::Unknown(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing() {
        assert_eq!(Role::parse(""), Err(RoleParseError::Missing));
        assert_eq!(Role::parse("   "), Err(RoleParseError::Missing));
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        for role in ADMINISTRATIVE_ROLES {
            assert!(role.is_administrative());
            assert!(!role.is_member());
        }
        for role in MEMBER_ROLES {
            assert!(role.is_member());
            assert!(!role.is_administrative());
        }
        assert_eq!(ADMINISTRATIVE_ROLES.len() + MEMBER_ROLES.len(), 10);
    }

    #[test]
    fn test_dashboard_table() {
        let expected = [
            (Role::Admin, "/admin/dashboard"),
            (Role::Secretary, "/admin/secretary/home"),
            (Role::Chairman, "/admin/chairman/home"),
            (Role::ViceChairman, "/admin/vice-chairman/home"),
            (Role::Manager, "/admin/manager/home"),
            (Role::Treasurer, "/admin/treasurer/home"),
            (Role::BoardOfDirectors, "/admin/bod/home"),
            (Role::Driver, "/driver/dashboard"),
            (Role::Operator, "/operator/dashboard"),
            (Role::Member, "/dashboard"),
        ];
        for (role, path) in expected {
            assert_eq!(role.dashboard_path(), path);
        }
    }

    #[test]
    fn test_resolver_handles_arbitrary_casing() {
        // Every enumerated role resolves under arbitrary casing/whitespace.
        for role in Role::ALL {
            let messy = format!("  {} ", role.as_str().to_uppercase());
            assert_eq!(dashboard_path_for(&messy), role.dashboard_path());
        }
    }

    #[test]
    fn test_resolver_spaced_secretary() {
        assert_eq!(dashboard_path_for("  Secretary "), "/admin/secretary/home");
    }

    #[test]
    fn test_resolver_falls_back_to_login() {
        assert_eq!(dashboard_path_for(""), "/login");
        assert_eq!(dashboard_path_for("   "), "/login");
        assert_eq!(dashboard_path_for("intruder"), "/login");
        assert_eq!(dashboard_path_for("members"), "/login");
    }

    #[test]
    fn test_serde_uses_canonical_strings() {
        let json = serde_json::to_string(&Role::BoardOfDirectors).unwrap();
        assert_eq!(json, "\"board of directors\"");

        let parsed: Role = serde_json::from_str("\" Vice  Chairman \"").unwrap();
        assert_eq!(parsed, Role::ViceChairman);

        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }
}
