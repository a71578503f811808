//! Platform roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Platform role, ordered by privilege: `User < Moderator < Admin`.
///
/// Serialized by its canonical name (`"User"`, `"Moderator"`, `"Admin"`), which
/// is also the value stored in the `roles` table and carried in token claims.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Role {
    /// Regular account.
    #[default]
    User,
    /// May edit any post or comment.
    Moderator,
    /// Full platform administration.
    Admin,
}

impl Role {
    /// Canonical role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Moderator => "Moderator",
            Self::Admin => "Admin",
        }
    }

    /// All roles, lowest privilege first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::User, Self::Moderator, Self::Admin]
    }

    /// Highest role in the set, or `None` when the set is empty.
    pub fn highest<I>(roles: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        roles.into_iter().max()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_order() {
        assert!(Role::User < Role::Moderator);
        assert!(Role::Moderator < Role::Admin);
        assert!(Role::User < Role::Admin);
    }

    #[test]
    fn test_highest() {
        assert_eq!(
            Role::highest([Role::User, Role::Admin, Role::Moderator]),
            Some(Role::Admin)
        );
        assert_eq!(Role::highest([Role::User]), Some(Role::User));
        assert_eq!(Role::highest(Vec::new()), None);
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("Moderator".parse::<Role>(), Ok(Role::Moderator));
        assert_eq!("User".parse::<Role>(), Ok(Role::User));

        // Names are matched exactly; typos never grant a role.
        assert!("admin".parse::<Role>().is_err());
        assert!("Admn".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        for role in Role::all() {
            let json = serde_json::to_string(role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            let restored: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(*role, restored);
        }

        assert!(serde_json::from_str::<Role>("\"SuperAdmin\"").is_err());
    }
}
