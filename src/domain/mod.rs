//! Domain primitives shared by the services: roles, the requesting actor and
//! the owner-or-admin authorization policy, and post categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Account role as stored in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Returned when an actor tries to touch a resource it neither owns nor administers.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Only the owner or an administrator can {action}")]
pub struct Forbidden {
    pub action: &'static str,
}

/// The authenticated user on whose behalf a service call runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    #[must_use]
    pub fn owns(&self, owner_id: &str) -> bool {
        self.user_id == owner_id
    }

    /// Owner-or-admin check applied to every mutating operation.
    pub fn ensure_can_modify(&self, owner_id: &str, action: &'static str) -> Result<(), Forbidden> {
        if self.owns(owner_id) || self.is_admin() {
            Ok(())
        } else {
            Err(Forbidden { action })
        }
    }

    pub fn ensure_admin(&self, action: &'static str) -> Result<(), Forbidden> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Forbidden { action })
        }
    }
}

/// Post category shown as a prefix in front of the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PostPrefix {
    #[default]
    General,
    Notice,
    Recipe,
    Question,
    Tip,
}

impl PostPrefix {
    pub const ALL: [Self; 5] = [
        Self::General,
        Self::Notice,
        Self::Recipe,
        Self::Question,
        Self::Tip,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Notice => "Notice",
            Self::Recipe => "Recipe",
            Self::Question => "Question",
            Self::Tip => "Tip",
        }
    }
}

impl fmt::Display for PostPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostPrefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                format!("Prefix must be one of: General, Notice, Recipe, Question, Tip (got '{s}')")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_string() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "USER");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn owner_can_modify() {
        let actor = Actor::new("u1", "alice", Role::User);
        assert!(actor.ensure_can_modify("u1", "edit this post").is_ok());
    }

    #[test]
    fn admin_can_modify_anything() {
        let actor = Actor::new("root", "admin", Role::Admin);
        assert!(actor.ensure_can_modify("u1", "edit this post").is_ok());
        assert!(actor.ensure_admin("pin posts").is_ok());
    }

    #[test]
    fn stranger_is_forbidden() {
        let actor = Actor::new("u2", "bob", Role::User);
        let err = actor.ensure_can_modify("u1", "delete this comment").unwrap_err();
        assert_eq!(err.action, "delete this comment");
        assert!(actor.ensure_admin("pin posts").is_err());
    }

    #[test]
    fn prefix_parsing() {
        assert_eq!("Recipe".parse::<PostPrefix>().unwrap(), PostPrefix::Recipe);
        assert!("recipe".parse::<PostPrefix>().is_err());
        assert_eq!(PostPrefix::default(), PostPrefix::General);
    }
}
