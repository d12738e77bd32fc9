use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Actor role.
///
/// The set is closed: every request is handled as exactly one of these and
/// each downstream stage (rule selection, persistence collection, gate) matches
/// on it instead of branching on raw header strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Captain,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Captain => "captain",
        }
    }

    /// Capitalized label used in response messages ("User", "Captain").
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Captain => "Captain",
        }
    }

    /// Resolve a role from an optional raw header value.
    pub fn resolve(raw: Option<&str>) -> Result<Self, RoleError> {
        match raw.map(str::trim) {
            None | Some("") => Err(RoleError::Missing),
            Some(value) => value.parse(),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "captain" => Ok(Role::Captain),
            other => Err(RoleError::Invalid(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("role header is missing")]
    Missing,

    #[error("role '{0}' is not one of user, captain")]
    Invalid(String),
}

/// Which credential flow a payload is being validated for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthAction {
    Register,
    Login,
}
