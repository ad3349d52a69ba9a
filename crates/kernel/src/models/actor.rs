//! Actors and the permissions they hold on nodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anonymous actor UUID (nil UUID).
pub const ANONYMOUS_ACTOR_ID: Uuid = Uuid::nil();

/// Well-known role names.
pub mod well_known {
    /// Role every anonymous visitor carries.
    pub const ANONYMOUS_ROLE: &str = "anonymous";

    /// Role every logged-in actor carries.
    pub const AUTHENTICATED_ROLE: &str = "authenticated";
}

/// The actor a menu or query is evaluated for.
///
/// Passed explicitly into every permission-sensitive call; nothing reads a
/// "current user" from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub roles: Vec<String>,
    pub is_admin: bool,
}

impl Actor {
    /// The anonymous visitor.
    pub fn anonymous() -> Self {
        Self {
            id: ANONYMOUS_ACTOR_ID,
            roles: vec![well_known::ANONYMOUS_ROLE.to_string()],
            is_admin: false,
        }
    }

    /// An authenticated actor with extra roles.
    pub fn authenticated(id: Uuid, roles: &[&str]) -> Self {
        let mut all = vec![well_known::AUTHENTICATED_ROLE.to_string()];
        all.extend(roles.iter().map(|r| r.to_string()));
        Self {
            id,
            roles: all,
            is_admin: false,
        }
    }

    /// An administrator; bypasses node ACLs.
    pub fn admin(id: Uuid) -> Self {
        Self {
            id,
            roles: vec![well_known::AUTHENTICATED_ROLE.to_string()],
            is_admin: true,
        }
    }

    /// Check if this is the anonymous actor.
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_ACTOR_ID
    }

    /// Check if the actor carries a role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Node-level permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    View,
    Edit,
    Delete,
    Publish,
    Unpublish,
}

impl Permission {
    /// Storage name of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Edit => "EDIT",
            Self::Delete => "DELETE",
            Self::Publish => "PUBLISH",
            Self::Unpublish => "UNPUBLISH",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VIEW" => Ok(Self::View),
            "EDIT" => Ok(Self::Edit),
            "DELETE" => Ok(Self::Delete),
            "PUBLISH" => Ok(Self::Publish),
            "UNPUBLISH" => Ok(Self::Unpublish),
            other => anyhow::bail!("unknown permission '{other}'"),
        }
    }
}
