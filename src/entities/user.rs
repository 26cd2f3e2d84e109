//! User record and role definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{normalize, Record, RecordId};

/// Role carried by every user and by every session credential
///
/// The role is the sole input the authorization matrix consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum Role {
    Admin,
    Manager,
    Technician,
    #[default]
    Employee,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Technician, Role::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Technician => "TECHNICIAN",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// Roles that can administer reference data and other users
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "TECHNICIAN" => Ok(Role::Technician),
            "EMPLOYEE" => Ok(Role::Employee),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,

    pub username: String,

    pub email: String,

    pub role: Role,

    /// Team this user belongs to (at most one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Company label (no isolation is derived from it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Record for User {
    const KIND: &'static str = "user";

    fn id(&self) -> RecordId {
        self.id
    }

    fn label(&self) -> &str {
        &self.username
    }
}

/// Fields for a new user account
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub team: Option<RecordId>,
    pub department: Option<String>,
    pub company: Option<String>,
}

/// Role and team-membership edits
///
/// `None` leaves a field untouched; `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub role: Option<Role>,
    pub team: Option<Option<RecordId>>,
    pub department: Option<Option<String>>,
    pub company: Option<Option<String>>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.team.is_none()
            && self.department.is_none()
            && self.company.is_none()
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(team) = self.team {
            user.team = team;
        }
        if let Some(ref department) = self.department {
            user.department = department.clone();
        }
        if let Some(ref company) = self.company {
            user.company = company.clone();
        }
    }
}

/// Filter for user listings
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub team: Option<RecordId>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.role.map_or(true, |r| user.role == r)
            && self.team.map_or(true, |t| user.team == Some(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, team: Option<RecordId>) -> User {
        User {
            id: 1,
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            role,
            team,
            department: None,
            company: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_roundtrip_through_str() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert_eq!("technician".parse::<Role>().unwrap(), Role::Technician);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_patch_clears_team() {
        let mut u = user(Role::Technician, Some(4));
        let patch = UserPatch {
            team: Some(None),
            ..Default::default()
        };
        patch.apply(&mut u);
        assert_eq!(u.team, None);
        assert_eq!(u.role, Role::Technician);
    }

    #[test]
    fn test_filter_by_role_and_team() {
        let filter = UserFilter {
            role: Some(Role::Technician),
            team: Some(2),
        };
        assert!(filter.matches(&user(Role::Technician, Some(2))));
        assert!(!filter.matches(&user(Role::Technician, None)));
        assert!(!filter.matches(&user(Role::Manager, Some(2))));
        assert!(UserFilter::default().matches(&user(Role::Employee, None)));
    }
}
