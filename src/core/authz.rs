//! Authorization matrix
//!
//! One table answers "may this role perform this action on this kind of
//! resource". Every engine entry point consults it before touching the
//! directory. Record-level narrowing for self-scoped roles (technicians see
//! their assignments, employees see what they reported) lives in a second,
//! equally small table and is applied as a query-time filter.

use serde::Serialize;
use tracing::warn;

use crate::core::error::ServiceError;
use crate::core::session::Session;
use crate::entities::request::{Request, RequestQuery};
use crate::entities::user::Role;

/// Kinds of resource guarded by the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Request,
    Equipment,
    WorkCenter,
    Team,
    Category,
    User,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Request,
        ResourceKind::Equipment,
        ResourceKind::WorkCenter,
        ResourceKind::Team,
        ResourceKind::Category,
        ResourceKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Request => "request",
            ResourceKind::Equipment => "equipment",
            ResourceKind::WorkCenter => "work_center",
            ResourceKind::Team => "team",
            ResourceKind::Category => "category",
            ResourceKind::User => "user",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions a caller may attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    TransitionStage,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::TransitionStage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::TransitionStage => "transition_stage",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a matrix lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Which records of an allowed kind a role can actually reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Every record
    All,
    /// Requests whose technician is the caller
    AssignedToSelf,
    /// Requests the caller reported
    ReportedBySelf,
}

impl Scope {
    /// Whether a request is inside this scope for the given caller
    pub fn covers(&self, request: &Request, session: &Session) -> bool {
        match self {
            Scope::All => true,
            Scope::AssignedToSelf => request.technician == Some(session.user_id),
            Scope::ReportedBySelf => request.reporter == session.user_id,
        }
    }

    /// Narrow a listing query to this scope, overriding whatever the caller
    /// asked for on the scoped field
    pub fn narrow(&self, query: &mut RequestQuery, session: &Session) {
        match self {
            Scope::All => {}
            Scope::AssignedToSelf => query.technician = Some(session.user_id),
            Scope::ReportedBySelf => query.reporter = Some(session.user_id),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::AssignedToSelf => write!(f, "assigned to self"),
            Scope::ReportedBySelf => write!(f, "reported by self"),
        }
    }
}

/// One row of the matrix
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub resource: ResourceKind,
    pub action: Action,
    pub roles: &'static [Role],
}

const ALL_ROLES: &[Role] = &[Role::Admin, Role::Manager, Role::Technician, Role::Employee];
const STAFF: &[Role] = &[Role::Admin, Role::Manager, Role::Technician];
const MANAGEMENT: &[Role] = &[Role::Admin, Role::Manager];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// The observed permission table. Pairs absent from it are denied.
pub const RULES: &[Rule] = &[
    // request
    Rule {
        resource: ResourceKind::Request,
        action: Action::Read,
        roles: ALL_ROLES,
    },
    Rule {
        resource: ResourceKind::Request,
        action: Action::Create,
        roles: STAFF,
    },
    Rule {
        resource: ResourceKind::Request,
        action: Action::Update,
        roles: STAFF,
    },
    Rule {
        resource: ResourceKind::Request,
        action: Action::TransitionStage,
        roles: STAFF,
    },
    Rule {
        resource: ResourceKind::Request,
        action: Action::Delete,
        roles: MANAGEMENT,
    },
    // equipment
    Rule {
        resource: ResourceKind::Equipment,
        action: Action::Read,
        roles: ALL_ROLES,
    },
    Rule {
        resource: ResourceKind::Equipment,
        action: Action::Create,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::Equipment,
        action: Action::Update,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::Equipment,
        action: Action::Delete,
        roles: MANAGEMENT,
    },
    // work center
    Rule {
        resource: ResourceKind::WorkCenter,
        action: Action::Read,
        roles: &[Role::Admin, Role::Manager, Role::Employee],
    },
    Rule {
        resource: ResourceKind::WorkCenter,
        action: Action::Create,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::WorkCenter,
        action: Action::Update,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::WorkCenter,
        action: Action::Delete,
        roles: MANAGEMENT,
    },
    // team
    Rule {
        resource: ResourceKind::Team,
        action: Action::Read,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::Team,
        action: Action::Create,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::Team,
        action: Action::Update,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::Team,
        action: Action::Delete,
        roles: ADMIN_ONLY,
    },
    // category
    Rule {
        resource: ResourceKind::Category,
        action: Action::Read,
        roles: ADMIN_ONLY,
    },
    Rule {
        resource: ResourceKind::Category,
        action: Action::Create,
        roles: ADMIN_ONLY,
    },
    Rule {
        resource: ResourceKind::Category,
        action: Action::Update,
        roles: ADMIN_ONLY,
    },
    Rule {
        resource: ResourceKind::Category,
        action: Action::Delete,
        roles: ADMIN_ONLY,
    },
    // user (role and team edits)
    Rule {
        resource: ResourceKind::User,
        action: Action::Read,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::User,
        action: Action::Create,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::User,
        action: Action::Update,
        roles: MANAGEMENT,
    },
    Rule {
        resource: ResourceKind::User,
        action: Action::Delete,
        roles: ADMIN_ONLY,
    },
];

/// Record-level narrowing for roles whose access to a kind is self-scoped
const SCOPES: &[(ResourceKind, Role, Scope)] = &[
    (ResourceKind::Request, Role::Technician, Scope::AssignedToSelf),
    (ResourceKind::Request, Role::Employee, Scope::ReportedBySelf),
];

/// Table-driven authorization
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationMatrix {
    rules: &'static [Rule],
    scopes: &'static [(ResourceKind, Role, Scope)],
}

impl Default for AuthorizationMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

impl AuthorizationMatrix {
    /// The matrix observed in production use
    pub const fn standard() -> Self {
        Self {
            rules: RULES,
            scopes: SCOPES,
        }
    }

    /// Look up a single (role, resource, action) triple
    pub fn authorize(&self, role: Role, resource: ResourceKind, action: Action) -> Decision {
        let allowed = self
            .rules
            .iter()
            .any(|r| r.resource == resource && r.action == action && r.roles.contains(&role));
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Record scope a role gets on a resource kind it is allowed to touch
    pub fn scope(&self, role: Role, resource: ResourceKind) -> Scope {
        self.scopes
            .iter()
            .find(|(kind, r, _)| *kind == resource && *r == role)
            .map(|(_, _, scope)| *scope)
            .unwrap_or(Scope::All)
    }

    /// Fail with `Forbidden` unless the session's role may perform the action
    pub fn require(
        &self,
        session: &Session,
        resource: ResourceKind,
        action: Action,
    ) -> Result<(), ServiceError> {
        match self.authorize(session.role, resource, action) {
            Decision::Allow => Ok(()),
            Decision::Deny => {
                warn!(
                    user = %session.username,
                    role = %session.role,
                    %resource,
                    %action,
                    "authorization denied"
                );
                Err(ServiceError::Forbidden {
                    role: session.role,
                    action,
                    resource,
                })
            }
        }
    }

    /// Fail with `Forbidden` unless the request is inside the caller's scope
    pub fn require_in_scope(&self, session: &Session, request: &Request) -> Result<(), ServiceError> {
        let scope = self.scope(session.role, ResourceKind::Request);
        if scope.covers(request, session) {
            return Ok(());
        }
        warn!(
            user = %session.username,
            role = %session.role,
            request = request.id,
            %scope,
            "request outside caller scope"
        );
        Err(ServiceError::OutOfScope {
            message: format!(
                "Request {} is not {} for {}",
                request.id, scope, session.username
            ),
        })
    }

    /// Every action a role is allowed on a resource kind
    pub fn allowed_actions(&self, role: Role, resource: ResourceKind) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| self.authorize(role, resource, *a).is_allowed())
            .collect()
    }
}
