//! Role-gated access to reference data
//!
//! Equipment, work centers, teams, categories and user accounts. Each
//! operation checks the authorization matrix, validates references and
//! uniqueness, then writes through the directory.

mod category;
mod equipment;
mod team;
mod user;
mod work_center;

pub use equipment::EquipmentRequests;

use crate::core::authz::{Action, AuthorizationMatrix, ResourceKind};
use crate::core::directory::ResourceDirectory;
use crate::core::entity::RecordId;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::session::Session;
use crate::entities::request::RequestQuery;

pub struct Catalog<'a> {
    directory: &'a dyn ResourceDirectory,
    matrix: AuthorizationMatrix,
}

impl<'a> Catalog<'a> {
    pub fn new(directory: &'a dyn ResourceDirectory) -> Self {
        Self {
            directory,
            matrix: AuthorizationMatrix::standard(),
        }
    }

    fn require(&self, session: &Session, kind: ResourceKind, action: Action) -> ServiceResult<()> {
        self.matrix.require(session, kind, action)
    }

    fn check_team(&self, team: Option<RecordId>) -> ServiceResult<()> {
        match team {
            Some(id) if self.directory.team(id)?.is_none() => {
                Err(ServiceError::validation(format!("Team {} does not exist", id)))
            }
            _ => Ok(()),
        }
    }

    fn check_user(&self, user: Option<RecordId>) -> ServiceResult<()> {
        match user {
            Some(id) if self.directory.user(id)?.is_none() => {
                Err(ServiceError::validation(format!("User {} does not exist", id)))
            }
            _ => Ok(()),
        }
    }

    fn check_category(&self, category: Option<RecordId>) -> ServiceResult<()> {
        match category {
            Some(id) if self.directory.category(id)?.is_none() => {
                Err(ServiceError::validation(format!("Category {} does not exist", id)))
            }
            _ => Ok(()),
        }
    }

    /// Number of requests matching `query`, ignoring paging
    fn count_requests(&self, query: RequestQuery) -> ServiceResult<usize> {
        Ok(self.directory.requests(&query)?.len())
    }
}

/// Trimmed, non-empty text or a validation error naming the field
fn required(field: &str, value: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}
