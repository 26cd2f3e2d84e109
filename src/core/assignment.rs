//! Assignment resolution
//!
//! Works out who is responsible for a request. An explicit technician or team
//! wins; anything left unset falls back to the target equipment's defaults.
//! The result is a snapshot taken at creation or on explicit reassignment and
//! is never recomputed when equipment defaults change later.

use serde::Serialize;

use crate::core::directory::ResourceDirectory;
use crate::core::entity::RecordId;
use crate::core::error::{ServiceError, ServiceResult};
use crate::entities::equipment::Equipment;
use crate::entities::request::Target;

/// The (technician, team) pair responsible for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub technician: Option<RecordId>,
    pub team: Option<RecordId>,
}

impl Assignment {
    pub fn new(technician: Option<RecordId>, team: Option<RecordId>) -> Self {
        Self { technician, team }
    }

    /// Fill each unset field from the equipment's defaults
    pub fn or_defaults_of(self, equipment: Option<&Equipment>) -> Self {
        let Some(equipment) = equipment else {
            return self;
        };
        Self {
            technician: self.technician.or(equipment.default_technician),
            team: self.team.or(equipment.default_team),
        }
    }
}

/// Resolves assignments against the directory
pub struct AssignmentResolver<'a> {
    directory: &'a dyn ResourceDirectory,
}

impl<'a> AssignmentResolver<'a> {
    pub fn new(directory: &'a dyn ResourceDirectory) -> Self {
        Self { directory }
    }

    /// Effective assignment for a request on `target`
    ///
    /// Work-center targets carry no defaults, so only explicit values apply.
    pub fn resolve(&self, target: Target, explicit: Assignment) -> ServiceResult<Assignment> {
        match target {
            Target::Equipment(id) => {
                let equipment = self
                    .directory
                    .equipment(id)?
                    .ok_or_else(|| ServiceError::validation(format!("Equipment {} does not exist", id)))?;
                Ok(explicit.or_defaults_of(Some(&equipment)))
            }
            Target::WorkCenter(_) => Ok(explicit),
        }
    }
}
