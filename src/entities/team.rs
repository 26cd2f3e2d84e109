//! Team record
//!
//! Membership is a back-reference: each user points at its team, a team never
//! lists its members directly.

use serde::{Deserialize, Serialize};

use crate::core::entity::{Record, RecordId};

/// A maintenance team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: RecordId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record for Team {
    const KIND: &'static str = "team";

    fn id(&self) -> RecordId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Fields for a new team
#[derive(Debug, Clone, Default)]
pub struct NewTeam {
    pub name: String,
    pub description: Option<String>,
}

/// Team edits
#[derive(Debug, Clone, Default)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl TeamPatch {
    pub fn apply(&self, team: &mut Team) {
        if let Some(ref name) = self.name {
            team.name = name.clone();
        }
        if let Some(ref description) = self.description {
            team.description = description.clone();
        }
    }
}
