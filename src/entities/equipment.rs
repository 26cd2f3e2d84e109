//! Equipment record

use serde::{Deserialize, Serialize};

use crate::core::entity::{AssetStatus, Record, RecordId};

/// A physical asset that maintenance requests can target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: RecordId,

    pub name: String,

    /// Serial number, unique across the organization
    pub serial_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub department: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RecordId>,

    /// Team copied onto new requests that name no team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_team: Option<RecordId>,

    /// Technician copied onto new requests that name no technician
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_technician: Option<RecordId>,

    #[serde(default)]
    pub status: AssetStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record for Equipment {
    const KIND: &'static str = "equipment";

    fn id(&self) -> RecordId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Fields for new equipment
#[derive(Debug, Clone, Default)]
pub struct NewEquipment {
    pub name: String,
    pub serial_number: String,
    pub location: Option<String>,
    pub department: String,
    pub category: Option<RecordId>,
    pub default_team: Option<RecordId>,
    pub default_technician: Option<RecordId>,
    pub status: AssetStatus,
    pub description: Option<String>,
}

/// Equipment edits
///
/// Changing the defaults here never touches requests that already copied them.
#[derive(Debug, Clone, Default)]
pub struct EquipmentPatch {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<Option<String>>,
    pub department: Option<String>,
    pub category: Option<Option<RecordId>>,
    pub default_team: Option<Option<RecordId>>,
    pub default_technician: Option<Option<RecordId>>,
    pub status: Option<AssetStatus>,
    pub description: Option<Option<String>>,
}

impl EquipmentPatch {
    pub fn apply(&self, equipment: &mut Equipment) {
        if let Some(ref name) = self.name {
            equipment.name = name.clone();
        }
        if let Some(ref serial) = self.serial_number {
            equipment.serial_number = serial.clone();
        }
        if let Some(ref location) = self.location {
            equipment.location = location.clone();
        }
        if let Some(ref department) = self.department {
            equipment.department = department.clone();
        }
        if let Some(category) = self.category {
            equipment.category = category;
        }
        if let Some(team) = self.default_team {
            equipment.default_team = team;
        }
        if let Some(technician) = self.default_technician {
            equipment.default_technician = technician;
        }
        if let Some(status) = self.status {
            equipment.status = status;
        }
        if let Some(ref description) = self.description {
            equipment.description = description.clone();
        }
    }
}

/// Filter for equipment listings
#[derive(Debug, Clone, Default)]
pub struct EquipmentFilter {
    pub status: Option<AssetStatus>,
    pub category: Option<RecordId>,
    pub team: Option<RecordId>,
    pub department: Option<String>,
}

impl EquipmentFilter {
    pub fn matches(&self, equipment: &Equipment) -> bool {
        self.status.map_or(true, |s| equipment.status == s)
            && self.category.map_or(true, |c| equipment.category == Some(c))
            && self.team.map_or(true, |t| equipment.default_team == Some(t))
            && self
                .department
                .as_deref()
                .map_or(true, |d| equipment.department.eq_ignore_ascii_case(d))
    }
}
