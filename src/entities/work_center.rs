//! Work center record

use serde::{Deserialize, Serialize};

use crate::core::entity::{AssetStatus, Record, RecordId};

/// Default OEE target for new work centers, in percent
pub const DEFAULT_OEE_TARGET: u8 = 85;

/// A production work center that maintenance requests can target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCenter {
    pub id: RecordId,

    pub name: String,

    /// Short code, unique across work centers
    pub code: String,

    pub department: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub status: AssetStatus,

    /// Throughput in units per hour
    #[serde(default)]
    pub capacity: u32,

    #[serde(default)]
    pub cost_per_hour: u32,

    /// Overall equipment effectiveness target (0-100)
    #[serde(default = "default_oee_target")]
    pub oee_target: u8,
}

fn default_oee_target() -> u8 {
    DEFAULT_OEE_TARGET
}

impl Record for WorkCenter {
    const KIND: &'static str = "work_center";

    fn id(&self) -> RecordId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct NewWorkCenter {
    pub name: String,
    pub code: String,
    pub department: String,
    pub location: Option<String>,
    pub status: AssetStatus,
    pub capacity: u32,
    pub cost_per_hour: u32,
    pub oee_target: u8,
}

impl Default for NewWorkCenter {
    fn default() -> Self {
        Self {
            name: String::new(),
            code: String::new(),
            department: String::new(),
            location: None,
            status: AssetStatus::Active,
            capacity: 0,
            cost_per_hour: 0,
            oee_target: DEFAULT_OEE_TARGET,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkCenterPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub department: Option<String>,
    pub location: Option<Option<String>>,
    pub status: Option<AssetStatus>,
    pub capacity: Option<u32>,
    pub cost_per_hour: Option<u32>,
    pub oee_target: Option<u8>,
}

impl WorkCenterPatch {
    pub fn apply(&self, wc: &mut WorkCenter) {
        if let Some(ref name) = self.name {
            wc.name = name.clone();
        }
        if let Some(ref code) = self.code {
            wc.code = code.clone();
        }
        if let Some(ref department) = self.department {
            wc.department = department.clone();
        }
        if let Some(ref location) = self.location {
            wc.location = location.clone();
        }
        if let Some(status) = self.status {
            wc.status = status;
        }
        if let Some(capacity) = self.capacity {
            wc.capacity = capacity;
        }
        if let Some(cost) = self.cost_per_hour {
            wc.cost_per_hour = cost;
        }
        if let Some(target) = self.oee_target {
            wc.oee_target = target;
        }
    }
}
