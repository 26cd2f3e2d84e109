//! Record trait - common interface for all directory records

use serde::{de::DeserializeOwned, Serialize};

/// Identifier assigned to a record by the directory
pub type RecordId = i64;

/// Common trait for all GearGuard records
pub trait Record: Serialize + DeserializeOwned {
    /// The record kind label (e.g., "equipment", "request")
    const KIND: &'static str;

    /// Get the record's unique ID
    fn id(&self) -> RecordId;

    /// Get the record's display name
    fn label(&self) -> &str;
}

/// Priority of a maintenance request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Operational status shared by equipment and work centers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum AssetStatus {
    #[default]
    Active,
    UnderMaintenance,
    Scrap,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "ACTIVE",
            AssetStatus::UnderMaintenance => "UNDER_MAINTENANCE",
            AssetStatus::Scrap => "SCRAP",
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "ACTIVE" => Ok(AssetStatus::Active),
            "UNDER_MAINTENANCE" => Ok(AssetStatus::UnderMaintenance),
            "SCRAP" => Ok(AssetStatus::Scrap),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Upper-case an enum token and accept `-` as a word separator, so the
/// command line can say `in-progress` where the wire form is `IN_PROGRESS`.
pub(crate) fn normalize(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace('-', "_")
}
