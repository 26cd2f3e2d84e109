//! Maintenance request record

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{normalize, Priority, Record, RecordId};

/// Kind of maintenance work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum RequestType {
    #[default]
    Corrective,
    Preventive,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Corrective => "CORRECTIVE",
            RequestType::Preventive => "PREVENTIVE",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "CORRECTIVE" => Ok(RequestType::Corrective),
            "PREVENTIVE" => Ok(RequestType::Preventive),
            _ => Err(format!("Unknown request type: {}", s)),
        }
    }
}

/// Lifecycle stage of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum Stage {
    #[default]
    New,
    InProgress,
    Repaired,
    Scrap,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::New, Stage::InProgress, Stage::Repaired, Stage::Scrap];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::New => "NEW",
            Stage::InProgress => "IN_PROGRESS",
            Stage::Repaired => "REPAIRED",
            Stage::Scrap => "SCRAP",
        }
    }

    /// NEW and IN_PROGRESS requests still need work
    pub fn is_open(&self) -> bool {
        matches!(self, Stage::New | Stage::InProgress)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "NEW" => Ok(Stage::New),
            "IN_PROGRESS" => Ok(Stage::InProgress),
            "REPAIRED" => Ok(Stage::Repaired),
            "SCRAP" => Ok(Stage::Scrap),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}

/// The single asset a request is raised against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Equipment(RecordId),
    WorkCenter(RecordId),
}

impl Target {
    /// Build a target from the two optional references a caller may supply
    ///
    /// Returns `None` unless exactly one reference is set.
    pub fn from_refs(equipment: Option<RecordId>, work_center: Option<RecordId>) -> Option<Self> {
        match (equipment, work_center) {
            (Some(id), None) => Some(Target::Equipment(id)),
            (None, Some(id)) => Some(Target::WorkCenter(id)),
            _ => None,
        }
    }

    pub fn equipment(&self) -> Option<RecordId> {
        match self {
            Target::Equipment(id) => Some(*id),
            Target::WorkCenter(_) => None,
        }
    }

    pub fn work_center(&self) -> Option<RecordId> {
        match self {
            Target::WorkCenter(id) => Some(*id),
            Target::Equipment(_) => None,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Equipment(id) => write!(f, "equipment #{}", id),
            Target::WorkCenter(id) => write!(f, "work center #{}", id),
        }
    }
}

/// A maintenance request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RecordId,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub target: Target,

    pub request_type: RequestType,

    pub priority: Priority,

    pub stage: Stage,

    /// User who raised the request; fixed at creation
    pub reporter: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub duration_minutes: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Request {
    /// Date used to place the request on a calendar: the scheduled date, or
    /// the creation time when nothing was scheduled
    pub fn anchor_date(&self) -> DateTime<Utc> {
        self.scheduled_date.unwrap_or(self.created_at)
    }
}

impl Record for Request {
    const KIND: &'static str = "request";

    fn id(&self) -> RecordId {
        self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

/// Caller-supplied fields for a new request
///
/// Equipment and work center are kept as two optional references here; the
/// lifecycle manager turns them into a [`Target`] or rejects the draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestDraft {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub equipment: Option<RecordId>,

    #[serde(default)]
    pub work_center: Option<RecordId>,

    #[serde(default)]
    pub request_type: RequestType,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub duration_minutes: u32,

    #[serde(default)]
    pub technician: Option<RecordId>,

    #[serde(default)]
    pub team: Option<RecordId>,
}

/// Stored fields for a request about to be inserted
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub title: String,
    pub description: String,
    pub target: Target,
    pub request_type: RequestType,
    pub priority: Priority,
    pub reporter: RecordId,
    pub technician: Option<RecordId>,
    pub team: Option<RecordId>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub created_at: DateTime<Utc>,
}

/// Request edits
///
/// `None` leaves a field untouched; `Some(None)` clears a nullable field.
/// Stage is not patchable; it only moves through the transition table.
#[derive(Debug, Clone, Default)]
pub struct RequestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub request_type: Option<RequestType>,
    pub scheduled_date: Option<Option<DateTime<Utc>>>,
    pub duration_minutes: Option<u32>,
    pub equipment: Option<Option<RecordId>>,
    pub work_center: Option<Option<RecordId>>,
    pub technician: Option<Option<RecordId>>,
    pub team: Option<Option<RecordId>>,
    /// Re-run assignment resolution for any of technician/team not set above
    pub reassign: bool,
}

impl RequestPatch {
    /// Whether the patch touches the equipment/work-center reference
    pub fn changes_target(&self) -> bool {
        self.equipment.is_some() || self.work_center.is_some()
    }
}

/// Filters for request listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQuery {
    pub technician: Option<RecordId>,
    pub reporter: Option<RecordId>,
    pub stage: Option<Stage>,
    pub priority: Option<Priority>,
    pub equipment: Option<RecordId>,
    pub work_center: Option<RecordId>,
    /// First day (inclusive) of the anchor-date window
    pub from: Option<NaiveDate>,
    /// Last day (inclusive) of the anchor-date window
    pub to: Option<NaiveDate>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl RequestQuery {
    /// Whether a request passes every filter (paging is not applied here)
    pub fn matches(&self, request: &Request) -> bool {
        let day = request.anchor_date().date_naive();
        self.technician.map_or(true, |t| request.technician == Some(t))
            && self.reporter.map_or(true, |r| request.reporter == r)
            && self.stage.map_or(true, |s| request.stage == s)
            && self.priority.map_or(true, |p| request.priority == p)
            && self.equipment.map_or(true, |e| request.target.equipment() == Some(e))
            && self.work_center.map_or(true, |w| request.target.work_center() == Some(w))
            && self.from.map_or(true, |from| day >= from)
            && self.to.map_or(true, |to| day <= to)
    }
}
