//! Unified filter enums for CLI commands
//!
//! Each filter either narrows to a single value, which is pushed down into
//! the directory query, or to a group of values matched after loading.

use clap::ValueEnum;

use crate::core::entity::{AssetStatus, Priority};
use crate::entities::request::Stage;
use crate::entities::user::Role;

/// Stage filter for request listings
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StageFilter {
    New,
    InProgress,
    Repaired,
    Scrap,
    /// NEW and IN_PROGRESS
    Open,
    /// REPAIRED and SCRAP
    Closed,
    /// Every stage - default
    #[default]
    All,
}

impl StageFilter {
    /// The one stage this filter selects, if it selects exactly one
    pub fn single(&self) -> Option<Stage> {
        match self {
            StageFilter::New => Some(Stage::New),
            StageFilter::InProgress => Some(Stage::InProgress),
            StageFilter::Repaired => Some(Stage::Repaired),
            StageFilter::Scrap => Some(Stage::Scrap),
            StageFilter::Open | StageFilter::Closed | StageFilter::All => None,
        }
    }

    pub fn matches(&self, stage: &Stage) -> bool {
        match self {
            StageFilter::Open => stage.is_open(),
            StageFilter::Closed => !stage.is_open(),
            StageFilter::All => true,
            single => single.single() == Some(*stage),
        }
    }
}

/// Priority filter for request listings
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    /// Low priority only
    Low,
    /// Medium priority only
    Medium,
    /// High priority only
    High,
    /// Critical priority only
    Critical,
    /// High and critical only
    Urgent,
    /// All priorities - default
    #[default]
    All,
}

impl PriorityFilter {
    pub fn single(&self) -> Option<Priority> {
        match self {
            PriorityFilter::Low => Some(Priority::Low),
            PriorityFilter::Medium => Some(Priority::Medium),
            PriorityFilter::High => Some(Priority::High),
            PriorityFilter::Critical => Some(Priority::Critical),
            PriorityFilter::Urgent | PriorityFilter::All => None,
        }
    }

    /// Check if a Priority matches this filter
    pub fn matches(&self, priority: &Priority) -> bool {
        match self {
            PriorityFilter::Urgent => {
                *priority == Priority::High || *priority == Priority::Critical
            }
            PriorityFilter::All => true,
            single => single.single() == Some(*priority),
        }
    }
}

/// Operational status filter for equipment listings
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    UnderMaintenance,
    Scrap,
    /// Every status - default
    #[default]
    All,
}

impl StatusFilter {
    pub fn single(&self) -> Option<AssetStatus> {
        match self {
            StatusFilter::Active => Some(AssetStatus::Active),
            StatusFilter::UnderMaintenance => Some(AssetStatus::UnderMaintenance),
            StatusFilter::Scrap => Some(AssetStatus::Scrap),
            StatusFilter::All => None,
        }
    }
}

/// Role filter for user listings
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum RoleFilter {
    Admin,
    Manager,
    Technician,
    Employee,
    #[default]
    All,
}

impl RoleFilter {
    pub fn single(&self) -> Option<Role> {
        match self {
            RoleFilter::Admin => Some(Role::Admin),
            RoleFilter::Manager => Some(Role::Manager),
            RoleFilter::Technician => Some(Role::Technician),
            RoleFilter::Employee => Some(Role::Employee),
            RoleFilter::All => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_filter_matches() {
        assert!(StageFilter::New.matches(&Stage::New));
        assert!(!StageFilter::New.matches(&Stage::Scrap));

        assert!(StageFilter::Open.matches(&Stage::InProgress));
        assert!(!StageFilter::Open.matches(&Stage::Repaired));
        assert!(StageFilter::Closed.matches(&Stage::Scrap));

        assert!(StageFilter::All.matches(&Stage::Scrap));
        assert_eq!(StageFilter::Open.single(), None);
        assert_eq!(StageFilter::InProgress.single(), Some(Stage::InProgress));
    }

    #[test]
    fn test_priority_filter_matches() {
        assert!(PriorityFilter::High.matches(&Priority::High));
        assert!(!PriorityFilter::High.matches(&Priority::Low));

        assert!(PriorityFilter::Urgent.matches(&Priority::High));
        assert!(PriorityFilter::Urgent.matches(&Priority::Critical));
        assert!(!PriorityFilter::Urgent.matches(&Priority::Medium));

        assert!(PriorityFilter::All.matches(&Priority::Low));
    }

    #[test]
    fn test_single_value_filters() {
        assert_eq!(StatusFilter::Scrap.single(), Some(AssetStatus::Scrap));
        assert_eq!(StatusFilter::All.single(), None);
        assert_eq!(RoleFilter::Technician.single(), Some(Role::Technician));
    }
}
