//! Dashboard statistics
//!
//! Everything here is recomputed from the current equipment, request and user
//! collections on each call. [`aggregate`] is a pure function; the
//! [`StatsAggregator`] only gathers its inputs and picks the view for the
//! caller's role.

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::authz::{Action, AuthorizationMatrix, ResourceKind};
use crate::core::config::StatsConfig;
use crate::core::directory::ResourceDirectory;
use crate::core::entity::{AssetStatus, RecordId};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::session::Session;
use crate::entities::equipment::Equipment;
use crate::entities::request::{Request, RequestQuery, Stage};
use crate::entities::user::{Role, User};

pub const CRITICAL_EQUIPMENT_LABEL: &str = "Units (Not Active)";
pub const OPEN_REQUESTS_LABEL: &str = "Pending Requests";
pub const LOAD_DETAILS: &str = "(Based on active requests)";

// =========================================================================
// Health scoring
// =========================================================================

/// Scores an equipment unit from 0 (dead) to 100 (healthy)
pub trait HealthScorer {
    /// `requests` holds every request raised against this unit
    fn score(&self, equipment: &Equipment, requests: &[&Request]) -> f64;
}

/// Scores by operational status alone
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusHealthScorer;

impl HealthScorer for StatusHealthScorer {
    fn score(&self, equipment: &Equipment, _requests: &[&Request]) -> f64 {
        match equipment.status {
            AssetStatus::Active => 100.0,
            AssetStatus::UnderMaintenance => 25.0,
            AssetStatus::Scrap => 0.0,
        }
    }
}

// =========================================================================
// Output shapes
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountMetric {
    pub count: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicianLoad {
    pub technician: RecordId,
    pub username: String,
    pub open: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadMetric {
    pub label: String,
    pub details: String,
    pub percent: usize,
    pub technicians: usize,
    pub breakdown: Vec<TechnicianLoad>,
    /// Open requests nobody is assigned to
    pub unassigned: usize,
}

/// Organisation-wide dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub critical_equipment: CountMetric,
    pub technician_load: LoadMetric,
    pub open_requests: CountMetric,
}

/// A technician's own numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TechnicianStats {
    pub assigned: usize,
    pub completed: usize,
}

/// Stats shaped for the caller's role
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Stats {
    Global(DashboardStats),
    Technician(TechnicianStats),
}

// =========================================================================
// Aggregation
// =========================================================================

/// Compute the global dashboard
///
/// `users` may contain every account; only TECHNICIAN accounts count toward
/// workforce size.
pub fn aggregate(
    equipment: &[Equipment],
    requests: &[Request],
    users: &[User],
    scorer: &dyn HealthScorer,
    config: &StatsConfig,
) -> DashboardStats {
    let critical = equipment
        .iter()
        .filter(|e| {
            let raised: Vec<&Request> = requests
                .iter()
                .filter(|r| r.target.equipment() == Some(e.id))
                .collect();
            scorer.score(e, &raised) < config.critical_health_threshold
        })
        .count();

    let open: Vec<&Request> = requests.iter().filter(|r| r.stage.is_open()).collect();

    let technicians: Vec<&User> = users.iter().filter(|u| u.role == Role::Technician).collect();
    let capacity = technicians.len() * config.requests_per_technician as usize;
    let percent = if capacity == 0 {
        0
    } else {
        open.len() * 100 / capacity
    };

    let breakdown = technicians
        .iter()
        .map(|t| TechnicianLoad {
            technician: t.id,
            username: t.username.clone(),
            open: open.iter().filter(|r| r.technician == Some(t.id)).count(),
        })
        .collect();

    DashboardStats {
        critical_equipment: CountMetric {
            count: critical,
            label: CRITICAL_EQUIPMENT_LABEL.to_string(),
        },
        technician_load: LoadMetric {
            label: format!("{}% Utilized", percent),
            details: LOAD_DETAILS.to_string(),
            percent,
            technicians: technicians.len(),
            breakdown,
            unassigned: open.iter().filter(|r| r.technician.is_none()).count(),
        },
        open_requests: CountMetric {
            count: open.len(),
            label: OPEN_REQUESTS_LABEL.to_string(),
        },
    }
}

/// Counts over the requests assigned to one technician
pub fn technician_view(requests: &[Request], technician: RecordId) -> TechnicianStats {
    let mine = requests.iter().filter(|r| r.technician == Some(technician));
    let (assigned, completed) = mine.fold((0, 0), |(assigned, completed), r| {
        (assigned + 1, completed + usize::from(r.stage == Stage::Repaired))
    });
    TechnicianStats {
        assigned,
        completed,
    }
}

/// Gathers inputs from the directory and shapes stats per role
pub struct StatsAggregator<'a> {
    directory: &'a dyn ResourceDirectory,
    config: &'a StatsConfig,
    scorer: Box<dyn HealthScorer + 'a>,
    matrix: AuthorizationMatrix,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(directory: &'a dyn ResourceDirectory, config: &'a StatsConfig) -> Self {
        Self::with_scorer(directory, config, Box::new(StatusHealthScorer))
    }

    pub fn with_scorer(
        directory: &'a dyn ResourceDirectory,
        config: &'a StatsConfig,
        scorer: Box<dyn HealthScorer + 'a>,
    ) -> Self {
        Self {
            directory,
            config,
            scorer,
            matrix: AuthorizationMatrix::standard(),
        }
    }

    pub fn stats(&self, session: &Session) -> ServiceResult<Stats> {
        self.matrix
            .require(session, ResourceKind::Request, Action::Read)?;

        match session.role {
            Role::Admin | Role::Manager => {
                let equipment = self.directory.equipment_list()?;
                let requests = self.directory.requests(&RequestQuery::default())?;
                let users = self.directory.users()?;
                let stats = aggregate(
                    &equipment,
                    &requests,
                    &users,
                    self.scorer.as_ref(),
                    self.config,
                );
                debug!(
                    user = %session.username,
                    open = stats.open_requests.count,
                    critical = stats.critical_equipment.count,
                    "computed dashboard"
                );
                Ok(Stats::Global(stats))
            }
            Role::Technician => {
                let mut query = RequestQuery::default();
                self.matrix
                    .scope(session.role, ResourceKind::Request)
                    .narrow(&mut query, session);
                let requests = self.directory.requests(&query)?;
                let stats = technician_view(&requests, session.user_id);
                debug!(user = %session.username, assigned = stats.assigned, "computed technician stats");
                Ok(Stats::Technician(stats))
            }
            Role::Employee => {
                warn!(user = %session.username, "stats refused for employee");
                Err(ServiceError::OutOfScope {
                    message: "The dashboard is not available to employees".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Priority;
    use crate::entities::request::{RequestType, Target};
    use chrono::Utc;

    fn equipment(id: RecordId, status: AssetStatus) -> Equipment {
        Equipment {
            id,
            name: format!("Unit {}", id),
            serial_number: format!("SN-{}", id),
            location: None,
            department: "Ops".to_string(),
            category: None,
            default_team: None,
            default_technician: None,
            status,
            description: None,
        }
    }

    fn request(id: RecordId, stage: Stage, technician: Option<RecordId>) -> Request {
        Request {
            id,
            title: format!("Job {}", id),
            description: String::new(),
            target: Target::Equipment(1),
            request_type: RequestType::Corrective,
            priority: Priority::Medium,
            stage,
            reporter: 1,
            technician,
            team: None,
            scheduled_date: None,
            duration_minutes: 0,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    fn user(id: RecordId, role: Role) -> User {
        User {
            id,
            username: format!("u{}", id),
            email: format!("u{}@example.com", id),
            role,
            team: None,
            department: None,
            company: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_requests_count_new_and_in_progress() {
        let requests = vec![
            request(1, Stage::New, None),
            request(2, Stage::InProgress, Some(5)),
            request(3, Stage::Repaired, Some(5)),
            request(4, Stage::Scrap, None),
        ];
        let stats = aggregate(
            &[],
            &requests,
            &[],
            &StatusHealthScorer,
            &StatsConfig::default(),
        );
        assert_eq!(stats.open_requests.count, 2);
        assert_eq!(stats.open_requests.label, "Pending Requests");
        assert_eq!(stats.technician_load.label, "0% Utilized");
        assert_eq!(stats.technician_load.details, "(Based on active requests)");
    }

    #[test]
    fn test_critical_equipment_is_not_active_count() {
        let units = vec![
            equipment(1, AssetStatus::Active),
            equipment(2, AssetStatus::UnderMaintenance),
            equipment(3, AssetStatus::Scrap),
        ];
        let stats = aggregate(&units, &[], &[], &StatusHealthScorer, &StatsConfig::default());
        assert_eq!(stats.critical_equipment.count, 2);
        assert_eq!(stats.critical_equipment.label, "Units (Not Active)");
    }

    #[test]
    fn test_load_percentage_floors() {
        // 3 open over 2 technicians at 5 each = 30%
        let requests = vec![
            request(1, Stage::New, Some(10)),
            request(2, Stage::New, Some(10)),
            request(3, Stage::InProgress, None),
        ];
        let users = vec![
            user(10, Role::Technician),
            user(11, Role::Technician),
            user(12, Role::Manager),
        ];
        let stats = aggregate(&[], &requests, &users, &StatusHealthScorer, &StatsConfig::default());
        assert_eq!(stats.technician_load.label, "30% Utilized");
        assert_eq!(stats.technician_load.technicians, 2);
        assert_eq!(stats.technician_load.unassigned, 1);
        assert_eq!(stats.technician_load.breakdown[0].open, 2);
        assert_eq!(stats.technician_load.breakdown[1].open, 0);

        // 1 open over 3 technicians = 6.66% -> 6%
        let users = vec![
            user(10, Role::Technician),
            user(11, Role::Technician),
            user(13, Role::Technician),
        ];
        let stats = aggregate(
            &[],
            &requests[..1],
            &users,
            &StatusHealthScorer,
            &StatsConfig::default(),
        );
        assert_eq!(stats.technician_load.label, "6% Utilized");
    }

    #[test]
    fn test_custom_scorer() {
        struct OpenRequestPenalty;
        impl HealthScorer for OpenRequestPenalty {
            fn score(&self, _equipment: &Equipment, requests: &[&Request]) -> f64 {
                100.0 - 40.0 * requests.iter().filter(|r| r.stage.is_open()).count() as f64
            }
        }

        let units = vec![equipment(1, AssetStatus::Active)];
        let requests = vec![request(1, Stage::New, None), request(2, Stage::New, None)];
        let stats = aggregate(&units, &requests, &[], &OpenRequestPenalty, &StatsConfig::default());
        assert_eq!(stats.critical_equipment.count, 1);
    }

    #[test]
    fn test_technician_view() {
        let requests = vec![
            request(1, Stage::Repaired, Some(5)),
            request(2, Stage::InProgress, Some(5)),
            request(3, Stage::Repaired, Some(6)),
        ];
        assert_eq!(
            technician_view(&requests, 5),
            TechnicianStats {
                assigned: 2,
                completed: 1
            }
        );
    }

    #[test]
    fn test_stats_view_tag() {
        let json = serde_json::to_value(Stats::Technician(TechnicianStats {
            assigned: 1,
            completed: 0,
        }))
        .unwrap();
        assert_eq!(json["view"], "technician");
        assert_eq!(json["assigned"], 1);
    }
}
