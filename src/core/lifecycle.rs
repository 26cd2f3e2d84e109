//! Request lifecycle
//!
//! Owns request records and moves them through their stages. Every entry
//! point checks the authorization matrix first, then the caller's record
//! scope, then the request's own invariants.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::core::assignment::{Assignment, AssignmentResolver};
use crate::core::authz::{Action, AuthorizationMatrix, ResourceKind};
use crate::core::config::LifecycleConfig;
use crate::core::directory::ResourceDirectory;
use crate::core::entity::{AssetStatus, RecordId};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::session::Session;
use crate::entities::request::{
    NewRequest, Request, RequestDraft, RequestPatch, RequestQuery, RequestType, Stage, Target,
};

/// Page size applied to listings that do not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 100;

// =========================================================================
// Stage table
// =========================================================================

/// Allowed stage moves, keyed by the current stage
///
/// Stages missing from the table have no outgoing moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageTable(BTreeMap<Stage, Vec<Stage>>);

impl Default for StageTable {
    fn default() -> Self {
        Self::permissive()
    }
}

impl StageTable {
    /// Every stage may move to every stage, itself included
    pub fn permissive() -> Self {
        Self(
            Stage::ALL
                .into_iter()
                .map(|from| (from, Stage::ALL.to_vec()))
                .collect(),
        )
    }

    /// Build a table from explicit (from, to) pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Stage, Stage)>) -> Self {
        let mut table: BTreeMap<Stage, Vec<Stage>> = BTreeMap::new();
        for (from, to) in pairs {
            let targets = table.entry(from).or_default();
            if !targets.contains(&to) {
                targets.push(to);
            }
        }
        Self(table)
    }

    pub fn allows(&self, from: Stage, to: Stage) -> bool {
        self.0.get(&from).map_or(false, |targets| targets.contains(&to))
    }

    /// Stages reachable from `from`, in lifecycle order
    pub fn allowed_from(&self, from: Stage) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|to| self.allows(from, *to))
            .collect()
    }

    /// A stage with no way out
    pub fn is_terminal(&self, stage: Stage) -> bool {
        self.allowed_from(stage).is_empty()
    }
}

// =========================================================================
// RequestManager
// =========================================================================

pub struct RequestManager<'a> {
    directory: &'a dyn ResourceDirectory,
    config: &'a LifecycleConfig,
    matrix: AuthorizationMatrix,
}

impl<'a> RequestManager<'a> {
    pub fn new(directory: &'a dyn ResourceDirectory, config: &'a LifecycleConfig) -> Self {
        Self {
            directory,
            config,
            matrix: AuthorizationMatrix::standard(),
        }
    }

    pub fn transitions(&self) -> &StageTable {
        &self.config.transitions
    }

    /// Raise a new request; it always starts at NEW with the caller as reporter
    pub fn create(&self, session: &Session, draft: RequestDraft) -> ServiceResult<Request> {
        self.matrix
            .require(session, ResourceKind::Request, Action::Create)?;

        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }
        let target = require_single_target(draft.equipment, draft.work_center)?;
        self.check_target(target)?;

        if draft.request_type == RequestType::Preventive
            && self.config.require_schedule_for_preventive
            && draft.scheduled_date.is_none()
        {
            return Err(ServiceError::validation(
                "Preventive requests must have a scheduled date",
            ));
        }

        let explicit = Assignment::new(draft.technician, draft.team);
        self.check_assignment(explicit)?;
        let assignment = AssignmentResolver::new(self.directory).resolve(target, explicit)?;

        let request = self.directory.insert_request(&NewRequest {
            title: title.to_string(),
            description: draft.description,
            target,
            request_type: draft.request_type,
            priority: draft.priority,
            reporter: session.user_id,
            technician: assignment.technician,
            team: assignment.team,
            scheduled_date: draft.scheduled_date,
            duration_minutes: draft.duration_minutes,
            created_at: Utc::now(),
        })?;

        info!(
            id = request.id,
            reporter = %session.username,
            %target,
            technician = ?request.technician,
            team = ?request.team,
            "created request"
        );
        Ok(request)
    }

    /// Fetch one request the caller is allowed to see
    pub fn get(&self, session: &Session, id: RecordId) -> ServiceResult<Request> {
        self.matrix
            .require(session, ResourceKind::Request, Action::Read)?;
        let request = self.load(id)?;
        self.matrix.require_in_scope(session, &request)?;
        Ok(request)
    }

    /// Apply a patch. Stage is untouched; see [`Self::transition_stage`].
    pub fn update(
        &self,
        session: &Session,
        id: RecordId,
        patch: RequestPatch,
    ) -> ServiceResult<Request> {
        self.matrix
            .require(session, ResourceKind::Request, Action::Update)?;
        let mut request = self.load(id)?;
        self.matrix.require_in_scope(session, &request)?;

        if let Some(ref title) = patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ServiceError::validation("Title is required"));
            }
            request.title = title.to_string();
        }
        if let Some(ref description) = patch.description {
            request.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            request.priority = priority;
        }
        if let Some(request_type) = patch.request_type {
            request.request_type = request_type;
        }
        if let Some(scheduled_date) = patch.scheduled_date {
            request.scheduled_date = scheduled_date;
        }
        if let Some(duration) = patch.duration_minutes {
            request.duration_minutes = duration;
        }

        if patch.changes_target() {
            let equipment = patch.equipment.unwrap_or(request.target.equipment());
            let work_center = patch.work_center.unwrap_or(request.target.work_center());
            let target = require_single_target(equipment, work_center)?;
            self.check_target(target)?;
            request.target = target;
        }

        if request.request_type == RequestType::Preventive
            && self.config.require_schedule_for_preventive
            && request.scheduled_date.is_none()
        {
            return Err(ServiceError::validation(
                "Preventive requests must have a scheduled date",
            ));
        }

        let explicit = Assignment::new(patch.technician.flatten(), patch.team.flatten());
        self.check_assignment(explicit)?;
        if patch.reassign {
            let base = Assignment::new(
                patch.technician.unwrap_or(None),
                patch.team.unwrap_or(None),
            );
            let resolved = AssignmentResolver::new(self.directory).resolve(request.target, base)?;
            request.technician = match patch.technician {
                Some(technician) => technician,
                None => resolved.technician,
            };
            request.team = match patch.team {
                Some(team) => team,
                None => resolved.team,
            };
        } else {
            if let Some(technician) = patch.technician {
                request.technician = technician;
            }
            if let Some(team) = patch.team {
                request.team = team;
            }
        }

        if self.config.enforce_team_membership {
            if let (Some(Some(technician)), Some(team)) = (patch.technician, request.team) {
                self.check_membership(technician, team)?;
            }
        }

        self.directory.update_request(&request)?;
        info!(id, user = %session.username, "updated request");
        Ok(request)
    }

    /// Move a request to another stage through the configured table
    pub fn transition_stage(
        &self,
        session: &Session,
        id: RecordId,
        to: Stage,
    ) -> ServiceResult<Request> {
        self.matrix
            .require(session, ResourceKind::Request, Action::TransitionStage)?;
        let mut request = self.load(id)?;
        self.matrix.require_in_scope(session, &request)?;

        let from = request.stage;
        if !self.config.transitions.allows(from, to) {
            return Err(ServiceError::validation(format!(
                "Invalid stage transition: {} -> {}",
                from, to
            )));
        }
        request.stage = to;

        if self.config.capture_work_timestamps {
            let now = Utc::now();
            match to {
                Stage::InProgress if from != Stage::InProgress => request.started_at = Some(now),
                Stage::Repaired => {
                    request.completed_at = Some(now);
                    if let Some(started) = request.started_at {
                        request.duration_minutes = (now - started).num_minutes().max(0) as u32;
                    }
                }
                _ => {}
            }
        }

        if to == Stage::Scrap && self.config.scrap_marks_equipment {
            if let Some(equipment_id) = request.target.equipment() {
                if let Some(mut equipment) = self.directory.equipment(equipment_id)? {
                    equipment.status = AssetStatus::Scrap;
                    self.directory.update_equipment(&equipment)?;
                    info!(equipment = equipment_id, request = id, "equipment scrapped");
                }
            }
        }

        self.directory.update_request(&request)?;
        info!(id, user = %session.username, %from, %to, "stage changed");
        Ok(request)
    }

    /// Requests matching the filters, narrowed to what the caller may see
    pub fn list(&self, session: &Session, mut query: RequestQuery) -> ServiceResult<Vec<Request>> {
        self.matrix
            .require(session, ResourceKind::Request, Action::Read)?;
        self.matrix
            .scope(session.role, ResourceKind::Request)
            .narrow(&mut query, session);
        if query.limit.is_none() {
            query.limit = Some(DEFAULT_PAGE_SIZE);
        }
        let requests = self.directory.requests(&query)?;
        debug!(user = %session.username, count = requests.len(), "listed requests");
        Ok(requests)
    }

    pub fn delete(&self, session: &Session, id: RecordId) -> ServiceResult<()> {
        self.matrix
            .require(session, ResourceKind::Request, Action::Delete)?;
        let request = self.load(id)?;
        self.directory.delete_request(request.id)?;
        info!(id, user = %session.username, "deleted request");
        Ok(())
    }

    /// Stages the request could move to next
    pub fn allowed_transitions(&self, session: &Session, id: RecordId) -> ServiceResult<Vec<Stage>> {
        let request = self.get(session, id)?;
        Ok(self.config.transitions.allowed_from(request.stage))
    }

    fn load(&self, id: RecordId) -> ServiceResult<Request> {
        self.directory
            .request(id)?
            .ok_or_else(|| ServiceError::not_found("request", id))
    }

    fn check_target(&self, target: Target) -> ServiceResult<()> {
        let exists = match target {
            Target::Equipment(id) => self.directory.equipment(id)?.is_some(),
            Target::WorkCenter(id) => self.directory.work_center(id)?.is_some(),
        };
        if exists {
            Ok(())
        } else {
            Err(ServiceError::validation(format!("Referenced {} does not exist", target)))
        }
    }

    fn check_assignment(&self, assignment: Assignment) -> ServiceResult<()> {
        if let Some(technician) = assignment.technician {
            if self.directory.user(technician)?.is_none() {
                return Err(ServiceError::validation(format!(
                    "Technician {} does not exist",
                    technician
                )));
            }
        }
        if let Some(team) = assignment.team {
            if self.directory.team(team)?.is_none() {
                return Err(ServiceError::validation(format!("Team {} does not exist", team)));
            }
        }
        Ok(())
    }

    fn check_membership(&self, technician: RecordId, team: RecordId) -> ServiceResult<()> {
        let user = self
            .directory
            .user(technician)?
            .ok_or_else(|| ServiceError::validation(format!("Technician {} does not exist", technician)))?;
        if user.team != Some(team) {
            return Err(ServiceError::validation(
                "Technician does not belong to the assigned team",
            ));
        }
        Ok(())
    }
}

fn require_single_target(
    equipment: Option<RecordId>,
    work_center: Option<RecordId>,
) -> ServiceResult<Target> {
    Target::from_refs(equipment, work_center).ok_or_else(|| {
        ServiceError::validation("A request needs exactly one of equipment or work center")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::SqliteDirectory;
    use crate::core::entity::Priority;
    use crate::entities::equipment::NewEquipment;
    use crate::entities::team::NewTeam;
    use crate::entities::user::{NewUser, Role};
    use crate::entities::work_center::NewWorkCenter;
    use chrono::Duration;

    struct Fixture {
        dir: SqliteDirectory,
        manager: Session,
        tech: Session,
        employee: Session,
        equipment: RecordId,
        work_center: RecordId,
        team: RecordId,
    }

    fn user(dir: &SqliteDirectory, name: &str, role: Role, team: Option<RecordId>) -> Session {
        let u = dir
            .insert_user(
                &NewUser {
                    username: name.to_string(),
                    email: format!("{}@plant.test", name),
                    role,
                    team,
                    ..Default::default()
                },
                "x",
                Utc::now(),
            )
            .unwrap();
        Session::new(u.id, name, role)
    }

    fn fixture() -> Fixture {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let team = dir
            .insert_team(&NewTeam {
                name: "Mechanics".to_string(),
                description: None,
            })
            .unwrap()
            .id;
        let manager = user(&dir, "mona", Role::Manager, None);
        let tech = user(&dir, "tom", Role::Technician, Some(team));
        let employee = user(&dir, "emma", Role::Employee, None);
        let equipment = dir
            .insert_equipment(&NewEquipment {
                name: "Conveyor".to_string(),
                serial_number: "CV-1".to_string(),
                department: "Packing".to_string(),
                default_technician: Some(tech.user_id),
                default_team: Some(team),
                ..Default::default()
            })
            .unwrap()
            .id;
        let work_center = dir
            .insert_work_center(&NewWorkCenter {
                name: "Assembly".to_string(),
                code: "AS-1".to_string(),
                department: "Assembly".to_string(),
                ..Default::default()
            })
            .unwrap()
            .id;
        Fixture {
            dir,
            manager,
            tech,
            employee,
            equipment,
            work_center,
            team,
        }
    }

    fn draft(equipment: Option<RecordId>, work_center: Option<RecordId>) -> RequestDraft {
        RequestDraft {
            title: "Belt stuck".to_string(),
            equipment,
            work_center,
            priority: Priority::High,
            ..Default::default()
        }
    }

    #[test]
    fn test_permissive_table_allows_every_pair() {
        let table = StageTable::permissive();
        for from in Stage::ALL {
            for to in Stage::ALL {
                assert!(table.allows(from, to));
            }
            assert!(!table.is_terminal(from));
        }
    }

    #[test]
    fn test_tightened_table() {
        let table = StageTable::from_pairs([
            (Stage::New, Stage::InProgress),
            (Stage::New, Stage::Scrap),
            (Stage::InProgress, Stage::Repaired),
            (Stage::InProgress, Stage::Scrap),
        ]);
        assert_eq!(
            table.allowed_from(Stage::New),
            vec![Stage::InProgress, Stage::Scrap]
        );
        assert!(table.is_terminal(Stage::Repaired));
        assert!(!table.allows(Stage::Scrap, Stage::New));
    }

    #[test]
    fn test_create_resolves_equipment_defaults() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);

        let request = requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();
        assert_eq!(request.stage, Stage::New);
        assert_eq!(request.technician, Some(f.tech.user_id));
        assert_eq!(request.team, Some(f.team));
        assert_eq!(request.reporter, f.manager.user_id);
    }

    #[test]
    fn test_create_requires_exactly_one_target() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);

        for (eq, wc) in [(Some(f.equipment), Some(f.work_center)), (None, None)] {
            let err = requests.create(&f.manager, draft(eq, wc)).unwrap_err();
            assert_eq!(err.kind().as_str(), "validation_error");
        }
        let err = requests.create(&f.manager, draft(Some(999), None)).unwrap_err();
        assert_eq!(err.kind().as_str(), "validation_error");
    }

    #[test]
    fn test_employee_cannot_create() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);
        let err = requests
            .create(&f.employee, draft(Some(f.equipment), None))
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "forbidden");
    }

    #[test]
    fn test_preventive_needs_schedule() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);
        let mut d = draft(None, Some(f.work_center));
        d.request_type = RequestType::Preventive;
        assert!(requests.create(&f.manager, d.clone()).is_err());

        d.scheduled_date = Some(Utc::now() + Duration::days(3));
        assert!(requests.create(&f.manager, d).is_ok());
    }

    #[test]
    fn test_update_cannot_set_both_targets() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);
        let request = requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();

        let err = requests
            .update(
                &f.manager,
                request.id,
                RequestPatch {
                    work_center: Some(Some(f.work_center)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "validation_error");

        let moved = requests
            .update(
                &f.manager,
                request.id,
                RequestPatch {
                    equipment: Some(None),
                    work_center: Some(Some(f.work_center)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.target, Target::WorkCenter(f.work_center));
    }

    #[test]
    fn test_update_enforces_team_membership() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);
        let outsider = user(&f.dir, "otto", Role::Technician, None);
        let request = requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();

        let err = requests
            .update(
                &f.manager,
                request.id,
                RequestPatch {
                    technician: Some(Some(outsider.user_id)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.to_string().contains("does not belong"));
    }

    #[test]
    fn test_technician_limited_to_assigned_requests() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);
        let other = requests
            .create(&f.manager, draft(None, Some(f.work_center)))
            .unwrap();

        let err = requests
            .update(&f.tech, other.id, RequestPatch::default())
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "forbidden");

        let mine = requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();
        assert!(requests
            .transition_stage(&f.tech, mine.id, Stage::InProgress)
            .is_ok());
    }

    #[test]
    fn test_transition_has_no_side_effects_by_default() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);
        let request = requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();

        let moved = requests
            .transition_stage(&f.manager, request.id, Stage::Repaired)
            .unwrap();
        assert_eq!(moved.stage, Stage::Repaired);
        assert_eq!(moved.completed_at, None);

        // permissive table: terminal stages can be left again
        let back = requests
            .transition_stage(&f.manager, request.id, Stage::New)
            .unwrap();
        assert_eq!(back.stage, Stage::New);
    }

    #[test]
    fn test_transition_rejected_by_table() {
        let f = fixture();
        let config = LifecycleConfig {
            transitions: StageTable::from_pairs([(Stage::New, Stage::InProgress)]),
            ..Default::default()
        };
        let requests = RequestManager::new(&f.dir, &config);
        let request = requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();

        let err = requests
            .transition_stage(&f.manager, request.id, Stage::Repaired)
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid stage transition"));
    }

    #[test]
    fn test_stage_effects_when_enabled() {
        let f = fixture();
        let config = LifecycleConfig {
            capture_work_timestamps: true,
            scrap_marks_equipment: true,
            ..Default::default()
        };
        let requests = RequestManager::new(&f.dir, &config);
        let request = requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();

        let started = requests
            .transition_stage(&f.manager, request.id, Stage::InProgress)
            .unwrap();
        assert!(started.started_at.is_some());
        let done = requests
            .transition_stage(&f.manager, request.id, Stage::Repaired)
            .unwrap();
        assert!(done.completed_at.is_some());

        requests
            .transition_stage(&f.manager, request.id, Stage::Scrap)
            .unwrap();
        let eq = f.dir.equipment(f.equipment).unwrap().unwrap();
        assert_eq!(eq.status, AssetStatus::Scrap);
    }

    #[test]
    fn test_technician_list_is_self_scoped() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);
        requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();
        requests
            .create(&f.manager, draft(None, Some(f.work_center)))
            .unwrap();

        let seen = requests
            .list(
                &f.tech,
                RequestQuery {
                    technician: Some(9),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen.iter().all(|r| r.technician == Some(f.tech.user_id)));

        assert!(requests
            .list(&f.employee, RequestQuery::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_allowed_transitions_follow_table_and_scope() {
        let f = fixture();
        let config = LifecycleConfig {
            transitions: StageTable::from_pairs([
                (Stage::New, Stage::InProgress),
                (Stage::New, Stage::Scrap),
                (Stage::InProgress, Stage::Repaired),
            ]),
            ..Default::default()
        };
        let requests = RequestManager::new(&f.dir, &config);
        let mine = requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();

        assert_eq!(
            requests.allowed_transitions(&f.tech, mine.id).unwrap(),
            vec![Stage::InProgress, Stage::Scrap]
        );
        requests
            .transition_stage(&f.tech, mine.id, Stage::InProgress)
            .unwrap();
        requests
            .transition_stage(&f.tech, mine.id, Stage::Repaired)
            .unwrap();
        assert!(requests
            .allowed_transitions(&f.manager, mine.id)
            .unwrap()
            .is_empty());

        let other = requests
            .create(&f.manager, draft(None, Some(f.work_center)))
            .unwrap();
        let err = requests.allowed_transitions(&f.tech, other.id).unwrap_err();
        assert_eq!(err.kind().as_str(), "forbidden");
    }

    #[test]
    fn test_delete_and_not_found() {
        let f = fixture();
        let config = LifecycleConfig::default();
        let requests = RequestManager::new(&f.dir, &config);
        let request = requests
            .create(&f.manager, draft(Some(f.equipment), None))
            .unwrap();

        assert_eq!(
            requests.delete(&f.tech, request.id).unwrap_err().kind().as_str(),
            "forbidden"
        );
        requests.delete(&f.manager, request.id).unwrap();
        assert_eq!(
            requests.get(&f.manager, request.id).unwrap_err().kind().as_str(),
            "not_found"
        );
    }
}
