use tracing::{debug, info};

use super::{required, Catalog};
use crate::core::authz::{Action, ResourceKind};
use crate::core::directory::TeamDetachment;
use crate::core::entity::RecordId;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::session::Session;
use crate::entities::team::{NewTeam, Team, TeamPatch};
use crate::entities::user::User;

impl<'a> Catalog<'a> {
    pub fn list_teams(&self, session: &Session) -> ServiceResult<Vec<Team>> {
        self.require(session, ResourceKind::Team, Action::Read)?;
        let list = self.directory.teams()?;
        debug!(count = list.len(), "listed teams");
        Ok(list)
    }

    pub fn team(&self, session: &Session, id: RecordId) -> ServiceResult<Team> {
        self.require(session, ResourceKind::Team, Action::Read)?;
        self.load_team(id)
    }

    pub fn create_team(&self, session: &Session, mut new: NewTeam) -> ServiceResult<Team> {
        self.require(session, ResourceKind::Team, Action::Create)?;
        new.name = required("Name", &new.name)?;
        self.check_team_name(&new.name, None)?;
        let team = self.directory.insert_team(&new)?;
        info!(id = team.id, name = %team.name, user = %session.username, "created team");
        Ok(team)
    }

    pub fn update_team(
        &self,
        session: &Session,
        id: RecordId,
        patch: TeamPatch,
    ) -> ServiceResult<Team> {
        self.require(session, ResourceKind::Team, Action::Update)?;
        let mut team = self.load_team(id)?;
        patch.apply(&mut team);
        team.name = required("Name", &team.name)?;
        self.check_team_name(&team.name, Some(id))?;
        self.directory.update_team(&team)?;
        info!(id, user = %session.username, "updated team");
        Ok(team)
    }

    /// Delete a team after clearing every reference to it. Members keep their
    /// accounts and simply end up without a team.
    pub fn delete_team(&self, session: &Session, id: RecordId) -> ServiceResult<TeamDetachment> {
        self.require(session, ResourceKind::Team, Action::Delete)?;
        self.load_team(id)?;
        let detached = self.directory.detach_team(id)?;
        self.directory.delete_team(id)?;
        info!(
            id,
            user = %session.username,
            members = detached.members,
            equipment = detached.equipment,
            requests = detached.requests,
            "deleted team"
        );
        Ok(detached)
    }

    pub fn team_members(&self, session: &Session, id: RecordId) -> ServiceResult<Vec<User>> {
        self.require(session, ResourceKind::Team, Action::Read)?;
        self.load_team(id)?;
        Ok(self
            .directory
            .users()?
            .into_iter()
            .filter(|u| u.team == Some(id))
            .collect())
    }

    /// Point a user at this team, moving them out of any previous one
    pub fn add_member(
        &self,
        session: &Session,
        team: RecordId,
        user: RecordId,
    ) -> ServiceResult<User> {
        self.require(session, ResourceKind::Team, Action::Update)?;
        self.require(session, ResourceKind::User, Action::Update)?;
        self.load_team(team)?;
        let mut member = self.load_user(user)?;
        member.team = Some(team);
        self.directory.update_user(&member)?;
        info!(team, user = %member.username, "added team member");
        Ok(member)
    }

    pub fn remove_member(
        &self,
        session: &Session,
        team: RecordId,
        user: RecordId,
    ) -> ServiceResult<User> {
        self.require(session, ResourceKind::Team, Action::Update)?;
        self.require(session, ResourceKind::User, Action::Update)?;
        self.load_team(team)?;
        let mut member = self.load_user(user)?;
        if member.team != Some(team) {
            return Err(ServiceError::validation(format!(
                "User '{}' is not a member of team {}",
                member.username, team
            )));
        }
        member.team = None;
        self.directory.update_user(&member)?;
        info!(team, user = %member.username, "removed team member");
        Ok(member)
    }

    fn load_team(&self, id: RecordId) -> ServiceResult<Team> {
        self.directory
            .team(id)?
            .ok_or_else(|| ServiceError::not_found("team", id))
    }

    fn check_team_name(&self, name: &str, current: Option<RecordId>) -> ServiceResult<()> {
        match self.directory.team_by_name(name)? {
            Some(existing) if Some(existing.id) != current => Err(ServiceError::validation(
                format!("Team '{}' already exists", name),
            )),
            _ => Ok(()),
        }
    }
}
