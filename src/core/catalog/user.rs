use tracing::{info, warn};

use super::Catalog;
use crate::core::authz::{Action, ResourceKind};
use crate::core::entity::RecordId;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::session::Session;
use crate::entities::user::{User, UserFilter, UserPatch};

impl<'a> Catalog<'a> {
    pub fn list_users(&self, session: &Session, filter: &UserFilter) -> ServiceResult<Vec<User>> {
        self.require(session, ResourceKind::User, Action::Read)?;
        Ok(self
            .directory
            .users()?
            .into_iter()
            .filter(|u| filter.matches(u))
            .collect())
    }

    pub fn user(&self, session: &Session, id: RecordId) -> ServiceResult<User> {
        self.require(session, ResourceKind::User, Action::Read)?;
        self.load_user(id)
    }

    /// The caller's own account; every role may read it
    pub fn me(&self, session: &Session) -> ServiceResult<User> {
        self.load_user(session.user_id)
    }

    /// Change role, team or profile labels
    pub fn update_user(
        &self,
        session: &Session,
        id: RecordId,
        patch: UserPatch,
    ) -> ServiceResult<User> {
        self.require(session, ResourceKind::User, Action::Update)?;
        if patch.is_empty() {
            return Err(ServiceError::validation("Nothing to update"));
        }
        let mut user = self.load_user(id)?;
        if let Some(team) = patch.team {
            self.check_team(team)?;
        }
        let previous_role = user.role;
        patch.apply(&mut user);
        self.directory.update_user(&user)?;

        if user.role != previous_role {
            warn!(
                user = %user.username,
                from = %previous_role,
                to = %user.role,
                by = %session.username,
                "role changed"
            );
        }
        info!(id, by = %session.username, "updated user");
        Ok(user)
    }

    /// Refused while requests or equipment still point at the user
    pub fn delete_user(&self, session: &Session, id: RecordId) -> ServiceResult<()> {
        self.require(session, ResourceKind::User, Action::Delete)?;
        if id == session.user_id {
            return Err(ServiceError::validation("You cannot delete your own account"));
        }
        let user = self.load_user(id)?;
        let refs = self.directory.user_references(id)?;
        if refs.total() > 0 {
            return Err(ServiceError::validation(format!(
                "User '{}' is still referenced by {} reported request(s), {} assigned request(s) and {} equipment default(s)",
                user.username, refs.reported, refs.assigned, refs.default_for_equipment
            )));
        }
        self.directory.delete_user(id)?;
        info!(id, username = %user.username, by = %session.username, "deleted user");
        Ok(())
    }

    pub(super) fn load_user(&self, id: RecordId) -> ServiceResult<User> {
        self.directory
            .user(id)?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::session;
    use super::*;
    use crate::core::directory::SqliteDirectory;
    use crate::entities::user::Role;

    #[test]
    fn test_manager_changes_role_and_team() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let manager = session(&dir, "mona", Role::Manager);
        let emp = session(&dir, "emma", Role::Employee);
        let catalog = Catalog::new(&dir);

        let updated = catalog
            .update_user(
                &manager,
                emp.user_id,
                UserPatch {
                    role: Some(Role::Technician),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.role, Role::Technician);

        let err = catalog
            .update_user(
                &manager,
                emp.user_id,
                UserPatch {
                    team: Some(Some(42)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "validation_error");
    }

    #[test]
    fn test_only_admin_deletes_users() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let admin = session(&dir, "ada", Role::Admin);
        let manager = session(&dir, "mona", Role::Manager);
        let emp = session(&dir, "emma", Role::Employee);
        let catalog = Catalog::new(&dir);

        assert!(catalog.delete_user(&manager, emp.user_id).is_err());
        assert!(catalog.delete_user(&admin, admin.user_id).is_err());
        catalog.delete_user(&admin, emp.user_id).unwrap();
        assert_eq!(
            catalog.user(&admin, emp.user_id).unwrap_err().kind().as_str(),
            "not_found"
        );
    }

    #[test]
    fn test_employee_reads_own_account_only() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let admin = session(&dir, "ada", Role::Admin);
        let emp = session(&dir, "emma", Role::Employee);
        let catalog = Catalog::new(&dir);

        assert_eq!(catalog.me(&emp).unwrap().username, "emma");
        let err = catalog.user(&emp, admin.user_id).unwrap_err();
        assert_eq!(err.kind().as_str(), "forbidden");
    }

    #[test]
    fn test_filter_by_role() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let admin = session(&dir, "ada", Role::Admin);
        session(&dir, "tom", Role::Technician);
        session(&dir, "tim", Role::Technician);
        let catalog = Catalog::new(&dir);

        let filter = UserFilter {
            role: Some(Role::Technician),
            team: None,
        };
        assert_eq!(catalog.list_users(&admin, &filter).unwrap().len(), 2);
    }
}
