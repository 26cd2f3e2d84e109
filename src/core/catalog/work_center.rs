use tracing::{debug, info};

use super::{required, Catalog};
use crate::core::authz::{Action, ResourceKind};
use crate::core::entity::RecordId;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::session::Session;
use crate::entities::request::RequestQuery;
use crate::entities::work_center::{NewWorkCenter, WorkCenter, WorkCenterPatch};

impl<'a> Catalog<'a> {
    pub fn list_work_centers(&self, session: &Session) -> ServiceResult<Vec<WorkCenter>> {
        self.require(session, ResourceKind::WorkCenter, Action::Read)?;
        let list = self.directory.work_centers()?;
        debug!(count = list.len(), "listed work centers");
        Ok(list)
    }

    pub fn work_center(&self, session: &Session, id: RecordId) -> ServiceResult<WorkCenter> {
        self.require(session, ResourceKind::WorkCenter, Action::Read)?;
        self.load_work_center(id)
    }

    pub fn create_work_center(
        &self,
        session: &Session,
        mut new: NewWorkCenter,
    ) -> ServiceResult<WorkCenter> {
        self.require(session, ResourceKind::WorkCenter, Action::Create)?;
        new.name = required("Name", &new.name)?;
        new.code = required("Code", &new.code)?;
        new.department = required("Department", &new.department)?;
        check_oee(new.oee_target)?;
        self.check_code(&new.code, None)?;

        let wc = self.directory.insert_work_center(&new)?;
        info!(id = wc.id, code = %wc.code, user = %session.username, "created work center");
        Ok(wc)
    }

    pub fn update_work_center(
        &self,
        session: &Session,
        id: RecordId,
        patch: WorkCenterPatch,
    ) -> ServiceResult<WorkCenter> {
        self.require(session, ResourceKind::WorkCenter, Action::Update)?;
        let mut wc = self.load_work_center(id)?;
        patch.apply(&mut wc);

        wc.name = required("Name", &wc.name)?;
        wc.code = required("Code", &wc.code)?;
        wc.department = required("Department", &wc.department)?;
        check_oee(wc.oee_target)?;
        self.check_code(&wc.code, Some(id))?;

        self.directory.update_work_center(&wc)?;
        info!(id, user = %session.username, "updated work center");
        Ok(wc)
    }

    /// Refused while any request still points at the work center
    pub fn delete_work_center(&self, session: &Session, id: RecordId) -> ServiceResult<()> {
        self.require(session, ResourceKind::WorkCenter, Action::Delete)?;
        let wc = self.load_work_center(id)?;
        let referenced = self.count_requests(RequestQuery {
            work_center: Some(id),
            ..Default::default()
        })?;
        if referenced > 0 {
            return Err(ServiceError::validation(format!(
                "Work center '{}' still has {} request(s)",
                wc.code, referenced
            )));
        }
        self.directory.delete_work_center(id)?;
        info!(id, user = %session.username, "deleted work center");
        Ok(())
    }

    fn load_work_center(&self, id: RecordId) -> ServiceResult<WorkCenter> {
        self.directory
            .work_center(id)?
            .ok_or_else(|| ServiceError::not_found("work_center", id))
    }

    fn check_code(&self, code: &str, current: Option<RecordId>) -> ServiceResult<()> {
        match self.directory.work_center_by_code(code)? {
            Some(existing) if Some(existing.id) != current => Err(ServiceError::validation(
                format!("Work center code '{}' is already in use", code),
            )),
            _ => Ok(()),
        }
    }
}

fn check_oee(target: u8) -> ServiceResult<()> {
    if target > 100 {
        return Err(ServiceError::validation(format!(
            "OEE target must be between 0 and 100, got {}",
            target
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::session;
    use super::*;
    use crate::core::directory::SqliteDirectory;
    use crate::entities::user::Role;
    use crate::entities::work_center::DEFAULT_OEE_TARGET;

    fn new_wc(code: &str) -> NewWorkCenter {
        NewWorkCenter {
            name: "Paint shop".to_string(),
            code: code.to_string(),
            department: "Finishing".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_defaults_and_unique_code() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let manager = session(&dir, "mona", Role::Manager);
        let catalog = Catalog::new(&dir);

        let wc = catalog.create_work_center(&manager, new_wc("PS-1")).unwrap();
        assert_eq!(wc.oee_target, DEFAULT_OEE_TARGET);
        assert!(catalog.create_work_center(&manager, new_wc("ps-1")).is_err());
    }

    #[test]
    fn test_oee_target_bounds() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let manager = session(&dir, "mona", Role::Manager);
        let catalog = Catalog::new(&dir);
        let wc = catalog.create_work_center(&manager, new_wc("PS-2")).unwrap();

        let err = catalog
            .update_work_center(
                &manager,
                wc.id,
                WorkCenterPatch {
                    oee_target: Some(101),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "validation_error");
    }

    #[test]
    fn test_technician_cannot_read_work_centers() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let tech = session(&dir, "tom", Role::Technician);
        let employee = session(&dir, "emma", Role::Employee);
        let catalog = Catalog::new(&dir);

        assert_eq!(
            catalog.list_work_centers(&tech).unwrap_err().kind().as_str(),
            "forbidden"
        );
        assert!(catalog.list_work_centers(&employee).is_ok());
    }
}
