use serde::Serialize;
use tracing::{debug, info};

use super::{required, Catalog};
use crate::core::authz::{Action, ResourceKind};
use crate::core::entity::RecordId;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::session::Session;
use crate::entities::equipment::{Equipment, EquipmentFilter, EquipmentPatch, NewEquipment};
use crate::entities::request::{Request, RequestQuery};

/// A unit together with the requests raised against it
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentRequests {
    pub equipment: Equipment,
    pub open: usize,
    pub requests: Vec<Request>,
}

impl<'a> Catalog<'a> {
    pub fn list_equipment(
        &self,
        session: &Session,
        filter: &EquipmentFilter,
    ) -> ServiceResult<Vec<Equipment>> {
        self.require(session, ResourceKind::Equipment, Action::Read)?;
        let list: Vec<Equipment> = self
            .directory
            .equipment_list()?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        debug!(count = list.len(), "listed equipment");
        Ok(list)
    }

    pub fn equipment(&self, session: &Session, id: RecordId) -> ServiceResult<Equipment> {
        self.require(session, ResourceKind::Equipment, Action::Read)?;
        self.load_equipment(id)
    }

    pub fn create_equipment(
        &self,
        session: &Session,
        mut new: NewEquipment,
    ) -> ServiceResult<Equipment> {
        self.require(session, ResourceKind::Equipment, Action::Create)?;
        new.name = required("Name", &new.name)?;
        new.serial_number = required("Serial number", &new.serial_number)?;
        new.department = required("Department", &new.department)?;
        self.check_serial(&new.serial_number, None)?;
        self.check_category(new.category)?;
        self.check_team(new.default_team)?;
        self.check_user(new.default_technician)?;

        let equipment = self.directory.insert_equipment(&new)?;
        info!(id = equipment.id, serial = %equipment.serial_number, user = %session.username, "created equipment");
        Ok(equipment)
    }

    pub fn update_equipment(
        &self,
        session: &Session,
        id: RecordId,
        patch: EquipmentPatch,
    ) -> ServiceResult<Equipment> {
        self.require(session, ResourceKind::Equipment, Action::Update)?;
        let mut equipment = self.load_equipment(id)?;
        patch.apply(&mut equipment);

        equipment.name = required("Name", &equipment.name)?;
        equipment.serial_number = required("Serial number", &equipment.serial_number)?;
        equipment.department = required("Department", &equipment.department)?;
        self.check_serial(&equipment.serial_number, Some(id))?;
        self.check_category(equipment.category)?;
        self.check_team(equipment.default_team)?;
        self.check_user(equipment.default_technician)?;

        self.directory.update_equipment(&equipment)?;
        info!(id, user = %session.username, "updated equipment");
        Ok(equipment)
    }

    /// Refused while any request still points at the unit
    pub fn delete_equipment(&self, session: &Session, id: RecordId) -> ServiceResult<()> {
        self.require(session, ResourceKind::Equipment, Action::Delete)?;
        let equipment = self.load_equipment(id)?;
        let referenced = self.count_requests(RequestQuery {
            equipment: Some(id),
            ..Default::default()
        })?;
        if referenced > 0 {
            return Err(ServiceError::validation(format!(
                "Equipment '{}' still has {} request(s)",
                equipment.name, referenced
            )));
        }
        self.directory.delete_equipment(id)?;
        info!(id, user = %session.username, "deleted equipment");
        Ok(())
    }

    /// Requests raised against one unit, narrowed to the caller's scope
    pub fn equipment_requests(
        &self,
        session: &Session,
        id: RecordId,
    ) -> ServiceResult<EquipmentRequests> {
        self.require(session, ResourceKind::Equipment, Action::Read)?;
        self.require(session, ResourceKind::Request, Action::Read)?;
        let equipment = self.load_equipment(id)?;

        let mut query = RequestQuery {
            equipment: Some(id),
            ..Default::default()
        };
        self.matrix
            .scope(session.role, ResourceKind::Request)
            .narrow(&mut query, session);
        let requests = self.directory.requests(&query)?;
        let open = requests.iter().filter(|r| r.stage.is_open()).count();

        Ok(EquipmentRequests {
            equipment,
            open,
            requests,
        })
    }

    fn load_equipment(&self, id: RecordId) -> ServiceResult<Equipment> {
        self.directory
            .equipment(id)?
            .ok_or_else(|| ServiceError::not_found("equipment", id))
    }

    fn check_serial(&self, serial: &str, current: Option<RecordId>) -> ServiceResult<()> {
        match self.directory.equipment_by_serial(serial)? {
            Some(existing) if Some(existing.id) != current => Err(ServiceError::validation(
                format!("Serial number '{}' is already in use", serial),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::session;
    use super::*;
    use crate::core::directory::{ResourceDirectory, SqliteDirectory};
    use crate::core::entity::{AssetStatus, Priority};
    use crate::entities::request::{NewRequest, RequestType, Target};
    use crate::entities::user::Role;
    use chrono::Utc;

    fn new_equipment(serial: &str) -> NewEquipment {
        NewEquipment {
            name: "Press".to_string(),
            serial_number: serial.to_string(),
            department: "Stamping".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_serial_must_be_unique() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let admin = session(&dir, "ada", Role::Admin);
        let catalog = Catalog::new(&dir);

        catalog.create_equipment(&admin, new_equipment("P-1")).unwrap();
        let err = catalog
            .create_equipment(&admin, new_equipment("P-1"))
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "validation_error");
    }

    #[test]
    fn test_technician_reads_but_cannot_write() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let tech = session(&dir, "tom", Role::Technician);
        let catalog = Catalog::new(&dir);

        assert!(catalog
            .list_equipment(&tech, &EquipmentFilter::default())
            .is_ok());
        let err = catalog
            .create_equipment(&tech, new_equipment("P-2"))
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "forbidden");
    }

    #[test]
    fn test_delete_refused_while_referenced() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let admin = session(&dir, "ada", Role::Admin);
        let catalog = Catalog::new(&dir);
        let eq = catalog.create_equipment(&admin, new_equipment("P-3")).unwrap();

        let request = dir
            .insert_request(&NewRequest {
                title: "Oil leak".to_string(),
                description: String::new(),
                target: Target::Equipment(eq.id),
                request_type: RequestType::Corrective,
                priority: Priority::High,
                reporter: admin.user_id,
                technician: None,
                team: None,
                scheduled_date: None,
                duration_minutes: 0,
                created_at: Utc::now(),
            })
            .unwrap();

        let listing = catalog.equipment_requests(&admin, eq.id).unwrap();
        assert_eq!(listing.open, 1);

        assert!(catalog.delete_equipment(&admin, eq.id).is_err());
        dir.delete_request(request.id).unwrap();
        catalog.delete_equipment(&admin, eq.id).unwrap();
    }

    #[test]
    fn test_update_status_and_filter() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let manager = session(&dir, "mona", Role::Manager);
        let catalog = Catalog::new(&dir);
        let eq = catalog.create_equipment(&manager, new_equipment("P-4")).unwrap();
        catalog.create_equipment(&manager, new_equipment("P-5")).unwrap();

        catalog
            .update_equipment(
                &manager,
                eq.id,
                EquipmentPatch {
                    status: Some(AssetStatus::UnderMaintenance),
                    ..Default::default()
                },
            )
            .unwrap();

        let filter = EquipmentFilter {
            status: Some(AssetStatus::UnderMaintenance),
            ..Default::default()
        };
        let found = catalog.list_equipment(&manager, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, eq.id);
    }
}
