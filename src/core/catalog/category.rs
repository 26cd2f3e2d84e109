use tracing::info;

use super::{required, Catalog};
use crate::core::authz::{Action, ResourceKind};
use crate::core::entity::RecordId;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::session::Session;
use crate::entities::category::{Category, CategoryPatch, NewCategory};

impl<'a> Catalog<'a> {
    pub fn list_categories(&self, session: &Session) -> ServiceResult<Vec<Category>> {
        self.require(session, ResourceKind::Category, Action::Read)?;
        Ok(self.directory.categories()?)
    }

    pub fn create_category(
        &self,
        session: &Session,
        mut new: NewCategory,
    ) -> ServiceResult<Category> {
        self.require(session, ResourceKind::Category, Action::Create)?;
        new.name = required("Name", &new.name)?;
        self.check_category_name(&new.name, None)?;
        let category = self.directory.insert_category(&new)?;
        info!(id = category.id, name = %category.name, "created category");
        Ok(category)
    }

    pub fn update_category(
        &self,
        session: &Session,
        id: RecordId,
        patch: CategoryPatch,
    ) -> ServiceResult<Category> {
        self.require(session, ResourceKind::Category, Action::Update)?;
        let mut category = self.load_category(id)?;
        patch.apply(&mut category);
        category.name = required("Name", &category.name)?;
        self.check_category_name(&category.name, Some(id))?;
        self.directory.update_category(&category)?;
        info!(id, "updated category");
        Ok(category)
    }

    /// Delete a category; equipment using it is left uncategorized
    pub fn delete_category(&self, session: &Session, id: RecordId) -> ServiceResult<usize> {
        self.require(session, ResourceKind::Category, Action::Delete)?;
        self.load_category(id)?;
        let detached = self.directory.detach_category(id)?;
        self.directory.delete_category(id)?;
        info!(id, equipment = detached, "deleted category");
        Ok(detached)
    }

    fn load_category(&self, id: RecordId) -> ServiceResult<Category> {
        self.directory
            .category(id)?
            .ok_or_else(|| ServiceError::not_found("category", id))
    }

    fn check_category_name(&self, name: &str, current: Option<RecordId>) -> ServiceResult<()> {
        match self.directory.category_by_name(name)? {
            Some(existing) if Some(existing.id) != current => Err(ServiceError::validation(
                format!("Category '{}' already exists", name),
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
    use crate::entities::equipment::NewEquipment;
    use crate::entities::user::Role;

    #[test]
    fn test_only_admin_manages_categories() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let admin = session(&dir, "ada", Role::Admin);
        let manager = session(&dir, "mona", Role::Manager);
        let catalog = Catalog::new(&dir);

        let new = NewCategory {
            name: "Pumps".to_string(),
            description: None,
        };
        assert_eq!(
            catalog
                .create_category(&manager, new.clone())
                .unwrap_err()
                .kind()
                .as_str(),
            "forbidden"
        );
        catalog.create_category(&admin, new).unwrap();
        assert_eq!(catalog.list_categories(&admin).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_uncategorizes_equipment() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let admin = session(&dir, "ada", Role::Admin);
        let catalog = Catalog::new(&dir);
        let category = catalog
            .create_category(
                &admin,
                NewCategory {
                    name: "Compressors".to_string(),
                    description: None,
                },
            )
            .unwrap();
        let eq = dir
            .insert_equipment(&NewEquipment {
                name: "Air compressor".to_string(),
                serial_number: "AC-1".to_string(),
                department: "Utilities".to_string(),
                category: Some(category.id),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(catalog.delete_category(&admin, category.id).unwrap(), 1);
        assert_eq!(dir.equipment(eq.id).unwrap().unwrap().category, None);
    }
}
