//! Resource directory
//!
//! The storage seam every engine component reads and writes through. The
//! engine only ever talks to [`ResourceDirectory`]; [`SqliteDirectory`] is the
//! implementation the command line uses, and `open_in_memory` gives tests a
//! throwaway one.
//!
//! Writes are single-record and last-write-wins. There is no version column,
//! so two callers updating the same request concurrently will see the later
//! write replace the earlier one.

mod serialize;
mod sqlite;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::entity::RecordId;
use crate::entities::category::{Category, NewCategory};
use crate::entities::equipment::{Equipment, NewEquipment};
use crate::entities::request::{NewRequest, Request, RequestQuery};
use crate::entities::team::{NewTeam, Team};
use crate::entities::user::{NewUser, User};
use crate::entities::work_center::{NewWorkCenter, WorkCenter};

pub use serialize::{format_timestamp, parse_timestamp, Timestamp};
pub use sqlite::SqliteDirectory;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// How many records point at a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserReferences {
    pub reported: usize,
    pub assigned: usize,
    pub default_for_equipment: usize,
}

impl UserReferences {
    pub fn total(&self) -> usize {
        self.reported + self.assigned + self.default_for_equipment
    }
}

/// What detaching a team touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamDetachment {
    pub members: usize,
    pub equipment: usize,
    pub requests: usize,
}

pub trait ResourceDirectory {
    // ----- users -----
    fn insert_user(
        &self,
        user: &NewUser,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> DirectoryResult<User>;
    fn user(&self, id: RecordId) -> DirectoryResult<Option<User>>;
    fn user_by_username(&self, username: &str) -> DirectoryResult<Option<User>>;
    fn user_by_email(&self, email: &str) -> DirectoryResult<Option<User>>;
    /// The user and its stored password hash
    fn credential_for(&self, username: &str) -> DirectoryResult<Option<(User, String)>>;
    fn users(&self) -> DirectoryResult<Vec<User>>;
    fn update_user(&self, user: &User) -> DirectoryResult<()>;
    fn delete_user(&self, id: RecordId) -> DirectoryResult<bool>;
    fn user_references(&self, id: RecordId) -> DirectoryResult<UserReferences>;

    // ----- teams -----
    fn insert_team(&self, team: &NewTeam) -> DirectoryResult<Team>;
    fn team(&self, id: RecordId) -> DirectoryResult<Option<Team>>;
    fn team_by_name(&self, name: &str) -> DirectoryResult<Option<Team>>;
    fn teams(&self) -> DirectoryResult<Vec<Team>>;
    fn update_team(&self, team: &Team) -> DirectoryResult<()>;
    /// Clear every reference to a team: user membership, equipment defaults
    /// and request assignments
    fn detach_team(&self, id: RecordId) -> DirectoryResult<TeamDetachment>;
    fn delete_team(&self, id: RecordId) -> DirectoryResult<bool>;

    // ----- categories -----
    fn insert_category(&self, category: &NewCategory) -> DirectoryResult<Category>;
    fn category(&self, id: RecordId) -> DirectoryResult<Option<Category>>;
    fn category_by_name(&self, name: &str) -> DirectoryResult<Option<Category>>;
    fn categories(&self) -> DirectoryResult<Vec<Category>>;
    fn update_category(&self, category: &Category) -> DirectoryResult<()>;
    /// Clear the category on every equipment record that uses it
    fn detach_category(&self, id: RecordId) -> DirectoryResult<usize>;
    fn delete_category(&self, id: RecordId) -> DirectoryResult<bool>;

    // ----- equipment -----
    fn insert_equipment(&self, equipment: &NewEquipment) -> DirectoryResult<Equipment>;
    fn equipment(&self, id: RecordId) -> DirectoryResult<Option<Equipment>>;
    fn equipment_by_serial(&self, serial: &str) -> DirectoryResult<Option<Equipment>>;
    fn equipment_list(&self) -> DirectoryResult<Vec<Equipment>>;
    fn update_equipment(&self, equipment: &Equipment) -> DirectoryResult<()>;
    fn delete_equipment(&self, id: RecordId) -> DirectoryResult<bool>;

    // ----- work centers -----
    fn insert_work_center(&self, wc: &NewWorkCenter) -> DirectoryResult<WorkCenter>;
    fn work_center(&self, id: RecordId) -> DirectoryResult<Option<WorkCenter>>;
    fn work_center_by_code(&self, code: &str) -> DirectoryResult<Option<WorkCenter>>;
    fn work_centers(&self) -> DirectoryResult<Vec<WorkCenter>>;
    fn update_work_center(&self, wc: &WorkCenter) -> DirectoryResult<()>;
    fn delete_work_center(&self, id: RecordId) -> DirectoryResult<bool>;

    // ----- requests -----
    fn insert_request(&self, request: &NewRequest) -> DirectoryResult<Request>;
    fn request(&self, id: RecordId) -> DirectoryResult<Option<Request>>;
    /// Requests matching the query, in storage (id) order
    fn requests(&self, query: &RequestQuery) -> DirectoryResult<Vec<Request>>;
    fn update_request(&self, request: &Request) -> DirectoryResult<()>;
    fn delete_request(&self, id: RecordId) -> DirectoryResult<bool>;
}
