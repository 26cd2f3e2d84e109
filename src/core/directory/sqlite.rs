//! SQLite-backed resource directory

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use tracing::debug;

use super::serialize::{day_after, day_start, Timestamp};
use super::{DirectoryResult, ResourceDirectory, TeamDetachment, UserReferences};
use crate::core::entity::RecordId;
use crate::entities::category::{Category, NewCategory};
use crate::entities::equipment::{Equipment, NewEquipment};
use crate::entities::request::{NewRequest, Request, RequestQuery, Target};
use crate::entities::team::{NewTeam, Team};
use crate::entities::user::{NewUser, User};
use crate::entities::work_center::{NewWorkCenter, WorkCenter};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,
    team_id       INTEGER REFERENCES teams(id),
    department    TEXT,
    company       TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS equipment (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    name                  TEXT NOT NULL,
    serial_number         TEXT NOT NULL UNIQUE,
    location              TEXT,
    department            TEXT NOT NULL,
    category_id           INTEGER REFERENCES categories(id),
    default_team_id       INTEGER REFERENCES teams(id),
    default_technician_id INTEGER REFERENCES users(id),
    status                TEXT NOT NULL,
    description           TEXT
);

CREATE TABLE IF NOT EXISTS work_centers (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    code          TEXT NOT NULL UNIQUE,
    department    TEXT NOT NULL,
    location      TEXT,
    status        TEXT NOT NULL,
    capacity      INTEGER NOT NULL DEFAULT 0,
    cost_per_hour INTEGER NOT NULL DEFAULT 0,
    oee_target    INTEGER NOT NULL DEFAULT 85
);

CREATE TABLE IF NOT EXISTS requests (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    title            TEXT NOT NULL,
    description      TEXT NOT NULL DEFAULT '',
    equipment_id     INTEGER REFERENCES equipment(id),
    work_center_id   INTEGER REFERENCES work_centers(id),
    request_type     TEXT NOT NULL,
    priority         TEXT NOT NULL,
    stage            TEXT NOT NULL,
    reporter_id      INTEGER NOT NULL REFERENCES users(id),
    technician_id    INTEGER REFERENCES users(id),
    team_id          INTEGER REFERENCES teams(id),
    scheduled_date   TEXT,
    duration_minutes INTEGER NOT NULL DEFAULT 0,
    started_at       TEXT,
    completed_at     TEXT,
    created_at       TEXT NOT NULL,
    CHECK ((equipment_id IS NULL) <> (work_center_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_requests_technician ON requests(technician_id);
CREATE INDEX IF NOT EXISTS idx_requests_stage ON requests(stage);
CREATE INDEX IF NOT EXISTS idx_users_team ON users(team_id);
"#;

const USER_COLUMNS: &str =
    "id, username, email, role, team_id, department, company, created_at";
const EQUIPMENT_COLUMNS: &str = "id, name, serial_number, location, department, category_id, \
     default_team_id, default_technician_id, status, description";
const WORK_CENTER_COLUMNS: &str =
    "id, name, code, department, location, status, capacity, cost_per_hour, oee_target";
const REQUEST_COLUMNS: &str = "id, title, description, equipment_id, work_center_id, \
     request_type, priority, stage, reporter_id, technician_id, team_id, scheduled_date, \
     duration_minutes, started_at, completed_at, created_at";

/// Resource directory stored in a single SQLite database
pub struct SqliteDirectory {
    conn: Connection,
}

impl SqliteDirectory {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path) -> DirectoryResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened directory");
        Self::with_connection(conn)
    }

    /// A private database that disappears when dropped
    pub fn open_in_memory() -> DirectoryResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DirectoryResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn query_one<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    ) -> DirectoryResult<Option<T>> {
        Ok(self.conn.query_row(sql, params, map).optional()?)
    }

    fn query_all<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> DirectoryResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn count(&self, sql: &str, id: RecordId) -> DirectoryResult<usize> {
        let n: i64 = self.conn.query_row(sql, [id], |row| row.get(0))?;
        Ok(n as usize)
    }
}

// =========================================================================
// Row mapping
// =========================================================================

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        team: row.get(4)?,
        department: row.get(5)?,
        company: row.get(6)?,
        created_at: row.get::<_, Timestamp>(7)?.0,
    })
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn equipment_from_row(row: &Row<'_>) -> rusqlite::Result<Equipment> {
    Ok(Equipment {
        id: row.get(0)?,
        name: row.get(1)?,
        serial_number: row.get(2)?,
        location: row.get(3)?,
        department: row.get(4)?,
        category: row.get(5)?,
        default_team: row.get(6)?,
        default_technician: row.get(7)?,
        status: row.get(8)?,
        description: row.get(9)?,
    })
}

fn work_center_from_row(row: &Row<'_>) -> rusqlite::Result<WorkCenter> {
    Ok(WorkCenter {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        department: row.get(3)?,
        location: row.get(4)?,
        status: row.get(5)?,
        capacity: row.get(6)?,
        cost_per_hour: row.get(7)?,
        oee_target: row.get(8)?,
    })
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<Request> {
    let equipment: Option<RecordId> = row.get(3)?;
    let work_center: Option<RecordId> = row.get(4)?;
    let target = Target::from_refs(equipment, work_center).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Integer,
            "request must reference exactly one of equipment or work center".into(),
        )
    })?;

    Ok(Request {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        target,
        request_type: row.get(5)?,
        priority: row.get(6)?,
        stage: row.get(7)?,
        reporter: row.get(8)?,
        technician: row.get(9)?,
        team: row.get(10)?,
        scheduled_date: row.get::<_, Option<Timestamp>>(11)?.map(|t| t.0),
        duration_minutes: row.get(12)?,
        started_at: row.get::<_, Option<Timestamp>>(13)?.map(|t| t.0),
        completed_at: row.get::<_, Option<Timestamp>>(14)?.map(|t| t.0),
        created_at: row.get::<_, Timestamp>(15)?.0,
    })
}

fn opt_ts(ts: Option<DateTime<Utc>>) -> Option<Timestamp> {
    ts.map(Timestamp)
}

// =========================================================================
// ResourceDirectory
// =========================================================================

impl ResourceDirectory for SqliteDirectory {
    fn insert_user(
        &self,
        user: &NewUser,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> DirectoryResult<User> {
        self.conn.execute(
            "INSERT INTO users (username, email, password_hash, role, team_id, department, company, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.username,
                user.email,
                password_hash,
                user.role,
                user.team,
                user.department,
                user.company,
                Timestamp(created_at),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            team: user.team,
            department: user.department.clone(),
            company: user.company.clone(),
            created_at,
        })
    }

    fn user(&self, id: RecordId) -> DirectoryResult<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id],
            user_from_row,
        )
    }

    fn user_by_username(&self, username: &str) -> DirectoryResult<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            [username],
            user_from_row,
        )
    }

    fn user_by_email(&self, email: &str) -> DirectoryResult<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower(?1)"),
            [email],
            user_from_row,
        )
    }

    fn credential_for(&self, username: &str) -> DirectoryResult<Option<(User, String)>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"),
            [username],
            |row| Ok((user_from_row(row)?, row.get(8)?)),
        )
    }

    fn users(&self) -> DirectoryResult<Vec<User>> {
        self.query_all(
            &format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"),
            [],
            user_from_row,
        )
    }

    fn update_user(&self, user: &User) -> DirectoryResult<()> {
        self.conn.execute(
            "UPDATE users SET email = ?2, role = ?3, team_id = ?4, department = ?5, company = ?6
             WHERE id = ?1",
            params![
                user.id,
                user.email,
                user.role,
                user.team,
                user.department,
                user.company
            ],
        )?;
        Ok(())
    }

    fn delete_user(&self, id: RecordId) -> DirectoryResult<bool> {
        Ok(self.conn.execute("DELETE FROM users WHERE id = ?1", [id])? > 0)
    }

    fn user_references(&self, id: RecordId) -> DirectoryResult<UserReferences> {
        Ok(UserReferences {
            reported: self.count("SELECT COUNT(*) FROM requests WHERE reporter_id = ?1", id)?,
            assigned: self.count("SELECT COUNT(*) FROM requests WHERE technician_id = ?1", id)?,
            default_for_equipment: self.count(
                "SELECT COUNT(*) FROM equipment WHERE default_technician_id = ?1",
                id,
            )?,
        })
    }

    fn insert_team(&self, team: &NewTeam) -> DirectoryResult<Team> {
        self.conn.execute(
            "INSERT INTO teams (name, description) VALUES (?1, ?2)",
            params![team.name, team.description],
        )?;
        Ok(Team {
            id: self.conn.last_insert_rowid(),
            name: team.name.clone(),
            description: team.description.clone(),
        })
    }

    fn team(&self, id: RecordId) -> DirectoryResult<Option<Team>> {
        self.query_one(
            "SELECT id, name, description FROM teams WHERE id = ?1",
            [id],
            team_from_row,
        )
    }

    fn team_by_name(&self, name: &str) -> DirectoryResult<Option<Team>> {
        self.query_one(
            "SELECT id, name, description FROM teams WHERE lower(name) = lower(?1)",
            [name],
            team_from_row,
        )
    }

    fn teams(&self) -> DirectoryResult<Vec<Team>> {
        self.query_all(
            "SELECT id, name, description FROM teams ORDER BY id",
            [],
            team_from_row,
        )
    }

    fn update_team(&self, team: &Team) -> DirectoryResult<()> {
        self.conn.execute(
            "UPDATE teams SET name = ?2, description = ?3 WHERE id = ?1",
            params![team.id, team.name, team.description],
        )?;
        Ok(())
    }

    fn detach_team(&self, id: RecordId) -> DirectoryResult<TeamDetachment> {
        let tx = self.conn.unchecked_transaction()?;
        let members = tx.execute("UPDATE users SET team_id = NULL WHERE team_id = ?1", [id])?;
        let equipment = tx.execute(
            "UPDATE equipment SET default_team_id = NULL WHERE default_team_id = ?1",
            [id],
        )?;
        let requests = tx.execute("UPDATE requests SET team_id = NULL WHERE team_id = ?1", [id])?;
        tx.commit()?;
        Ok(TeamDetachment {
            members,
            equipment,
            requests,
        })
    }

    fn delete_team(&self, id: RecordId) -> DirectoryResult<bool> {
        Ok(self.conn.execute("DELETE FROM teams WHERE id = ?1", [id])? > 0)
    }

    fn insert_category(&self, category: &NewCategory) -> DirectoryResult<Category> {
        self.conn.execute(
            "INSERT INTO categories (name, description) VALUES (?1, ?2)",
            params![category.name, category.description],
        )?;
        Ok(Category {
            id: self.conn.last_insert_rowid(),
            name: category.name.clone(),
            description: category.description.clone(),
        })
    }

    fn category(&self, id: RecordId) -> DirectoryResult<Option<Category>> {
        self.query_one(
            "SELECT id, name, description FROM categories WHERE id = ?1",
            [id],
            category_from_row,
        )
    }

    fn category_by_name(&self, name: &str) -> DirectoryResult<Option<Category>> {
        self.query_one(
            "SELECT id, name, description FROM categories WHERE lower(name) = lower(?1)",
            [name],
            category_from_row,
        )
    }

    fn categories(&self) -> DirectoryResult<Vec<Category>> {
        self.query_all(
            "SELECT id, name, description FROM categories ORDER BY id",
            [],
            category_from_row,
        )
    }

    fn update_category(&self, category: &Category) -> DirectoryResult<()> {
        self.conn.execute(
            "UPDATE categories SET name = ?2, description = ?3 WHERE id = ?1",
            params![category.id, category.name, category.description],
        )?;
        Ok(())
    }

    fn detach_category(&self, id: RecordId) -> DirectoryResult<usize> {
        Ok(self.conn.execute(
            "UPDATE equipment SET category_id = NULL WHERE category_id = ?1",
            [id],
        )?)
    }

    fn delete_category(&self, id: RecordId) -> DirectoryResult<bool> {
        Ok(self.conn.execute("DELETE FROM categories WHERE id = ?1", [id])? > 0)
    }

    fn insert_equipment(&self, e: &NewEquipment) -> DirectoryResult<Equipment> {
        self.conn.execute(
            "INSERT INTO equipment (name, serial_number, location, department, category_id,
                                    default_team_id, default_technician_id, status, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                e.name,
                e.serial_number,
                e.location,
                e.department,
                e.category,
                e.default_team,
                e.default_technician,
                e.status,
                e.description,
            ],
        )?;
        Ok(Equipment {
            id: self.conn.last_insert_rowid(),
            name: e.name.clone(),
            serial_number: e.serial_number.clone(),
            location: e.location.clone(),
            department: e.department.clone(),
            category: e.category,
            default_team: e.default_team,
            default_technician: e.default_technician,
            status: e.status,
            description: e.description.clone(),
        })
    }

    fn equipment(&self, id: RecordId) -> DirectoryResult<Option<Equipment>> {
        self.query_one(
            &format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE id = ?1"),
            [id],
            equipment_from_row,
        )
    }

    fn equipment_by_serial(&self, serial: &str) -> DirectoryResult<Option<Equipment>> {
        self.query_one(
            &format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE serial_number = ?1"),
            [serial],
            equipment_from_row,
        )
    }

    fn equipment_list(&self) -> DirectoryResult<Vec<Equipment>> {
        self.query_all(
            &format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment ORDER BY id"),
            [],
            equipment_from_row,
        )
    }

    fn update_equipment(&self, e: &Equipment) -> DirectoryResult<()> {
        self.conn.execute(
            "UPDATE equipment SET name = ?2, serial_number = ?3, location = ?4, department = ?5,
                    category_id = ?6, default_team_id = ?7, default_technician_id = ?8,
                    status = ?9, description = ?10
             WHERE id = ?1",
            params![
                e.id,
                e.name,
                e.serial_number,
                e.location,
                e.department,
                e.category,
                e.default_team,
                e.default_technician,
                e.status,
                e.description,
            ],
        )?;
        Ok(())
    }

    fn delete_equipment(&self, id: RecordId) -> DirectoryResult<bool> {
        Ok(self.conn.execute("DELETE FROM equipment WHERE id = ?1", [id])? > 0)
    }

    fn insert_work_center(&self, wc: &NewWorkCenter) -> DirectoryResult<WorkCenter> {
        self.conn.execute(
            "INSERT INTO work_centers (name, code, department, location, status, capacity,
                                       cost_per_hour, oee_target)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                wc.name,
                wc.code,
                wc.department,
                wc.location,
                wc.status,
                wc.capacity,
                wc.cost_per_hour,
                wc.oee_target,
            ],
        )?;
        Ok(WorkCenter {
            id: self.conn.last_insert_rowid(),
            name: wc.name.clone(),
            code: wc.code.clone(),
            department: wc.department.clone(),
            location: wc.location.clone(),
            status: wc.status,
            capacity: wc.capacity,
            cost_per_hour: wc.cost_per_hour,
            oee_target: wc.oee_target,
        })
    }

    fn work_center(&self, id: RecordId) -> DirectoryResult<Option<WorkCenter>> {
        self.query_one(
            &format!("SELECT {WORK_CENTER_COLUMNS} FROM work_centers WHERE id = ?1"),
            [id],
            work_center_from_row,
        )
    }

    fn work_center_by_code(&self, code: &str) -> DirectoryResult<Option<WorkCenter>> {
        self.query_one(
            &format!("SELECT {WORK_CENTER_COLUMNS} FROM work_centers WHERE lower(code) = lower(?1)"),
            [code],
            work_center_from_row,
        )
    }

    fn work_centers(&self) -> DirectoryResult<Vec<WorkCenter>> {
        self.query_all(
            &format!("SELECT {WORK_CENTER_COLUMNS} FROM work_centers ORDER BY id"),
            [],
            work_center_from_row,
        )
    }

    fn update_work_center(&self, wc: &WorkCenter) -> DirectoryResult<()> {
        self.conn.execute(
            "UPDATE work_centers SET name = ?2, code = ?3, department = ?4, location = ?5,
                    status = ?6, capacity = ?7, cost_per_hour = ?8, oee_target = ?9
             WHERE id = ?1",
            params![
                wc.id,
                wc.name,
                wc.code,
                wc.department,
                wc.location,
                wc.status,
                wc.capacity,
                wc.cost_per_hour,
                wc.oee_target,
            ],
        )?;
        Ok(())
    }

    fn delete_work_center(&self, id: RecordId) -> DirectoryResult<bool> {
        Ok(self.conn.execute("DELETE FROM work_centers WHERE id = ?1", [id])? > 0)
    }

    fn insert_request(&self, r: &NewRequest) -> DirectoryResult<Request> {
        self.conn.execute(
            "INSERT INTO requests (title, description, equipment_id, work_center_id, request_type,
                                   priority, stage, reporter_id, technician_id, team_id,
                                   scheduled_date, duration_minutes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'NEW', ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                r.title,
                r.description,
                r.target.equipment(),
                r.target.work_center(),
                r.request_type,
                r.priority,
                r.reporter,
                r.technician,
                r.team,
                opt_ts(r.scheduled_date),
                r.duration_minutes,
                Timestamp(r.created_at),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, "inserted request");
        Ok(Request {
            id,
            title: r.title.clone(),
            description: r.description.clone(),
            target: r.target,
            request_type: r.request_type,
            priority: r.priority,
            stage: Default::default(),
            reporter: r.reporter,
            technician: r.technician,
            team: r.team,
            scheduled_date: r.scheduled_date,
            duration_minutes: r.duration_minutes,
            started_at: None,
            completed_at: None,
            created_at: r.created_at,
        })
    }

    fn request(&self, id: RecordId) -> DirectoryResult<Option<Request>> {
        self.query_one(
            &format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1"),
            [id],
            request_from_row,
        )
    }

    fn requests(&self, query: &RequestQuery) -> DirectoryResult<Vec<Request>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(technician) = query.technician {
            clauses.push("technician_id = ?");
            values.push(Box::new(technician));
        }
        if let Some(reporter) = query.reporter {
            clauses.push("reporter_id = ?");
            values.push(Box::new(reporter));
        }
        if let Some(stage) = query.stage {
            clauses.push("stage = ?");
            values.push(Box::new(stage));
        }
        if let Some(priority) = query.priority {
            clauses.push("priority = ?");
            values.push(Box::new(priority));
        }
        if let Some(equipment) = query.equipment {
            clauses.push("equipment_id = ?");
            values.push(Box::new(equipment));
        }
        if let Some(work_center) = query.work_center {
            clauses.push("work_center_id = ?");
            values.push(Box::new(work_center));
        }
        if let Some(from) = query.from {
            clauses.push("COALESCE(scheduled_date, created_at) >= ?");
            values.push(Box::new(day_start(from)));
        }
        if let Some(to) = query.to {
            clauses.push("COALESCE(scheduled_date, created_at) < ?");
            values.push(Box::new(day_after(to)));
        }

        let mut sql = format!("SELECT {REQUEST_COLUMNS} FROM requests");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        // A negative LIMIT means "no limit" to SQLite
        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");
        values.push(Box::new(query.limit.map(|l| l as i64).unwrap_or(-1)));
        values.push(Box::new(query.offset as i64));

        self.query_all(&sql, params_from_iter(values.iter()), request_from_row)
    }

    fn update_request(&self, r: &Request) -> DirectoryResult<()> {
        self.conn.execute(
            "UPDATE requests SET title = ?2, description = ?3, equipment_id = ?4,
                    work_center_id = ?5, request_type = ?6, priority = ?7, stage = ?8,
                    technician_id = ?9, team_id = ?10, scheduled_date = ?11,
                    duration_minutes = ?12, started_at = ?13, completed_at = ?14
             WHERE id = ?1",
            params![
                r.id,
                r.title,
                r.description,
                r.target.equipment(),
                r.target.work_center(),
                r.request_type,
                r.priority,
                r.stage,
                r.technician,
                r.team,
                opt_ts(r.scheduled_date),
                r.duration_minutes,
                opt_ts(r.started_at),
                opt_ts(r.completed_at),
            ],
        )?;
        Ok(())
    }

    fn delete_request(&self, id: RecordId) -> DirectoryResult<bool> {
        Ok(self.conn.execute("DELETE FROM requests WHERE id = ?1", [id])? > 0)
    }
}
