//! Users, companies, projects and tasks.
//!
//! Plain record management. Tasks are the only records the entry lifecycle
//! reads, through [`TaskDirectory`].

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;
use wt_core::{
    CompanyId, HourlyRate, ProjectId, TaskAssignment, TaskDirectory, TaskId, TaskStatus, TaskType,
    UserId,
};

use crate::{Database, DbError, format_timestamp, is_unique_violation, parse_decimal};

/// A user who can be assigned tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub rate: HourlyRate,
}

/// A client company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    pub id: CompanyId,
    pub name: String,
    pub description: String,
}

/// A project run for a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub company_id: CompanyId,
    pub name: String,
    pub description: String,
}

/// A task within a project, assigned to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub name: String,
    pub code: String,
    pub description: String,
    pub kind: TaskType,
    pub status: TaskStatus,
}

/// Fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub name: String,
    pub code: String,
    pub description: String,
    pub kind: TaskType,
}

struct RawUser {
    id: String,
    email: String,
    name: String,
    rate: String,
}

impl RawUser {
    fn into_record(self) -> Result<UserRecord, DbError> {
        let rate = HourlyRate::new(parse_decimal(&self.rate, &self.id)?)?;
        Ok(UserRecord {
            id: UserId::new(self.id)?,
            email: self.email,
            name: self.name,
            rate,
        })
    }
}

struct RawTask {
    id: String,
    user_id: String,
    project_id: String,
    name: String,
    code: String,
    description: String,
    kind: String,
    status: String,
}

impl RawTask {
    fn into_record(self) -> Result<TaskRecord, DbError> {
        Ok(TaskRecord {
            kind: self.kind.parse()?,
            status: self.status.parse()?,
            user_id: UserId::new(self.user_id)?,
            project_id: ProjectId::new(self.project_id)?,
            id: TaskId::new(self.id)?,
            name: self.name,
            code: self.code,
            description: self.description,
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Database {
    /// Creates a user with a unique email.
    pub fn create_user(&mut self, email: &str, name: &str, rate: HourlyRate) -> Result<UserRecord, DbError> {
        let record = UserRecord {
            id: UserId::new(new_id())?,
            email: email.trim().to_string(),
            name: name.trim().to_string(),
            rate,
        };
        self.conn
            .execute(
                "INSERT INTO users (id, email, name, rate, created_at) VALUES (?, ?, ?, ?, ?)",
                params![
                    record.id.as_str(),
                    record.email,
                    record.name,
                    record.rate.value().to_string(),
                    format_timestamp(Utc::now()),
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    DbError::DuplicateEmail(record.email.clone())
                } else {
                    DbError::Sqlite(err)
                }
            })?;
        tracing::info!(user_id = %record.id, email = %record.email, "created user");
        Ok(record)
    }

    /// Lists users ordered by email.
    pub fn list_users(&self) -> Result<Vec<UserRecord>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, email, name, rate FROM users ORDER BY email ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(RawUser {
                id: row.get(0)?,
                email: row.get(1)?,
                name: row.get(2)?,
                rate: row.get(3)?,
            })
        })?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?.into_record()?);
        }
        Ok(users)
    }

    /// Finds a user by email.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError> {
        self.conn
            .query_row(
                "SELECT id, email, name, rate FROM users WHERE email = ?",
                [email.trim()],
                |row| {
                    Ok(RawUser {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        name: row.get(2)?,
                        rate: row.get(3)?,
                    })
                },
            )
            .optional()?
            .map(RawUser::into_record)
            .transpose()
    }

    /// Creates a company.
    pub fn create_company(&mut self, name: &str, description: &str) -> Result<CompanyRecord, DbError> {
        let record = CompanyRecord {
            id: CompanyId::new(new_id())?,
            name: name.trim().to_string(),
            description: description.to_string(),
        };
        self.conn.execute(
            "INSERT INTO companies (id, name, description, created_at) VALUES (?, ?, ?, ?)",
            params![
                record.id.as_str(),
                record.name,
                record.description,
                format_timestamp(Utc::now()),
            ],
        )?;
        tracing::info!(company_id = %record.id, "created company");
        Ok(record)
    }

    /// Lists companies ordered by name.
    pub fn list_companies(&self) -> Result<Vec<CompanyRecord>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM companies ORDER BY name ASC, id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut companies = Vec::new();
        for row in rows {
            let (id, name, description) = row?;
            companies.push(CompanyRecord {
                id: CompanyId::new(id)?,
                name,
                description,
            });
        }
        Ok(companies)
    }

    /// Creates a project under an existing company.
    pub fn create_project(
        &mut self,
        company_id: &CompanyId,
        name: &str,
        description: &str,
    ) -> Result<ProjectRecord, DbError> {
        if !exists(&self.conn, "companies", company_id.as_str())? {
            return Err(DbError::NotFound {
                kind: "company",
                id: company_id.to_string(),
            });
        }
        let record = ProjectRecord {
            id: ProjectId::new(new_id())?,
            company_id: company_id.clone(),
            name: name.trim().to_string(),
            description: description.to_string(),
        };
        self.conn.execute(
            "INSERT INTO projects (id, company_id, name, description, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                record.id.as_str(),
                record.company_id.as_str(),
                record.name,
                record.description,
                format_timestamp(Utc::now()),
            ],
        )?;
        tracing::info!(project_id = %record.id, company_id = %record.company_id, "created project");
        Ok(record)
    }

    /// Lists projects ordered by name.
    pub fn list_projects(&self) -> Result<Vec<ProjectRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, company_id, name, description FROM projects ORDER BY name ASC, id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut projects = Vec::new();
        for row in rows {
            let (id, company_id, name, description) = row?;
            projects.push(ProjectRecord {
                id: ProjectId::new(id)?,
                company_id: CompanyId::new(company_id)?,
                name,
                description,
            });
        }
        Ok(projects)
    }

    /// Creates a task, assigning it to an existing user within an existing project.
    pub fn create_task(&mut self, task: NewTask) -> Result<TaskRecord, DbError> {
        if !exists(&self.conn, "users", task.user_id.as_str())? {
            return Err(DbError::NotFound {
                kind: "user",
                id: task.user_id.to_string(),
            });
        }
        if !exists(&self.conn, "projects", task.project_id.as_str())? {
            return Err(DbError::NotFound {
                kind: "project",
                id: task.project_id.to_string(),
            });
        }
        let record = TaskRecord {
            id: TaskId::new(new_id())?,
            user_id: task.user_id,
            project_id: task.project_id,
            name: task.name.trim().to_string(),
            code: task.code.trim().to_string(),
            description: task.description,
            kind: task.kind,
            status: TaskStatus::New,
        };
        self.conn.execute(
            "
            INSERT INTO tasks (id, user_id, project_id, name, code, description, type, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                record.id.as_str(),
                record.user_id.as_str(),
                record.project_id.as_str(),
                record.name,
                record.code,
                record.description,
                record.kind.as_str(),
                record.status.as_str(),
                format_timestamp(Utc::now()),
            ],
        )?;
        tracing::info!(task_id = %record.id, user_id = %record.user_id, code = %record.code, "created task");
        Ok(record)
    }

    /// Updates a task's progress status.
    pub fn set_task_status(&mut self, task_id: &TaskId, status: TaskStatus) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "UPDATE tasks SET status = ? WHERE id = ?",
            params![status.as_str(), task_id.as_str()],
        )?;
        if updated == 0 {
            return Err(DbError::NotFound {
                kind: "task",
                id: task_id.to_string(),
            });
        }
        Ok(())
    }

    /// Lists tasks, optionally only those assigned to `user_id`, ordered by code.
    pub fn list_tasks(&self, user_id: Option<&UserId>) -> Result<Vec<TaskRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, user_id, project_id, name, code, description, type, status
            FROM tasks
            WHERE (?1 IS NULL OR user_id = ?1)
            ORDER BY code ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([user_id.map(UserId::as_str)], |row| {
            Ok(RawTask {
                id: row.get(0)?,
                user_id: row.get(1)?,
                project_id: row.get(2)?,
                name: row.get(3)?,
                code: row.get(4)?,
                description: row.get(5)?,
                kind: row.get(6)?,
                status: row.get(7)?,
            })
        })?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_record()?);
        }
        Ok(tasks)
    }
}

impl TaskDirectory for Database {
    type Error = DbError;

    fn find_assignment(&self, task_id: &TaskId) -> Result<Option<TaskAssignment>, DbError> {
        find_assignment(&self.conn, task_id)
    }
}

/// [`TaskDirectory`] over a borrowed connection, usable inside a transaction.
pub(crate) struct ConnDirectory<'c>(pub(crate) &'c Connection);

impl TaskDirectory for ConnDirectory<'_> {
    type Error = DbError;

    fn find_assignment(&self, task_id: &TaskId) -> Result<Option<TaskAssignment>, DbError> {
        find_assignment(self.0, task_id)
    }
}

fn find_assignment(conn: &Connection, task_id: &TaskId) -> Result<Option<TaskAssignment>, DbError> {
    let row = conn
        .query_row(
            "
            SELECT tasks.user_id, users.rate
            FROM tasks
            JOIN users ON users.id = tasks.user_id
            WHERE tasks.id = ?
            ",
            [task_id.as_str()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;
    let Some((user_id, rate)) = row else {
        return Ok(None);
    };
    Ok(Some(TaskAssignment {
        task_id: task_id.clone(),
        rate: HourlyRate::new(parse_decimal(&rate, &user_id)?)?,
        user_id: UserId::new(user_id)?,
    }))
}

fn exists(conn: &Connection, table: &str, id: &str) -> Result<bool, DbError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
    Ok(conn.query_row(&sql, [id], |row| row.get(0))?)
}
