//! Task records and assignment.

use std::io::Write;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use wt_core::{ProjectId, TaskId, TaskStatus, TaskType};
use wt_db::{Database, NewTask};

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Add a task to a project and assign it to a user.
    Add(AddTaskArgs),
    /// List tasks.
    List {
        /// Only tasks assigned to this email.
        #[arg(long)]
        user: Option<String>,
    },
    /// Change a task's progress status.
    SetStatus {
        task_id: String,
        /// One of NEW, IN_PROGRESS, COMPLETED, NEEDS_FEEDBACK, CLOSED.
        status: TaskStatus,
    },
}

#[derive(Debug, Args)]
pub struct AddTaskArgs {
    pub name: String,
    /// Short task code, e.g. `PROJ-12`.
    #[arg(long)]
    pub code: String,
    /// ID of the project the task belongs to.
    #[arg(long)]
    pub project: String,
    /// Email of the assignee.
    #[arg(long)]
    pub user: String,
    #[arg(long = "type", default_value = "FEATURE")]
    pub kind: TaskType,
    #[arg(long, default_value = "")]
    pub description: String,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, command: &TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Add(args) => add(writer, db, args),
        TaskCommand::List { user } => list(writer, db, user.as_deref()),
        TaskCommand::SetStatus { task_id, status } => {
            db.set_task_status(&TaskId::new(task_id.as_str())?, *status)?;
            writeln!(writer, "Task {task_id} is now {status}")?;
            Ok(())
        }
    }
}

fn add<W: Write>(writer: &mut W, db: &mut Database, args: &AddTaskArgs) -> Result<()> {
    let Some(user) = db.find_user_by_email(&args.user)? else {
        bail!("unknown user: {}", args.user);
    };
    let task = db.create_task(NewTask {
        user_id: user.id,
        project_id: ProjectId::new(args.project.as_str())?,
        name: args.name.clone(),
        code: args.code.clone(),
        description: args.description.clone(),
        kind: args.kind,
    })?;
    writeln!(
        writer,
        "Created task {} {} ({}) for {}",
        task.code, task.name, task.id, user.email
    )?;
    Ok(())
}

fn list<W: Write>(writer: &mut W, db: &Database, email: Option<&str>) -> Result<()> {
    let user_id = match email {
        Some(email) => match db.find_user_by_email(email)? {
            Some(user) => Some(user.id),
            None => bail!("unknown user: {email}"),
        },
        None => None,
    };
    let tasks = db.list_tasks(user_id.as_ref())?;
    if tasks.is_empty() {
        writeln!(writer, "No tasks.")?;
        return Ok(());
    }
    for task in tasks {
        writeln!(
            writer,
            "{:<14} {:<28} {:<14} {:<16} {}",
            task.code, task.name, task.kind, task.status, task.id
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use wt_core::HourlyRate;
    use wt_db::ProjectRecord;

    use super::*;

    fn seeded() -> (Database, ProjectRecord) {
        let mut db = Database::open_in_memory().unwrap();
        db.create_user(
            "samwise@test.com",
            "Samwise Gamgee",
            HourlyRate::new(Decimal::from(10)).unwrap(),
        )
        .unwrap();
        let company = db.create_company("Mordor, Inc.", "").unwrap();
        let project = db
            .create_project(&company.id, "Deliver the precious", "")
            .unwrap();
        (db, project)
    }

    fn add_args(project: &ProjectRecord, user: &str) -> TaskCommand {
        TaskCommand::Add(AddTaskArgs {
            name: "To Rivendell".to_string(),
            code: "Rivendell-1".to_string(),
            project: project.id.to_string(),
            user: user.to_string(),
            kind: TaskType::Investigation,
            description: String::new(),
        })
    }

    #[test]
    fn add_list_and_update_status() {
        let (mut db, project) = seeded();
        let mut output = Vec::new();
        run(&mut output, &mut db, &add_args(&project, "samwise@test.com")).unwrap();
        let task_id = db.list_tasks(None).unwrap()[0].id.to_string();

        let set = TaskCommand::SetStatus {
            task_id: task_id.clone(),
            status: TaskStatus::InProgress,
        };
        run(&mut output, &mut db, &set).unwrap();

        let mut listing = Vec::new();
        let list = TaskCommand::List {
            user: Some("samwise@test.com".to_string()),
        };
        run(&mut listing, &mut db, &list).unwrap();
        let listing = String::from_utf8(listing).unwrap();
        assert!(listing.contains("Rivendell-1"));
        assert!(listing.contains("Investigation"));
        assert!(listing.contains("In Progress"));
        assert!(listing.contains(&task_id));
    }

    #[test]
    fn add_requires_known_user() {
        let (mut db, project) = seeded();
        let mut output = Vec::new();
        let err = run(&mut output, &mut db, &add_args(&project, "gollum@test.com")).unwrap_err();
        assert_eq!(err.to_string(), "unknown user: gollum@test.com");
    }

    #[test]
    fn add_requires_existing_project() {
        let (mut db, _) = seeded();
        let mut output = Vec::new();
        let args = TaskCommand::Add(AddTaskArgs {
            name: "To Rivendell".to_string(),
            code: "Rivendell-1".to_string(),
            project: "missing".to_string(),
            user: "samwise@test.com".to_string(),
            kind: TaskType::Feature,
            description: String::new(),
        });
        let err = run(&mut output, &mut db, &args).unwrap_err();
        assert_eq!(err.to_string(), "project not found: missing");
    }
}
