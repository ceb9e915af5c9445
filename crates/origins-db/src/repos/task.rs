//! Task repository: CRUD plus the creation-window query used by reports.

use chrono::{DateTime, Utc};

use origins_core::entities::Task;
use origins_core::enums::{TaskPriority, TaskStatus};
use origins_core::ids::PREFIX_TASK;

use crate::OriginsDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_progress};
use crate::updates::task::TaskUpdate;

const SELECT_COLS: &str = "id, title, description, progress, status, priority, \
     assignee_id, assigner_id, continued_from, created_at, updated_at";

fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        progress: parse_progress(row.get::<i64>(3)?)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        priority: parse_enum(&row.get::<String>(5)?)?,
        assignee_id: get_opt_string(row, 6)?,
        assigner_id: get_opt_string(row, 7)?,
        continued_from: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl OriginsDb {
    pub async fn create_task(
        &self,
        title: &str,
        description: Option<&str>,
        priority: TaskPriority,
        assignee_id: Option<&str>,
        assigner_id: Option<&str>,
        continued_from: Option<&str>,
    ) -> Result<Task, DatabaseError> {
        let now = Utc::now();
        let id = self.generate_id(PREFIX_TASK).await?;

        self.conn()
            .execute(
                &format!(
                    "INSERT INTO tasks ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                libsql::params![
                    id.as_str(),
                    title,
                    description,
                    0i64,
                    TaskStatus::NotStarted.as_str(),
                    priority.as_str(),
                    assignee_id,
                    assigner_id,
                    continued_from,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Task {
            id,
            title: title.to_string(),
            description: description.map(String::from),
            progress: 0,
            status: TaskStatus::NotStarted,
            priority,
            assignee_id: assignee_id.map(String::from),
            assigner_id: assigner_id.map(String::from),
            continued_from: continued_from.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_task(&row)
    }

    pub async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Task, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref title) = update.title {
            sets.push(format!("title = ?{idx}"));
            params.push(title.clone().into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(description.clone().map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if let Some(progress) = update.progress {
            sets.push(format!("progress = ?{idx}"));
            params.push(i64::from(progress).into());
            idx += 1;
        }
        if let Some(ref status) = update.status {
            sets.push(format!("status = ?{idx}"));
            params.push(status.as_str().into());
            idx += 1;
        }
        if let Some(ref priority) = update.priority {
            sets.push(format!("priority = ?{idx}"));
            params.push(priority.as_str().into());
            idx += 1;
        }
        if let Some(ref assignee_id) = update.assignee_id {
            sets.push(format!("assignee_id = ?{idx}"));
            params.push(assignee_id.clone().map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_task(task_id).await;
        }

        let now = Utc::now();
        sets.push(format!("updated_at = ?{idx}"));
        params.push(now.to_rfc3339().into());
        idx += 1;

        params.push(task_id.into());
        let sql = format!("UPDATE tasks SET {} WHERE id = ?{idx}", sets.join(", "));
        self.conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.get_task(task_id).await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), DatabaseError> {
        self.conn()
            .execute("DELETE FROM attachments WHERE task_id = ?1", [task_id])
            .await?;
        self.conn()
            .execute("DELETE FROM tasks WHERE id = ?1", [task_id])
            .await?;
        Ok(())
    }

    pub async fn list_tasks(&self, limit: u32) -> Result<Vec<Task>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM tasks ORDER BY created_at DESC LIMIT {limit}"),
                (),
            )
            .await?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    /// Tasks with `start <= created_at <= end`, ordered by creation time.
    ///
    /// Both bounds are inclusive; this is the weekly-report window query.
    pub async fn tasks_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM tasks \
                     WHERE created_at >= ?1 AND created_at <= ?2 \
                     ORDER BY created_at"
                ),
                libsql::params![start.to_rfc3339(), end.to_rfc3339()],
            )
            .await?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updates::task::TaskUpdateBuilder;
    use chrono::TimeZone;

    async fn test_db() -> OriginsDb {
        OriginsDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn create_task_roundtrip() {
        let db = test_db().await;

        let task = db
            .create_task(
                "Prepare inventory",
                Some("Count the back room"),
                TaskPriority::High,
                None,
                None,
                None,
            )
            .await
            .unwrap();

        assert!(task.id.starts_with("tsk-"));
        assert_eq!(task.title, "Prepare inventory");
        assert_eq!(task.progress, 0);
        assert_eq!(task.status, TaskStatus::NotStarted);
        assert_eq!(task.priority, TaskPriority::High);

        let fetched = db.get_task(&task.id).await.unwrap();
        assert_eq!(fetched.title, "Prepare inventory");
        assert_eq!(fetched.priority, TaskPriority::High);
    }

    #[tokio::test]
    async fn update_task_partial() {
        let db = test_db().await;
        let task = db
            .create_task("Original", None, TaskPriority::Normal, None, None, None)
            .await
            .unwrap();

        let update = TaskUpdateBuilder::new()
            .progress(60)
            .status(TaskStatus::InProgress)
            .build();
        let updated = db.update_task(&task.id, update).await.unwrap();
        assert_eq!(updated.progress, 60);
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.title, "Original");
    }

    #[tokio::test]
    async fn empty_update_is_noop() {
        let db = test_db().await;
        let task = db
            .create_task("Untouched", None, TaskPriority::Low, None, None, None)
            .await
            .unwrap();

        let updated = db
            .update_task(&task.id, TaskUpdateBuilder::new().build())
            .await
            .unwrap();
        assert_eq!(updated, task);
    }

    #[tokio::test]
    async fn delete_task_removes_row_and_attachments() {
        let db = test_db().await;
        let task = db
            .create_task("To delete", None, TaskPriority::Normal, None, None, None)
            .await
            .unwrap();
        db.add_attachment(&task.id, "uploads/a.png", "a.png")
            .await
            .unwrap();

        db.delete_task(&task.id).await.unwrap();
        assert!(matches!(
            db.get_task(&task.id).await,
            Err(DatabaseError::NoResult)
        ));
        assert!(db.attachments_for_task(&task.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn continued_from_links_predecessor() {
        let db = test_db().await;
        let first = db
            .create_task("Week 1 stocktake", None, TaskPriority::Normal, None, None, None)
            .await
            .unwrap();
        let second = db
            .create_task(
                "Week 2 stocktake",
                None,
                TaskPriority::Normal,
                None,
                None,
                Some(&first.id),
            )
            .await
            .unwrap();

        let fetched = db.get_task(&second.id).await.unwrap();
        assert_eq!(fetched.continued_from.as_deref(), Some(first.id.as_str()));
    }

    #[tokio::test]
    async fn window_query_is_inclusive_on_both_bounds() {
        let db = test_db().await;

        // Insert directly with pinned timestamps to control the window edges.
        let rows = [
            ("tsk-00000001", "before", "2026-08-23T23:59:59+00:00"),
            ("tsk-00000002", "start edge", "2026-08-24T00:00:00+00:00"),
            ("tsk-00000003", "inside", "2026-08-26T12:00:00+00:00"),
            ("tsk-00000004", "end edge", "2026-08-29T23:59:59.999+00:00"),
            ("tsk-00000005", "after", "2026-08-30T00:00:00+00:00"),
        ];
        for (id, title, ts) in rows {
            db.conn()
                .execute(
                    "INSERT INTO tasks (id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                    libsql::params![id, title, ts],
                )
                .await
                .unwrap();
        }

        let start = Utc.with_ymd_and_hms(2026, 8, 24, 0, 0, 0).unwrap();
        let end = Utc
            .with_ymd_and_hms(2026, 8, 29, 23, 59, 59)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(999))
            .unwrap();

        let tasks = db.tasks_created_between(start, end).await.unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["start edge", "inside", "end edge"]);
    }

    #[tokio::test]
    async fn default_timestamps_fall_inside_rfc3339_window_bounds() {
        let db = test_db().await;
        // Rely on the schema's created_at default rather than an explicit
        // value; it must sort consistently with the RFC 3339 query bounds.
        db.conn()
            .execute(
                "INSERT INTO tasks (id, title) VALUES ('tsk-0000000c', 'defaulted')",
                (),
            )
            .await
            .unwrap();

        let now = Utc::now();
        let tasks = db
            .tasks_created_between(
                now - chrono::Duration::hours(1),
                now + chrono::Duration::hours(1),
            )
            .await
            .unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["defaulted"]);
    }

    #[tokio::test]
    async fn list_tasks_newest_first() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO tasks (id, title, created_at, updated_at) \
                 VALUES ('tsk-0000000a', 'older', '2026-08-01T00:00:00+00:00', '2026-08-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO tasks (id, title, created_at, updated_at) \
                 VALUES ('tsk-0000000b', 'newer', '2026-08-02T00:00:00+00:00', '2026-08-02T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();

        let tasks = db.list_tasks(10).await.unwrap();
        assert_eq!(tasks[0].title, "newer");
        assert_eq!(tasks[1].title, "older");
    }
}
