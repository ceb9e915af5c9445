//! Attachment repository: file references hanging off tasks.
//!
//! The stored objects themselves live in the artifact store; rows here only
//! carry the storage key.

use chrono::Utc;

use origins_core::entities::Attachment;
use origins_core::ids::PREFIX_ATTACHMENT;

use crate::OriginsDb;
use crate::error::DatabaseError;
use crate::helpers::parse_datetime;

const SELECT_COLS: &str = "id, task_id, storage_key, file_name, created_at";

fn row_to_attachment(row: &libsql::Row) -> Result<Attachment, DatabaseError> {
    Ok(Attachment {
        id: row.get(0)?,
        task_id: row.get(1)?,
        storage_key: row.get(2)?,
        file_name: row.get(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl OriginsDb {
    pub async fn add_attachment(
        &self,
        task_id: &str,
        storage_key: &str,
        file_name: &str,
    ) -> Result<Attachment, DatabaseError> {
        let now = Utc::now();
        let id = self.generate_id(PREFIX_ATTACHMENT).await?;

        self.conn()
            .execute(
                &format!("INSERT INTO attachments ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![id.as_str(), task_id, storage_key, file_name, now.to_rfc3339()],
            )
            .await?;

        Ok(Attachment {
            id,
            task_id: task_id.to_string(),
            storage_key: storage_key.to_string(),
            file_name: file_name.to_string(),
            created_at: now,
        })
    }

    pub async fn get_attachment(&self, id: &str) -> Result<Attachment, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM attachments WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_attachment(&row)
    }

    pub async fn attachments_for_task(
        &self,
        task_id: &str,
    ) -> Result<Vec<Attachment>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM attachments \
                     WHERE task_id = ?1 ORDER BY created_at"
                ),
                [task_id],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_attachment(&row)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use origins_core::enums::TaskPriority;

    async fn test_db() -> OriginsDb {
        OriginsDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn add_and_list_attachments() {
        let db = test_db().await;
        let task = db
            .create_task("With files", None, TaskPriority::Normal, None, None, None)
            .await
            .unwrap();

        let att = db
            .add_attachment(&task.id, "uploads/photo.jpg", "photo.jpg")
            .await
            .unwrap();
        assert!(att.id.starts_with("att-"));

        let listed = db.attachments_for_task(&task.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].storage_key, "uploads/photo.jpg");

        let fetched = db.get_attachment(&att.id).await.unwrap();
        assert_eq!(fetched.file_name, "photo.jpg");
    }

    #[tokio::test]
    async fn get_attachment_unknown_id() {
        let db = test_db().await;
        let result = db.get_attachment("att-ffffffff").await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn attachment_requires_existing_task() {
        let db = test_db().await;
        let result = db.add_attachment("tsk-ffffffff", "uploads/x", "x").await;
        assert!(result.is_err(), "FK should reject unknown task");
    }
}
