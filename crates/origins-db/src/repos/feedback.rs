//! Feedback repository: daily/weekly feedback records.

use chrono::Utc;

use origins_core::entities::Feedback;
use origins_core::enums::FeedbackKind;
use origins_core::ids::PREFIX_FEEDBACK;

use crate::OriginsDb;
use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum};

const SELECT_COLS: &str = "id, user_id, kind, content, created_at";

fn row_to_feedback(row: &libsql::Row) -> Result<Feedback, DatabaseError> {
    Ok(Feedback {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: parse_enum(&row.get::<String>(2)?)?,
        content: row.get(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl OriginsDb {
    pub async fn create_feedback(
        &self,
        user_id: &str,
        kind: FeedbackKind,
        content: &str,
    ) -> Result<Feedback, DatabaseError> {
        let now = Utc::now();
        let id = self.generate_id(PREFIX_FEEDBACK).await?;

        self.conn()
            .execute(
                &format!("INSERT INTO feedback ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![id.as_str(), user_id, kind.as_str(), content, now.to_rfc3339()],
            )
            .await?;

        Ok(Feedback {
            id,
            user_id: user_id.to_string(),
            kind,
            content: content.to_string(),
            created_at: now,
        })
    }

    pub async fn list_feedback_for_user(
        &self,
        user_id: &str,
        kind: Option<FeedbackKind>,
        limit: u32,
    ) -> Result<Vec<Feedback>, DatabaseError> {
        let mut rows = match kind {
            Some(kind) => {
                self.conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM feedback \
                             WHERE user_id = ?1 AND kind = ?2 \
                             ORDER BY created_at DESC LIMIT {limit}"
                        ),
                        libsql::params![user_id, kind.as_str()],
                    )
                    .await?
            }
            None => {
                self.conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM feedback \
                             WHERE user_id = ?1 ORDER BY created_at DESC LIMIT {limit}"
                        ),
                        [user_id],
                    )
                    .await?
            }
        };

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_feedback(&row)?);
        }
        Ok(items)
    }
}
