//! User repository: lookups, chat-id linking, and recipient resolution.

use chrono::Utc;

use origins_core::entities::User;
use origins_core::enums::Role;
use origins_core::ids::PREFIX_USER;

use crate::OriginsDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};

const SELECT_COLS: &str = "id, name, role, chat_id, created_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        role: parse_enum(&row.get::<String>(2)?)?,
        chat_id: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl OriginsDb {
    pub async fn create_user(&self, name: &str, role: Role) -> Result<User, DatabaseError> {
        let now = Utc::now();
        let id = self.generate_id(PREFIX_USER).await?;

        self.conn()
            .execute(
                &format!("INSERT INTO users ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![id.as_str(), name, role.as_str(), Option::<String>::None, now.to_rfc3339()],
            )
            .await?;

        Ok(User {
            id,
            name: name.to_string(),
            role,
            chat_id: None,
            created_at: now,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_user(&row)
    }

    /// Fetch users by id, preserving only ids that exist. Order follows the
    /// store, not the input.
    pub async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT {SELECT_COLS} FROM users WHERE id IN ({})",
            placeholders.join(", ")
        );
        let params: Vec<libsql::Value> = ids.iter().map(|id| id.clone().into()).collect();

        let mut rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// Link an external chat id to a user (bot webhook handler).
    pub async fn set_chat_id(&self, user_id: &str, chat_id: &str) -> Result<User, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE users SET chat_id = ?1 WHERE id = ?2",
                libsql::params![chat_id, user_id],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> OriginsDb {
        OriginsDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn create_user_roundtrip() {
        let db = test_db().await;
        let user = db.create_user("Ann", Role::Manager).await.unwrap();

        assert!(user.id.starts_with("usr-"));
        assert!(user.chat_id.is_none());

        let fetched = db.get_user(&user.id).await.unwrap();
        assert_eq!(fetched.name, "Ann");
        assert_eq!(fetched.role, Role::Manager);
    }

    #[tokio::test]
    async fn set_chat_id_links_user() {
        let db = test_db().await;
        let user = db.create_user("Bob", Role::Staff).await.unwrap();

        let updated = db.set_chat_id(&user.id, "123456789").await.unwrap();
        assert_eq!(updated.chat_id.as_deref(), Some("123456789"));
    }

    #[tokio::test]
    async fn set_chat_id_unknown_user() {
        let db = test_db().await;
        let result = db.set_chat_id("usr-ffffffff", "123").await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn get_users_by_ids_skips_missing() {
        let db = test_db().await;
        let ann = db.create_user("Ann", Role::Staff).await.unwrap();
        let bob = db.create_user("Bob", Role::Bk).await.unwrap();

        let users = db
            .get_users_by_ids(&[ann.id.clone(), "usr-ffffffff".to_string(), bob.id.clone()])
            .await
            .unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn get_users_by_ids_empty_input() {
        let db = test_db().await;
        assert!(db.get_users_by_ids(&[]).await.unwrap().is_empty());
    }
}
