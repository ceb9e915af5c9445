//! Application context shared by all request handlers.

use anyhow::Context;

use origins_config::OriginsConfig;
use origins_db::OriginsDb;
use origins_db::error::DatabaseError;
use origins_notify::BotClient;
use origins_storage::ArtifactStore;

/// Long-lived handles: store accessor, artifact store, bot client.
///
/// Storage and bot are optional so the task endpoints keep working on
/// deployments that never configured reporting. Report runs fail with a
/// clear error instead.
pub struct App {
    pub config: OriginsConfig,
    pub db: OriginsDb,
    pub store: Option<ArtifactStore>,
    pub bot: Option<BotClient>,
}

impl App {
    /// Open the database and build the optional storage/bot clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or a configured
    /// client fails to build.
    pub async fn init(config: OriginsConfig) -> anyhow::Result<Self> {
        let db = OriginsDb::open_local(&config.server.db_path)
            .await
            .with_context(|| format!("failed to open database at {}", config.server.db_path))?;

        let store = if config.storage.is_configured() {
            Some(ArtifactStore::new(&config.storage).context("failed to build artifact store")?)
        } else {
            tracing::warn!("storage is not configured; report publishing disabled");
            None
        };

        let bot = if config.bot.is_configured() {
            Some(BotClient::new(&config.bot).context("failed to build bot client")?)
        } else {
            tracing::warn!("bot is not configured; report notifications disabled");
            None
        };

        Ok(Self {
            config,
            db,
            store,
            bot,
        })
    }

    /// Delete a task, its attachment rows, and best-effort the stored
    /// attachment objects. Storage failures are logged and swallowed so
    /// cleanup never fails the deletion itself.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NoResult`] if the task does not exist, or
    /// another `DatabaseError` if the row deletes fail.
    pub async fn remove_task(&self, task_id: &str) -> Result<(), DatabaseError> {
        self.db.get_task(task_id).await?;

        let attachments = self.db.attachments_for_task(task_id).await?;
        if let Some(store) = self.store.as_ref() {
            for attachment in &attachments {
                if let Err(error) = store.delete(&attachment.storage_key).await {
                    tracing::warn!(
                        %error,
                        key = %attachment.storage_key,
                        "attachment object cleanup failed"
                    );
                }
            }
        } else if !attachments.is_empty() {
            tracing::warn!(
                task_id,
                count = attachments.len(),
                "storage not configured; attachment objects left behind"
            );
        }

        self.db.delete_task(task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use origins_core::enums::TaskPriority;

    async fn test_app() -> App {
        let mut config = OriginsConfig::default();
        config.server.db_path = ":memory:".to_string();
        App::init(config).await.unwrap()
    }

    #[tokio::test]
    async fn remove_task_deletes_rows_even_without_storage() {
        let app = test_app().await;
        let task = app
            .db
            .create_task("Doomed", None, TaskPriority::Normal, None, None, None)
            .await
            .unwrap();
        app.db
            .add_attachment(&task.id, "attachments/x.png", "x.png")
            .await
            .unwrap();

        app.remove_task(&task.id).await.unwrap();
        assert!(matches!(
            app.db.get_task(&task.id).await,
            Err(DatabaseError::NoResult)
        ));
        assert!(app.db.attachments_for_task(&task.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_unknown_task_is_not_found() {
        let app = test_app().await;
        let result = app.remove_task("tsk-ffffffff").await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }
}
