//! Weekly report orchestration.
//!
//! One run is a straight pipeline with no persisted state: window, fetch,
//! build, publish, resolve recipients, fan out notifications. The artifact
//! is published before any send, so a notification failure still leaves the
//! report retrievable.

use std::collections::HashMap;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use thiserror::Error;

use origins_core::entities::Task;
use origins_notify::{LinkButton, ParseMode, SendOptions};
use origins_report::window::parse_target_day;
use origins_report::{ReportTask, ReportWindow, build_report};

use crate::app::App;

/// How a run was triggered. Automatic runs only proceed on the configured
/// target weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Automatic,
    Manual,
}

impl Mode {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "automatic" => Some(Self::Automatic),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub task_count: usize,
    pub title: String,
    pub window_start: String,
    pub window_end: String,
    pub key: String,
    pub url: String,
}

/// Terminal states of a run that are not hard failures.
#[derive(Debug)]
pub enum RunOutcome {
    /// Published and every notification delivered.
    Sent {
        summary: RunSummary,
        recipients: usize,
    },
    /// Automatic trigger on a day other than the target weekday.
    Skipped { target_day: String },
    /// Published, but nobody to notify. The artifact stays retrievable.
    NoRecipients { summary: RunSummary },
}

/// Hard failures, split at the publish boundary.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed before the artifact was stored; nothing was sent.
    #[error("report generation failed: {0:#}")]
    Generation(#[source] anyhow::Error),

    /// The artifact was stored but at least one send failed.
    #[error("notification delivery failed for {} recipient(s)", failures.len())]
    Notification {
        summary: RunSummary,
        failures: Vec<String>,
    },
}

fn generation<E: Into<anyhow::Error>>(error: E) -> RunError {
    RunError::Generation(error.into())
}

/// Artifact key for one run. Millisecond-resolution timestamp so
/// back-to-back runs in the same week never collide.
fn report_key(window_start: DateTime<Utc>) -> String {
    format!(
        "reports/weekly-{}-{}.pdf",
        window_start.format("%Y-%m-%d"),
        Utc::now().timestamp_millis()
    )
}

impl App {
    /// Run the weekly report pipeline for today.
    ///
    /// # Errors
    ///
    /// See [`RunError`].
    pub async fn run_report(&self, mode: Mode) -> Result<RunOutcome, RunError> {
        self.run_report_for_date(mode, Utc::now().date_naive()).await
    }

    async fn run_report_for_date(
        &self,
        mode: Mode,
        today: NaiveDate,
    ) -> Result<RunOutcome, RunError> {
        if mode == Mode::Automatic {
            let target = parse_target_day(&self.config.report.target_day).map_err(generation)?;
            if !ReportWindow::is_target_day(today, target) {
                tracing::info!(
                    target_day = %self.config.report.target_day,
                    "automatic run skipped, not the target day"
                );
                return Ok(RunOutcome::Skipped {
                    target_day: self.config.report.target_day.clone(),
                });
            }
        }

        let store = self
            .store
            .as_ref()
            .ok_or_else(|| generation(anyhow!("storage is not configured")))?;

        let window = ReportWindow::for_date(today);
        let tasks = self
            .db
            .tasks_created_between(window.start, window.end)
            .await
            .map_err(generation)?;

        let report_tasks = self.resolve_report_tasks(&tasks).await.map_err(generation)?;
        let title = format!("Weekly Report {}", window.label());
        let bytes = build_report(&report_tasks, &title).map_err(generation)?;

        let key = report_key(window.start);
        store
            .publish(&key, bytes)
            .await
            .map_err(generation)?;

        let summary = RunSummary {
            task_count: tasks.len(),
            title: title.clone(),
            window_start: window.start.to_rfc3339(),
            window_end: window.end.to_rfc3339(),
            url: self.report_url(&key),
            key,
        };
        tracing::info!(
            key = %summary.key,
            task_count = summary.task_count,
            "weekly report published"
        );

        let recipients = self.resolve_recipients().await.map_err(generation)?;
        if recipients.is_empty() {
            tracing::warn!("no recipients resolved, skipping notification");
            return Ok(RunOutcome::NoRecipients { summary });
        }

        let Some(bot) = self.bot.as_ref() else {
            return Err(RunError::Notification {
                summary,
                failures: vec!["bot is not configured".to_string()],
            });
        };

        let text = format!("*{title}* is ready.");
        let options = SendOptions {
            parse_mode: Some(ParseMode::Markdown),
            disable_link_preview: true,
            button: Some(LinkButton {
                text: "Open report".to_string(),
                url: summary.url.clone(),
            }),
        };

        let sends = recipients
            .iter()
            .map(|chat_id| bot.send_message(chat_id, &text, &options));
        let results = join_all(sends).await;

        let failures: Vec<String> = recipients
            .iter()
            .zip(results)
            .filter_map(|(chat_id, result)| {
                result
                    .err()
                    .map(|error| format!("chat {chat_id}: {error}"))
            })
            .collect();

        if failures.is_empty() {
            Ok(RunOutcome::Sent {
                recipients: recipients.len(),
                summary,
            })
        } else {
            for failure in &failures {
                tracing::error!(%failure, "notification send failed");
            }
            Err(RunError::Notification { summary, failures })
        }
    }

    /// Join the stable retrieval path onto the configured public base URL.
    fn report_url(&self, key: &str) -> String {
        let path = format!("/api/reports/file?key={}", urlencoding::encode(key));
        let base = self.config.report.public_base_url.trim_end_matches('/');
        if base.is_empty() {
            path
        } else {
            format!("{base}{path}")
        }
    }

    /// Resolve assignee/assigner ids to display names for the builder.
    /// Ids with no matching user row render as missing names.
    async fn resolve_report_tasks(
        &self,
        tasks: &[Task],
    ) -> Result<Vec<ReportTask>, origins_db::error::DatabaseError> {
        let mut ids: Vec<String> = tasks
            .iter()
            .flat_map(|t| [t.assignee_id.clone(), t.assigner_id.clone()])
            .flatten()
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let names: HashMap<String, String> = self
            .db
            .get_users_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let lookup = |id: &Option<String>| {
            id.as_ref().and_then(|id| names.get(id)).cloned()
        };

        Ok(tasks
            .iter()
            .map(|task| ReportTask {
                created_at: task.created_at,
                title: task.title.clone(),
                priority: task.priority,
                progress: task.progress,
                assignee: lookup(&task.assignee_id),
                assigner: lookup(&task.assigner_id),
            })
            .collect())
    }

    /// Chat ids to notify: configured user ids that have a linked chat id,
    /// plus the extra chat id appended unconditionally.
    async fn resolve_recipients(
        &self,
    ) -> Result<Vec<String>, origins_db::error::DatabaseError> {
        let users = self
            .db
            .get_users_by_ids(&self.config.report.recipients)
            .await?;

        let mut chat_ids: Vec<String> = users.into_iter().filter_map(|u| u.chat_id).collect();
        if !self.config.report.extra_chat_id.is_empty() {
            chat_ids.push(self.config.report.extra_chat_id.clone());
        }
        Ok(chat_ids)
    }
}
