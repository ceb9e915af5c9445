//! Entity structs for the Origins domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{FeedbackKind, Role, TaskPriority, TaskStatus};

/// A unit of assigned work with progress tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Completion percentage, 0–100. `progress == 100` implies
    /// `status == Completed`; enforced on update at the application layer,
    /// not by the store.
    pub progress: u8,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<String>,
    pub assigner_id: Option<String>,
    /// Predecessor task this one continues from.
    pub continued_from: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A system user; `chat_id` is the external messaging identifier used for
/// report notifications, set via the bot webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub chat_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A daily or weekly feedback record written by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feedback {
    pub id: String,
    pub user_id: String,
    pub kind: FeedbackKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A stored file attached to a task. `storage_key` is the object-store key;
/// the object itself lives outside the relational store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: String,
    pub task_id: String,
    pub storage_key: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// One line of a generated report table. Derived from a [`Task`] plus
/// resolved user names; never persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportRow {
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub priority: TaskPriority,
    pub progress: u8,
    /// Resolved assigner display name, if any.
    pub assigner: Option<String>,
}
