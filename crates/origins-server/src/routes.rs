//! HTTP surface over `tiny_http`.
//!
//! `tiny_http::Server::recv` blocks, so the accept loop runs inside
//! `spawn_blocking` and drives async handlers through the runtime handle.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;

use serde::Deserialize;
use tiny_http::{Header, Method, Request, Response};

use origins_core::enums::TaskStatus;
use origins_db::error::DatabaseError;
use origins_db::updates::task::TaskUpdateBuilder;
use origins_notify::webhook::Update;

use crate::app::App;
use crate::orchestrator::{Mode, RunError, RunOutcome};

type Reply = Response<Cursor<Vec<u8>>>;

/// Bind and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the accept loop panics.
pub async fn serve(app: Arc<App>, bind: &str) -> anyhow::Result<()> {
    let server = tiny_http::Server::http(bind)
        .map_err(|e| anyhow::anyhow!("failed to bind {bind}: {e}"))?;
    tracing::info!(bind, "origins server listening");

    let handle = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || {
        for mut request in server.incoming_requests() {
            let reply = handle.block_on(handle_request(&app, &mut request));
            if let Err(error) = request.respond(reply) {
                tracing::warn!(%error, "failed to write response");
            }
        }
    })
    .await?;
    Ok(())
}

async fn handle_request(app: &App, request: &mut Request) -> Reply {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or(&url).to_string();
    let query = parse_query(&url);
    let method = request.method().clone();
    tracing::debug!(%method, %path, "request");

    match (&method, path.as_str()) {
        (Method::Get, "/api/reports/weekly") => handle_weekly(app, &query).await,
        (Method::Get, "/api/reports/file") => handle_report_file(app, &query).await,
        (Method::Post, "/api/bot/webhook") => {
            let body = read_body(request);
            handle_webhook(app, &body).await
        }
        (Method::Post, _) => {
            if let Some(task_id) = path_segment(&path, "/api/tasks/", "/progress") {
                let body = read_body(request);
                handle_progress(app, task_id, &body).await
            } else if let Some(task_id) = path_segment(&path, "/api/tasks/", "/attachments") {
                let body = read_body(request);
                handle_add_attachment(app, task_id, &body).await
            } else {
                not_found()
            }
        }
        (Method::Delete, _) => {
            if let Some(task_id) = path_segment(&path, "/api/tasks/", "") {
                handle_delete_task(app, task_id).await
            } else {
                not_found()
            }
        }
        (Method::Get, _) => {
            if let Some(id) = path_segment(&path, "/api/attachments/", "/download") {
                handle_attachment_download(app, id).await
            } else {
                not_found()
            }
        }
        _ => not_found(),
    }
}

// ── Handlers ───────────────────────────────────────────────────────

async fn handle_weekly(app: &App, query: &HashMap<String, String>) -> Reply {
    let mode = match query.get("mode").map(String::as_str) {
        None => Mode::Manual,
        Some(raw) => match Mode::parse(raw) {
            Some(mode) => mode,
            None => {
                return json(
                    400,
                    &serde_json::json!({"error": format!("invalid mode '{raw}'")}),
                );
            }
        },
    };

    match app.run_report(mode).await {
        Ok(RunOutcome::Sent {
            summary,
            recipients,
        }) => json(
            200,
            &serde_json::json!({
                "status": "sent",
                "recipients": recipients,
                "report": summary,
            }),
        ),
        Ok(RunOutcome::Skipped { target_day }) => json(
            200,
            &serde_json::json!({
                "status": "skipped",
                "mode": mode.as_str(),
                "target_day": target_day,
            }),
        ),
        Ok(RunOutcome::NoRecipients { summary }) => json(
            404,
            &serde_json::json!({
                "error": "no recipients resolved",
                "report": summary,
            }),
        ),
        Err(RunError::Generation(error)) => json(
            500,
            &serde_json::json!({
                "error": "report generation failed",
                "detail": format!("{error:#}"),
            }),
        ),
        Err(RunError::Notification { summary, failures }) => json(
            500,
            &serde_json::json!({
                "error": "notification delivery failed",
                "failures": failures,
                "report": summary,
            }),
        ),
    }
}

async fn handle_report_file(app: &App, query: &HashMap<String, String>) -> Reply {
    let Some(key) = query.get("key") else {
        return json(400, &serde_json::json!({"error": "missing 'key' parameter"}));
    };
    if !is_report_key(key) {
        return json(
            400,
            &serde_json::json!({"error": "key must be under the reports/ prefix"}),
        );
    }
    let Some(store) = app.store.as_ref() else {
        return json(500, &serde_json::json!({"error": "storage is not configured"}));
    };

    match store.fetch(key).await {
        Ok(bytes) => Response::from_data(bytes)
            .with_header(header("Content-Type", "application/pdf"))
            .with_header(header("Cache-Control", "public, max-age=31536000, immutable")),
        Err(error) if error.is_not_found() => {
            json(404, &serde_json::json!({"error": "report not found"}))
        }
        Err(error) => {
            tracing::error!(%error, key, "report fetch failed");
            json(500, &serde_json::json!({"error": "report fetch failed"}))
        }
    }
}

/// Provider webhook. Always answers 200 so the provider never retries;
/// handler errors are logged and swallowed.
async fn handle_webhook(app: &App, body: &str) -> Reply {
    match serde_json::from_str::<Update>(body) {
        Ok(update) => {
            if let (Some(user_id), Some(chat_id)) = (update.start_payload(), update.chat_id()) {
                match app.db.set_chat_id(user_id, &chat_id.to_string()).await {
                    Ok(user) => {
                        tracing::info!(user_id = %user.id, chat_id, "chat linked to user");
                    }
                    Err(error) => {
                        tracing::warn!(%error, user_id, "chat link failed");
                    }
                }
            }
        }
        Err(error) => tracing::warn!(%error, "unparseable webhook update"),
    }
    json(200, &serde_json::json!({"ok": true}))
}

#[derive(Deserialize)]
struct ProgressBody {
    progress: i64,
    #[serde(default)]
    status: Option<TaskStatus>,
}

async fn handle_progress(app: &App, task_id: &str, body: &str) -> Reply {
    let parsed: ProgressBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(error) => {
            return json(400, &serde_json::json!({"error": format!("invalid body: {error}")}));
        }
    };

    let (progress, status) = apply_progress(parsed.progress, parsed.status);
    let update = TaskUpdateBuilder::new()
        .progress(progress)
        .status(status)
        .build();

    match app.db.update_task(task_id, update).await {
        Ok(task) => match serde_json::to_value(&task) {
            Ok(value) => json(200, &value),
            Err(error) => {
                tracing::error!(%error, "task serialization failed");
                json(500, &serde_json::json!({"error": "internal error"}))
            }
        },
        Err(DatabaseError::NoResult) => {
            json(404, &serde_json::json!({"error": "task not found"}))
        }
        Err(error) => {
            tracing::error!(%error, task_id, "task update failed");
            json(500, &serde_json::json!({"error": "task update failed"}))
        }
    }
}

async fn handle_delete_task(app: &App, task_id: &str) -> Reply {
    match app.remove_task(task_id).await {
        Ok(()) => json(200, &serde_json::json!({"deleted": task_id})),
        Err(DatabaseError::NoResult) => {
            json(404, &serde_json::json!({"error": "task not found"}))
        }
        Err(error) => {
            tracing::error!(%error, task_id, "task delete failed");
            json(500, &serde_json::json!({"error": "task delete failed"}))
        }
    }
}

#[derive(Deserialize)]
struct AttachmentBody {
    file_name: String,
}

/// Register an attachment row and hand back a presigned upload URL; the
/// client PUTs the bytes to storage directly.
async fn handle_add_attachment(app: &App, task_id: &str, body: &str) -> Reply {
    let parsed: AttachmentBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(error) => {
            return json(400, &serde_json::json!({"error": format!("invalid body: {error}")}));
        }
    };
    if parsed.file_name.trim().is_empty() {
        return json(400, &serde_json::json!({"error": "file_name must not be empty"}));
    }
    let Some(store) = app.store.as_ref() else {
        return json(500, &serde_json::json!({"error": "storage is not configured"}));
    };

    match app.db.get_task(task_id).await {
        Ok(_) => {}
        Err(DatabaseError::NoResult) => {
            return json(404, &serde_json::json!({"error": "task not found"}));
        }
        Err(error) => {
            tracing::error!(%error, task_id, "task lookup failed");
            return json(500, &serde_json::json!({"error": "task lookup failed"}));
        }
    }

    let key = format!(
        "attachments/{task_id}/{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sanitize_segment(&parsed.file_name)
    );

    let attachment = match app.db.add_attachment(task_id, &key, &parsed.file_name).await {
        Ok(attachment) => attachment,
        Err(error) => {
            tracing::error!(%error, task_id, "attachment insert failed");
            return json(500, &serde_json::json!({"error": "attachment insert failed"}));
        }
    };

    match store.signed_upload_url(&key).await {
        Ok(url) => json(
            200,
            &serde_json::json!({"attachment": attachment, "upload_url": url.as_str()}),
        ),
        Err(error) => {
            tracing::error!(%error, key, "upload URL signing failed");
            json(500, &serde_json::json!({"error": "upload URL signing failed"}))
        }
    }
}

async fn handle_attachment_download(app: &App, attachment_id: &str) -> Reply {
    let attachment = match app.db.get_attachment(attachment_id).await {
        Ok(attachment) => attachment,
        Err(DatabaseError::NoResult) => {
            return json(404, &serde_json::json!({"error": "attachment not found"}));
        }
        Err(error) => {
            tracing::error!(%error, attachment_id, "attachment lookup failed");
            return json(500, &serde_json::json!({"error": "attachment lookup failed"}));
        }
    };
    let Some(store) = app.store.as_ref() else {
        return json(500, &serde_json::json!({"error": "storage is not configured"}));
    };

    match store.signed_download_url(&attachment.storage_key).await {
        Ok(url) => json(
            200,
            &serde_json::json!({"file_name": attachment.file_name, "url": url.as_str()}),
        ),
        Err(error) => {
            tracing::error!(%error, attachment_id, "download URL signing failed");
            json(500, &serde_json::json!({"error": "download URL signing failed"}))
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Clamp progress to 0–100 and force `completed` at 100. A caller-supplied
/// status wins below 100; without one the status follows the progress value.
fn apply_progress(progress: i64, status: Option<TaskStatus>) -> (u8, TaskStatus) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = progress.clamp(0, 100) as u8;
    let status = if clamped == 100 {
        TaskStatus::Completed
    } else {
        status.unwrap_or(TaskStatus::for_progress(clamped))
    };
    (clamped, status)
}

fn is_report_key(key: &str) -> bool {
    key.strip_prefix("reports/")
        .is_some_and(|rest| !rest.is_empty())
}

/// The single id segment between `prefix` and `suffix`, rejecting empty or
/// nested ids.
fn path_segment<'a>(path: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    let id = path.strip_prefix(prefix)?.strip_suffix(suffix)?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(id)
}

/// Reduce a file name to characters safe inside an object key; runs of
/// anything else collapse to a single underscore.
fn sanitize_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_underscore = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_' {
            out.push(ch);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        return "_".to_string();
    }
    let mut capped = trimmed.to_string();
    capped.truncate(128);
    capped
}

/// Decode the query string into a map. Last value wins on duplicate keys.
fn parse_query(url: &str) -> HashMap<String, String> {
    let Some(query) = url.split_once('?').map(|(_, q)| q) else {
        return HashMap::new();
    };

    query
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = urlencoding::decode(key).ok()?;
            let value = urlencoding::decode(value).ok()?;
            Some((key.into_owned(), value.into_owned()))
        })
        .collect()
}

fn read_body(request: &mut Request) -> String {
    let mut body = String::new();
    if let Err(error) = request.as_reader().read_to_string(&mut body) {
        tracing::warn!(%error, "failed to read request body");
    }
    body
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name, value).unwrap()
}

fn json(status: u16, body: &serde_json::Value) -> Reply {
    Response::from_data(body.to_string().into_bytes())
        .with_status_code(status)
        .with_header(header("Content-Type", "application/json"))
}

fn not_found() -> Reply {
    json(404, &serde_json::json!({"error": "not found"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_parsing_decodes_values() {
        let query = parse_query("/api/reports/file?key=reports%2Fweekly-2026-08-24-1756.pdf&x=1");
        assert_eq!(
            query.get("key").map(String::as_str),
            Some("reports/weekly-2026-08-24-1756.pdf")
        );
        assert_eq!(query.get("x").map(String::as_str), Some("1"));
        assert!(parse_query("/api/reports/weekly").is_empty());
    }

    #[test]
    fn report_key_prefix_enforced() {
        assert!(is_report_key("reports/weekly-2026-08-24-1756.pdf"));
        assert!(!is_report_key("reports/"));
        assert!(!is_report_key("attachments/secret.png"));
        assert!(!is_report_key("../etc/passwd"));
    }

    #[test]
    fn path_segment_extraction() {
        assert_eq!(
            path_segment("/api/tasks/tsk-a1b2c3d4/progress", "/api/tasks/", "/progress"),
            Some("tsk-a1b2c3d4")
        );
        assert_eq!(path_segment("/api/tasks//progress", "/api/tasks/", "/progress"), None);
        assert_eq!(path_segment("/api/tasks/a/b/progress", "/api/tasks/", "/progress"), None);
        assert_eq!(
            path_segment("/api/tasks/tsk-a1b2c3d4", "/api/tasks/", ""),
            Some("tsk-a1b2c3d4")
        );
        assert_eq!(
            path_segment("/api/attachments/att-1/download", "/api/attachments/", "/download"),
            Some("att-1")
        );
    }

    #[test]
    fn file_names_sanitize_for_object_keys() {
        assert_eq!(sanitize_segment("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_segment("my report (final).pdf"), "my_report_final_.pdf");
        assert_eq!(sanitize_segment("///"), "_");
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(apply_progress(-5, None), (0, TaskStatus::NotStarted));
        assert_eq!(apply_progress(250, None), (100, TaskStatus::Completed));
        assert_eq!(apply_progress(50, None), (50, TaskStatus::InProgress));
    }

    #[test]
    fn full_progress_forces_completed() {
        assert_eq!(
            apply_progress(100, Some(TaskStatus::InProgress)),
            (100, TaskStatus::Completed)
        );
    }

    #[test]
    fn explicit_status_wins_below_full_progress() {
        assert_eq!(
            apply_progress(90, Some(TaskStatus::NotStarted)),
            (90, TaskStatus::NotStarted)
        );
    }

    async fn storage_test_app() -> App {
        let mut config = origins_config::OriginsConfig::default();
        config.server.db_path = ":memory:".to_string();
        config.storage.access_key_id = "key".into();
        config.storage.secret_access_key = "secret".into();
        config.storage.bucket_name = "origins-test".into();
        config.storage.endpoint = "http://localhost:9000".into();
        App::init(config).await.unwrap()
    }

    #[tokio::test]
    async fn attachment_register_distinguishes_missing_task_from_lookup_failure() {
        let app = storage_test_app().await;
        let body = r#"{"file_name": "a.pdf"}"#;

        let reply = handle_add_attachment(&app, "tsk-ffffffff", body).await;
        assert_eq!(reply.status_code().0, 404);

        // Break the task lookup outright; the handler must surface 500
        // instead of proceeding to the insert.
        app.db.conn().execute("DROP TABLE tasks", ()).await.unwrap();
        let reply = handle_add_attachment(&app, "tsk-ffffffff", body).await;
        assert_eq!(reply.status_code().0, 500);
    }

    #[test]
    fn progress_body_accepts_optional_status() {
        let body: ProgressBody = serde_json::from_str(r#"{"progress": 40}"#).unwrap();
        assert_eq!(body.progress, 40);
        assert!(body.status.is_none());

        let body: ProgressBody =
            serde_json::from_str(r#"{"progress": 40, "status": "in_progress"}"#).unwrap();
        assert_eq!(body.status, Some(TaskStatus::InProgress));
    }
}
