//! Paginated PDF report builder.
//!
//! Groups tasks by assignee display name (fallback `"Unknown"`), emits one
//! section per assignee in lexicographic key order, and starts a new page
//! when the running vertical offset leaves too little room for the next
//! section. Page breaks happen only between sections, matching the layout
//! of the reports this replaces.

use std::collections::BTreeMap;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use origins_core::entities::ReportRow;
use origins_core::enums::TaskPriority;

use crate::error::ReportError;

/// Builder input: one task with its user references already resolved to
/// display names.
#[derive(Debug, Clone)]
pub struct ReportTask {
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub title: String,
    pub priority: TaskPriority,
    pub progress: u8,
    pub assignee: Option<String>,
    pub assigner: Option<String>,
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_MM: f32 = 6.0;
/// Minimum vertical room left on a page to begin a section on it.
const SECTION_MIN_MM: f32 = 40.0;
const TITLE_MAX_CHARS: usize = 44;

const COL_DATE_MM: f32 = 15.0;
const COL_TITLE_MM: f32 = 42.0;
const COL_PRIORITY_MM: f32 = 130.0;
const COL_PROGRESS_MM: f32 = 155.0;
const COL_ASSIGNER_MM: f32 = 175.0;

/// Group tasks by assignee display name. `BTreeMap` keys give the
/// deterministic lexicographic section order regardless of input order.
fn group_by_assignee(tasks: &[ReportTask]) -> BTreeMap<String, Vec<&ReportTask>> {
    let mut groups: BTreeMap<String, Vec<&ReportTask>> = BTreeMap::new();
    for task in tasks {
        let key = task
            .assignee
            .clone()
            .unwrap_or_else(|| String::from("Unknown"));
        groups.entry(key).or_default().push(task);
    }
    groups
}

fn to_row(task: &ReportTask) -> ReportRow {
    ReportRow {
        created_at: task.created_at,
        title: task.title.clone(),
        priority: task.priority,
        progress: task.progress,
        assigner: task.assigner.clone(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}

/// Render state for the page being written. `y` runs top-down in mm.
struct PageCursor {
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor {
    fn text(&mut self, text: impl Into<String>, size: f32, x: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self) {
        self.y -= LINE_MM;
    }
}

/// Build a weekly report PDF from `tasks` under `title`.
///
/// An empty task list yields a one-page document with just the title.
///
/// # Errors
///
/// Returns [`ReportError::Pdf`] if font registration or document
/// serialization fails.
pub fn build_report(tasks: &[ReportTask], title: &str) -> Result<Vec<u8>, ReportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut cursor = PageCursor {
        layer: doc.get_page(first_page).get_layer(first_layer),
        y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    cursor.text(title, 16.0, MARGIN_MM, &bold);
    cursor.advance();
    cursor.advance();

    for (assignee, group) in group_by_assignee(tasks) {
        if cursor.y < SECTION_MIN_MM {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "layer 1");
            cursor = PageCursor {
                layer: doc.get_page(page).get_layer(layer),
                y: PAGE_HEIGHT_MM - MARGIN_MM,
            };
        }

        cursor.text(&assignee, 13.0, MARGIN_MM, &bold);
        cursor.advance();

        cursor.text("Date", 10.0, COL_DATE_MM, &bold);
        cursor.text("Task", 10.0, COL_TITLE_MM, &bold);
        cursor.text("Priority", 10.0, COL_PRIORITY_MM, &bold);
        cursor.text("Progress", 10.0, COL_PROGRESS_MM, &bold);
        cursor.text("Assigner", 10.0, COL_ASSIGNER_MM, &bold);
        cursor.advance();

        for task in group {
            let row = to_row(task);
            cursor.text(
                row.created_at.format("%Y-%m-%d").to_string(),
                10.0,
                COL_DATE_MM,
                &font,
            );
            cursor.text(truncate(&row.title, TITLE_MAX_CHARS), 10.0, COL_TITLE_MM, &font);
            cursor.text(row.priority.label(), 10.0, COL_PRIORITY_MM, &font);
            cursor.text(format!("{}%", row.progress), 10.0, COL_PROGRESS_MM, &font);
            cursor.text(
                row.assigner.as_deref().unwrap_or("-"),
                10.0,
                COL_ASSIGNER_MM,
                &font,
            );
            cursor.advance();
        }

        // gap between sections
        cursor.advance();
    }

    tracing::debug!(tasks = tasks.len(), title, "report document assembled");
    Ok(doc.save_to_bytes()?)
}
