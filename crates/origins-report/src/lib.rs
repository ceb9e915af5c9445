//! # origins-report
//!
//! Weekly-report generation for Origins: the Monday–Saturday window
//! computation and the paginated PDF builder.
//!
//! The builder is pure: tasks in, PDF bytes out. Fetching, publishing,
//! and notification live in their own crates.

pub mod builder;
pub mod error;
pub mod window;

pub use builder::{ReportTask, build_report};
pub use error::ReportError;
pub use window::ReportWindow;
