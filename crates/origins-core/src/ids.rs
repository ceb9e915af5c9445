//! ID prefix constants.
//!
//! IDs are `<prefix>-<8 hex chars>`, generated by the store accessor via
//! `randomblob(4)`.

pub const PREFIX_TASK: &str = "tsk";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_FEEDBACK: &str = "fbk";
pub const PREFIX_ATTACHMENT: &str = "att";

/// All prefixes, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_TASK, PREFIX_USER, PREFIX_FEEDBACK, PREFIX_ATTACHMENT];
