//! Partial-update builders for repo `update_*` methods.

pub mod task;
