//! Repository methods, grouped by entity. All are `impl OriginsDb` blocks.

pub mod attachment;
pub mod feedback;
pub mod task;
pub mod user;
