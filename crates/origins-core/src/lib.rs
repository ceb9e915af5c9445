//! # origins-core
//!
//! Core types for the Origins task-management system.
//!
//! This crate provides the foundational types shared across all Origins
//! crates:
//! - Entity structs for the domain objects (tasks, users, feedback,
//!   attachments)
//! - Status/priority/role enums with snake_case serialization
//! - ID prefix constants
//! - The transient report row produced during report generation

pub mod entities;
pub mod enums;
pub mod ids;
