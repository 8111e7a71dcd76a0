//! Project/task domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Share one draft shape between generated and persisted tasks.
//!
//! # Invariants
//! - Every persisted object is identified by a stable UUID.
//! - Deletion is a hard delete; project deletion cascades to its tasks.

pub mod level;
pub mod project;
pub mod task;
