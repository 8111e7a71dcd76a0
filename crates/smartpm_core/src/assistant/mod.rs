//! Task-generation assistant.
//!
//! # Responsibility
//! - Classify feature descriptions and expand them into task drafts.
//! - Keep the append-only conversation that carries those drafts.
//! - Materialize accepted drafts through the storage collaborator.
//!
//! # Invariants
//! - Decomposition is a pure function of its input and the static tables.
//! - Only the choice of template depends on the input text.

pub mod conversation;
pub mod decomposer;
pub mod materializer;
pub mod templates;
