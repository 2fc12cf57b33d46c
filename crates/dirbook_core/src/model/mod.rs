//! Contact directory domain model.
//!
//! # Responsibility
//! - Define the directory entry and address shapes used by core logic.
//! - Own write-input validation rules.
//!
//! # Invariants
//! - Every persisted directory entry is identified by a stable `DirectoryId`.
//! - An address is a value, never a null: absence is the all-empty shape.

pub mod directory;
