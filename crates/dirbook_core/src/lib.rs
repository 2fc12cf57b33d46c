//! Core domain logic for DirBook, a contact directory service.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::directory::{
    Address, Directory, DirectoryDraft, DirectoryId, DirectoryValidationError,
};
pub use repo::directory_repo::{
    DirectoryRepository, RepoError, RepoResult, SqliteDirectoryRepository,
};
pub use service::directory_service::{parse_directory_id, DirectoryService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
