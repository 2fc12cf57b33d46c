//! Directory use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for transport collaborators.
//! - Own the string-id boundary: ids arrive as text, storage uses integers.
//! - Log operation outcomes; storage failure detail stays in the log, not
//!   in the outward error message.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/transaction contracts.
//! - A get for an absent id is reported as `NotFound`, distinct from
//!   storage failure.

use crate::model::directory::{Directory, DirectoryDraft, DirectoryId, DirectoryValidationError};
use crate::repo::directory_repo::{DirectoryRepository, RepoError, RepoResult};
use log::{error, info, warn};

/// Use-case service wrapper for directory CRUD operations.
///
/// The excluded transport layer (HTTP or otherwise) calls these methods with
/// already-decoded parameters and maps the returned error kinds onto its own
/// status codes.
pub struct DirectoryService<R: DirectoryRepository> {
    repo: R,
}

impl<R: DirectoryRepository> DirectoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new directory entry and returns it with id and timestamps
    /// assigned.
    pub fn create(&mut self, draft: &DirectoryDraft) -> RepoResult<Directory> {
        match self.repo.create_directory(draft) {
            Ok(entry) => {
                info!(
                    "event=directory_create module=service status=ok id={}",
                    entry.id
                );
                Ok(entry)
            }
            Err(err) => Err(log_failure("directory_create", err)),
        }
    }

    /// Updates an existing entry addressed by its external string id.
    pub fn update(&mut self, id: &str, draft: &DirectoryDraft) -> RepoResult<Directory> {
        let id = parse_directory_id(id)?;
        match self.repo.update_directory(id, draft) {
            Ok(entry) => {
                info!(
                    "event=directory_update module=service status=ok id={}",
                    entry.id
                );
                Ok(entry)
            }
            Err(err) => Err(log_failure("directory_update", err)),
        }
    }

    /// Gets one entry by its external string id.
    ///
    /// An absent id yields `RepoError::NotFound`, never an empty success.
    pub fn get(&self, id: &str) -> RepoResult<Directory> {
        let id = parse_directory_id(id)?;
        match self.repo.get_directory(id) {
            Ok(Some(entry)) => Ok(entry),
            Ok(None) => Err(log_failure("directory_get", RepoError::NotFound(id))),
            Err(err) => Err(log_failure("directory_get", err)),
        }
    }

    /// Lists all entries ascending by id. Zero entries is an empty list,
    /// not an error.
    pub fn list(&self) -> RepoResult<Vec<Directory>> {
        match self.repo.list_directories() {
            Ok(entries) => Ok(entries),
            Err(err) => Err(log_failure("directory_list", err)),
        }
    }

    /// Deletes one entry by its external string id, cascading to its
    /// address row.
    pub fn delete(&mut self, id: &str) -> RepoResult<()> {
        let id = parse_directory_id(id)?;
        match self.repo.delete_directory(id) {
            Ok(()) => {
                info!("event=directory_delete module=service status=ok id={id}");
                Ok(())
            }
            Err(err) => Err(log_failure("directory_delete", err)),
        }
    }
}

/// Parses the externally-surfaced string id into a storage id.
///
/// # Errors
/// - `InvalidId` when the text is not an integer.
pub fn parse_directory_id(raw: &str) -> Result<DirectoryId, DirectoryValidationError> {
    raw.trim()
        .parse::<DirectoryId>()
        .map_err(|_| DirectoryValidationError::InvalidId(raw.to_string()))
}

fn log_failure(event: &str, err: RepoError) -> RepoError {
    match &err {
        RepoError::Db(db_err) => {
            error!("event={event} module=service status=error error_code=storage error={db_err}");
        }
        RepoError::NotFound(id) => {
            info!("event={event} module=service status=not_found id={id}");
        }
        other => {
            warn!("event={event} module=service status=rejected error={other}");
        }
    }
    err
}
