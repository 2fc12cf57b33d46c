//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query and transaction details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `DirectoryDraft::validate()` before
//!   persistence.
//! - All multi-statement mutations run inside one transaction; no partial
//!   directory/address state is ever committed.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod directory_repo;
