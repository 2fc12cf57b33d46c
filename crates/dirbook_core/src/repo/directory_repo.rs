//! Directory repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `directory` + `address` tables.
//! - Keep SQL and transaction details inside the core persistence boundary.
//!
//! # Invariants
//! - Every multi-statement write runs in a single IMMEDIATE transaction;
//!   a failure at any step rolls the whole unit back.
//! - An address row exists iff the entry's address has content. Create and
//!   update both enforce this; delete relies on `ON DELETE CASCADE` and
//!   never removes address rows explicitly.
//! - NULL address columns from the outer join collapse to empty strings at
//!   row-parse time and nowhere else.

use crate::db::DbError;
use crate::model::directory::{
    Address, Directory, DirectoryDraft, DirectoryId, DirectoryValidationError,
};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DIRECTORY_SELECT_SQL: &str = "SELECT
    d.id,
    d.name,
    d.phone_number,
    d.created_at,
    d.updated_at,
    a.address_line_1,
    a.address_line_2,
    a.city,
    a.state,
    a.country
FROM directory d
LEFT JOIN address a ON a.directory_id = d.id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for directory persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(DirectoryValidationError),
    Db(DbError),
    NotFound(DirectoryId),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "directory not found: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run schema bootstrap")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DirectoryValidationError> for RepoError {
    fn from(value: DirectoryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for directory CRUD operations.
pub trait DirectoryRepository {
    /// Creates one entry (and its address row when non-empty) atomically.
    fn create_directory(&mut self, draft: &DirectoryDraft) -> RepoResult<Directory>;
    /// Rewrites one entry's mutable fields and its address row atomically.
    fn update_directory(&mut self, id: DirectoryId, draft: &DirectoryDraft)
        -> RepoResult<Directory>;
    /// Gets one entry by id, address defaulted when absent.
    fn get_directory(&self, id: DirectoryId) -> RepoResult<Option<Directory>>;
    /// Lists all entries ascending by id.
    fn list_directories(&self) -> RepoResult<Vec<Directory>>;
    /// Deletes one entry; the address row goes with it via cascade.
    fn delete_directory(&mut self, id: DirectoryId) -> RepoResult<()>;
}

/// SQLite-backed directory repository.
///
/// The only component permitted to mutate persisted state. Holds a mutable
/// borrow of the process-wide connection so transactions are available to
/// the write paths.
pub struct SqliteDirectoryRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteDirectoryRepository<'conn> {
    /// Constructs a repository from a bootstrapped connection.
    ///
    /// Verifies the required tables and columns exist so that a connection
    /// which skipped schema bootstrap fails loudly here instead of at the
    /// first query.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DirectoryRepository for SqliteDirectoryRepository<'_> {
    fn create_directory(&mut self, draft: &DirectoryDraft) -> RepoResult<Directory> {
        draft.validate()?;

        let now = utc_timestamp();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO directory (name, phone_number, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.name.as_str(),
                draft.phone_number.as_str(),
                now.as_str(),
                now.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        if draft.address.has_content() {
            insert_address(&tx, id, &draft.address)?;
        }

        tx.commit()?;

        Ok(Directory {
            id,
            name: draft.name.clone(),
            phone_number: draft.phone_number.clone(),
            address: draft.address.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    fn update_directory(
        &mut self,
        id: DirectoryId,
        draft: &DirectoryDraft,
    ) -> RepoResult<Directory> {
        draft.validate()?;

        let now = utc_timestamp();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // created_at is immutable and comes back in the result, so the
        // existence pre-check doubles as its read.
        let created_at: String = tx
            .query_row(
                "SELECT created_at FROM directory WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(RepoError::NotFound(id))?;

        tx.execute(
            "UPDATE directory
             SET name = ?1, phone_number = ?2, updated_at = ?3
             WHERE id = ?4;",
            params![
                draft.name.as_str(),
                draft.phone_number.as_str(),
                now.as_str(),
                id,
            ],
        )?;

        if draft.address.has_content() {
            // Upsert: entries created without an address gain one here.
            let changed = tx.execute(
                "UPDATE address
                 SET address_line_1 = ?1,
                     address_line_2 = ?2,
                     city = ?3,
                     state = ?4,
                     country = ?5
                 WHERE directory_id = ?6;",
                params![
                    draft.address.address_line_1.as_str(),
                    draft.address.address_line_2.as_str(),
                    draft.address.city.as_str(),
                    draft.address.state.as_str(),
                    draft.address.country.as_str(),
                    id,
                ],
            )?;
            if changed == 0 {
                insert_address(&tx, id, &draft.address)?;
            }
        } else {
            // An all-empty address must leave zero rows behind, on update
            // just as on create.
            tx.execute("DELETE FROM address WHERE directory_id = ?1;", [id])?;
        }

        tx.commit()?;

        Ok(Directory {
            id,
            name: draft.name.clone(),
            phone_number: draft.phone_number.clone(),
            address: draft.address.clone(),
            created_at,
            updated_at: now,
        })
    }

    fn get_directory(&self, id: DirectoryId) -> RepoResult<Option<Directory>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DIRECTORY_SELECT_SQL} WHERE d.id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_directory_row(row)?));
        }

        Ok(None)
    }

    fn list_directories(&self) -> RepoResult<Vec<Directory>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DIRECTORY_SELECT_SQL} ORDER BY d.id ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_directory_row(row)?);
        }

        Ok(entries)
    }

    fn delete_directory(&mut self, id: DirectoryId) -> RepoResult<()> {
        // Single statement; the address row falls to ON DELETE CASCADE.
        let changed = self
            .conn
            .execute("DELETE FROM directory WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn insert_address(tx: &Transaction<'_>, id: DirectoryId, address: &Address) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO address (
            directory_id,
            address_line_1,
            address_line_2,
            city,
            state,
            country
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            id,
            address.address_line_1.as_str(),
            address.address_line_2.as_str(),
            address.city.as_str(),
            address.state.as_str(),
            address.country.as_str(),
        ],
    )?;
    Ok(())
}

fn parse_directory_row(row: &Row<'_>) -> RepoResult<Directory> {
    let address = Address {
        address_line_1: scan_text(row, "address_line_1")?,
        address_line_2: scan_text(row, "address_line_2")?,
        city: scan_text(row, "city")?,
        state: scan_text(row, "state")?,
        country: scan_text(row, "country")?,
    };

    Ok(Directory {
        id: row.get("id")?,
        name: row.get("name")?,
        phone_number: scan_text(row, "phone_number")?,
        address,
        created_at: scan_text(row, "created_at")?,
        updated_at: scan_text(row, "updated_at")?,
    })
}

// Nullable column scan: NULL collapses to the empty string here and never
// travels further into the domain layer.
fn scan_text(row: &Row<'_>, column: &str) -> RepoResult<String> {
    Ok(row.get::<_, Option<String>>(column)?.unwrap_or_default())
}

// Microsecond precision keeps updated_at observably later than created_at
// for back-to-back writes, and fixed-width RFC 3339 text sorts
// chronologically.
fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["directory", "address"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in ["id", "name", "phone_number", "created_at", "updated_at"] {
        if !table_has_column(conn, "directory", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "directory",
                column,
            });
        }
    }

    for column in [
        "directory_id",
        "address_line_1",
        "address_line_2",
        "city",
        "state",
        "country",
    ] {
        if !table_has_column(conn, "address", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "address",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
