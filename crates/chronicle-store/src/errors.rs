//! Error handling for chronicle-store
//!
//! One taxonomy for the whole persistence layer. Write-path errors abort and
//! roll back the enclosing unit of work; query-path errors surface verbatim.
//! Nothing here retries.

use chronicle_core::Hash256;
use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while persisting or querying ledger history
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error from SQLite
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Point or filtered query matched nothing
    #[error("not found")]
    NotFound,

    /// Dictionary insert conflicted with an existing id or value mapping
    #[error("duplicate {dictionary} entry for id {id}")]
    DuplicateEntity { dictionary: &'static str, id: u32 },

    /// A closed-set discriminant read from storage or a parameter was not
    /// recognized
    #[error("unknown {kind} discriminant: {code}")]
    UnsupportedVariant { kind: &'static str, code: u32 },

    /// Paired current/previous snapshots disagree on entry type
    #[error(
        "effect at position {position}: current snapshot is {current}, previous is {previous}"
    )]
    InconsistentEntryType {
        position: u32,
        current: &'static str,
        previous: &'static str,
    },

    /// An entry snapshot violates its own internal invariants
    #[error("malformed entry snapshot at position {position}: {reason}")]
    MalformedEntry { position: u32, reason: String },

    /// A query parameter failed to parse; reported before any I/O
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    /// More than one row matched a hash that the schema keeps unique
    #[error("{matches} rows match hash {hash}")]
    AmbiguousHash { hash: Hash256, matches: usize },

    /// A stored column could not be decoded back into its domain type
    #[error("invalid value in column {column}: {reason}")]
    Decode {
        column: &'static str,
        reason: String,
    },

    /// A surrogate id read from storage has no dictionary entry
    #[error("dangling {dictionary} surrogate id: {id}")]
    DanglingSurrogate { dictionary: &'static str, id: u32 },

    /// A write failed and the rollback failed too; both are reported
    #[error("write failed: {cause}; rollback also failed: {rollback}")]
    Rollback {
        cause: Box<StoreError>,
        rollback: rusqlite::Error,
    },

    /// A schema migration failed to apply
    #[error("migration {migration_id} failed: {reason}")]
    Migration {
        migration_id: &'static str,
        reason: String,
    },

    /// A previously applied migration no longer matches its recorded checksum
    #[error("checksum mismatch for migration {migration_id}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        migration_id: &'static str,
        expected: String,
        actual: String,
    },
}

impl StoreError {
    /// Wrap a domain parse failure as a column decode error
    pub(crate) fn decode(column: &'static str, err: impl std::fmt::Display) -> Self {
        StoreError::Decode {
            column,
            reason: err.to_string(),
        }
    }
}
