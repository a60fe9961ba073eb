//! Chronicle Store - relational persistence for ledger history
//!
//! Provides:
//! - SQLite schema with migrations framework
//! - Surrogate dictionaries compressing repeated binary identifiers
//! - Polymorphic record mapping between the typed domain model and the
//!   normalized, dictionary-encoded schema
//! - Two-phase query planning over per-variant denormalized views

pub mod codec;
pub mod columns;
pub mod db;
pub mod dict;
pub mod diff;
pub mod errors;
pub mod migrations;
pub mod query;
pub mod schema;
pub mod store;

// Re-export key types
pub use dict::{DictKind, LookupEntry};
pub use errors::{Result, StoreError};
pub use query::{LedgerQuery, QueryExecution, QueryResult, TransactionQuery, TransactionRow};
pub use store::{Entity, LedgerStore};
