//! Database connection management
//!
//! Utilities for opening and configuring SQLite connections. Transactional
//! guarantees, durability and uniqueness enforcement belong to SQLite; this
//! layer only selects sane settings.

use crate::errors::Result;
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Ok(Connection::open(path)?)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Ok(Connection::open_in_memory()?)
}

/// Configure a connection with the settings the store expects
pub fn configure(conn: &Connection) -> Result<()> {
    // Enforce referential integrity
    conn.execute_batch("PRAGMA foreign_keys = ON")?;

    // WAL mode allows readers while an ingestion transaction is open
    conn.execute_batch("PRAGMA journal_mode = WAL")?;

    Ok(())
}
