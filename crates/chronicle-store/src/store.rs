//! Store facade
//!
//! Owns the connection and the four surrogate dictionaries, and exposes the
//! external surface: ingestion, point lookup, filtered queries, gap
//! detection, and dictionary administration. Every call runs synchronously
//! end-to-end; all writes belonging to one ingested entity share a single
//! transaction against SQLite.

use std::collections::HashMap;
use std::path::Path;

use chronicle_core::{AccountId, Hash256, Ledger, TransactionWithMeta};
use rusqlite::{params, Connection};

use crate::columns;
use crate::db;
use crate::dict::{DictKind, Dictionaries, LookupEntry};
use crate::errors::{Result, StoreError};
use crate::migrations;
use crate::query::{LedgerQuery, QueryResult, TransactionQuery};
use crate::schema::Stmt;

/// A full entity the store ingests or returns from point lookup
///
/// The set is closed: anything else is unrepresentable at this seam.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Ledger(Ledger),
    Transaction(Box<TransactionWithMeta>),
}

impl Entity {
    /// The hash identifying this entity
    pub fn hash(&self) -> Hash256 {
        match self {
            Entity::Ledger(ledger) => ledger.hash,
            Entity::Transaction(txm) => txm.tx.common.hash,
        }
    }
}

/// SQLite-backed ledger history store
pub struct LedgerStore {
    conn: Connection,
    dicts: Dictionaries,
}

impl LedgerStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(db::open(path)?)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::init(db::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        migrations::apply_migrations(&mut conn)?;
        let dicts = Dictionaries::load(&conn)?;
        Ok(Self { conn, dicts })
    }

    /// Borrow the dictionaries (reverse lookups, cache inspection)
    pub fn dictionaries(&self) -> &Dictionaries {
        &self.dicts
    }

    /// Ingest one entity
    ///
    /// All writes for the entity (envelope, variant payload, child rows,
    /// entry effects, first-sight dictionary rows) form one atomic unit.
    /// Re-ingestion replaces rows identically. On failure the unit rolls
    /// back; a rollback failure is reported compounded with the original
    /// error.
    pub fn insert(&mut self, entity: &Entity) -> Result<()> {
        self.dicts.begin_unit();
        let tx = self.conn.transaction()?;

        let outcome = match entity {
            Entity::Ledger(ledger) => {
                tracing::debug!(sequence = ledger.sequence, "ingesting ledger");
                columns::insert_ledger(&tx, ledger)
            }
            Entity::Transaction(txm) => {
                tracing::debug!(
                    ledger_sequence = txm.ledger_sequence,
                    transaction_index = txm.meta.transaction_index,
                    "ingesting transaction"
                );
                columns::insert_transaction(&tx, &mut self.dicts, txm)
            }
        };

        match outcome {
            Ok(()) => {
                tx.commit()?;
                self.dicts.commit_unit();
                Ok(())
            }
            Err(cause) => {
                let rollback = tx.rollback();
                self.dicts.abort_unit();
                match rollback {
                    Ok(()) => Err(cause),
                    Err(rollback) => Err(StoreError::Rollback {
                        cause: Box::new(cause),
                        rollback,
                    }),
                }
            }
        }
    }

    /// Point lookup by hash: ledgers first, then transactions
    ///
    /// Zero matches is `NotFound`. More than one match means a schema
    /// uniqueness invariant was breached and is a fatal error.
    pub fn get(&mut self, hash: &Hash256) -> Result<Entity> {
        let query = TransactionQuery {
            ledger: LedgerQuery {
                hash: Some(*hash),
                ..LedgerQuery::default()
            },
            account_id: None,
            transaction_type: None,
            limit: None,
        };
        let mut result = QueryResult {
            query,
            ..QueryResult::default()
        };

        // One read transaction for both probes, released on return
        let tx = self.conn.transaction()?;

        match query.ledger.rows(&tx, &mut result) {
            Ok(()) => {
                if result.ledgers.len() > 1 {
                    return Err(StoreError::AmbiguousHash {
                        hash: *hash,
                        matches: result.ledgers.len(),
                    });
                }
                return Ok(Entity::Ledger(result.ledgers.remove(0)));
            }
            Err(StoreError::NotFound) => {}
            Err(other) => return Err(other),
        }

        query.rows(&tx, &self.dicts, &mut result)?;
        drop(tx);

        match result.transactions.len() {
            0 => Err(StoreError::NotFound),
            1 => Ok(Entity::Transaction(Box::new(
                result.transactions.remove(0).txm,
            ))),
            matches => Err(StoreError::AmbiguousHash {
                hash: *hash,
                matches,
            }),
        }
    }

    /// Filtered query from a string-keyed parameter map
    ///
    /// Parameter parsing (including the account dictionary resolution, which
    /// may write) happens before the read transaction opens.
    pub fn query(&mut self, params: &HashMap<String, String>) -> Result<QueryResult> {
        let query = TransactionQuery::from_params(&self.conn, &mut self.dicts, params)?;
        self.query_transactions(&query)
    }

    /// Filtered transaction query for typed callers
    pub fn query_transactions(&mut self, query: &TransactionQuery) -> Result<QueryResult> {
        let mut result = QueryResult {
            query: *query,
            ..QueryResult::default()
        };
        let tx = self.conn.transaction()?;
        query.rows(&tx, &self.dicts, &mut result)?;
        drop(tx);
        Ok(result)
    }

    /// Ledger-only query for typed callers
    pub fn query_ledgers(&mut self, query: &LedgerQuery) -> Result<QueryResult> {
        let mut result = QueryResult {
            query: TransactionQuery {
                ledger: *query,
                account_id: None,
                transaction_type: None,
                limit: None,
            },
            ..QueryResult::default()
        };
        let tx = self.conn.transaction()?;
        query.rows(&tx, &mut result)?;
        drop(tx);
        Ok(result)
    }

    /// Sequence numbers absent from the contiguous range `[start, end]`
    pub fn missing_ledgers(&self, start: u32, end: u32) -> Result<Vec<u32>> {
        if end < start {
            return Ok(Vec::new());
        }
        let mut stmt = Stmt::MissingLedgers.prepare(&self.conn)?;
        let mut rows = stmt.query(params![start, end])?;
        let mut missing = Vec::new();
        while let Some(row) = rows.next()? {
            missing.push(row.get(0)?);
        }
        Ok(missing)
    }

    /// Lowest and highest stored ledger sequence; `(0, 0)` when empty
    pub fn ledger_range(&self) -> Result<(u32, u32)> {
        let (first, last): (Option<u32>, Option<u32>) = Stmt::LedgerRange
            .prepare(&self.conn)?
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok((first.unwrap_or(0), last.unwrap_or(0)))
    }

    /// Administrative dictionary insert
    pub fn insert_lookup_entry(&mut self, kind: DictKind, entry: &LookupEntry) -> Result<()> {
        let Self { conn, dicts } = self;
        dicts.get_mut(kind).insert_entry(conn, entry)
    }

    /// List one dictionary's persisted entries in id order
    pub fn lookup_entries(&self, kind: DictKind) -> Result<Vec<LookupEntry>> {
        self.dicts.get(kind).entries(&self.conn)
    }

    /// Accounts whose human form contains the given substring, at most 10,
    /// ordered by human form
    pub fn search_accounts(&self, substring: &str) -> Result<Vec<String>> {
        let pattern = format!("%{substring}%");
        let mut stmt = Stmt::SearchAccounts.prepare(&self.conn)?;
        let mut rows = stmt.query(params![pattern])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(row.get(0)?);
        }
        Ok(results)
    }

    /// Reverse an account surrogate id; absent ids yield `None`
    pub fn account_value(&self, id: u32) -> Option<AccountId> {
        self.dicts.reverse_account(id).ok()
    }
}
