//! Query planner
//!
//! Turns a logical filter into a two-phase execution: phase 1 discovers, per
//! transaction type, the contiguous ledger range holding matching rows
//! (bounding the work and honoring the row limit); phase 2 issues one fetch
//! per discovered type against that type's denormalized view and merges the
//! decoded rows into one ordered result. Ledger-only filters take a
//! single-phase path against the ledgers table.
//!
//! The planner is stateless between queries. Every statement executed on
//! behalf of a query is recorded in the result's execution trace.

use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Instant;

use chronicle_core::{AccountId, Hash256, Ledger, TransactionWithMeta, TxType};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::columns;
use crate::dict::Dictionaries;
use crate::errors::{Result, StoreError};
use crate::schema::Stmt;

/// Row limit applied when the filter names neither a hash nor an exact ledger
pub const DEFAULT_LIMIT: u32 = 100;

/// Filter over ledger headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ledger: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ledger: Option<u32>,
}

/// Filter over transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionQuery {
    #[serde(flatten)]
    pub ledger: LedgerQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TxType>,
    /// `None` is unbounded; hash and exact-ledger filters lift the limit
    pub limit: Option<u32>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            ledger: LedgerQuery::default(),
            account_id: None,
            transaction_type: None,
            limit: Some(DEFAULT_LIMIT),
        }
    }
}

impl TransactionQuery {
    /// Build a filter from a string-keyed parameter map
    ///
    /// Recognized keys: `Ledger`, `MinLedger`, `MaxLedger`, `Account`,
    /// `TransactionType`, `Hash`. Unknown transaction-type strings are
    /// silently ignored; malformed values fail before any query I/O. The
    /// account parameter resolves through the dictionary and may mint an id,
    /// which is why this runs outside the read transaction.
    pub fn from_params(
        conn: &Connection,
        dicts: &mut Dictionaries,
        params: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut query = Self::default();

        if let Some(value) = params.get("Ledger") {
            query.ledger.ledger = Some(parse_sequence("Ledger", value)?);
            query.limit = None;
        }
        if let Some(value) = params.get("MinLedger") {
            query.ledger.min_ledger = Some(parse_sequence("MinLedger", value)?);
        }
        if let Some(value) = params.get("MaxLedger") {
            query.ledger.max_ledger = Some(parse_sequence("MaxLedger", value)?);
        }
        if let Some(value) = params.get("TransactionType") {
            query.transaction_type = TxType::from_param(value);
        }
        if let Some(value) = params.get("Account") {
            let account: AccountId =
                value.parse().map_err(|_| StoreError::InvalidParameter {
                    name: "Account",
                    value: value.clone(),
                })?;
            query.account_id = Some(dicts.lookup_account(conn, &account)?);
        }
        if let Some(value) = params.get("Hash") {
            let hash: Hash256 = value.parse().map_err(|_| StoreError::InvalidParameter {
                name: "Hash",
                value: value.clone(),
            })?;
            query.ledger.hash = Some(hash);
            query.limit = None;
        }

        Ok(query)
    }

    /// A max-only bound walks the history backwards
    fn descending(&self) -> bool {
        self.ledger.max_ledger.is_some()
    }
}

fn parse_sequence(name: &'static str, value: &str) -> Result<u32> {
    value.parse().map_err(|_| StoreError::InvalidParameter {
        name,
        value: value.to_string(),
    })
}

/// One transaction as a query returns it: the reconstructed typed object
/// plus the surrogate id its envelope row carries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub account_id: u32,
    #[serde(flatten)]
    pub txm: TransactionWithMeta,
}

/// One statement executed on behalf of a query
#[derive(Debug, Clone, Serialize)]
pub struct QueryExecution {
    /// The SQL that ran
    pub statement: &'static str,
    /// Bound parameters, rendered for inspection
    pub params: Vec<String>,
    pub elapsed_micros: u64,
}

/// An ordered sequence of ledgers and/or transactions with bookkeeping
#[derive(Debug, Default, Serialize)]
pub struct QueryResult {
    pub query: TransactionQuery,
    pub ledgers: Vec<Ledger>,
    pub transactions: Vec<TransactionRow>,
    /// Lowest ledger the store held when the query ran
    pub first: u32,
    /// Highest ledger the store held when the query ran
    pub last: u32,
    pub executions: Vec<QueryExecution>,
}

impl QueryResult {
    /// Lowest ledger sequence present in the result
    pub fn min_ledger(&self) -> u32 {
        match (self.ledgers.first(), self.transactions.first()) {
            (Some(ledger), _) => ledger.sequence,
            (None, Some(row)) => row.txm.ledger_sequence,
            (None, None) => 0,
        }
    }

    /// Highest ledger sequence present in the result
    pub fn max_ledger(&self) -> u32 {
        match (self.ledgers.last(), self.transactions.last()) {
            (Some(ledger), _) => ledger.sequence,
            (None, Some(row)) => row.txm.ledger_sequence,
            (None, None) => 0,
        }
    }

    /// The page boundary before this result
    pub fn previous(&self) -> u32 {
        self.min_ledger().saturating_sub(1)
    }

    /// The page boundary after this result
    pub fn next(&self) -> u32 {
        self.max_ledger().saturating_add(1)
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty() && self.transactions.is_empty()
    }

    fn record(&mut self, stmt: Stmt, params: Vec<String>, started: Instant) {
        self.executions.push(QueryExecution {
            statement: stmt.sql(),
            params,
            elapsed_micros: started.elapsed().as_micros() as u64,
        });
    }
}

/// Record the store's current ledger bounds once per result
fn load_ledger_range(conn: &Connection, result: &mut QueryResult) -> Result<()> {
    if result.first != 0 || result.last != 0 {
        return Ok(());
    }
    let (first, last): (Option<u32>, Option<u32>) = Stmt::LedgerRange
        .prepare(conn)?
        .query_row([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    result.first = first.unwrap_or(0);
    result.last = last.unwrap_or(0);
    Ok(())
}

fn render<T: Debug>(value: &T) -> String {
    format!("{value:?}")
}

impl LedgerQuery {
    /// Single-phase fetch against the ledgers table
    ///
    /// Predicate precedence: hash, exact sequence, min bound, max bound.
    /// Bounded to 10 rows in predicate order, re-presented ascending. An
    /// empty result is `NotFound`; a filter without any predicate is
    /// rejected before touching storage.
    pub(crate) fn rows(&self, conn: &Connection, result: &mut QueryResult) -> Result<()> {
        load_ledger_range(conn, result)?;

        let (stmt, param): (Stmt, rusqlite::types::Value) = if let Some(hash) = &self.hash {
            (Stmt::LedgersByHash, hash.as_bytes().to_vec().into())
        } else if let Some(sequence) = self.ledger {
            (Stmt::LedgerBySequence, i64::from(sequence).into())
        } else if let Some(min) = self.min_ledger {
            (Stmt::LedgersFromMin, i64::from(min).into())
        } else if let Some(max) = self.max_ledger {
            (Stmt::LedgersToMax, i64::from(max).into())
        } else {
            return Err(StoreError::InvalidParameter {
                name: "LedgerQuery",
                value: "no predicate supplied".to_string(),
            });
        };

        let started = Instant::now();
        {
            let mut prepared = stmt.prepare(conn)?;
            let mut rows = prepared.query(params![param])?;
            while let Some(row) = rows.next()? {
                result.ledgers.push(columns::read_ledger_row(row)?);
            }
        }
        result.record(stmt, vec![render(&param)], started);

        if result.ledgers.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

impl TransactionQuery {
    /// Two-phase fetch: per-type range discovery, then one fetch per
    /// discovered type's view, globally ordered at the end
    pub(crate) fn rows(
        &self,
        conn: &Connection,
        dicts: &Dictionaries,
        result: &mut QueryResult,
    ) -> Result<()> {
        load_ledger_range(conn, result)?;

        let descending = self.descending();
        let hash = self.ledger.hash.map(|h| h.as_bytes().to_vec());
        let type_code = self.transaction_type.map(TxType::code);
        // SQLite treats a negative LIMIT as unbounded
        let limit = self.limit.map_or(-1i64, i64::from);

        // Phase 1: per-type [min,max] ledger ranges within the limit window
        let ranges_stmt = if descending {
            Stmt::RangesDesc
        } else {
            Stmt::RangesAsc
        };
        let started = Instant::now();
        let mut ranges: Vec<(TxType, u32, u32)> = Vec::new();
        {
            let mut prepared = ranges_stmt.prepare(conn)?;
            let mut rows = prepared.query(params![
                hash,
                self.ledger.ledger,
                self.ledger.min_ledger,
                self.ledger.max_ledger,
                self.account_id,
                type_code,
                limit,
            ])?;
            while let Some(row) = rows.next()? {
                let code: u16 = row.get(0)?;
                let tx_type = TxType::from_code(code).ok_or(StoreError::UnsupportedVariant {
                    kind: "transaction type",
                    code: u32::from(code),
                })?;
                ranges.push((tx_type, row.get(1)?, row.get(2)?));
            }
        }
        result.record(
            ranges_stmt,
            vec![
                render(&hash),
                render(&self.ledger.ledger),
                render(&self.ledger.min_ledger),
                render(&self.ledger.max_ledger),
                render(&self.account_id),
                render(&type_code),
                render(&limit),
            ],
            started,
        );

        tracing::debug!(types = ranges.len(), descending, "discovered type ranges");

        // Phase 2: one fetch per discovered type, narrowed to its range
        for (tx_type, min, max) in ranges {
            let fetch = Stmt::fetch_for(tx_type);
            let started = Instant::now();
            {
                let mut prepared = fetch.prepare(conn)?;
                let mut rows = prepared.query(params![
                    hash,
                    self.ledger.ledger,
                    min,
                    max,
                    self.account_id,
                ])?;
                while let Some(row) = rows.next()? {
                    result
                        .transactions
                        .push(columns::read_tx_row(conn, dicts, tx_type, row)?);
                }
            }
            result.record(
                fetch,
                vec![
                    render(&hash),
                    render(&self.ledger.ledger),
                    render(&min),
                    render(&max),
                    render(&self.account_id),
                ],
                started,
            );
        }

        // Per-type sub-queries return in discovery order; impose one total
        // order across types
        result
            .transactions
            .sort_by_key(|row| (row.txm.ledger_sequence, row.txm.meta.transaction_index));
        if descending {
            result.transactions.reverse();
        }

        Ok(())
    }
}
