//! Ledger headers

use serde::{Deserialize, Serialize};

use super::primitives::Hash256;
use super::time::LedgerTime;

/// One consensus-closed ledger header
///
/// Identified by sequence number and hash. Rows are written once per height
/// and never mutated; re-ingestion replaces the row identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Height of this ledger; primary key in the store
    pub sequence: u32,

    /// Total native coins in existence after this ledger
    pub total_coins: u64,

    /// Hash of the parent ledger
    pub previous_ledger: Hash256,

    /// Root hash of this ledger's transaction tree
    pub transaction_hash: Hash256,

    /// Root hash of this ledger's state tree
    pub state_hash: Hash256,

    /// Close time of the parent ledger
    pub parent_close_time: LedgerTime,

    /// Close time of this ledger
    pub close_time: LedgerTime,

    /// Close time resolution in seconds
    pub close_resolution: u8,

    /// Close flags
    pub close_flags: u8,

    /// This ledger's own hash, supplied by the wire layer
    pub hash: Hash256,
}
