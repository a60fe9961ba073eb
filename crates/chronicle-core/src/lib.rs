//! Chronicle Core - typed domain model for ledger history
//!
//! Provides:
//! - Fixed-width binary primitives (hashes, identifiers, keys)
//! - Ledger headers and the transaction envelope with its payload variants
//! - Ledger-entry snapshots and the effects transactions produce
//!
//! This crate holds data only. Wire-format decoding and hash derivation
//! belong to the upstream wire library; persistence belongs to
//! `chronicle-store`.

pub mod errors;
pub mod model;

// Re-export key types
pub use errors::ParseError;
pub use model::{
    AccountId, AccountRootEntry, AccountSet, Amendment, Amount, Currency, DirectoryEntry, Drops,
    Entry, EntryEffect, EntryState, EntryType, FeeSettingsEntry, Hash128, Hash256, Ledger,
    LedgerTime, Memo, OfferCancel, OfferCreate, OfferEntry, PathStep, Payment, PublicKey,
    RegularKey, SetFee, SetRegularKey, Transaction, TransactionMeta, TransactionWithMeta,
    TrustLineEntry, TrustSet, TxCommon, TxPayload, TxType,
};
