//! Domain model for ledger history
//!
//! One module per entity family, mirroring the persisted schema: primitives,
//! amounts, ledger headers, transactions, and ledger-entry snapshots.

pub mod amount;
pub mod entry;
pub mod ledger;
pub mod primitives;
pub mod time;
pub mod transaction;

pub use amount::Amount;
pub use entry::{
    AccountRootEntry, DirectoryEntry, Entry, EntryEffect, EntryState, EntryType, FeeSettingsEntry,
    OfferEntry, TrustLineEntry,
};
pub use ledger::Ledger;
pub use primitives::{AccountId, Currency, Drops, Hash128, Hash256, PublicKey, RegularKey};
pub use time::LedgerTime;
pub use transaction::{
    AccountSet, Amendment, Memo, OfferCancel, OfferCreate, PathStep, Payment, SetFee,
    SetRegularKey, Transaction, TransactionMeta, TransactionWithMeta, TrustSet, TxCommon,
    TxPayload, TxType,
};
