//! Ledger-entry snapshots and transaction effects
//!
//! A transaction's metadata records, for every ledger entry it touched, a
//! before and after snapshot of the entry's fields. Snapshot fields are all
//! optional: the previous image carries only what changed, and a created
//! entry has no previous image at all. The entry set is closed; adding a
//! variant is a compile-time-visible change to [`Entry`].

use serde::{Deserialize, Serialize};

use super::amount::Amount;
use super::primitives::{AccountId, Currency, Drops, Hash128, Hash256, RegularKey};

/// What happened to the entry within the transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryState {
    Created,
    Modified,
    Deleted,
}

impl EntryState {
    /// Stored discriminant code
    pub fn code(self) -> u8 {
        match self {
            EntryState::Created => 0,
            EntryState::Modified => 1,
            EntryState::Deleted => 2,
        }
    }

    /// Decode a stored discriminant code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EntryState::Created),
            1 => Some(EntryState::Modified),
            2 => Some(EntryState::Deleted),
            _ => None,
        }
    }
}

/// Ledger-entry type discriminant, using the wire-level codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    AccountRoot,
    TrustLine,
    Offer,
    Directory,
    FeeSettings,
}

impl EntryType {
    /// Wire-level discriminant code
    pub fn code(self) -> u16 {
        match self {
            EntryType::AccountRoot => 0x61,
            EntryType::Directory => 0x64,
            EntryType::Offer => 0x6f,
            EntryType::TrustLine => 0x72,
            EntryType::FeeSettings => 0x73,
        }
    }

    /// Decode a wire-level discriminant code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x61 => Some(EntryType::AccountRoot),
            0x64 => Some(EntryType::Directory),
            0x6f => Some(EntryType::Offer),
            0x72 => Some(EntryType::TrustLine),
            0x73 => Some(EntryType::FeeSettings),
            _ => None,
        }
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            EntryType::AccountRoot => "AccountRoot",
            EntryType::TrustLine => "TrustLine",
            EntryType::Offer => "Offer",
            EntryType::Directory => "Directory",
            EntryType::FeeSettings => "FeeSettings",
        }
    }
}

/// Account-root snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountRootEntry {
    pub flags: Option<u32>,
    pub account: Option<AccountId>,
    pub sequence: Option<u32>,
    pub balance: Option<Drops>,
    pub owner_count: Option<u32>,
    pub regular_key: Option<RegularKey>,
    pub email_hash: Option<Hash128>,
    pub wallet_locator: Option<Hash256>,
    pub wallet_size: Option<u32>,
    pub message_key: Option<Vec<u8>>,
    pub domain: Option<Vec<u8>>,
    pub transfer_rate: Option<u32>,
}

/// Trust-line snapshot
///
/// The balance and both limits always share one currency; the diff writer
/// rejects snapshots where they disagree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrustLineEntry {
    pub flags: Option<u32>,
    pub balance: Option<Amount>,
    pub low_limit: Option<Amount>,
    pub high_limit: Option<Amount>,
    pub low_node: Option<u64>,
    pub high_node: Option<u64>,
    pub low_quality_in: Option<u32>,
    pub low_quality_out: Option<u32>,
    pub high_quality_in: Option<u32>,
    pub high_quality_out: Option<u32>,
}

/// Offer snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OfferEntry {
    pub flags: Option<u32>,
    pub account: Option<AccountId>,
    pub sequence: Option<u32>,
    pub taker_pays: Option<Amount>,
    pub taker_gets: Option<Amount>,
    pub expiration: Option<u32>,
    pub book_directory: Option<Hash256>,
    pub book_node: Option<u64>,
    pub owner_node: Option<u64>,
}

/// Directory-node snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub root_index: Option<Hash256>,
    pub indexes: Option<Vec<Hash256>>,
    pub owner: Option<AccountId>,
    pub taker_pays_currency: Option<Currency>,
    pub taker_pays_issuer: Option<AccountId>,
    pub taker_gets_currency: Option<Currency>,
    pub taker_gets_issuer: Option<AccountId>,
    pub exchange_rate: Option<u64>,
    pub index_next: Option<u64>,
    pub index_previous: Option<u64>,
}

/// Fee-settings snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeSettingsEntry {
    pub flags: Option<u32>,
    pub base_fee: Option<u64>,
    pub reference_fee_units: Option<u32>,
    pub reserve_base: Option<u32>,
    pub reserve_increment: Option<u32>,
}

/// One ledger-entry snapshot, tagged by entry type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    AccountRoot(AccountRootEntry),
    TrustLine(TrustLineEntry),
    Offer(OfferEntry),
    Directory(DirectoryEntry),
    FeeSettings(FeeSettingsEntry),
}

impl Entry {
    /// Discriminant of this snapshot
    pub fn entry_type(&self) -> EntryType {
        match self {
            Entry::AccountRoot(_) => EntryType::AccountRoot,
            Entry::TrustLine(_) => EntryType::TrustLine,
            Entry::Offer(_) => EntryType::Offer,
            Entry::Directory(_) => EntryType::Directory,
            Entry::FeeSettings(_) => EntryType::FeeSettings,
        }
    }
}

/// One ledger entry created, modified or deleted by a transaction
///
/// Effects are ordered within their transaction; the store preserves that
/// order on read. Current and previous snapshots must share an entry type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryEffect {
    pub state: EntryState,

    /// Index of the entry in the state tree
    pub ledger_index: Hash256,

    /// Hash of the previous transaction to touch this entry
    pub previous_txn_id: Option<Hash256>,

    /// Snapshot after the transaction applied
    pub current: Entry,

    /// Snapshot before the transaction applied; sparse, carrying only the
    /// fields that changed
    pub previous: Entry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_codes_round_trip() {
        for t in [
            EntryType::AccountRoot,
            EntryType::TrustLine,
            EntryType::Offer,
            EntryType::Directory,
            EntryType::FeeSettings,
        ] {
            assert_eq!(EntryType::from_code(t.code()), Some(t));
        }
        assert_eq!(EntryType::from_code(0x70), None);
    }

    #[test]
    fn test_entry_state_codes() {
        assert_eq!(EntryState::from_code(1), Some(EntryState::Modified));
        assert_eq!(EntryState::from_code(3), None);
    }

    #[test]
    fn test_entry_discriminant() {
        let entry = Entry::Offer(OfferEntry::default());
        assert_eq!(entry.entry_type(), EntryType::Offer);
        assert_eq!(entry.entry_type().code(), 0x6f);
    }
}
