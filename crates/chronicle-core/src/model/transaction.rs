//! Transactions: the shared envelope and its payload variants
//!
//! Every transaction carries the same envelope; exactly one payload variant
//! holds the operation-specific fields. The payload set is closed: adding a
//! variant is a compile-time-visible change to [`TxPayload`] and every match
//! over it.

use serde::{Deserialize, Serialize};

use super::amount::Amount;
use super::entry::EntryEffect;
use super::primitives::{AccountId, Currency, Drops, Hash128, Hash256, PublicKey, RegularKey};
use super::time::LedgerTime;

/// Transaction type discriminant
///
/// Codes are the wire-level discriminants; names double as the view-table
/// naming scheme in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    Payment,
    AccountSet,
    SetRegularKey,
    OfferCreate,
    OfferCancel,
    TrustSet,
    Amendment,
    SetFee,
}

impl TxType {
    /// Every known transaction type, in code order
    pub const ALL: [TxType; 8] = [
        TxType::Payment,
        TxType::AccountSet,
        TxType::SetRegularKey,
        TxType::OfferCreate,
        TxType::OfferCancel,
        TxType::TrustSet,
        TxType::Amendment,
        TxType::SetFee,
    ];

    /// Wire-level discriminant code
    pub fn code(self) -> u16 {
        match self {
            TxType::Payment => 0,
            TxType::AccountSet => 3,
            TxType::SetRegularKey => 5,
            TxType::OfferCreate => 7,
            TxType::OfferCancel => 8,
            TxType::TrustSet => 20,
            TxType::Amendment => 100,
            TxType::SetFee => 101,
        }
    }

    /// Decode a wire-level discriminant
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            TxType::Payment => "Payment",
            TxType::AccountSet => "AccountSet",
            TxType::SetRegularKey => "SetRegularKey",
            TxType::OfferCreate => "OfferCreate",
            TxType::OfferCancel => "OfferCancel",
            TxType::TrustSet => "TrustSet",
            TxType::Amendment => "Amendment",
            TxType::SetFee => "SetFee",
        }
    }

    /// Parse a query-parameter value; matching is case-insensitive
    pub fn from_param(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name().to_ascii_lowercase() == lower)
    }
}

/// One memo attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Memo {
    pub memo_type: Option<Vec<u8>>,
    pub memo_data: Option<Vec<u8>>,
}

/// One step of a payment path
///
/// Each field is independently optional; a step names an account to route
/// through, a currency to convert into, an issuer, or a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathStep {
    pub account: Option<AccountId>,
    pub currency: Option<Currency>,
    pub issuer: Option<AccountId>,
}

/// Fields shared by every transaction regardless of payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxCommon {
    /// Sending account
    pub account: AccountId,

    /// Account sequence number
    pub sequence: u32,

    /// Transaction flags
    pub flags: Option<u32>,

    /// Arbitrary sender-supplied tag
    pub source_tag: Option<u32>,

    /// Fee in native drops
    pub fee: Drops,

    /// Last ledger this transaction may appear in
    pub last_ledger_sequence: Option<u32>,

    /// Signing public key; absent for pseudo-transactions
    pub signing_pub_key: Option<PublicKey>,

    /// Signature blob; absent for pseudo-transactions
    pub txn_signature: Option<Vec<u8>>,

    /// Ordered memo list
    pub memos: Vec<Memo>,

    /// Transaction hash, supplied by the wire layer
    pub hash: Hash256,
}

/// Payment of an amount to a destination, optionally along paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub destination: AccountId,
    pub amount: Amount,
    pub send_max: Option<Amount>,
    pub destination_tag: Option<u32>,
    pub invoice_id: Option<Hash256>,
    /// Path sets in wire order; inner vectors are steps in traversal order
    pub paths: Vec<Vec<PathStep>>,
}

/// Offer placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCreate {
    pub offer_sequence: Option<u32>,
    pub taker_pays: Amount,
    pub taker_gets: Amount,
    pub expiration: Option<u32>,
}

/// Offer cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCancel {
    pub offer_sequence: u32,
}

/// Account settings change
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountSet {
    pub email_hash: Option<Hash128>,
    pub wallet_locator: Option<Hash256>,
    pub wallet_size: Option<u32>,
    pub message_key: Option<Vec<u8>>,
    pub domain: Option<Vec<u8>>,
    pub transfer_rate: Option<u32>,
    pub set_flag: Option<u32>,
    pub clear_flag: Option<u32>,
}

/// Regular-key assignment; clearing the key leaves the field absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetRegularKey {
    pub regular_key: Option<RegularKey>,
}

/// Trust-line limit change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustSet {
    pub limit_amount: Amount,
    pub quality_in: Option<u32>,
    pub quality_out: Option<u32>,
}

/// Network fee schedule change (pseudo-transaction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetFee {
    pub base_fee: u64,
    pub reference_fee_units: u32,
    pub reserve_base: u32,
    pub reserve_increment: u32,
}

/// Amendment activation (pseudo-transaction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amendment {
    pub amendment: Hash256,
}

/// The operation-specific half of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPayload {
    Payment(Payment),
    AccountSet(AccountSet),
    SetRegularKey(SetRegularKey),
    OfferCreate(OfferCreate),
    OfferCancel(OfferCancel),
    TrustSet(TrustSet),
    Amendment(Amendment),
    SetFee(SetFee),
}

impl TxPayload {
    /// Discriminant of this payload
    pub fn tx_type(&self) -> TxType {
        match self {
            TxPayload::Payment(_) => TxType::Payment,
            TxPayload::AccountSet(_) => TxType::AccountSet,
            TxPayload::SetRegularKey(_) => TxType::SetRegularKey,
            TxPayload::OfferCreate(_) => TxType::OfferCreate,
            TxPayload::OfferCancel(_) => TxType::OfferCancel,
            TxPayload::TrustSet(_) => TxType::TrustSet,
            TxPayload::Amendment(_) => TxType::Amendment,
            TxPayload::SetFee(_) => TxType::SetFee,
        }
    }
}

/// A complete transaction: shared envelope plus exactly one payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub common: TxCommon,
    pub payload: TxPayload,
}

impl Transaction {
    /// Discriminant of this transaction's payload
    pub fn tx_type(&self) -> TxType {
        self.payload.tx_type()
    }
}

/// Execution metadata attached to a validated transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMeta {
    /// Position of the transaction within its ledger
    pub transaction_index: u32,

    /// Engine result code
    pub transaction_result: u8,

    /// Amount actually delivered by a payment, when it differs from the
    /// requested amount
    pub delivered_amount: Option<Amount>,

    /// Ledger entries this transaction created, modified or deleted, in
    /// application order
    pub affected_entries: Vec<EntryEffect>,
}

/// A validated transaction in the context of its ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithMeta {
    /// Ledger this transaction was validated in
    pub ledger_sequence: u32,

    /// Close time of that ledger; zero when not yet known
    pub close_time: LedgerTime,

    pub tx: Transaction,
    pub meta: TransactionMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_type_codes_round_trip() {
        for t in TxType::ALL {
            assert_eq!(TxType::from_code(t.code()), Some(t));
        }
        assert_eq!(TxType::from_code(9999), None);
    }

    #[test]
    fn test_tx_type_from_param() {
        assert_eq!(TxType::from_param("payment"), Some(TxType::Payment));
        assert_eq!(TxType::from_param("OFFERCREATE"), Some(TxType::OfferCreate));
        assert_eq!(TxType::from_param("SetRegularKey"), Some(TxType::SetRegularKey));
        assert_eq!(TxType::from_param("escrow"), None);
    }

    #[test]
    fn test_payload_discriminant() {
        let payload = TxPayload::OfferCancel(OfferCancel { offer_sequence: 5 });
        assert_eq!(payload.tx_type(), TxType::OfferCancel);
        assert_eq!(payload.tx_type().code(), 8);
    }
}
