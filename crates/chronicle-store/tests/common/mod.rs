//! Shared fixture builders for the integration suites

#![allow(dead_code)]

use chronicle_core::{
    AccountId, AccountRootEntry, AccountSet, Amendment, Amount, Currency, Drops, Entry,
    EntryEffect, EntryState, Hash256, Ledger, LedgerTime, Memo, OfferCancel, OfferCreate,
    PathStep, Payment, PublicKey, SetFee, SetRegularKey, Transaction, TransactionMeta,
    TransactionWithMeta, TrustLineEntry, TrustSet, TxCommon, TxPayload,
};
use chronicle_store::LedgerStore;

pub fn store() -> LedgerStore {
    LedgerStore::open_in_memory().expect("in-memory store opens")
}

pub fn hash256(n: u8) -> Hash256 {
    Hash256([n; 32])
}

pub fn account(n: u8) -> AccountId {
    AccountId([n; 20])
}

pub fn usd(value: u64) -> Amount {
    Amount {
        value: Drops(value),
        currency: Currency::from_code("USD").unwrap(),
        issuer: account(0xEE),
    }
}

pub fn native(value: u64) -> Amount {
    Amount::native(value)
}

/// A ledger header whose hash encodes its sequence, so hashes stay unique
pub fn ledger(sequence: u32) -> Ledger {
    let mut hash = [0u8; 32];
    hash[0] = 0x10;
    hash[28..].copy_from_slice(&sequence.to_be_bytes());
    Ledger {
        sequence,
        total_coins: 99_999_999_999,
        previous_ledger: hash256(0x0A),
        transaction_hash: hash256(0x0B),
        state_hash: hash256(0x0C),
        parent_close_time: LedgerTime(500_000_000),
        close_time: LedgerTime(500_000_000 + sequence),
        close_resolution: 10,
        close_flags: 0,
        hash: Hash256(hash),
    }
}

/// A transaction hash that encodes its ledger position, so hashes stay unique
pub fn tx_hash(ledger_sequence: u32, transaction_index: u32) -> Hash256 {
    let mut hash = [0u8; 32];
    hash[0] = 0x20;
    hash[24..28].copy_from_slice(&ledger_sequence.to_be_bytes());
    hash[28..].copy_from_slice(&transaction_index.to_be_bytes());
    Hash256(hash)
}

pub fn common(sender: AccountId, ledger_sequence: u32, transaction_index: u32) -> TxCommon {
    TxCommon {
        account: sender,
        sequence: 7,
        flags: Some(0x8000_0000),
        source_tag: None,
        fee: Drops(12),
        last_ledger_sequence: Some(ledger_sequence + 4),
        signing_pub_key: Some(PublicKey([0x99; 33])),
        txn_signature: Some(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        memos: Vec::new(),
        hash: tx_hash(ledger_sequence, transaction_index),
    }
}

pub fn with_meta(
    ledger_sequence: u32,
    transaction_index: u32,
    tx: Transaction,
) -> TransactionWithMeta {
    TransactionWithMeta {
        ledger_sequence,
        close_time: LedgerTime(0),
        tx,
        meta: TransactionMeta {
            transaction_index,
            transaction_result: 0,
            delivered_amount: None,
            affected_entries: Vec::new(),
        },
    }
}

pub fn payment(
    ledger_sequence: u32,
    transaction_index: u32,
    sender: u8,
    destination: u8,
) -> TransactionWithMeta {
    let tx = Transaction {
        common: common(account(sender), ledger_sequence, transaction_index),
        payload: TxPayload::Payment(Payment {
            destination: account(destination),
            amount: usd(2_500),
            send_max: None,
            destination_tag: None,
            invoice_id: None,
            paths: Vec::new(),
        }),
    };
    with_meta(ledger_sequence, transaction_index, tx)
}

/// A payment with a two-set path list and two memos, for the child-row
/// round-trip scenarios
pub fn payment_with_paths(
    ledger_sequence: u32,
    transaction_index: u32,
    sender: u8,
    destination: u8,
) -> TransactionWithMeta {
    let mut txm = payment(ledger_sequence, transaction_index, sender, destination);
    txm.tx.common.memos = vec![
        Memo {
            memo_type: Some(b"text/plain".to_vec()),
            memo_data: Some(b"invoice 42".to_vec()),
        },
        Memo {
            memo_type: None,
            memo_data: Some(b"second".to_vec()),
        },
    ];
    if let TxPayload::Payment(ref mut p) = txm.tx.payload {
        p.send_max = Some(native(3_000));
        p.invoice_id = Some(hash256(0x42));
        p.paths = vec![
            vec![
                PathStep {
                    account: Some(account(0xA1)),
                    currency: None,
                    issuer: None,
                },
                PathStep {
                    account: None,
                    currency: Some(Currency::from_code("EUR").unwrap()),
                    issuer: Some(account(0xA2)),
                },
            ],
            vec![PathStep {
                account: Some(account(0xA3)),
                currency: None,
                issuer: None,
            }],
        ];
    }
    txm.meta.delivered_amount = Some(usd(2_400));
    txm
}

pub fn offer_create(
    ledger_sequence: u32,
    transaction_index: u32,
    sender: u8,
) -> TransactionWithMeta {
    let tx = Transaction {
        common: common(account(sender), ledger_sequence, transaction_index),
        payload: TxPayload::OfferCreate(OfferCreate {
            offer_sequence: None,
            taker_pays: usd(100),
            taker_gets: native(50_000_000),
            expiration: Some(600_000_000),
        }),
    };
    with_meta(ledger_sequence, transaction_index, tx)
}

pub fn offer_cancel(
    ledger_sequence: u32,
    transaction_index: u32,
    sender: u8,
) -> TransactionWithMeta {
    let tx = Transaction {
        common: common(account(sender), ledger_sequence, transaction_index),
        payload: TxPayload::OfferCancel(OfferCancel { offer_sequence: 11 }),
    };
    with_meta(ledger_sequence, transaction_index, tx)
}

pub fn trust_set(ledger_sequence: u32, transaction_index: u32, sender: u8) -> TransactionWithMeta {
    let tx = Transaction {
        common: common(account(sender), ledger_sequence, transaction_index),
        payload: TxPayload::TrustSet(TrustSet {
            limit_amount: usd(1_000_000),
            quality_in: None,
            quality_out: Some(1_000),
        }),
    };
    with_meta(ledger_sequence, transaction_index, tx)
}

pub fn account_set(
    ledger_sequence: u32,
    transaction_index: u32,
    sender: u8,
) -> TransactionWithMeta {
    let tx = Transaction {
        common: common(account(sender), ledger_sequence, transaction_index),
        payload: TxPayload::AccountSet(AccountSet {
            domain: Some(b"example.com".to_vec()),
            transfer_rate: Some(1_002_000_000),
            ..AccountSet::default()
        }),
    };
    with_meta(ledger_sequence, transaction_index, tx)
}

pub fn set_regular_key(
    ledger_sequence: u32,
    transaction_index: u32,
    sender: u8,
) -> TransactionWithMeta {
    let tx = Transaction {
        common: common(account(sender), ledger_sequence, transaction_index),
        payload: TxPayload::SetRegularKey(SetRegularKey {
            regular_key: Some(chronicle_core::RegularKey([0x77; 20])),
        }),
    };
    with_meta(ledger_sequence, transaction_index, tx)
}

pub fn set_fee(ledger_sequence: u32, transaction_index: u32, sender: u8) -> TransactionWithMeta {
    let tx = Transaction {
        common: common(account(sender), ledger_sequence, transaction_index),
        payload: TxPayload::SetFee(SetFee {
            base_fee: 10,
            reference_fee_units: 10,
            reserve_base: 20_000_000,
            reserve_increment: 5_000_000,
        }),
    };
    with_meta(ledger_sequence, transaction_index, tx)
}

pub fn amendment(ledger_sequence: u32, transaction_index: u32, sender: u8) -> TransactionWithMeta {
    let tx = Transaction {
        common: common(account(sender), ledger_sequence, transaction_index),
        payload: TxPayload::Amendment(Amendment {
            amendment: hash256(0x55),
        }),
    };
    with_meta(ledger_sequence, transaction_index, tx)
}

/// A modified account-root effect: flags absent on the current side, balance
/// changed against the previous snapshot
pub fn account_root_effect(owner: u8) -> EntryEffect {
    EntryEffect {
        state: EntryState::Modified,
        ledger_index: hash256(0xD0),
        previous_txn_id: Some(hash256(0xD1)),
        current: Entry::AccountRoot(AccountRootEntry {
            flags: None,
            account: Some(account(owner)),
            sequence: Some(8),
            balance: Some(Drops(997_000_000)),
            owner_count: None,
            ..AccountRootEntry::default()
        }),
        previous: Entry::AccountRoot(AccountRootEntry {
            balance: Some(Drops(1_000_000_000)),
            sequence: Some(7),
            ..AccountRootEntry::default()
        }),
    }
}

/// A modified trust-line effect with consistent currencies
pub fn trust_line_effect() -> EntryEffect {
    EntryEffect {
        state: EntryState::Modified,
        ledger_index: hash256(0xD2),
        previous_txn_id: None,
        current: Entry::TrustLine(TrustLineEntry {
            flags: Some(0x0001_0000),
            balance: Some(usd(500)),
            low_limit: Some(usd(0)),
            high_limit: Some(usd(10_000)),
            ..TrustLineEntry::default()
        }),
        previous: Entry::TrustLine(TrustLineEntry {
            balance: Some(usd(750)),
            ..TrustLineEntry::default()
        }),
    }
}
