// Integration tests for the ledger-entry diff writer: effect ordering, the
// legacy column defaults, snapshot invariants, and write-unit atomicity.
// Raw rows are inspected through a second connection after the store closes.

mod common;

use chronicle_core::{Drops, Entry, TrustLineEntry};
use chronicle_store::{DictKind, Entity, StoreError};

fn tx_with_effects() -> chronicle_core::TransactionWithMeta {
    let mut txm = common::payment(1, 0, 0x01, 0x02);
    txm.meta.affected_entries = vec![common::account_root_effect(0x01), common::trust_line_effect()];
    txm
}

#[test]
fn test_effects_persist_in_position_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chronicle.db");
    {
        let mut store = chronicle_store::LedgerStore::open(&path).unwrap();
        store
            .insert(&Entity::Transaction(Box::new(tx_with_effects())))
            .unwrap();
    }

    let conn = rusqlite::Connection::open(&path).unwrap();
    let rows: Vec<(u32, u16, u8)> = conn
        .prepare("SELECT position, entry_type, entry_state FROM entry_effects ORDER BY position")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    // Account root at position 0, trust line at position 1, both modified
    assert_eq!(rows, vec![(0, 0x61, 1), (1, 0x72, 1)]);
}

#[test]
fn test_account_root_legacy_defaults_and_sparse_previous() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chronicle.db");
    {
        let mut store = chronicle_store::LedgerStore::open(&path).unwrap();
        store
            .insert(&Entity::Transaction(Box::new(tx_with_effects())))
            .unwrap();
    }

    let conn = rusqlite::Connection::open(&path).unwrap();
    let (flags, owner_count, previous_flags, balance, previous_balance): (
        u32,
        u32,
        Option<u32>,
        Vec<u8>,
        Vec<u8>,
    ) = conn
        .query_row(
            "SELECT flags, owner_count, previous_flags, balance, previous_balance \
             FROM account_roots WHERE position = 0",
            [],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            },
        )
        .unwrap();

    // Absent current flags and owner count store the legacy 0 default;
    // the absent previous flags stay NULL
    assert_eq!(flags, 0);
    assert_eq!(owner_count, 0);
    assert_eq!(previous_flags, None);
    assert_eq!(balance, Drops(997_000_000).to_bytes().to_vec());
    assert_eq!(previous_balance, Drops(1_000_000_000).to_bytes().to_vec());
}

#[test]
fn test_trust_line_snapshots_share_dictionary_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chronicle.db");
    {
        let mut store = chronicle_store::LedgerStore::open(&path).unwrap();
        store
            .insert(&Entity::Transaction(Box::new(tx_with_effects())))
            .unwrap();
    }

    let conn = rusqlite::Connection::open(&path).unwrap();
    let (currency, previous_currency): (u32, u32) = conn
        .query_row(
            "SELECT currency, previous_currency FROM trust_lines WHERE position = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    // Previous snapshots resolve through the same dictionary as current ones
    assert_eq!(currency, previous_currency);
}

#[test]
fn test_absent_invoice_stores_empty_bytes_not_null() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chronicle.db");
    {
        let mut store = chronicle_store::LedgerStore::open(&path).unwrap();
        store
            .insert(&Entity::Transaction(Box::new(common::payment(
                1, 0, 0x01, 0x02,
            ))))
            .unwrap();
    }

    let conn = rusqlite::Connection::open(&path).unwrap();
    let invoice: Vec<u8> = conn
        .query_row("SELECT invoice_id FROM payments", [], |row| row.get(0))
        .unwrap();
    assert!(invoice.is_empty());
}

#[test]
fn test_mismatched_snapshot_pair_rolls_back_the_unit() {
    let mut store = common::store();
    let mut txm = common::payment(1, 0, 0x01, 0x02);
    let mut effect = common::account_root_effect(0x01);
    effect.previous = Entry::TrustLine(TrustLineEntry::default());
    txm.meta.affected_entries = vec![effect];

    let err = store
        .insert(&Entity::Transaction(Box::new(txm.clone())))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InconsistentEntryType { position: 0, .. }
    ));

    // The envelope written before the failing effect is gone with the unit
    assert!(matches!(
        store.get(&txm.tx.common.hash),
        Err(StoreError::NotFound)
    ));
    // Dictionary ids minted inside the unit are forgotten too
    assert!(store.lookup_entries(DictKind::Account).unwrap().is_empty());
}

#[test]
fn test_trust_line_currency_mismatch_is_rejected() {
    let mut store = common::store();
    let mut txm = common::payment(1, 0, 0x01, 0x02);
    let mut effect = common::trust_line_effect();
    if let Entry::TrustLine(ref mut line) = effect.current {
        let mut high = common::usd(10_000);
        high.currency = chronicle_core::Currency::from_code("EUR").unwrap();
        line.high_limit = Some(high);
    }
    txm.meta.affected_entries = vec![effect];

    let err = store
        .insert(&Entity::Transaction(Box::new(txm)))
        .unwrap_err();
    assert!(matches!(err, StoreError::MalformedEntry { .. }));
}
