// Integration tests for the surrogate dictionaries: idempotent lookup,
// reverse lookup, administrative inserts, substring search, persistence
// across reopen.

mod common;

use chronicle_core::AccountId;
use chronicle_store::{DictKind, Entity, LookupEntry, StoreError};

#[test]
fn test_ingestion_populates_dictionaries() {
    let mut store = common::store();
    store
        .insert(&Entity::Transaction(Box::new(common::payment(
            1, 0, 0x01, 0x02,
        ))))
        .unwrap();

    let accounts = store.lookup_entries(DictKind::Account).unwrap();
    // Sender, destination, and the amount issuer
    assert_eq!(accounts.len(), 3);
    assert!(accounts.iter().all(|e| e.human == hex::encode(&e.value)));

    let currencies = store.lookup_entries(DictKind::Currency).unwrap();
    assert_eq!(currencies.len(), 1);
    assert_eq!(currencies[0].human, "USD");

    assert_eq!(store.lookup_entries(DictKind::PublicKey).unwrap().len(), 1);
}

#[test]
fn test_lookup_is_idempotent() {
    let mut store = common::store();
    // Two payments sharing every identifier
    store
        .insert(&Entity::Transaction(Box::new(common::payment(
            1, 0, 0x01, 0x02,
        ))))
        .unwrap();
    store
        .insert(&Entity::Transaction(Box::new(common::payment(
            2, 0, 0x01, 0x02,
        ))))
        .unwrap();

    assert_eq!(store.lookup_entries(DictKind::Account).unwrap().len(), 3);
    assert_eq!(store.lookup_entries(DictKind::Currency).unwrap().len(), 1);
}

#[test]
fn test_reverse_lookup_returns_original_value() {
    let mut store = common::store();
    store
        .insert(&Entity::Transaction(Box::new(common::payment(
            1, 0, 0x01, 0x02,
        ))))
        .unwrap();

    for entry in store.lookup_entries(DictKind::Account).unwrap() {
        let value = store.account_value(entry.id).expect("id resolves");
        assert_eq!(value.as_bytes(), &entry.value[..]);
    }
    assert_eq!(store.account_value(999), None);
}

#[test]
fn test_admin_insert_and_conflict() {
    let mut store = common::store();
    let entry = LookupEntry {
        id: 3,
        value: vec![0xAB; 20],
        human: hex::encode([0xAB; 20]),
    };
    store
        .insert_lookup_entry(DictKind::Account, &entry)
        .unwrap();
    // Identical re-insert is idempotent
    store
        .insert_lookup_entry(DictKind::Account, &entry)
        .unwrap();

    // Same value under a different id conflicts
    let clash = LookupEntry {
        id: 4,
        value: vec![0xAB; 20],
        human: hex::encode([0xAB; 20]),
    };
    let err = store
        .insert_lookup_entry(DictKind::Account, &clash)
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEntity { .. }));

    // Fresh ids mint above the administrative one
    store
        .insert(&Entity::Transaction(Box::new(common::payment(
            1, 0, 0x01, 0x02,
        ))))
        .unwrap();
    let accounts = store.lookup_entries(DictKind::Account).unwrap();
    assert!(accounts.iter().all(|e| e.id == 3 || e.id > 3));
}

#[test]
fn test_search_accounts_substring_and_cap() {
    let mut store = common::store();
    for n in 0..12u8 {
        let mut value = [0x30u8; 20];
        value[19] = n;
        store
            .insert_lookup_entry(
                DictKind::Account,
                &LookupEntry {
                    id: u32::from(n),
                    value: value.to_vec(),
                    human: hex::encode(value),
                },
            )
            .unwrap();
    }

    // All twelve share the "3030" prefix but at most 10 come back
    let matches = store.search_accounts("3030").unwrap();
    assert_eq!(matches.len(), 10);
    let mut sorted = matches.clone();
    sorted.sort();
    assert_eq!(matches, sorted, "ordered by human form");

    assert!(store.search_accounts("ffff").unwrap().is_empty());
}

#[test]
fn test_dictionary_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chronicle.db");

    let sender = AccountId([0x01; 20]);
    let original_id;
    {
        let mut store = chronicle_store::LedgerStore::open(&path).unwrap();
        store
            .insert(&Entity::Transaction(Box::new(common::payment(
                1, 0, 0x01, 0x02,
            ))))
            .unwrap();
        original_id = store
            .lookup_entries(DictKind::Account)
            .unwrap()
            .iter()
            .find(|e| e.value == sender.as_bytes())
            .unwrap()
            .id;
    }

    let mut reopened = chronicle_store::LedgerStore::open(&path).unwrap();
    // Same account in a new transaction reuses the persisted id
    reopened
        .insert(&Entity::Transaction(Box::new(common::payment(
            2, 0, 0x01, 0x05,
        ))))
        .unwrap();
    let entries = reopened.lookup_entries(DictKind::Account).unwrap();
    let found = entries
        .iter()
        .find(|e| e.value == sender.as_bytes())
        .unwrap();
    assert_eq!(found.id, original_id);
}
