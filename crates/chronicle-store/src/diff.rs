//! Ledger-entry diff writer
//!
//! Persists the before/after snapshots a transaction's metadata records for
//! every ledger entry it touched: one shared envelope row per effect, then
//! one row in the entry type's variant table. Runs inside the transaction's
//! unit of work; a failure here rolls the whole ingestion back.
//!
//! Previous-snapshot bindings are rebuilt through the same codec as current
//! ones, so prior-state rows carry surrogate ids symmetrically.

use chronicle_core::{
    AccountRootEntry, DirectoryEntry, Entry, FeeSettingsEntry, OfferEntry, TransactionWithMeta,
    TrustLineEntry,
};
use rusqlite::{params, Transaction as SqlTx};

use crate::codec::{self, ResolvedAmount};
use crate::dict::Dictionaries;
use crate::errors::{Result, StoreError};
use crate::schema::Stmt;

/// Key of one effect row within its transaction
#[derive(Debug, Clone, Copy)]
struct EffectKey {
    ledger_sequence: u32,
    transaction_index: u32,
    position: u32,
}

/// Persist every ledger-entry effect of one transaction, in metadata order
pub fn write_effects(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    txm: &TransactionWithMeta,
) -> Result<()> {
    for (position, effect) in txm.meta.affected_entries.iter().enumerate() {
        let key = EffectKey {
            ledger_sequence: txm.ledger_sequence,
            transaction_index: txm.meta.transaction_index,
            position: position as u32,
        };

        Stmt::InsertEffect.prepare(tx)?.execute(params![
            key.ledger_sequence,
            key.transaction_index,
            key.position,
            effect.current.entry_type().code(),
            effect.state.code(),
            effect.ledger_index.as_bytes(),
            effect.previous_txn_id.as_ref().map(|h| h.as_bytes()),
        ])?;

        match (&effect.current, &effect.previous) {
            (Entry::AccountRoot(c), Entry::AccountRoot(p)) => {
                insert_account_root(tx, dicts, key, c, p)?
            }
            (Entry::TrustLine(c), Entry::TrustLine(p)) => insert_trust_line(tx, dicts, key, c, p)?,
            (Entry::Offer(c), Entry::Offer(p)) => insert_offer(tx, dicts, key, c, p)?,
            (Entry::Directory(c), Entry::Directory(p)) => insert_directory(tx, dicts, key, c, p)?,
            (Entry::FeeSettings(c), Entry::FeeSettings(p)) => insert_fee_settings(tx, key, c, p)?,
            (current, previous) => {
                return Err(StoreError::InconsistentEntryType {
                    position: key.position,
                    current: current.entry_type().name(),
                    previous: previous.entry_type().name(),
                })
            }
        }
    }
    Ok(())
}

fn insert_account_root(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    key: EffectKey,
    current: &AccountRootEntry,
    previous: &AccountRootEntry,
) -> Result<()> {
    let account = dicts.lookup_opt_account(tx, current.account.as_ref())?;
    let regular_key = dicts.lookup_opt_regular_key(tx, current.regular_key.as_ref())?;
    let previous_regular_key = dicts.lookup_opt_regular_key(tx, previous.regular_key.as_ref())?;

    Stmt::InsertAccountRoot.prepare(tx)?.execute(params![
        key.ledger_sequence,
        key.transaction_index,
        key.position,
        codec::flags_or_zero(current.flags),
        account,
        current.sequence,
        current.balance.map(|b| b.to_bytes().to_vec()),
        codec::count_or_zero(current.owner_count),
        regular_key,
        current.email_hash.as_ref().map(|h| h.as_bytes()),
        current.wallet_locator.as_ref().map(|h| h.as_bytes()),
        current.wallet_size,
        current.message_key,
        current.domain,
        current.transfer_rate,
        previous.flags,
        previous.sequence,
        previous.balance.map(|b| b.to_bytes().to_vec()),
        previous.owner_count,
        previous_regular_key,
        previous.email_hash.as_ref().map(|h| h.as_bytes()),
        previous.wallet_locator.as_ref().map(|h| h.as_bytes()),
        previous.wallet_size,
        previous.message_key,
        previous.domain,
        previous.transfer_rate,
    ])?;
    Ok(())
}

/// The balance and both limits of a trust line always share one currency
fn check_trust_line(position: u32, line: &TrustLineEntry) -> Result<()> {
    if let (Some(balance), Some(low), Some(high)) = (&line.balance, &line.low_limit, &line.high_limit)
    {
        if balance.currency != low.currency || balance.currency != high.currency {
            return Err(StoreError::MalformedEntry {
                position,
                reason: "trust line balance and limits disagree on currency".to_string(),
            });
        }
    }
    Ok(())
}

fn insert_trust_line(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    key: EffectKey,
    current: &TrustLineEntry,
    previous: &TrustLineEntry,
) -> Result<()> {
    check_trust_line(key.position, current)?;

    let balance = ResolvedAmount::resolve(current.balance.as_ref(), tx, dicts)?;
    let low_limit = ResolvedAmount::resolve(current.low_limit.as_ref(), tx, dicts)?;
    let high_limit = ResolvedAmount::resolve(current.high_limit.as_ref(), tx, dicts)?;
    let previous_balance = ResolvedAmount::resolve(previous.balance.as_ref(), tx, dicts)?;
    let previous_low_limit = ResolvedAmount::resolve(previous.low_limit.as_ref(), tx, dicts)?;
    let previous_high_limit = ResolvedAmount::resolve(previous.high_limit.as_ref(), tx, dicts)?;

    Stmt::InsertTrustLine.prepare(tx)?.execute(params![
        key.ledger_sequence,
        key.transaction_index,
        key.position,
        current.flags,
        balance.value,
        balance.currency,
        low_limit.value,
        low_limit.issuer,
        high_limit.value,
        high_limit.issuer,
        current.low_node,
        current.high_node,
        current.low_quality_in,
        current.low_quality_out,
        current.high_quality_in,
        current.high_quality_out,
        previous.flags,
        previous_balance.value,
        previous_balance.currency,
        previous_low_limit.value,
        previous_low_limit.issuer,
        previous_high_limit.value,
        previous_high_limit.issuer,
        previous.low_node,
        previous.high_node,
        previous.low_quality_in,
        previous.low_quality_out,
        previous.high_quality_in,
        previous.high_quality_out,
    ])?;
    Ok(())
}

fn insert_offer(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    key: EffectKey,
    current: &OfferEntry,
    previous: &OfferEntry,
) -> Result<()> {
    let account = dicts.lookup_opt_account(tx, current.account.as_ref())?;
    let taker_pays = ResolvedAmount::resolve(current.taker_pays.as_ref(), tx, dicts)?;
    let taker_gets = ResolvedAmount::resolve(current.taker_gets.as_ref(), tx, dicts)?;
    let previous_taker_pays = ResolvedAmount::resolve(previous.taker_pays.as_ref(), tx, dicts)?;
    let previous_taker_gets = ResolvedAmount::resolve(previous.taker_gets.as_ref(), tx, dicts)?;

    Stmt::InsertOfferEntry.prepare(tx)?.execute(params![
        key.ledger_sequence,
        key.transaction_index,
        key.position,
        codec::flags_or_zero(current.flags),
        account,
        current.sequence,
        taker_pays.value,
        taker_pays.currency,
        taker_pays.issuer,
        taker_gets.value,
        taker_gets.currency,
        taker_gets.issuer,
        current.expiration,
        current.book_directory.as_ref().map(|h| h.as_bytes()),
        current.book_node,
        current.owner_node,
        previous.flags,
        previous.sequence,
        previous_taker_pays.value,
        previous_taker_pays.currency,
        previous_taker_pays.issuer,
        previous_taker_gets.value,
        previous_taker_gets.currency,
        previous_taker_gets.issuer,
        previous.expiration,
        previous.book_directory.as_ref().map(|h| h.as_bytes()),
        previous.book_node,
        previous.owner_node,
    ])?;
    Ok(())
}

fn insert_directory(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    key: EffectKey,
    current: &DirectoryEntry,
    previous: &DirectoryEntry,
) -> Result<()> {
    let owner = dicts.lookup_opt_account(tx, current.owner.as_ref())?;
    let taker_pays_currency = dicts.lookup_opt_currency(tx, current.taker_pays_currency.as_ref())?;
    let taker_pays_issuer = dicts.lookup_opt_account(tx, current.taker_pays_issuer.as_ref())?;
    let taker_gets_currency = dicts.lookup_opt_currency(tx, current.taker_gets_currency.as_ref())?;
    let taker_gets_issuer = dicts.lookup_opt_account(tx, current.taker_gets_issuer.as_ref())?;
    let previous_owner = dicts.lookup_opt_account(tx, previous.owner.as_ref())?;
    let previous_taker_pays_currency =
        dicts.lookup_opt_currency(tx, previous.taker_pays_currency.as_ref())?;
    let previous_taker_pays_issuer =
        dicts.lookup_opt_account(tx, previous.taker_pays_issuer.as_ref())?;
    let previous_taker_gets_currency =
        dicts.lookup_opt_currency(tx, previous.taker_gets_currency.as_ref())?;
    let previous_taker_gets_issuer =
        dicts.lookup_opt_account(tx, previous.taker_gets_issuer.as_ref())?;

    Stmt::InsertDirectory.prepare(tx)?.execute(params![
        key.ledger_sequence,
        key.transaction_index,
        key.position,
        current.root_index.as_ref().map(|h| h.as_bytes()),
        codec::indexes_blob(current.indexes.as_ref()),
        owner,
        taker_pays_currency,
        taker_pays_issuer,
        taker_gets_currency,
        taker_gets_issuer,
        codec::u64_blob(current.exchange_rate),
        current.index_next,
        current.index_previous,
        previous.root_index.as_ref().map(|h| h.as_bytes()),
        codec::indexes_blob(previous.indexes.as_ref()),
        previous_owner,
        previous_taker_pays_currency,
        previous_taker_pays_issuer,
        previous_taker_gets_currency,
        previous_taker_gets_issuer,
        codec::u64_blob(previous.exchange_rate),
        previous.index_next,
        previous.index_previous,
    ])?;
    Ok(())
}

fn insert_fee_settings(
    tx: &SqlTx<'_>,
    key: EffectKey,
    current: &FeeSettingsEntry,
    previous: &FeeSettingsEntry,
) -> Result<()> {
    Stmt::InsertFeeSettings.prepare(tx)?.execute(params![
        key.ledger_sequence,
        key.transaction_index,
        key.position,
        codec::flags_or_zero(current.flags),
        current.base_fee,
        current.reference_fee_units,
        current.reserve_base,
        current.reserve_increment,
        codec::flags_or_zero(previous.flags),
        previous.base_fee,
        previous.reference_fee_units,
        previous.reserve_base,
        previous.reserve_increment,
    ])?;
    Ok(())
}
