//! Polymorphic record mapper
//!
//! Bridges the variant-typed domain model onto the normalized schema. Writes
//! append a variant-specific column suffix to the shared envelope prefix;
//! reads consume a variant view's columns back into the typed union. Both
//! directions dispatch on the closed payload enum, so an added variant is a
//! compile-time omission in every match below, not a runtime default case.

use chronicle_core::{
    AccountSet, Amendment, Amount, Ledger, LedgerTime, Memo, OfferCancel, OfferCreate, PathStep,
    Payment, SetFee, SetRegularKey, Transaction, TransactionMeta, TransactionWithMeta, TrustSet,
    TxCommon, TxPayload, TxType,
};
use rusqlite::{params, Connection, Row, Transaction as SqlTx};

use crate::codec::{self, ResolvedAmount};
use crate::dict::Dictionaries;
use crate::diff;
use crate::errors::{Result, StoreError};
use crate::query::TransactionRow;
use crate::schema::Stmt;

/// Index of the first variant-specific column in every variant view; columns
/// 0..15 are the shared envelope prefix delivered by tx_view
const VARIANT_BASE: usize = 15;

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

/// Persist one ledger header
pub fn insert_ledger(tx: &SqlTx<'_>, ledger: &Ledger) -> Result<()> {
    Stmt::InsertLedger.prepare(tx)?.execute(params![
        ledger.sequence,
        ledger.total_coins,
        ledger.previous_ledger.as_bytes(),
        ledger.transaction_hash.as_bytes(),
        ledger.state_hash.as_bytes(),
        ledger.parent_close_time.0,
        ledger.close_time.0,
        ledger.close_resolution,
        ledger.close_flags,
        ledger.hash.as_bytes(),
    ])?;
    Ok(())
}

/// Persist one transaction: envelope, memos, entry effects, then the
/// variant payload with its child rows
pub fn insert_transaction(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    txm: &TransactionWithMeta,
) -> Result<()> {
    let common = &txm.tx.common;
    let account = dicts.lookup_account(tx, &common.account)?;
    let signing_key = dicts.lookup_opt_public_key(tx, common.signing_pub_key.as_ref())?;

    Stmt::InsertTx.prepare(tx)?.execute(params![
        txm.ledger_sequence,
        txm.meta.transaction_index,
        txm.meta.transaction_result,
        txm.tx.tx_type().code(),
        common.flags,
        common.source_tag,
        account,
        common.sequence,
        common.last_ledger_sequence,
        common.fee.to_bytes().to_vec(),
        signing_key,
        common.txn_signature,
        common.hash.as_bytes(),
    ])?;

    for (position, memo) in common.memos.iter().enumerate() {
        Stmt::InsertMemo.prepare(tx)?.execute(params![
            txm.ledger_sequence,
            txm.meta.transaction_index,
            position as u32,
            memo.memo_type,
            memo.memo_data,
        ])?;
    }

    diff::write_effects(tx, dicts, txm)?;

    match &txm.tx.payload {
        TxPayload::Payment(p) => insert_payment(tx, dicts, txm, p),
        TxPayload::AccountSet(a) => insert_account_set(tx, txm, a),
        TxPayload::SetRegularKey(k) => insert_set_regular_key(tx, dicts, txm, k),
        TxPayload::OfferCreate(o) => insert_offer_create(tx, dicts, txm, o),
        TxPayload::OfferCancel(o) => insert_offer_cancel(tx, txm, o),
        TxPayload::TrustSet(t) => insert_trust_set(tx, dicts, txm, t),
        TxPayload::Amendment(a) => insert_amendment(tx, txm, a),
        TxPayload::SetFee(f) => insert_set_fee(tx, txm, f),
    }
}

fn insert_payment(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    txm: &TransactionWithMeta,
    payment: &Payment,
) -> Result<()> {
    let destination = dicts.lookup_account(tx, &payment.destination)?;
    let amount = ResolvedAmount::resolve(Some(&payment.amount), tx, dicts)?;
    let delivered = ResolvedAmount::resolve(txm.meta.delivered_amount.as_ref(), tx, dicts)?;
    let send_max = ResolvedAmount::resolve(payment.send_max.as_ref(), tx, dicts)?;

    Stmt::InsertPayment.prepare(tx)?.execute(params![
        txm.ledger_sequence,
        txm.meta.transaction_index,
        destination,
        amount.value,
        amount.currency,
        amount.issuer,
        delivered.value,
        delivered.currency,
        delivered.issuer,
        send_max.value,
        send_max.currency,
        send_max.issuer,
        payment.destination_tag,
        codec::invoice_or_empty(payment.invoice_id.as_ref()),
    ])?;

    for (path_set, path) in payment.paths.iter().enumerate() {
        for (position, step) in path.iter().enumerate() {
            let account = dicts.lookup_opt_account(tx, step.account.as_ref())?;
            let currency = dicts.lookup_opt_currency(tx, step.currency.as_ref())?;
            let issuer = dicts.lookup_opt_account(tx, step.issuer.as_ref())?;
            Stmt::InsertPath.prepare(tx)?.execute(params![
                txm.ledger_sequence,
                txm.meta.transaction_index,
                path_set as u32,
                position as u32,
                account,
                currency,
                issuer,
            ])?;
        }
    }
    Ok(())
}

fn insert_account_set(
    tx: &SqlTx<'_>,
    txm: &TransactionWithMeta,
    account_set: &AccountSet,
) -> Result<()> {
    Stmt::InsertAccountSet.prepare(tx)?.execute(params![
        txm.ledger_sequence,
        txm.meta.transaction_index,
        account_set.email_hash.as_ref().map(|h| h.as_bytes()),
        account_set.wallet_locator.as_ref().map(|h| h.as_bytes()),
        account_set.wallet_size,
        account_set.message_key,
        account_set.domain,
        account_set.transfer_rate,
        account_set.set_flag,
        account_set.clear_flag,
    ])?;
    Ok(())
}

fn insert_set_regular_key(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    txm: &TransactionWithMeta,
    key_set: &SetRegularKey,
) -> Result<()> {
    let regular_key = dicts.lookup_opt_regular_key(tx, key_set.regular_key.as_ref())?;
    Stmt::InsertSetRegularKey.prepare(tx)?.execute(params![
        txm.ledger_sequence,
        txm.meta.transaction_index,
        regular_key,
    ])?;
    Ok(())
}

fn insert_offer_create(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    txm: &TransactionWithMeta,
    offer: &OfferCreate,
) -> Result<()> {
    let taker_pays = ResolvedAmount::resolve(Some(&offer.taker_pays), tx, dicts)?;
    let taker_gets = ResolvedAmount::resolve(Some(&offer.taker_gets), tx, dicts)?;
    Stmt::InsertOfferCreate.prepare(tx)?.execute(params![
        txm.ledger_sequence,
        txm.meta.transaction_index,
        offer.offer_sequence,
        taker_pays.value,
        taker_pays.currency,
        taker_pays.issuer,
        taker_gets.value,
        taker_gets.currency,
        taker_gets.issuer,
        offer.expiration,
    ])?;
    Ok(())
}

fn insert_offer_cancel(
    tx: &SqlTx<'_>,
    txm: &TransactionWithMeta,
    offer: &OfferCancel,
) -> Result<()> {
    Stmt::InsertOfferCancel.prepare(tx)?.execute(params![
        txm.ledger_sequence,
        txm.meta.transaction_index,
        offer.offer_sequence,
    ])?;
    Ok(())
}

fn insert_trust_set(
    tx: &SqlTx<'_>,
    dicts: &mut Dictionaries,
    txm: &TransactionWithMeta,
    trust_set: &TrustSet,
) -> Result<()> {
    let limit = ResolvedAmount::resolve(Some(&trust_set.limit_amount), tx, dicts)?;
    Stmt::InsertTrustSet.prepare(tx)?.execute(params![
        txm.ledger_sequence,
        txm.meta.transaction_index,
        limit.value,
        limit.currency,
        limit.issuer,
        trust_set.quality_in,
        trust_set.quality_out,
    ])?;
    Ok(())
}

fn insert_amendment(
    tx: &SqlTx<'_>,
    txm: &TransactionWithMeta,
    amendment: &Amendment,
) -> Result<()> {
    Stmt::InsertAmendment.prepare(tx)?.execute(params![
        txm.ledger_sequence,
        txm.meta.transaction_index,
        amendment.amendment.as_bytes(),
    ])?;
    Ok(())
}

fn insert_set_fee(tx: &SqlTx<'_>, txm: &TransactionWithMeta, set_fee: &SetFee) -> Result<()> {
    Stmt::InsertSetFee.prepare(tx)?.execute(params![
        txm.ledger_sequence,
        txm.meta.transaction_index,
        set_fee.base_fee,
        set_fee.reference_fee_units,
        set_fee.reserve_base,
        set_fee.reserve_increment,
    ])?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Decode one `ledgers` row
pub fn read_ledger_row(row: &Row<'_>) -> Result<Ledger> {
    Ok(Ledger {
        sequence: row.get(0)?,
        total_coins: row.get(1)?,
        previous_ledger: codec::col_hash256(row, 2, "previous_ledger")?,
        transaction_hash: codec::col_hash256(row, 3, "transaction_hash")?,
        state_hash: codec::col_hash256(row, 4, "state_hash")?,
        parent_close_time: LedgerTime(row.get(5)?),
        close_time: LedgerTime(row.get(6)?),
        close_resolution: row.get(7)?,
        close_flags: row.get(8)?,
        hash: codec::col_hash256(row, 9, "hash")?,
    })
}

/// Decode one variant-view row back into a typed transaction
///
/// The caller names the variant the view belongs to; the stored discriminant
/// is checked against it. Memo and path child rows are re-read so the
/// reconstructed transaction carries its full list structure.
pub fn read_tx_row(
    conn: &Connection,
    dicts: &Dictionaries,
    tx_type: TxType,
    row: &Row<'_>,
) -> Result<TransactionRow> {
    let ledger_sequence: u32 = row.get(0)?;
    let close_time: u32 = row.get(1)?;
    let transaction_index: u32 = row.get(2)?;
    let transaction_result: u8 = row.get(3)?;

    let type_code: u16 = row.get(4)?;
    if TxType::from_code(type_code) != Some(tx_type) {
        return Err(StoreError::UnsupportedVariant {
            kind: "transaction type",
            code: u32::from(type_code),
        });
    }

    let flags: Option<u32> = row.get(5)?;
    let source_tag: Option<u32> = row.get(6)?;
    let account_id: u32 = row.get(7)?;
    let account = codec::col_account(row, 8, "account_raw")?;
    let sequence: u32 = row.get(9)?;
    let last_ledger_sequence: Option<u32> = row.get(10)?;
    let fee = codec::col_drops(row, 11, "fee")?;
    let signing_pub_key = codec::col_opt_public_key(row, 12, "signing_pub_key")?;
    let txn_signature: Option<Vec<u8>> = row.get(13)?;
    let hash = codec::col_hash256(row, 14, "hash")?;

    let memos = load_memos(conn, ledger_sequence, transaction_index)?;
    let (payload, delivered_amount) =
        read_variant(conn, dicts, tx_type, row, ledger_sequence, transaction_index)?;

    Ok(TransactionRow {
        account_id,
        txm: TransactionWithMeta {
            ledger_sequence,
            close_time: LedgerTime(close_time),
            tx: Transaction {
                common: TxCommon {
                    account,
                    sequence,
                    flags,
                    source_tag,
                    fee,
                    last_ledger_sequence,
                    signing_pub_key,
                    txn_signature,
                    memos,
                    hash,
                },
                payload,
            },
            meta: TransactionMeta {
                transaction_index,
                transaction_result,
                delivered_amount,
                // Effects are write-only history; the views do not carry them
                affected_entries: Vec::new(),
            },
        },
    })
}

fn read_variant(
    conn: &Connection,
    dicts: &Dictionaries,
    tx_type: TxType,
    row: &Row<'_>,
    ledger_sequence: u32,
    transaction_index: u32,
) -> Result<(TxPayload, Option<Amount>)> {
    let v = VARIANT_BASE;
    match tx_type {
        TxType::Payment => {
            let destination = codec::col_account(row, v, "destination")?;
            let amount = codec::col_amount(row, v + 1, "amount")?;
            let delivered = codec::col_opt_amount(row, v + 2, "delivered_amount")?;
            let send_max = codec::col_opt_amount(row, v + 3, "send_max")?;
            let destination_tag: Option<u32> = row.get(v + 4)?;
            let invoice_id = codec::col_opt_hash256(row, v + 5, "invoice_id")?;
            let paths = load_paths(conn, dicts, ledger_sequence, transaction_index)?;
            Ok((
                TxPayload::Payment(Payment {
                    destination,
                    amount,
                    send_max,
                    destination_tag,
                    invoice_id,
                    paths,
                }),
                delivered,
            ))
        }
        TxType::AccountSet => Ok((
            TxPayload::AccountSet(AccountSet {
                email_hash: codec::col_opt_hash128(row, v, "email_hash")?,
                wallet_locator: codec::col_opt_hash256(row, v + 1, "wallet_locator")?,
                wallet_size: row.get(v + 2)?,
                message_key: row.get(v + 3)?,
                domain: row.get(v + 4)?,
                transfer_rate: row.get(v + 5)?,
                set_flag: row.get(v + 6)?,
                clear_flag: row.get(v + 7)?,
            }),
            None,
        )),
        TxType::SetRegularKey => Ok((
            TxPayload::SetRegularKey(SetRegularKey {
                regular_key: codec::col_opt_regular_key(row, v, "regular_key")?,
            }),
            None,
        )),
        TxType::OfferCreate => Ok((
            TxPayload::OfferCreate(OfferCreate {
                offer_sequence: row.get(v)?,
                taker_pays: codec::col_amount(row, v + 1, "taker_pays")?,
                taker_gets: codec::col_amount(row, v + 2, "taker_gets")?,
                expiration: row.get(v + 3)?,
            }),
            None,
        )),
        TxType::OfferCancel => Ok((
            TxPayload::OfferCancel(OfferCancel {
                offer_sequence: row.get(v)?,
            }),
            None,
        )),
        TxType::TrustSet => Ok((
            TxPayload::TrustSet(TrustSet {
                limit_amount: codec::col_amount(row, v, "limit_amount")?,
                quality_in: row.get(v + 1)?,
                quality_out: row.get(v + 2)?,
            }),
            None,
        )),
        TxType::Amendment => Ok((
            TxPayload::Amendment(Amendment {
                amendment: codec::col_hash256(row, v, "amendment")?,
            }),
            None,
        )),
        TxType::SetFee => Ok((
            TxPayload::SetFee(SetFee {
                base_fee: row.get(v)?,
                reference_fee_units: row.get(v + 1)?,
                reserve_base: row.get(v + 2)?,
                reserve_increment: row.get(v + 3)?,
            }),
            None,
        )),
    }
}

/// Re-read a transaction's memo child rows in position order
pub fn load_memos(conn: &Connection, ledger_sequence: u32, transaction_index: u32) -> Result<Vec<Memo>> {
    let mut stmt = Stmt::MemosForTx.prepare(conn)?;
    let mut rows = stmt.query(params![ledger_sequence, transaction_index])?;
    let mut memos = Vec::new();
    while let Some(row) = rows.next()? {
        memos.push(Memo {
            memo_type: row.get(1)?,
            memo_data: row.get(2)?,
        });
    }
    Ok(memos)
}

/// Re-read a payment's path child rows, regrouped by path set in position
/// order, surrogate ids dereferenced back to raw values
pub fn load_paths(
    conn: &Connection,
    dicts: &Dictionaries,
    ledger_sequence: u32,
    transaction_index: u32,
) -> Result<Vec<Vec<PathStep>>> {
    let mut stmt = Stmt::PathsForTx.prepare(conn)?;
    let mut rows = stmt.query(params![ledger_sequence, transaction_index])?;
    let mut paths: Vec<Vec<PathStep>> = Vec::new();
    while let Some(row) = rows.next()? {
        let path_set: u32 = row.get(0)?;
        let account: Option<u32> = row.get(2)?;
        let currency: Option<u32> = row.get(3)?;
        let issuer: Option<u32> = row.get(4)?;
        let step = PathStep {
            account: dicts.reverse_opt_account(account)?,
            currency: dicts.reverse_opt_currency(currency)?,
            issuer: dicts.reverse_opt_account(issuer)?,
        };
        while paths.len() <= path_set as usize {
            paths.push(Vec::new());
        }
        paths[path_set as usize].push(step);
    }
    Ok(paths)
}
