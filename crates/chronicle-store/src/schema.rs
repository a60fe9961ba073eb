//! Typed statement registry
//!
//! Every SQL statement the store executes lives here, keyed by a closed enum
//! and prepared through the connection's statement cache. Filters use the
//! `(?N IS NULL OR col = ?N)` kernel form so that no SQL is ever assembled
//! from strings at runtime.

use chronicle_core::TxType;
use rusqlite::{CachedStatement, Connection};

use crate::errors::Result;

/// Per-variant fetch: the variant view joined against the kernel filter,
/// narrowed in phase 2 to the range phase 1 discovered.
macro_rules! fetch_sql {
    ($view:literal) => {
        concat!(
            "SELECT v.* FROM ",
            $view,
            " v WHERE (?1 IS NULL OR v.hash = ?1)",
            " AND (?2 IS NULL OR v.ledger_sequence = ?2)",
            " AND (?3 IS NULL OR v.ledger_sequence >= ?3)",
            " AND (?4 IS NULL OR v.ledger_sequence <= ?4)",
            " AND (?5 IS NULL OR v.account = ?5)",
            " ORDER BY v.ledger_sequence, v.transaction_index"
        )
    };
}

/// Phase-1 range discovery: bound the kernel rows by the requested limit and
/// collapse them into one `[min,max]` ledger range per transaction type.
macro_rules! ranges_sql {
    ($order:literal) => {
        concat!(
            "SELECT transaction_type, MIN(ledger_sequence), MAX(ledger_sequence) FROM (",
            "SELECT ledger_sequence, transaction_index, transaction_type FROM txs",
            " WHERE (?1 IS NULL OR hash = ?1)",
            " AND (?2 IS NULL OR ledger_sequence = ?2)",
            " AND (?3 IS NULL OR ledger_sequence >= ?3)",
            " AND (?4 IS NULL OR ledger_sequence <= ?4)",
            " AND (?5 IS NULL OR account = ?5)",
            " AND (?6 IS NULL OR transaction_type = ?6)",
            " ORDER BY ledger_sequence ",
            $order,
            ", transaction_index ",
            $order,
            " LIMIT ?7) GROUP BY transaction_type"
        )
    };
}

/// Ledger-only queries: bounded to 10 rows in predicate order, re-presented
/// ascending to the caller.
macro_rules! ledgers_sql {
    ($where_order:literal) => {
        concat!(
            "SELECT * FROM (SELECT ledger_sequence, total_coins, previous_ledger, \
             transaction_hash, state_hash, parent_close_time, close_time, close_resolution, \
             close_flags, hash FROM ledgers WHERE ",
            $where_order,
            " LIMIT 10) ORDER BY ledger_sequence"
        )
    };
}

/// A prepared statement key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stmt {
    // Entity writes (replace-on-conflict)
    InsertLedger,
    InsertTx,
    InsertPayment,
    InsertOfferCreate,
    InsertOfferCancel,
    InsertAccountSet,
    InsertSetRegularKey,
    InsertTrustSet,
    InsertSetFee,
    InsertAmendment,
    InsertPath,
    InsertMemo,
    InsertEffect,
    InsertAccountRoot,
    InsertTrustLine,
    InsertOfferEntry,
    InsertDirectory,
    InsertFeeSettings,

    // Dictionary writes
    MintAccount,
    MintCurrency,
    MintRegularKey,
    MintPublicKey,
    ReplaceAccount,
    ReplaceCurrency,
    ReplaceRegularKey,
    ReplacePublicKey,

    // Dictionary reads
    AccountByValue,
    CurrencyByValue,
    RegularKeyByValue,
    PublicKeyByValue,
    LoadAccounts,
    LoadCurrencies,
    LoadRegularKeys,
    LoadPublicKeys,
    SearchAccounts,

    // Query planning
    LedgerRange,
    RangesAsc,
    RangesDesc,
    LedgersByHash,
    LedgerBySequence,
    LedgersFromMin,
    LedgersToMax,
    FetchPayments,
    FetchAccountSets,
    FetchSetRegularKeys,
    FetchOfferCreates,
    FetchOfferCancels,
    FetchTrustSets,
    FetchAmendments,
    FetchSetFees,
    PathsForTx,
    MemosForTx,
    MissingLedgers,
}

impl Stmt {
    /// The SQL text for this statement
    pub fn sql(self) -> &'static str {
        match self {
            Stmt::InsertLedger => {
                "INSERT OR REPLACE INTO ledgers (ledger_sequence, total_coins, previous_ledger, \
                 transaction_hash, state_hash, parent_close_time, close_time, close_resolution, \
                 close_flags, hash) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            }
            Stmt::InsertTx => {
                "INSERT OR REPLACE INTO txs (ledger_sequence, transaction_index, \
                 transaction_result, transaction_type, flags, source_tag, account, sequence, \
                 last_ledger_sequence, fee, signing_pub_key, txn_signature, hash) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            }
            Stmt::InsertPayment => {
                "INSERT OR REPLACE INTO payments (ledger_sequence, transaction_index, \
                 destination, amount, amount_currency, amount_issuer, delivered_amount, \
                 delivered_currency, delivered_issuer, send_max, send_max_currency, \
                 send_max_issuer, destination_tag, invoice_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            }
            Stmt::InsertOfferCreate => {
                "INSERT OR REPLACE INTO offer_creates (ledger_sequence, transaction_index, \
                 offer_sequence, taker_pays, taker_pays_currency, taker_pays_issuer, taker_gets, \
                 taker_gets_currency, taker_gets_issuer, expiration) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            }
            Stmt::InsertOfferCancel => {
                "INSERT OR REPLACE INTO offer_cancels (ledger_sequence, transaction_index, \
                 offer_sequence) VALUES (?1, ?2, ?3)"
            }
            Stmt::InsertAccountSet => {
                "INSERT OR REPLACE INTO account_sets (ledger_sequence, transaction_index, \
                 email_hash, wallet_locator, wallet_size, message_key, domain, transfer_rate, \
                 set_flag, clear_flag) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            }
            Stmt::InsertSetRegularKey => {
                "INSERT OR REPLACE INTO set_regular_keys (ledger_sequence, transaction_index, \
                 regular_key) VALUES (?1, ?2, ?3)"
            }
            Stmt::InsertTrustSet => {
                "INSERT OR REPLACE INTO trust_sets (ledger_sequence, transaction_index, \
                 limit_amount, limit_amount_currency, limit_amount_issuer, quality_in, \
                 quality_out) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            }
            Stmt::InsertSetFee => {
                "INSERT OR REPLACE INTO set_fees (ledger_sequence, transaction_index, base_fee, \
                 reference_fee_units, reserve_base, reserve_increment) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            }
            Stmt::InsertAmendment => {
                "INSERT OR REPLACE INTO amendments (ledger_sequence, transaction_index, \
                 amendment) VALUES (?1, ?2, ?3)"
            }
            Stmt::InsertPath => {
                "INSERT OR REPLACE INTO paths (ledger_sequence, transaction_index, path_set, \
                 position, account, currency, issuer) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            }
            Stmt::InsertMemo => {
                "INSERT OR REPLACE INTO memos (ledger_sequence, transaction_index, position, \
                 memo_type, memo_data) VALUES (?1, ?2, ?3, ?4, ?5)"
            }
            Stmt::InsertEffect => {
                "INSERT OR REPLACE INTO entry_effects (ledger_sequence, transaction_index, \
                 position, entry_type, entry_state, ledger_index, previous_txn_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            }
            Stmt::InsertAccountRoot => {
                "INSERT OR REPLACE INTO account_roots (ledger_sequence, transaction_index, \
                 position, flags, account, sequence, balance, owner_count, regular_key, \
                 email_hash, wallet_locator, wallet_size, message_key, domain, transfer_rate, \
                 previous_flags, previous_sequence, previous_balance, previous_owner_count, \
                 previous_regular_key, previous_email_hash, previous_wallet_locator, \
                 previous_wallet_size, previous_message_key, previous_domain, \
                 previous_transfer_rate) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)"
            }
            Stmt::InsertTrustLine => {
                "INSERT OR REPLACE INTO trust_lines (ledger_sequence, transaction_index, \
                 position, flags, balance, currency, low_limit, low_limit_issuer, high_limit, \
                 high_limit_issuer, low_node, high_node, low_quality_in, low_quality_out, \
                 high_quality_in, high_quality_out, previous_flags, previous_balance, \
                 previous_currency, previous_low_limit, previous_low_limit_issuer, \
                 previous_high_limit, previous_high_limit_issuer, previous_low_node, \
                 previous_high_node, previous_low_quality_in, previous_low_quality_out, \
                 previous_high_quality_in, previous_high_quality_out) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)"
            }
            Stmt::InsertOfferEntry => {
                "INSERT OR REPLACE INTO offers (ledger_sequence, transaction_index, position, \
                 flags, account, sequence, taker_pays, taker_pays_currency, taker_pays_issuer, \
                 taker_gets, taker_gets_currency, taker_gets_issuer, expiration, book_directory, \
                 book_node, owner_node, previous_flags, previous_sequence, previous_taker_pays, \
                 previous_taker_pays_currency, previous_taker_pays_issuer, previous_taker_gets, \
                 previous_taker_gets_currency, previous_taker_gets_issuer, previous_expiration, \
                 previous_book_directory, previous_book_node, previous_owner_node) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)"
            }
            Stmt::InsertDirectory => {
                "INSERT OR REPLACE INTO directories (ledger_sequence, transaction_index, \
                 position, root_index, indexes, owner, taker_pays_currency, taker_pays_issuer, \
                 taker_gets_currency, taker_gets_issuer, exchange_rate, index_next, \
                 index_previous, previous_root_index, previous_indexes, previous_owner, \
                 previous_taker_pays_currency, previous_taker_pays_issuer, \
                 previous_taker_gets_currency, previous_taker_gets_issuer, \
                 previous_exchange_rate, previous_index_next, previous_index_previous) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19, ?20, ?21, ?22, ?23)"
            }
            Stmt::InsertFeeSettings => {
                "INSERT OR REPLACE INTO fee_settings (ledger_sequence, transaction_index, \
                 position, flags, base_fee, reference_fee_units, reserve_base, \
                 reserve_increment, previous_flags, previous_base_fee, \
                 previous_reference_fee_units, previous_reserve_base, \
                 previous_reserve_increment) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            }

            Stmt::MintAccount => "INSERT INTO accounts (id, value, human) VALUES (?1, ?2, ?3)",
            Stmt::MintCurrency => "INSERT INTO currencies (id, value, human) VALUES (?1, ?2, ?3)",
            Stmt::MintRegularKey => {
                "INSERT INTO regular_keys (id, value, human) VALUES (?1, ?2, ?3)"
            }
            Stmt::MintPublicKey => "INSERT INTO public_keys (id, value, human) VALUES (?1, ?2, ?3)",
            Stmt::ReplaceAccount => {
                "INSERT OR REPLACE INTO accounts (id, value, human) VALUES (?1, ?2, ?3)"
            }
            Stmt::ReplaceCurrency => {
                "INSERT OR REPLACE INTO currencies (id, value, human) VALUES (?1, ?2, ?3)"
            }
            Stmt::ReplaceRegularKey => {
                "INSERT OR REPLACE INTO regular_keys (id, value, human) VALUES (?1, ?2, ?3)"
            }
            Stmt::ReplacePublicKey => {
                "INSERT OR REPLACE INTO public_keys (id, value, human) VALUES (?1, ?2, ?3)"
            }

            Stmt::AccountByValue => "SELECT id FROM accounts WHERE value = ?1",
            Stmt::CurrencyByValue => "SELECT id FROM currencies WHERE value = ?1",
            Stmt::RegularKeyByValue => "SELECT id FROM regular_keys WHERE value = ?1",
            Stmt::PublicKeyByValue => "SELECT id FROM public_keys WHERE value = ?1",
            Stmt::LoadAccounts => "SELECT id, value, human FROM accounts ORDER BY id",
            Stmt::LoadCurrencies => "SELECT id, value, human FROM currencies ORDER BY id",
            Stmt::LoadRegularKeys => "SELECT id, value, human FROM regular_keys ORDER BY id",
            Stmt::LoadPublicKeys => "SELECT id, value, human FROM public_keys ORDER BY id",
            Stmt::SearchAccounts => {
                "SELECT human FROM accounts WHERE human LIKE ?1 ORDER BY human LIMIT 10"
            }

            Stmt::LedgerRange => "SELECT MIN(ledger_sequence), MAX(ledger_sequence) FROM ledgers",
            Stmt::RangesAsc => ranges_sql!("ASC"),
            Stmt::RangesDesc => ranges_sql!("DESC"),
            Stmt::LedgersByHash => ledgers_sql!("hash = ?1"),
            Stmt::LedgerBySequence => ledgers_sql!("ledger_sequence = ?1 ORDER BY ledger_sequence"),
            Stmt::LedgersFromMin => {
                ledgers_sql!("ledger_sequence >= ?1 ORDER BY ledger_sequence")
            }
            Stmt::LedgersToMax => {
                ledgers_sql!("ledger_sequence <= ?1 ORDER BY ledger_sequence DESC")
            }
            Stmt::FetchPayments => fetch_sql!("payment_view"),
            Stmt::FetchAccountSets => fetch_sql!("account_set_view"),
            Stmt::FetchSetRegularKeys => fetch_sql!("set_regular_key_view"),
            Stmt::FetchOfferCreates => fetch_sql!("offer_create_view"),
            Stmt::FetchOfferCancels => fetch_sql!("offer_cancel_view"),
            Stmt::FetchTrustSets => fetch_sql!("trust_set_view"),
            Stmt::FetchAmendments => fetch_sql!("amendment_view"),
            Stmt::FetchSetFees => fetch_sql!("set_fee_view"),
            Stmt::PathsForTx => {
                "SELECT path_set, position, account, currency, issuer FROM paths \
                 WHERE ledger_sequence = ?1 AND transaction_index = ?2 \
                 ORDER BY path_set, position"
            }
            Stmt::MemosForTx => {
                "SELECT position, memo_type, memo_data FROM memos \
                 WHERE ledger_sequence = ?1 AND transaction_index = ?2 ORDER BY position"
            }
            Stmt::MissingLedgers => {
                "WITH RECURSIVE span(n) AS (SELECT ?1 UNION ALL SELECT n + 1 FROM span \
                 WHERE n < ?2) \
                 SELECT n FROM span LEFT OUTER JOIN ledgers l ON l.ledger_sequence = n \
                 WHERE l.ledger_sequence IS NULL ORDER BY n"
            }
        }
    }

    /// The phase-2 fetch statement for a transaction type's view
    pub fn fetch_for(tx_type: TxType) -> Stmt {
        match tx_type {
            TxType::Payment => Stmt::FetchPayments,
            TxType::AccountSet => Stmt::FetchAccountSets,
            TxType::SetRegularKey => Stmt::FetchSetRegularKeys,
            TxType::OfferCreate => Stmt::FetchOfferCreates,
            TxType::OfferCancel => Stmt::FetchOfferCancels,
            TxType::TrustSet => Stmt::FetchTrustSets,
            TxType::Amendment => Stmt::FetchAmendments,
            TxType::SetFee => Stmt::FetchSetFees,
        }
    }

    /// Prepare this statement through the connection's statement cache
    pub fn prepare(self, conn: &Connection) -> Result<CachedStatement<'_>> {
        Ok(conn.prepare_cached(self.sql())?)
    }
}
