//! Column codec
//!
//! Bidirectional adapters between one typed domain field and its storable
//! column value(s): fixed-width binary, nullable wrappers, dictionary-backed
//! identifiers, and the canonical 8-byte amount value. The write side binds;
//! the read side decodes view columns back into domain types.
//!
//! Absence maps to SQL NULL everywhere except the legacy non-nullable
//! columns, which take a defined default instead: 0 for flag/counter fields,
//! empty bytes for the payment invoice id. The allow-list is exactly the
//! three functions below; the closed domain model keeps every other field
//! kind off this path.

use chronicle_core::{Amount, Drops, Hash128, Hash256, PublicKey, RegularKey};
use rusqlite::{Connection, Row};

use crate::dict::Dictionaries;
use crate::errors::{Result, StoreError};

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

/// Legacy default: an absent flag field stores 0 on its NOT NULL column
pub fn flags_or_zero(flags: Option<u32>) -> u32 {
    flags.unwrap_or(0)
}

/// Legacy default: an absent counter stores 0 on its NOT NULL column
pub fn count_or_zero(count: Option<u32>) -> u32 {
    count.unwrap_or(0)
}

/// Legacy default: an absent invoice id stores empty bytes, not NULL
pub fn invoice_or_empty(invoice: Option<&Hash256>) -> Vec<u8> {
    invoice.map(|h| h.as_bytes().to_vec()).unwrap_or_default()
}

/// Flatten an ordered hash list into one blob column
pub fn indexes_blob(indexes: Option<&Vec<Hash256>>) -> Option<Vec<u8>> {
    indexes.map(|hashes| {
        let mut out = Vec::with_capacity(hashes.len() * Hash256::LEN);
        for h in hashes {
            out.extend_from_slice(h.as_bytes());
        }
        out
    })
}

/// 8-byte big-endian scalar column (directory exchange rates, node ids
/// stored as binary)
pub fn u64_blob(value: Option<u64>) -> Option<Vec<u8>> {
    value.map(|v| v.to_be_bytes().to_vec())
}

/// An amount split into its storable parts with dictionary ids resolved
///
/// The previous-snapshot path reconstructs its bindings through this type
/// too, so prior-state rows carry surrogate ids symmetrically with
/// current-state ones.
#[derive(Debug, Default)]
pub struct ResolvedAmount {
    pub value: Option<Vec<u8>>,
    pub currency: Option<u32>,
    pub issuer: Option<u32>,
}

impl ResolvedAmount {
    /// Resolve an optional amount; absence leaves all three columns NULL
    pub fn resolve(
        amount: Option<&Amount>,
        conn: &Connection,
        dicts: &mut Dictionaries,
    ) -> Result<Self> {
        match amount {
            None => Ok(Self::default()),
            Some(a) => Ok(Self {
                value: Some(a.value.to_bytes().to_vec()),
                currency: Some(dicts.lookup_currency(conn, &a.currency)?),
                issuer: Some(dicts.lookup_account(conn, &a.issuer)?),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Fixed-width hash column
pub fn col_hash256(row: &Row<'_>, idx: usize, column: &'static str) -> Result<Hash256> {
    let bytes: Vec<u8> = row.get(idx)?;
    Hash256::from_slice(&bytes).map_err(|e| StoreError::decode(column, e))
}

/// Nullable hash column; NULL and the legacy empty-bytes default both read
/// back as absent
pub fn col_opt_hash256(row: &Row<'_>, idx: usize, column: &'static str) -> Result<Option<Hash256>> {
    let bytes: Option<Vec<u8>> = row.get(idx)?;
    match bytes {
        None => Ok(None),
        Some(b) if b.is_empty() => Ok(None),
        Some(b) => Hash256::from_slice(&b)
            .map(Some)
            .map_err(|e| StoreError::decode(column, e)),
    }
}

/// Nullable 128-bit hash column
pub fn col_opt_hash128(row: &Row<'_>, idx: usize, column: &'static str) -> Result<Option<Hash128>> {
    let bytes: Option<Vec<u8>> = row.get(idx)?;
    match bytes {
        None => Ok(None),
        Some(b) if b.is_empty() => Ok(None),
        Some(b) => Hash128::from_slice(&b)
            .map(Some)
            .map_err(|e| StoreError::decode(column, e)),
    }
}

/// Raw account value column, as the views deliver after dereferencing the
/// surrogate id
pub fn col_account(
    row: &Row<'_>,
    idx: usize,
    column: &'static str,
) -> Result<chronicle_core::AccountId> {
    let bytes: Vec<u8> = row.get(idx)?;
    chronicle_core::AccountId::from_slice(&bytes).map_err(|e| StoreError::decode(column, e))
}

/// Nullable raw regular-key column
pub fn col_opt_regular_key(
    row: &Row<'_>,
    idx: usize,
    column: &'static str,
) -> Result<Option<RegularKey>> {
    let bytes: Option<Vec<u8>> = row.get(idx)?;
    bytes
        .map(|b| RegularKey::from_slice(&b).map_err(|e| StoreError::decode(column, e)))
        .transpose()
}

/// Nullable raw public-key column
pub fn col_opt_public_key(
    row: &Row<'_>,
    idx: usize,
    column: &'static str,
) -> Result<Option<PublicKey>> {
    let bytes: Option<Vec<u8>> = row.get(idx)?;
    bytes
        .map(|b| PublicKey::from_slice(&b).map_err(|e| StoreError::decode(column, e)))
        .transpose()
}

/// Canonical 8-byte amount value column
pub fn col_drops(row: &Row<'_>, idx: usize, column: &'static str) -> Result<Drops> {
    let bytes: Vec<u8> = row.get(idx)?;
    Drops::from_slice(&bytes).map_err(|e| StoreError::decode(column, e))
}

/// Reassembled `value || currency || issuer` amount column
pub fn col_amount(row: &Row<'_>, idx: usize, column: &'static str) -> Result<Amount> {
    let bytes: Vec<u8> = row.get(idx)?;
    Amount::from_concat(&bytes).map_err(|e| StoreError::decode(column, e))
}

/// Nullable reassembled amount column; NULL propagation in the view turns an
/// absent amount into an absent concatenation
pub fn col_opt_amount(row: &Row<'_>, idx: usize, column: &'static str) -> Result<Option<Amount>> {
    let bytes: Option<Vec<u8>> = row.get(idx)?;
    bytes
        .map(|b| Amount::from_concat(&b).map_err(|e| StoreError::decode(column, e)))
        .transpose()
}
