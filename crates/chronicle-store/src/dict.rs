//! Surrogate dictionaries
//!
//! Four independent dictionaries map fixed-width binary values (accounts,
//! currencies, regular keys, public keys) to small integer surrogate ids.
//! Each keeps a full in-memory cache loaded at open; a value seen for the
//! first time mints the next id and persists it through the caller's unit of
//! work. Callers on otherwise-read-only paths must tolerate that write.

use std::collections::HashMap;

use chronicle_core::{AccountId, Currency, PublicKey, RegularKey};
use rusqlite::{Connection, ErrorCode};
use serde::Serialize;

use crate::errors::{Result, StoreError};
use crate::schema::Stmt;

/// Which dictionary a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DictKind {
    Account,
    Currency,
    RegularKey,
    PublicKey,
}

impl DictKind {
    /// Table name, used in errors and logging
    pub fn name(self) -> &'static str {
        match self {
            DictKind::Account => "accounts",
            DictKind::Currency => "currencies",
            DictKind::RegularKey => "regular_keys",
            DictKind::PublicKey => "public_keys",
        }
    }

    fn load_stmt(self) -> Stmt {
        match self {
            DictKind::Account => Stmt::LoadAccounts,
            DictKind::Currency => Stmt::LoadCurrencies,
            DictKind::RegularKey => Stmt::LoadRegularKeys,
            DictKind::PublicKey => Stmt::LoadPublicKeys,
        }
    }

    fn mint_stmt(self) -> Stmt {
        match self {
            DictKind::Account => Stmt::MintAccount,
            DictKind::Currency => Stmt::MintCurrency,
            DictKind::RegularKey => Stmt::MintRegularKey,
            DictKind::PublicKey => Stmt::MintPublicKey,
        }
    }

    fn replace_stmt(self) -> Stmt {
        match self {
            DictKind::Account => Stmt::ReplaceAccount,
            DictKind::Currency => Stmt::ReplaceCurrency,
            DictKind::RegularKey => Stmt::ReplaceRegularKey,
            DictKind::PublicKey => Stmt::ReplacePublicKey,
        }
    }

    fn by_value_stmt(self) -> Stmt {
        match self {
            DictKind::Account => Stmt::AccountByValue,
            DictKind::Currency => Stmt::CurrencyByValue,
            DictKind::RegularKey => Stmt::RegularKeyByValue,
            DictKind::PublicKey => Stmt::PublicKeyByValue,
        }
    }
}

/// One persisted dictionary row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupEntry {
    pub id: u32,
    pub value: Vec<u8>,
    pub human: String,
}

/// One cached dictionary
pub struct Lookup {
    kind: DictKind,
    by_value: HashMap<Vec<u8>, u32>,
    by_id: HashMap<u32, Vec<u8>>,
    next_id: u32,
    /// Ids minted since the current unit of work began; un-cached again if
    /// the unit rolls back
    pending: Vec<u32>,
}

impl Lookup {
    /// Load the full dictionary into memory
    pub fn load(conn: &Connection, kind: DictKind) -> Result<Self> {
        let mut stmt = kind.load_stmt().prepare(conn)?;
        let mut by_value = HashMap::new();
        let mut by_id = HashMap::new();
        let mut next_id = 0u32;

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: u32 = row.get(0)?;
            let value: Vec<u8> = row.get(1)?;
            by_value.insert(value.clone(), id);
            by_id.insert(id, value);
            next_id = next_id.max(id + 1);
        }

        Ok(Self {
            kind,
            by_value,
            by_id,
            next_id,
            pending: Vec::new(),
        })
    }

    /// Which dictionary this is
    pub fn kind(&self) -> DictKind {
        self.kind
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Forward lookup; mints and persists an id on first sight
    ///
    /// A uniqueness violation during the mint means another writer persisted
    /// the value first; the persisted id is adopted by re-reading the row
    /// once.
    pub fn lookup(&mut self, conn: &Connection, value: &[u8], human: &str) -> Result<u32> {
        if let Some(&id) = self.by_value.get(value) {
            return Ok(id);
        }

        let id = self.next_id;
        let minted = kind_execute(self.kind.mint_stmt(), conn, id, value, human);
        let id = match minted {
            Ok(()) => {
                self.next_id += 1;
                self.pending.push(id);
                tracing::debug!(dictionary = self.kind.name(), id, human, "minted surrogate id");
                id
            }
            Err(StoreError::Database(ref e)) if is_unique_violation(e) => {
                let mut stmt = self.kind.by_value_stmt().prepare(conn)?;
                stmt.query_row([value], |row| row.get(0))?
            }
            Err(e) => return Err(e),
        };

        self.by_value.insert(value.to_vec(), id);
        self.by_id.insert(id, value.to_vec());
        Ok(id)
    }

    /// Reverse lookup by surrogate id
    pub fn reverse(&self, id: u32) -> Option<&[u8]> {
        self.by_id.get(&id).map(Vec::as_slice)
    }

    /// List the persisted entries in id order
    pub fn entries(&self, conn: &Connection) -> Result<Vec<LookupEntry>> {
        let mut stmt = self.kind.load_stmt().prepare(conn)?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(LookupEntry {
                id: row.get(0)?,
                value: row.get(1)?,
                human: row.get(2)?,
            });
        }
        Ok(entries)
    }

    /// Administrative insert of an explicit entry
    ///
    /// Fails with `DuplicateEntity` when the entry conflicts with an existing
    /// id or value mapping; re-inserting an identical entry is idempotent.
    pub fn insert_entry(&mut self, conn: &Connection, entry: &LookupEntry) -> Result<()> {
        if let Some(existing) = self.by_id.get(&entry.id) {
            if existing != &entry.value {
                return Err(StoreError::DuplicateEntity {
                    dictionary: self.kind.name(),
                    id: entry.id,
                });
            }
        }
        if let Some(&existing) = self.by_value.get(&entry.value) {
            if existing != entry.id {
                return Err(StoreError::DuplicateEntity {
                    dictionary: self.kind.name(),
                    id: entry.id,
                });
            }
        }

        kind_execute(
            self.kind.replace_stmt(),
            conn,
            entry.id,
            &entry.value,
            &entry.human,
        )?;
        self.by_value.insert(entry.value.clone(), entry.id);
        self.by_id.insert(entry.id, entry.value.clone());
        self.next_id = self.next_id.max(entry.id + 1);
        Ok(())
    }

    fn begin_unit(&mut self) {
        self.pending.clear();
    }

    fn commit_unit(&mut self) {
        self.pending.clear();
    }

    /// Drop cache entries whose rows were rolled back with the unit of work
    fn abort_unit(&mut self) {
        for id in self.pending.drain(..) {
            if let Some(value) = self.by_id.remove(&id) {
                self.by_value.remove(&value);
            }
            self.next_id = self.next_id.min(id);
        }
    }
}

fn kind_execute(
    stmt: Stmt,
    conn: &Connection,
    id: u32,
    value: &[u8],
    human: &str,
) -> Result<()> {
    stmt.prepare(conn)?
        .execute(rusqlite::params![id, value, human])?;
    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// The four dictionaries, owned by the store facade and shared by every
/// ingestion and query operation
pub struct Dictionaries {
    pub accounts: Lookup,
    pub currencies: Lookup,
    pub regular_keys: Lookup,
    pub public_keys: Lookup,
}

impl Dictionaries {
    /// Load all four dictionaries
    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self {
            accounts: Lookup::load(conn, DictKind::Account)?,
            currencies: Lookup::load(conn, DictKind::Currency)?,
            regular_keys: Lookup::load(conn, DictKind::RegularKey)?,
            public_keys: Lookup::load(conn, DictKind::PublicKey)?,
        })
    }

    /// Borrow one dictionary by kind
    pub fn get(&self, kind: DictKind) -> &Lookup {
        match kind {
            DictKind::Account => &self.accounts,
            DictKind::Currency => &self.currencies,
            DictKind::RegularKey => &self.regular_keys,
            DictKind::PublicKey => &self.public_keys,
        }
    }

    /// Mutably borrow one dictionary by kind
    pub fn get_mut(&mut self, kind: DictKind) -> &mut Lookup {
        match kind {
            DictKind::Account => &mut self.accounts,
            DictKind::Currency => &mut self.currencies,
            DictKind::RegularKey => &mut self.regular_keys,
            DictKind::PublicKey => &mut self.public_keys,
        }
    }

    pub fn lookup_account(&mut self, conn: &Connection, value: &AccountId) -> Result<u32> {
        self.accounts.lookup(conn, value.as_bytes(), &value.human())
    }

    pub fn lookup_currency(&mut self, conn: &Connection, value: &Currency) -> Result<u32> {
        self.currencies
            .lookup(conn, value.as_bytes(), &value.human())
    }

    pub fn lookup_regular_key(&mut self, conn: &Connection, value: &RegularKey) -> Result<u32> {
        self.regular_keys
            .lookup(conn, value.as_bytes(), &value.human())
    }

    pub fn lookup_public_key(&mut self, conn: &Connection, value: &PublicKey) -> Result<u32> {
        self.public_keys
            .lookup(conn, value.as_bytes(), &value.human())
    }

    pub fn lookup_opt_account(
        &mut self,
        conn: &Connection,
        value: Option<&AccountId>,
    ) -> Result<Option<u32>> {
        value.map(|v| self.lookup_account(conn, v)).transpose()
    }

    pub fn lookup_opt_currency(
        &mut self,
        conn: &Connection,
        value: Option<&Currency>,
    ) -> Result<Option<u32>> {
        value.map(|v| self.lookup_currency(conn, v)).transpose()
    }

    pub fn lookup_opt_regular_key(
        &mut self,
        conn: &Connection,
        value: Option<&RegularKey>,
    ) -> Result<Option<u32>> {
        value.map(|v| self.lookup_regular_key(conn, v)).transpose()
    }

    pub fn lookup_opt_public_key(
        &mut self,
        conn: &Connection,
        value: Option<&PublicKey>,
    ) -> Result<Option<u32>> {
        value.map(|v| self.lookup_public_key(conn, v)).transpose()
    }

    /// Reverse an account surrogate id back to its raw value
    pub fn reverse_account(&self, id: u32) -> Result<AccountId> {
        let bytes = self
            .accounts
            .reverse(id)
            .ok_or(StoreError::DanglingSurrogate {
                dictionary: DictKind::Account.name(),
                id,
            })?;
        AccountId::from_slice(bytes).map_err(|e| StoreError::decode("accounts.value", e))
    }

    /// Reverse a currency surrogate id back to its raw value
    pub fn reverse_currency(&self, id: u32) -> Result<Currency> {
        let bytes = self
            .currencies
            .reverse(id)
            .ok_or(StoreError::DanglingSurrogate {
                dictionary: DictKind::Currency.name(),
                id,
            })?;
        Currency::from_slice(bytes).map_err(|e| StoreError::decode("currencies.value", e))
    }

    pub fn reverse_opt_account(&self, id: Option<u32>) -> Result<Option<AccountId>> {
        id.map(|i| self.reverse_account(i)).transpose()
    }

    pub fn reverse_opt_currency(&self, id: Option<u32>) -> Result<Option<Currency>> {
        id.map(|i| self.reverse_currency(i)).transpose()
    }

    /// Begin a unit of work; clears mint journals
    pub fn begin_unit(&mut self) {
        self.accounts.begin_unit();
        self.currencies.begin_unit();
        self.regular_keys.begin_unit();
        self.public_keys.begin_unit();
    }

    /// The unit of work committed; minted ids are durable
    pub fn commit_unit(&mut self) {
        self.accounts.commit_unit();
        self.currencies.commit_unit();
        self.regular_keys.commit_unit();
        self.public_keys.commit_unit();
    }

    /// The unit of work rolled back; forget ids minted inside it
    pub fn abort_unit(&mut self) {
        self.accounts.abort_unit();
        self.currencies.abort_unit();
        self.regular_keys.abort_unit();
        self.public_keys.abort_unit();
    }
}
