// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-owner transaction storage with push-on-change listeners.
//!
//! Every listener receives the owner's complete list on each delivery, never
//! a diff. Deliveries happen right after subscribing, after each mutation made
//! through the store, and from [`SqliteStore::poll_external_changes`] when
//! another connection has written to the database.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::KhataError;
use crate::models::{NewTransaction, Transaction};

/// Callback invoked with the owner's current list, or the error that
/// prevented reading it.
pub type Listener = Box<dyn FnMut(Result<&[Transaction], &KhataError>) + Send>;

pub trait TransactionStore {
    /// All of `owner`'s transactions, newest date first.
    fn list(&self, owner: i64) -> Result<Vec<Transaction>, KhataError>;
    fn create(&self, owner: i64, new: &NewTransaction) -> Result<Transaction, KhataError>;
    /// Replaces every field of transaction `id`. Last write wins.
    fn update(
        &self,
        owner: i64,
        id: i64,
        new: &NewTransaction,
    ) -> Result<Transaction, KhataError>;
    fn delete(&self, owner: i64, id: i64) -> Result<(), KhataError>;
    fn subscribe(&self, owner: i64, listener: Listener) -> Result<Subscription, KhataError>;
}

struct Entry {
    id: u64,
    owner: i64,
    listener: Arc<Mutex<Listener>>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

type SharedRegistry = Arc<Mutex<Registry>>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    owner: i64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn owner(&self) -> i64 {
        self.owner
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).entries.retain(|e| e.id != self.id);
            debug!(subscription = self.id, owner = self.owner, "unsubscribed");
        }
    }
}

const SELECT_TRANSACTION: &str =
    "SELECT id, owner_id, type, amount, remarks, date FROM transactions";

type RawRow = (i64, i64, String, String, String, String);

fn decode(raw: RawRow) -> Result<Transaction, KhataError> {
    let (id, owner_id, kind, amount, remarks, date) = raw;
    let kind = kind.parse()?;
    let amount = amount
        .trim()
        .parse::<Decimal>()
        .map_err(|_| KhataError::InvalidAmount(amount.clone()))?;
    Ok(Transaction {
        id,
        owner_id,
        kind,
        amount,
        remarks,
        date,
    })
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
    registry: SharedRegistry,
    data_version: Cell<i64>,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Result<Self, KhataError> {
        let version = read_data_version(conn)?;
        Ok(Self {
            conn,
            registry: Arc::new(Mutex::new(Registry::default())),
            data_version: Cell::new(version),
        })
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    /// Re-delivers to every live listener if another connection committed
    /// since the last check. Returns whether anything was delivered.
    pub fn poll_external_changes(&self) -> Result<bool, KhataError> {
        let version = read_data_version(self.conn)?;
        if version == self.data_version.get() {
            return Ok(false);
        }
        self.data_version.set(version);
        let owners: BTreeSet<i64> = lock(&self.registry)
            .entries
            .iter()
            .map(|e| e.owner)
            .collect();
        debug!(version, owners = owners.len(), "external change detected");
        for owner in &owners {
            self.publish(*owner);
        }
        Ok(!owners.is_empty())
    }

    fn listeners_for(&self, owner: i64) -> Vec<Arc<Mutex<Listener>>> {
        lock(&self.registry)
            .entries
            .iter()
            .filter(|e| e.owner == owner)
            .map(|e| Arc::clone(&e.listener))
            .collect()
    }

    /// Sends `owner`'s current list to all of that owner's listeners.
    ///
    /// The registry lock is released before listeners run, so a listener may
    /// subscribe or unsubscribe from inside its callback.
    fn publish(&self, owner: i64) {
        let listeners = self.listeners_for(owner);
        if listeners.is_empty() {
            return;
        }
        let snapshot = self.list(owner);
        for listener in listeners {
            deliver(&listener, &snapshot);
        }
    }
}

fn deliver(listener: &Mutex<Listener>, snapshot: &Result<Vec<Transaction>, KhataError>) {
    let mut guard = lock(listener);
    let callback = &mut *guard;
    match snapshot {
        Ok(list) => callback(Ok(list.as_slice())),
        Err(err) => callback(Err(err)),
    }
}

fn read_data_version(conn: &Connection) -> Result<i64, KhataError> {
    Ok(conn.query_row("PRAGMA data_version", [], |r| r.get(0))?)
}

impl TransactionStore for SqliteStore<'_> {
    fn list(&self, owner: i64) -> Result<Vec<Transaction>, KhataError> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE owner_id=?1 ORDER BY date DESC, id DESC",
            SELECT_TRANSACTION
        ))?;
        let rows = stmt.query_map(params![owner], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, String>(4)?,
                r.get::<_, String>(5)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(decode(row?)?);
        }
        Ok(out)
    }

    fn create(&self, owner: i64, new: &NewTransaction) -> Result<Transaction, KhataError> {
        let date = new.validate()?;
        self.conn.execute(
            "INSERT INTO transactions(owner_id, type, amount, remarks, date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                owner,
                new.kind.as_str(),
                new.amount.to_string(),
                new.remarks.trim(),
                date
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(owner, id, kind = %new.kind, "transaction created");
        self.publish(owner);
        Ok(Transaction {
            id,
            owner_id: owner,
            kind: new.kind,
            amount: new.amount,
            remarks: new.remarks.trim().to_string(),
            date,
        })
    }

    fn update(
        &self,
        owner: i64,
        id: i64,
        new: &NewTransaction,
    ) -> Result<Transaction, KhataError> {
        let date = new.validate()?;
        let changed = self.conn.execute(
            "UPDATE transactions SET type=?1, amount=?2, remarks=?3, date=?4
             WHERE id=?5 AND owner_id=?6",
            params![
                new.kind.as_str(),
                new.amount.to_string(),
                new.remarks.trim(),
                date,
                id,
                owner
            ],
        )?;
        if changed == 0 {
            return Err(KhataError::TransactionNotFound(id));
        }
        info!(owner, id, "transaction updated");
        self.publish(owner);
        Ok(Transaction {
            id,
            owner_id: owner,
            kind: new.kind,
            amount: new.amount,
            remarks: new.remarks.trim().to_string(),
            date,
        })
    }

    fn delete(&self, owner: i64, id: i64) -> Result<(), KhataError> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE id=?1 AND owner_id=?2",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(KhataError::TransactionNotFound(id));
        }
        info!(owner, id, "transaction deleted");
        self.publish(owner);
        Ok(())
    }

    fn subscribe(&self, owner: i64, listener: Listener) -> Result<Subscription, KhataError> {
        let listener = Arc::new(Mutex::new(listener));
        let id = {
            let mut registry = lock(&self.registry);
            registry.next_id += 1;
            let id = registry.next_id;
            registry.entries.push(Entry {
                id,
                owner,
                listener: Arc::clone(&listener),
            });
            id
        };
        debug!(subscription = id, owner, "subscribed");
        let subscription = Subscription {
            id,
            owner,
            registry: Arc::downgrade(&self.registry),
        };
        deliver(&listener, &self.list(owner));
        Ok(subscription)
    }
}
