use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stockledger_core::{DomainError, DomainResult};

use crate::entry::{EntryStatus, LedgerEntry};

/// Append-only storage for one kind of ledger entry.
///
/// Entries are never deleted and their business fields never change; the only
/// permitted update is a lifecycle step validated by `EntryStatus::advance`.
pub trait LedgerStore<E: LedgerEntry>: Send + Sync {
    /// Append a freshly recorded entry. Fails with `Conflict` on a duplicate id.
    fn append(&self, entry: E) -> DomainResult<E>;

    fn get(&self, id: &E::Id) -> DomainResult<E>;

    /// All entries in append order.
    fn list(&self) -> DomainResult<Vec<E>>;

    /// Advance an entry's lifecycle and return the updated entry.
    fn transition(&self, id: &E::Id, next: EntryStatus) -> DomainResult<E>;
}

impl<E, S> LedgerStore<E> for Arc<S>
where
    E: LedgerEntry,
    S: LedgerStore<E> + ?Sized,
{
    fn append(&self, entry: E) -> DomainResult<E> {
        (**self).append(entry)
    }

    fn get(&self, id: &E::Id) -> DomainResult<E> {
        (**self).get(id)
    }

    fn list(&self) -> DomainResult<Vec<E>> {
        (**self).list()
    }

    fn transition(&self, id: &E::Id, next: EntryStatus) -> DomainResult<E> {
        (**self).transition(id, next)
    }
}

#[derive(Debug)]
struct Journal<E: LedgerEntry> {
    entries: Vec<E>,
    positions: HashMap<E::Id, usize>,
}

/// In-memory append-only ledger.
#[derive(Debug)]
pub struct InMemoryLedgerStore<E: LedgerEntry> {
    inner: RwLock<Journal<E>>,
}

impl<E: LedgerEntry> InMemoryLedgerStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Journal {
                entries: Vec::new(),
                positions: HashMap::new(),
            }),
        }
    }
}

impl<E: LedgerEntry> Default for InMemoryLedgerStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> DomainError {
    DomainError::invalid_state("ledger lock poisoned")
}

impl<E: LedgerEntry> LedgerStore<E> for InMemoryLedgerStore<E> {
    fn append(&self, entry: E) -> DomainResult<E> {
        if *entry.status() != EntryStatus::Recorded {
            return Err(DomainError::invalid_state(
                "only freshly recorded entries can be appended",
            ));
        }

        let mut journal = self.inner.write().map_err(|_| poisoned())?;
        if journal.positions.contains_key(entry.id()) {
            return Err(DomainError::conflict(format!(
                "{} {:?} already recorded",
                E::KIND,
                entry.id()
            )));
        }

        let position = journal.entries.len();
        journal.positions.insert(entry.id().clone(), position);
        journal.entries.push(entry.clone());
        Ok(entry)
    }

    fn get(&self, id: &E::Id) -> DomainResult<E> {
        let journal = self.inner.read().map_err(|_| poisoned())?;
        journal
            .positions
            .get(id)
            .map(|&pos| journal.entries[pos].clone())
            .ok_or(DomainError::NotFound)
    }

    fn list(&self) -> DomainResult<Vec<E>> {
        let journal = self.inner.read().map_err(|_| poisoned())?;
        Ok(journal.entries.clone())
    }

    fn transition(&self, id: &E::Id, next: EntryStatus) -> DomainResult<E> {
        let mut journal = self.inner.write().map_err(|_| poisoned())?;
        let pos = *journal.positions.get(id).ok_or(DomainError::NotFound)?;

        let entry = &mut journal.entries[pos];
        let status = entry.status().advance(next)?;
        entry.set_status(status);
        Ok(entry.clone())
    }
}
