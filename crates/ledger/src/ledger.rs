use std::marker::PhantomData;

use stockledger_core::{DomainError, DomainResult, ProductId};

use crate::entry::{EntryStatus, LedgerEntry};
use crate::store::{InMemoryLedgerStore, LedgerStore};

/// A ledger of one entry kind over some storage.
///
/// Recording is specific to the entry kind (see `DeliveryLedger::record`
/// and `PickLedger::record`); everything else is shared here. A ledger never
/// touches stock: it only keeps the records that explain stock changes.
#[derive(Debug)]
pub struct Ledger<E, S = InMemoryLedgerStore<E>>
where
    E: LedgerEntry,
{
    store: S,
    _entry: PhantomData<fn() -> E>,
}

impl<E: LedgerEntry> Ledger<E, InMemoryLedgerStore<E>> {
    pub fn in_memory() -> Self {
        Self::new(InMemoryLedgerStore::new())
    }
}

impl<E: LedgerEntry> Default for Ledger<E, InMemoryLedgerStore<E>> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<E, S> Ledger<E, S>
where
    E: LedgerEntry,
    S: LedgerStore<E>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _entry: PhantomData,
        }
    }

    pub(crate) fn append(&self, entry: E) -> DomainResult<E> {
        let entry = self.store.append(entry)?;
        tracing::debug!(
            kind = E::KIND,
            entry_id = ?entry.id(),
            product_id = %entry.product_id(),
            amount = entry.amount(),
            "ledger entry recorded"
        );
        Ok(entry)
    }

    pub fn get(&self, id: &E::Id) -> DomainResult<E> {
        self.store.get(id)
    }

    /// Every entry, in recording order, whatever its status.
    pub fn list(&self) -> DomainResult<Vec<E>> {
        self.store.list()
    }

    pub fn list_for(&self, product_id: &ProductId) -> DomainResult<Vec<E>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|e| e.product_id() == product_id)
            .collect())
    }

    /// `Recorded → Applied`: the stock change this entry describes happened.
    pub fn mark_applied(&self, id: &E::Id) -> DomainResult<E> {
        self.store.transition(id, EntryStatus::Applied)
    }

    /// `Recorded → Rejected`: the stock change never happened; the entry stays
    /// in the ledger as void and is excluded from totals.
    pub fn reject(&self, id: &E::Id, reason: impl Into<String>) -> DomainResult<E> {
        self.store.transition(id, EntryStatus::rejected(reason))
    }

    /// Sum of applied amounts for one product.
    ///
    /// `InvalidState` if the total no longer fits in an `i64`.
    pub fn applied_total(&self, product_id: &ProductId) -> DomainResult<i64> {
        self.store
            .list()?
            .iter()
            .filter(|e| e.product_id() == product_id && e.status().counts_toward_stock())
            .try_fold(0i64, |total, e| total.checked_add(e.amount()))
            .ok_or_else(|| {
                DomainError::invalid_state(format!("{} total for {product_id} overflows", E::KIND))
            })
    }
}
