//! Reconciliation Service: makes "record event" and "change stock" one step.
//!
//! ```text
//! commit_delivery / commit_pick
//!   ↓
//! 1. Fetch product (NotFound)
//!   ↓
//! 2. Validate (Validation, InsufficientStock for picks); nothing written yet
//!   ↓
//! 3. Record ledger entry                         Proposed → Recorded
//!   ↓
//! 4. Product store adjust_stock (atomic guard)
//!   ├─ ok  → mark entry Applied                  Recorded → Applied
//!   └─ err → mark entry Rejected, surface error  Recorded → Rejected
//! ```
//!
//! Every commit runs to one of the two terminal states before returning, so
//! summing applied ledger entries always explains the product store's stock.
//! Once stock has moved the commit succeeds; a ledger store that then fails to
//! record `Applied` is logged at `error` and leaves the entry `Recorded`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, ProductId};
use stockledger_ledger::{
    ensure_positive_amount, Delivery, DeliveryLedger, InMemoryLedgerStore, Ledger, LedgerEntry,
    LedgerStore, Pick, PickLedger,
};
use stockledger_products::{
    InMemoryProductStore, OptimisticProductStore, Product, ProductStore, VersionedProductBackend,
};

use crate::config::ReconciliationConfig;

/// Point-in-time comparison of a product's stock with its ledgers.
///
/// `opening_balance` is whatever stock the applied ledger entries do not
/// explain, i.e. what the product was registered with. It never changes as
/// deliveries and picks are committed. Read while commits are in flight it may
/// be momentarily off by one in-progress entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAudit {
    pub product_id: ProductId,
    pub stock: i64,
    pub delivered: i64,
    pub picked: i64,
    pub opening_balance: i64,
}

impl StockAudit {
    /// Net movement recorded by applied ledger entries.
    pub fn ledger_movement(&self) -> i64 {
        self.delivered - self.picked
    }
}

/// Façade used by callers to move stock.
#[derive(Debug)]
pub struct ReconciliationService<
    P,
    D = InMemoryLedgerStore<Delivery>,
    K = InMemoryLedgerStore<Pick>,
> where
    D: LedgerStore<Delivery>,
    K: LedgerStore<Pick>,
{
    products: P,
    deliveries: DeliveryLedger<D>,
    picks: PickLedger<K>,
}

impl ReconciliationService<InMemoryProductStore> {
    /// Everything in memory, with per-product locking.
    pub fn in_memory() -> Self {
        Self::new(
            InMemoryProductStore::new(),
            DeliveryLedger::in_memory(),
            PickLedger::in_memory(),
        )
    }
}

impl<B: VersionedProductBackend> ReconciliationService<OptimisticProductStore<B>> {
    /// Products on a compare-and-set backend, retried per `config.retry`.
    pub fn with_backend(backend: B, config: &ReconciliationConfig) -> Self {
        Self::new(
            OptimisticProductStore::new(backend, config.retry.clone()),
            DeliveryLedger::in_memory(),
            PickLedger::in_memory(),
        )
    }
}

impl<P, D, K> ReconciliationService<P, D, K>
where
    P: ProductStore,
    D: LedgerStore<Delivery>,
    K: LedgerStore<Pick>,
{
    pub fn new(products: P, deliveries: DeliveryLedger<D>, picks: PickLedger<K>) -> Self {
        Self {
            products,
            deliveries,
            picks,
        }
    }

    pub fn product_store(&self) -> &P {
        &self.products
    }

    pub fn delivery_ledger(&self) -> &DeliveryLedger<D> {
        &self.deliveries
    }

    pub fn pick_ledger(&self) -> &PickLedger<K> {
        &self.picks
    }

    /// Register a product with its opening stock.
    pub fn register_product(
        &self,
        id: ProductId,
        name: impl Into<String>,
        opening_stock: i64,
    ) -> DomainResult<Product> {
        let product = self.products.insert(Product::new(id, name, opening_stock)?)?;
        tracing::info!(
            product_id = %product.id_typed(),
            stock = product.stock(),
            "product registered"
        );
        Ok(product)
    }

    /// Take a product out of the catalogue. Its ledger history is kept.
    pub fn retire_product(&self, id: &ProductId) -> DomainResult<Product> {
        let product = self.products.remove(id)?;
        tracing::info!(product_id = %id, stock = product.stock(), "product retired");
        Ok(product)
    }

    pub fn products(&self) -> DomainResult<Vec<Product>> {
        self.products.list()
    }

    pub fn product(&self, id: &ProductId) -> DomainResult<Product> {
        self.products.get(id)
    }

    pub fn deliveries(&self) -> DomainResult<Vec<Delivery>> {
        self.deliveries.list()
    }

    pub fn picks(&self) -> DomainResult<Vec<Pick>> {
        self.picks.list()
    }

    /// Record a delivery and add its amount to the product's stock.
    ///
    /// - `NotFound` if the product is unknown
    /// - `Validation` for a non-positive amount or blank comment (nothing written)
    ///
    /// If the stock adjustment fails after the delivery was recorded (e.g. the
    /// product was retired concurrently), the delivery is rejected and the
    /// adjustment error returned.
    pub fn commit_delivery(
        &self,
        product_id: &ProductId,
        amount: i64,
        delivery_date: NaiveDate,
        comment: impl Into<String>,
    ) -> DomainResult<Product> {
        self.products.get(product_id)?;

        let delivery = self
            .deliveries
            .record(product_id, amount, delivery_date, comment)?;

        self.apply(&self.deliveries, delivery)
    }

    /// Record a pick and remove its amount from the product's stock.
    ///
    /// - `NotFound` if the product is unknown
    /// - `Validation` for a non-positive amount
    /// - `InsufficientStock` if the amount exceeds current stock; checked
    ///   before anything is recorded
    /// - `InvalidState` if a concurrent pick drained the stock between the
    ///   check and the adjustment; the pick is rejected
    pub fn commit_pick(
        &self,
        product_id: &ProductId,
        amount: i64,
        comment: impl Into<String>,
    ) -> DomainResult<Product> {
        let product = self.products.get(product_id)?;

        ensure_positive_amount(amount)?;
        if amount > product.stock() {
            tracing::info!(
                product_id = %product_id,
                requested = amount,
                available = product.stock(),
                "pick refused: insufficient stock"
            );
            return Err(DomainError::insufficient_stock(amount, product.stock()));
        }

        let pick = self.picks.record(product_id, amount, comment)?;

        self.apply(&self.picks, pick)
    }

    /// Drive a recorded entry to `Applied` or `Rejected`.
    fn apply<E, S>(&self, ledger: &Ledger<E, S>, entry: E) -> DomainResult<Product>
    where
        E: LedgerEntry,
        S: LedgerStore<E>,
    {
        match self
            .products
            .adjust_stock(entry.product_id(), entry.stock_delta())
        {
            Ok(product) => {
                // Stock has moved; the commit stands even if the ledger lags.
                if let Err(mark_err) = ledger.mark_applied(entry.id()) {
                    tracing::error!(
                        kind = E::KIND,
                        entry_id = ?entry.id(),
                        product_id = %product.id_typed(),
                        error = %mark_err,
                        "failed to mark ledger entry applied"
                    );
                }
                tracing::info!(
                    kind = E::KIND,
                    entry_id = ?entry.id(),
                    product_id = %product.id_typed(),
                    amount = entry.amount(),
                    stock = product.stock(),
                    "commit applied"
                );
                Ok(product)
            }
            Err(err) => {
                tracing::warn!(
                    kind = E::KIND,
                    entry_id = ?entry.id(),
                    product_id = %entry.product_id(),
                    amount = entry.amount(),
                    error = %err,
                    "commit rejected; voiding ledger entry"
                );
                if let Err(void_err) = ledger.reject(entry.id(), err.to_string()) {
                    tracing::error!(
                        kind = E::KIND,
                        entry_id = ?entry.id(),
                        error = %void_err,
                        "failed to void ledger entry"
                    );
                }
                Err(err)
            }
        }
    }

    pub fn audit(&self, product_id: &ProductId) -> DomainResult<StockAudit> {
        let product = self.products.get(product_id)?;
        self.audit_product(&product)
    }

    pub fn audit_all(&self) -> DomainResult<Vec<StockAudit>> {
        self.products
            .list()?
            .iter()
            .map(|p| self.audit_product(p))
            .collect()
    }

    fn audit_product(&self, product: &Product) -> DomainResult<StockAudit> {
        let id = product.id_typed();
        let delivered = self.deliveries.applied_total(id)?;
        let picked = self.picks.applied_total(id)?;
        let opening_balance = product
            .stock()
            .checked_sub(delivered)
            .and_then(|v| v.checked_add(picked))
            .ok_or_else(|| {
                DomainError::invalid_state(format!("opening balance of {id} out of range"))
            })?;
        Ok(StockAudit {
            product_id: id.clone(),
            stock: product.stock(),
            delivered,
            picked,
            opening_balance,
        })
    }
}
