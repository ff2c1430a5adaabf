//! Product Store over a versioned (possibly remote) backend.
//!
//! Backends that cannot hold a lock across read and write instead offer a
//! compare-and-set keyed on the row version. `OptimisticProductStore` turns
//! that into the atomic `adjust_stock` contract by retrying on conflict.

use std::sync::Arc;

use stockledger_core::{DomainResult, ExpectedVersion, ProductId, Versioned};

use crate::product::Product;
use crate::retry::RetryPolicy;
use crate::store::ProductStore;

/// Storage that supports versioned reads and guarded writes.
pub trait VersionedProductBackend: Send + Sync {
    fn load(&self, id: &ProductId) -> DomainResult<Product>;

    fn load_all(&self) -> DomainResult<Vec<Product>>;

    fn create(&self, product: Product) -> DomainResult<Product>;

    /// Write `new_stock` only if the row is still at `expected`.
    ///
    /// - `Conflict` if the version moved (transient)
    /// - `InvalidState` if `new_stock` is negative
    /// - `NotFound` if the row is gone
    fn compare_and_set(
        &self,
        id: &ProductId,
        expected: ExpectedVersion,
        new_stock: i64,
    ) -> DomainResult<Product>;

    fn delete(&self, id: &ProductId) -> DomainResult<Product>;
}

impl<B> VersionedProductBackend for Arc<B>
where
    B: VersionedProductBackend + ?Sized,
{
    fn load(&self, id: &ProductId) -> DomainResult<Product> {
        (**self).load(id)
    }

    fn load_all(&self) -> DomainResult<Vec<Product>> {
        (**self).load_all()
    }

    fn create(&self, product: Product) -> DomainResult<Product> {
        (**self).create(product)
    }

    fn compare_and_set(
        &self,
        id: &ProductId,
        expected: ExpectedVersion,
        new_stock: i64,
    ) -> DomainResult<Product> {
        (**self).compare_and_set(id, expected, new_stock)
    }

    fn delete(&self, id: &ProductId) -> DomainResult<Product> {
        (**self).delete(id)
    }
}

/// `ProductStore` implemented with read / guard / compare-and-set retries.
#[derive(Debug)]
pub struct OptimisticProductStore<B> {
    backend: B,
    retry: RetryPolicy,
}

impl<B> OptimisticProductStore<B> {
    pub fn new(backend: B, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn into_inner(self) -> B {
        self.backend
    }
}

impl<B> ProductStore for OptimisticProductStore<B>
where
    B: VersionedProductBackend,
{
    fn insert(&self, product: Product) -> DomainResult<Product> {
        self.backend.create(product)
    }

    fn get(&self, id: &ProductId) -> DomainResult<Product> {
        self.backend.load(id)
    }

    fn list(&self) -> DomainResult<Vec<Product>> {
        self.backend.load_all()
    }

    fn adjust_stock(&self, id: &ProductId, delta: i64) -> DomainResult<Product> {
        let mut attempt = 0u32;
        loop {
            let current = self.backend.load(id)?;
            // Business-rule failures surface immediately; only the write races.
            let next = current.with_stock_adjusted(delta)?;

            match self.backend.compare_and_set(
                id,
                ExpectedVersion::Exact(current.version()),
                next.stock(),
            ) {
                Ok(updated) => return Ok(updated),
                Err(err) if err.is_transient() && self.retry.should_retry(attempt) => {
                    attempt += 1;
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::debug!(
                        product_id = %id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "stock adjustment conflicted; retrying"
                    );
                    std::thread::sleep(delay);
                }
                Err(err) => {
                    if err.is_transient() {
                        tracing::warn!(product_id = %id, attempts = attempt + 1, "stock adjustment retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }

    fn remove(&self, id: &ProductId) -> DomainResult<Product> {
        self.backend.delete(id)
    }
}
