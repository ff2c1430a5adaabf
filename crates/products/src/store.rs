//! Product Store: the canonical owner of stock levels.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use stockledger_core::{DomainError, DomainResult, ExpectedVersion, ProductId, Versioned};

use crate::optimistic::VersionedProductBackend;
use crate::product::Product;

/// Product Store contract.
///
/// `adjust_stock` is the only operation in the system allowed to change a
/// product's stock. It must behave as a single atomic check-and-set: read,
/// verify the result is non-negative, write, with no observable intermediate
/// state.
pub trait ProductStore: Send + Sync {
    /// Register a product. Fails with `Conflict` if the id is taken.
    fn insert(&self, product: Product) -> DomainResult<Product>;

    /// Current snapshot of one product.
    fn get(&self, id: &ProductId) -> DomainResult<Product>;

    /// Current snapshot of every product.
    fn list(&self) -> DomainResult<Vec<Product>>;

    /// Apply `stock += delta` atomically and return the updated product.
    ///
    /// - `NotFound` if no product has this id
    /// - `InvalidState` if the result would be negative (nothing is written)
    fn adjust_stock(&self, id: &ProductId, delta: i64) -> DomainResult<Product>;

    /// Deregister a product. In-flight adjustments against it fail with
    /// `NotFound`.
    fn remove(&self, id: &ProductId) -> DomainResult<Product>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn insert(&self, product: Product) -> DomainResult<Product> {
        (**self).insert(product)
    }

    fn get(&self, id: &ProductId) -> DomainResult<Product> {
        (**self).get(id)
    }

    fn list(&self) -> DomainResult<Vec<Product>> {
        (**self).list()
    }

    fn adjust_stock(&self, id: &ProductId, delta: i64) -> DomainResult<Product> {
        (**self).adjust_stock(id, delta)
    }

    fn remove(&self, id: &ProductId) -> DomainResult<Product> {
        (**self).remove(id)
    }
}

#[derive(Debug)]
struct Row {
    product: Product,
    removed: bool,
}

type SharedRow = Arc<Mutex<Row>>;

/// In-memory product store with one critical section per product.
///
/// The map lock is only held long enough to find a row; all stock changes
/// happen under that row's own mutex. Adjustments to different products never
/// wait on each other, adjustments to the same product serialize.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    rows: RwLock<HashMap<ProductId, SharedRow>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with products (e.g. at process start).
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> DomainResult<Self> {
        let store = Self::new();
        for product in products {
            store.insert(product)?;
        }
        Ok(store)
    }

    fn row(&self, id: &ProductId) -> DomainResult<SharedRow> {
        let rows = self
            .rows
            .read()
            .map_err(|_| DomainError::invalid_state("product map lock poisoned"))?;
        rows.get(id).cloned().ok_or(DomainError::NotFound)
    }

    fn lock(row: &Mutex<Row>) -> DomainResult<MutexGuard<'_, Row>> {
        row.lock()
            .map_err(|_| DomainError::invalid_state("product row lock poisoned"))
    }

    /// Run `mutate` inside the row's critical section and store its result.
    fn update_row(
        &self,
        id: &ProductId,
        mutate: impl FnOnce(&Product) -> DomainResult<Product>,
    ) -> DomainResult<Product> {
        let row = self.row(id)?;
        let mut guard = Self::lock(&row)?;
        if guard.removed {
            return Err(DomainError::NotFound);
        }
        let next = mutate(&guard.product)?;
        guard.product = next.clone();
        Ok(next)
    }
}

impl ProductStore for InMemoryProductStore {
    fn insert(&self, product: Product) -> DomainResult<Product> {
        if product.stock() < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }

        let mut rows = self
            .rows
            .write()
            .map_err(|_| DomainError::invalid_state("product map lock poisoned"))?;

        let id = product.id_typed().clone();
        if rows.contains_key(&id) {
            return Err(DomainError::conflict(format!("product {id} already exists")));
        }

        rows.insert(
            id,
            Arc::new(Mutex::new(Row {
                product: product.clone(),
                removed: false,
            })),
        );
        Ok(product)
    }

    fn get(&self, id: &ProductId) -> DomainResult<Product> {
        let row = self.row(id)?;
        let guard = Self::lock(&row)?;
        if guard.removed {
            return Err(DomainError::NotFound);
        }
        Ok(guard.product.clone())
    }

    fn list(&self) -> DomainResult<Vec<Product>> {
        let rows: Vec<SharedRow> = {
            let map = self
                .rows
                .read()
                .map_err(|_| DomainError::invalid_state("product map lock poisoned"))?;
            map.values().cloned().collect()
        };

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let guard = Self::lock(&row)?;
            if !guard.removed {
                products.push(guard.product.clone());
            }
        }
        products.sort_by(|a, b| a.id_typed().cmp(b.id_typed()));
        Ok(products)
    }

    fn adjust_stock(&self, id: &ProductId, delta: i64) -> DomainResult<Product> {
        self.update_row(id, |current| current.with_stock_adjusted(delta))
    }

    fn remove(&self, id: &ProductId) -> DomainResult<Product> {
        let row = {
            let mut rows = self
                .rows
                .write()
                .map_err(|_| DomainError::invalid_state("product map lock poisoned"))?;
            rows.remove(id).ok_or(DomainError::NotFound)?
        };

        let mut guard = Self::lock(&row)?;
        guard.removed = true;
        Ok(guard.product.clone())
    }
}

impl VersionedProductBackend for InMemoryProductStore {
    fn load(&self, id: &ProductId) -> DomainResult<Product> {
        self.get(id)
    }

    fn load_all(&self) -> DomainResult<Vec<Product>> {
        self.list()
    }

    fn create(&self, product: Product) -> DomainResult<Product> {
        self.insert(product)
    }

    fn compare_and_set(
        &self,
        id: &ProductId,
        expected: ExpectedVersion,
        new_stock: i64,
    ) -> DomainResult<Product> {
        self.update_row(id, |current| {
            expected.check(current.version())?;
            current.with_stock(new_stock)
        })
    }

    fn delete(&self, id: &ProductId) -> DomainResult<Product> {
        self.remove(id)
    }
}
