use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Entity, ProductId, Versioned};

/// A stocked product.
///
/// `stock` is never negative for a product handed out by a store. Values are
/// snapshots: mutating stock goes through a `ProductStore`, which produces a
/// new snapshot via [`Product::with_stock_adjusted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    stock: i64,
    #[serde(default)]
    version: u64,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, stock: i64) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if stock < 0 {
            return Err(DomainError::validation("opening stock cannot be negative"));
        }
        Ok(Self {
            id,
            name,
            stock,
            version: 0,
        })
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    /// Decide the next snapshot for `stock += delta`.
    ///
    /// Pure: `self` is left untouched. Fails with `InvalidState` if the result
    /// would be negative, which is the guard every store must apply inside
    /// its critical section.
    pub fn with_stock_adjusted(&self, delta: i64) -> DomainResult<Self> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }
        let new_stock = self
            .stock
            .checked_add(delta)
            .ok_or_else(|| DomainError::invalid_state("stock overflow"))?;
        self.with_stock(new_stock)
    }

    /// Snapshot with an absolute stock level and the next version.
    pub fn with_stock(&self, new_stock: i64) -> DomainResult<Self> {
        if new_stock < 0 {
            return Err(DomainError::invalid_state(format!(
                "stock cannot go negative (product {}, current {}, requested {})",
                self.id, self.stock, new_stock
            )));
        }
        Ok(Self {
            id: self.id.clone(),
            name: self.name.clone(),
            stock: new_stock,
            version: self.version + 1,
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Versioned for Product {
    fn version(&self) -> u64 {
        self.version
    }
}
