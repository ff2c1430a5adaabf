//! Product Store.
//!
//! Owns the canonical product list and is the only place stock levels change.
//! `InMemoryProductStore` serializes mutations per product; the optimistic
//! adapter provides the same contract over compare-and-set backends.

pub mod optimistic;
pub mod product;
pub mod retry;
pub mod store;

pub use optimistic::{OptimisticProductStore, VersionedProductBackend};
pub use product::Product;
pub use retry::{BackoffStrategy, RetryPolicy};
pub use store::{InMemoryProductStore, ProductStore};
