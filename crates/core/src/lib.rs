//! `stockledger-core`: shared domain building blocks.
//!
//! Error taxonomy, identifiers and concurrency primitives used by the product
//! store, the ledgers and the reconciliation service. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod version;

pub use entity::{Entity, Versioned};
pub use error::{DomainError, DomainResult};
pub use id::{DeliveryId, PickId, ProductId};
pub use version::ExpectedVersion;
