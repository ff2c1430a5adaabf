//! Delivery and Pick ledgers.
//!
//! Append-only records of stock movements. Ledgers validate and keep records;
//! they never change stock themselves. The reconciliation service pairs each
//! record with the matching product store adjustment and then moves the
//! record to `Applied` or `Rejected`.

pub mod delivery;
pub mod entry;
pub mod ledger;
pub mod pick;
pub mod store;

pub use delivery::{Delivery, DeliveryLedger, NewDelivery};
pub use entry::{ensure_positive_amount, EntryStatus, LedgerEntry};
pub use ledger::Ledger;
pub use pick::{NewPick, Pick, PickLedger};
pub use store::{InMemoryLedgerStore, LedgerStore};
