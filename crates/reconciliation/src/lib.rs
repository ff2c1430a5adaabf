//! Reconciliation Service.
//!
//! The only entry point callers need for moving stock: it pairs every ledger
//! record with the product store adjustment it describes, and offers the
//! read side (product snapshots, ledgers, audits) that callers pull from.

pub mod config;
pub mod script;
pub mod service;
pub mod session;

pub use config::ReconciliationConfig;
pub use service::{ReconciliationService, StockAudit};
pub use session::StockSession;
