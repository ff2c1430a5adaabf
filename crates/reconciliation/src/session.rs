//! Caller-side product cache.
//!
//! A session seeds its product list with a single `products()` call when it
//! opens and pulls a fresh snapshot after every commit it makes. Nothing is
//! pushed to it, and no mutable state is shared with other sessions.

use chrono::{DateTime, NaiveDate, Utc};

use stockledger_core::{DomainResult, ProductId};
use stockledger_ledger::{Delivery, LedgerStore, Pick};
use stockledger_products::{Product, ProductStore};

use crate::service::ReconciliationService;

#[derive(Debug)]
pub struct StockSession<'a, P, D, K>
where
    D: LedgerStore<Delivery>,
    K: LedgerStore<Pick>,
{
    service: &'a ReconciliationService<P, D, K>,
    products: Vec<Product>,
    refreshed_at: DateTime<Utc>,
}

impl<'a, P, D, K> StockSession<'a, P, D, K>
where
    P: ProductStore,
    D: LedgerStore<Delivery>,
    K: LedgerStore<Pick>,
{
    pub fn open(service: &'a ReconciliationService<P, D, K>) -> DomainResult<Self> {
        Ok(Self {
            service,
            products: service.products()?,
            refreshed_at: Utc::now(),
        })
    }

    /// Products as of the last refresh.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id_typed() == id)
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    pub fn refresh(&mut self) -> DomainResult<()> {
        self.products = self.service.products()?;
        self.refreshed_at = Utc::now();
        Ok(())
    }

    /// Commit a delivery, then re-pull products whatever the outcome.
    pub fn commit_delivery(
        &mut self,
        product_id: &ProductId,
        amount: i64,
        delivery_date: NaiveDate,
        comment: impl Into<String>,
    ) -> DomainResult<Product> {
        let outcome = self
            .service
            .commit_delivery(product_id, amount, delivery_date, comment);
        self.refresh()?;
        outcome
    }

    /// Commit a pick, then re-pull products whatever the outcome.
    pub fn commit_pick(
        &mut self,
        product_id: &ProductId,
        amount: i64,
        comment: impl Into<String>,
    ) -> DomainResult<Product> {
        let outcome = self.service.commit_pick(product_id, amount, comment);
        self.refresh()?;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockledger_core::DomainError;

    fn pid(s: &str) -> ProductId {
        ProductId::new(s).unwrap()
    }

    #[test]
    fn snapshot_is_pulled_after_commits_only() {
        let service = ReconciliationService::in_memory();
        service.register_product(pid("p1"), "Widget", 10).unwrap();

        let mut session = StockSession::open(&service).unwrap();
        assert_eq!(session.product(&pid("p1")).unwrap().stock(), 10);

        // Changes made elsewhere are not visible until the next pull.
        service.commit_pick(&pid("p1"), 1, "counter sale").unwrap();
        assert_eq!(session.product(&pid("p1")).unwrap().stock(), 10);

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        session
            .commit_delivery(&pid("p1"), 5, date, "restock")
            .unwrap();
        assert_eq!(session.product(&pid("p1")).unwrap().stock(), 14);
    }

    #[test]
    fn failed_commit_still_refreshes() {
        let service = ReconciliationService::in_memory();
        service.register_product(pid("p1"), "Widget", 3).unwrap();
        let mut session = StockSession::open(&service).unwrap();

        service.register_product(pid("p2"), "Gadget", 1).unwrap();
        let before = session.refreshed_at();

        let err = session.commit_pick(&pid("p1"), 9, "order").unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(9, 3));
        assert_eq!(session.products().len(), 2);
        assert!(session.refreshed_at() >= before);
    }
}
