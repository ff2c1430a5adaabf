use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DeliveryId, DomainError, DomainResult, Entity, ProductId};

use crate::entry::{ensure_positive_amount, EntryStatus, LedgerEntry};
use crate::ledger::Ledger;
use crate::store::{InMemoryLedgerStore, LedgerStore};

/// Incoming stock for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    id: DeliveryId,
    product_id: ProductId,
    amount: i64,
    delivery_date: NaiveDate,
    comment: String,
    recorded_at: DateTime<Utc>,
    status: EntryStatus,
}

impl Delivery {
    pub fn id_typed(&self) -> DeliveryId {
        self.id
    }

    /// Calendar date the goods were received.
    pub fn delivery_date(&self) -> NaiveDate {
        self.delivery_date
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

impl Entity for Delivery {
    type Id = DeliveryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl LedgerEntry for Delivery {
    const KIND: &'static str = "delivery";

    fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    fn amount(&self) -> i64 {
        self.amount
    }

    fn stock_delta(&self) -> i64 {
        self.amount
    }

    fn status(&self) -> &EntryStatus {
        &self.status
    }

    fn set_status(&mut self, status: EntryStatus) {
        self.status = status;
    }
}

/// A proposed delivery, not yet recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDelivery {
    pub product_id: ProductId,
    pub amount: i64,
    pub delivery_date: NaiveDate,
    pub comment: String,
}

impl NewDelivery {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_positive_amount(self.amount)?;
        if self.comment.trim().is_empty() {
            return Err(DomainError::validation("delivery comment is required"));
        }
        Ok(())
    }

    fn into_recorded(self, recorded_at: DateTime<Utc>) -> Delivery {
        Delivery {
            id: DeliveryId::new(),
            product_id: self.product_id,
            amount: self.amount,
            delivery_date: self.delivery_date,
            comment: self.comment,
            recorded_at,
            status: EntryStatus::Recorded,
        }
    }
}

/// Ledger of incoming stock.
pub type DeliveryLedger<S = InMemoryLedgerStore<Delivery>> = Ledger<Delivery, S>;

impl<S: LedgerStore<Delivery>> Ledger<Delivery, S> {
    /// Validate and append a delivery in status `Recorded`.
    ///
    /// Fails with `Validation` for a non-positive amount or a blank comment;
    /// nothing is stored in that case. Stock is not touched.
    pub fn record(
        &self,
        product_id: &ProductId,
        amount: i64,
        delivery_date: NaiveDate,
        comment: impl Into<String>,
    ) -> DomainResult<Delivery> {
        let proposal = NewDelivery {
            product_id: product_id.clone(),
            amount,
            delivery_date,
            comment: comment.into(),
        };
        proposal.validate()?;
        self.append(proposal.into_recorded(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::new(s).unwrap()
    }

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn record_appends_in_recorded_state() {
        let ledger = DeliveryLedger::in_memory();
        let d = ledger.record(&pid("p1"), 5, jan_first(), "restock").unwrap();

        assert_eq!(d.amount(), 5);
        assert_eq!(d.stock_delta(), 5);
        assert_eq!(d.delivery_date(), jan_first());
        assert_eq!(d.comment(), "restock");
        assert_eq!(*d.status(), EntryStatus::Recorded);
        assert_eq!(ledger.get(&d.id_typed()).unwrap(), d);
    }

    #[test]
    fn record_rejects_non_positive_amounts_without_storing() {
        let ledger = DeliveryLedger::in_memory();
        for amount in [0, -1] {
            let err = ledger
                .record(&pid("p1"), amount, jan_first(), "restock")
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
        assert!(ledger.list().unwrap().is_empty());
    }

    #[test]
    fn record_requires_a_comment() {
        let ledger = DeliveryLedger::in_memory();
        let err = ledger.record(&pid("p1"), 3, jan_first(), "  ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(ledger.list().unwrap().is_empty());
    }

    #[test]
    fn applied_total_ignores_recorded_and_rejected_entries() {
        let ledger = DeliveryLedger::in_memory();
        let a = ledger.record(&pid("p1"), 5, jan_first(), "a").unwrap();
        let b = ledger.record(&pid("p1"), 7, jan_first(), "b").unwrap();
        let _pending = ledger.record(&pid("p1"), 11, jan_first(), "c").unwrap();
        let other = ledger.record(&pid("p2"), 13, jan_first(), "d").unwrap();

        ledger.mark_applied(&a.id_typed()).unwrap();
        ledger.reject(&b.id_typed(), "product removed").unwrap();
        ledger.mark_applied(&other.id_typed()).unwrap();

        assert_eq!(ledger.applied_total(&pid("p1")).unwrap(), 5);
        assert_eq!(ledger.applied_total(&pid("p2")).unwrap(), 13);
        assert_eq!(ledger.list_for(&pid("p1")).unwrap().len(), 3);
        assert_eq!(ledger.list().unwrap().len(), 4);
    }

    #[test]
    fn applied_entries_cannot_be_rejected_later() {
        let ledger = DeliveryLedger::in_memory();
        let d = ledger.record(&pid("p1"), 5, jan_first(), "restock").unwrap();
        ledger.mark_applied(&d.id_typed()).unwrap();

        let err = ledger.reject(&d.id_typed(), "too late").unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(*ledger.get(&d.id_typed()).unwrap().status(), EntryStatus::Applied);
    }

    #[test]
    fn unknown_entry_is_not_found() {
        let ledger = DeliveryLedger::in_memory();
        assert_eq!(
            ledger.mark_applied(&DeliveryId::new()).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn serializes_dates_as_calendar_days() {
        let ledger = DeliveryLedger::in_memory();
        let d = ledger.record(&pid("p1"), 5, jan_first(), "restock").unwrap();

        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["delivery_date"], "2024-01-01");
        assert_eq!(json["product_id"], "p1");
        assert_eq!(json["status"]["state"], "recorded");
    }
}
