use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainResult, Entity, PickId, ProductId};

use crate::entry::{ensure_positive_amount, EntryStatus, LedgerEntry};
use crate::ledger::Ledger;
use crate::store::{InMemoryLedgerStore, LedgerStore};

/// Outgoing stock for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    id: PickId,
    product_id: ProductId,
    amount: i64,
    comment: String,
    picked_at: DateTime<Utc>,
    status: EntryStatus,
}

impl Pick {
    pub fn id_typed(&self) -> PickId {
        self.id
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn picked_at(&self) -> DateTime<Utc> {
        self.picked_at
    }
}

impl Entity for Pick {
    type Id = PickId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl LedgerEntry for Pick {
    const KIND: &'static str = "pick";

    fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    fn amount(&self) -> i64 {
        self.amount
    }

    fn stock_delta(&self) -> i64 {
        -self.amount
    }

    fn status(&self) -> &EntryStatus {
        &self.status
    }

    fn set_status(&mut self, status: EntryStatus) {
        self.status = status;
    }
}

/// A proposed pick, not yet recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPick {
    pub product_id: ProductId,
    pub amount: i64,
    pub comment: String,
}

impl NewPick {
    /// Shape checks only. Whether enough stock exists is decided against the
    /// product store, not here.
    pub fn validate(&self) -> DomainResult<()> {
        ensure_positive_amount(self.amount)
    }
}

/// Ledger of outgoing stock.
pub type PickLedger<S = InMemoryLedgerStore<Pick>> = Ledger<Pick, S>;

impl<S: LedgerStore<Pick>> Ledger<Pick, S> {
    /// Validate and append a pick in status `Recorded`. Stock is not touched.
    pub fn record(
        &self,
        product_id: &ProductId,
        amount: i64,
        comment: impl Into<String>,
    ) -> DomainResult<Pick> {
        let proposal = NewPick {
            product_id: product_id.clone(),
            amount,
            comment: comment.into(),
        };
        proposal.validate()?;

        self.append(Pick {
            id: PickId::new(),
            product_id: proposal.product_id,
            amount: proposal.amount,
            comment: proposal.comment,
            picked_at: Utc::now(),
            status: EntryStatus::Recorded,
        })
    }
}
