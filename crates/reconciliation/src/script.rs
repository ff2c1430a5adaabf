//! Batch replay of stock operations.
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   { "op": "register", "product_id": "p1", "name": "Widget", "stock": 10 },
//!   { "op": "deliver", "product_id": "p1", "amount": 5, "date": "2024-01-01", "comment": "restock" },
//!   { "op": "pick", "product_id": "p1", "amount": 20, "comment": "order" }
//! ]
//! ```
//!
//! Rejected steps are reported and the run continues, the same way an
//! interactive caller shows a message and lets the user try again.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, ProductId};
use stockledger_ledger::{Delivery, LedgerStore, Pick};
use stockledger_products::{Product, ProductStore};

use crate::service::{ReconciliationService, StockAudit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Register {
        product_id: ProductId,
        name: String,
        #[serde(default)]
        stock: i64,
    },
    Deliver {
        product_id: ProductId,
        amount: i64,
        date: NaiveDate,
        comment: String,
    },
    Pick {
        product_id: ProductId,
        amount: i64,
        #[serde(default)]
        comment: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Applied { product: Product },
    Rejected { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: usize,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub steps: Vec<StepReport>,
    pub products: Vec<Product>,
    pub audit: Vec<StockAudit>,
}

impl ScriptReport {
    pub fn rejected(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Rejected { .. }))
            .count()
    }
}

/// Run every step against `service` and summarize the final state.
pub fn run<P, D, K>(
    service: &ReconciliationService<P, D, K>,
    steps: impl IntoIterator<Item = ScriptStep>,
) -> Result<ScriptReport, DomainError>
where
    P: ProductStore,
    D: LedgerStore<Delivery>,
    K: LedgerStore<Pick>,
{
    let steps = steps
        .into_iter()
        .enumerate()
        .map(|(idx, step)| {
            let result = match step {
                ScriptStep::Register {
                    product_id,
                    name,
                    stock,
                } => service.register_product(product_id, name, stock),
                ScriptStep::Deliver {
                    product_id,
                    amount,
                    date,
                    comment,
                } => service.commit_delivery(&product_id, amount, date, comment),
                ScriptStep::Pick {
                    product_id,
                    amount,
                    comment,
                } => service.commit_pick(&product_id, amount, comment),
            };
            StepReport {
                step: idx + 1,
                outcome: match result {
                    Ok(product) => StepOutcome::Applied { product },
                    Err(err) => StepOutcome::Rejected {
                        error: err.to_string(),
                    },
                },
            }
        })
        .collect();

    Ok(ScriptReport {
        steps,
        products: service.products()?,
        audit: service.audit_all()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"[
        { "op": "register", "product_id": "p1", "name": "Widget", "stock": 10 },
        { "op": "deliver", "product_id": "p1", "amount": 5, "date": "2024-01-01", "comment": "restock" },
        { "op": "pick", "product_id": "p1", "amount": 20, "comment": "order" },
        { "op": "pick", "product_id": "p1", "amount": 0 }
    ]"#;

    #[test]
    fn replays_and_reports_rejections() {
        let steps: Vec<ScriptStep> = serde_json::from_str(SCRIPT).unwrap();
        let service = ReconciliationService::in_memory();

        let report = run(&service, steps).unwrap();

        assert_eq!(report.steps.len(), 4);
        assert_eq!(report.rejected(), 2);
        assert_eq!(report.products[0].stock(), 15);
        assert_eq!(report.audit[0].opening_balance, 10);
        match &report.steps[2].outcome {
            StepOutcome::Rejected { error } => assert!(error.starts_with("insufficient stock")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn report_serializes_flat_step_outcomes() {
        let steps: Vec<ScriptStep> = serde_json::from_str(SCRIPT).unwrap();
        let service = ReconciliationService::in_memory();
        let report = run(&service, steps).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0]["outcome"], "applied");
        assert_eq!(json["steps"][0]["step"], 1);
        assert_eq!(json["steps"][3]["outcome"], "rejected");
    }

    #[test]
    fn unknown_ops_fail_to_parse() {
        let bad = r#"[{ "op": "teleport", "product_id": "p1" }]"#;
        assert!(serde_json::from_str::<Vec<ScriptStep>>(bad).is_err());
    }
}
