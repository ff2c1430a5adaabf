//! Ledger entry lifecycle.

use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Entity, ProductId};

/// Lifecycle of a ledger entry.
///
/// ```text
/// Recorded ──► Applied            (stock was changed)
///     └──────► Rejected { reason } (stock was not changed; entry is void)
/// ```
///
/// Before it is recorded an entry only exists as a validated proposal
/// (`NewDelivery` / `NewPick`). Both terminal states are final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryStatus {
    Recorded,
    Applied,
    Rejected { reason: String },
}

impl EntryStatus {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Recorded)
    }

    /// Only applied entries explain the current stock level.
    pub fn counts_toward_stock(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Validate a lifecycle step and return the new status.
    pub fn advance(&self, next: EntryStatus) -> DomainResult<EntryStatus> {
        match (self, &next) {
            (Self::Recorded, Self::Applied) | (Self::Recorded, Self::Rejected { .. }) => Ok(next),
            _ => Err(DomainError::invalid_state(format!(
                "illegal ledger transition {self:?} -> {next:?}"
            ))),
        }
    }
}

/// An append-only record of a stock movement for a single product.
pub trait LedgerEntry: Entity + Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable name for logs (e.g. "delivery").
    const KIND: &'static str;

    fn product_id(&self) -> &ProductId;

    /// Units moved; always positive.
    fn amount(&self) -> i64;

    /// Signed effect on stock once applied.
    fn stock_delta(&self) -> i64;

    fn status(&self) -> &EntryStatus;

    /// Only ledger stores call this, after `EntryStatus::advance` accepted the step.
    fn set_status(&mut self, status: EntryStatus);
}

/// Shared amount rule for every ledger entry kind.
pub fn ensure_positive_amount(amount: i64) -> DomainResult<()> {
    if amount <= 0 {
        return Err(DomainError::validation(format!(
            "amount must be positive (got {amount})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_advances_to_either_terminal_state() {
        assert_eq!(
            EntryStatus::Recorded.advance(EntryStatus::Applied),
            Ok(EntryStatus::Applied)
        );
        assert!(
            EntryStatus::Recorded
                .advance(EntryStatus::rejected("race"))
                .unwrap()
                .is_terminal()
        );
    }

    #[test]
    fn terminal_states_are_final() {
        let err = EntryStatus::Applied
            .advance(EntryStatus::rejected("late"))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        assert!(
            EntryStatus::rejected("x")
                .advance(EntryStatus::Applied)
                .is_err()
        );
        assert!(EntryStatus::Recorded.advance(EntryStatus::Recorded).is_err());
    }

    #[test]
    fn only_applied_counts() {
        assert!(EntryStatus::Applied.counts_toward_stock());
        assert!(!EntryStatus::Recorded.counts_toward_stock());
        assert!(!EntryStatus::rejected("void").counts_toward_stock());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(ensure_positive_amount(1).is_ok());
        assert!(matches!(
            ensure_positive_amount(0),
            Err(DomainError::Validation(_))
        ));
        assert!(ensure_positive_amount(-3).is_err());
    }
}
