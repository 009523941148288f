//! Duplicate transaction detection
//!
//! A candidate transaction is compared against everything already stored
//! for the same customer: first by originating-system reference, then by
//! amount, currency and direction on a nearby calendar date. The first
//! strategy to find an existing transaction wins, and finding nothing is
//! a normal outcome, not an error.

use std::sync::Arc;

use aml_core::{CustomerId, Result, TenantId, TransactionRepository};
use chrono::Duration;
use tracing::debug;

use crate::types::{DuplicateCheck, ImportRecord};

/// Detects whether an import row repeats a stored transaction.
pub struct DuplicateChecker {
    store: Arc<dyn TransactionRepository>,
    tolerance_days: i64,
}

impl DuplicateChecker {
    /// Build a checker with a calendar-date tolerance for the
    /// amount-and-date strategy. A tolerance of one accepts dates one
    /// day apart, which absorbs settlement-date drift between systems.
    pub fn new(store: Arc<dyn TransactionRepository>, tolerance_days: i64) -> Self {
        Self {
            store,
            tolerance_days,
        }
    }

    /// Check one candidate against the customer's stored transactions.
    pub fn check(
        &self,
        tenant: TenantId,
        customer: CustomerId,
        candidate: &ImportRecord,
    ) -> Result<DuplicateCheck> {
        if let Some(external_ref) = candidate.external_ref.as_deref() {
            let trimmed = external_ref.trim();
            if !trimmed.is_empty() {
                if let Some(existing) =
                    self.store
                        .transaction_by_external_ref(tenant, customer, trimmed)?
                {
                    debug!(
                        existing_id = %existing.id,
                        external_ref = trimmed,
                        "duplicate by originating reference"
                    );
                    return Ok(DuplicateCheck::external_ref(existing.id));
                }
            }
        }

        // Pad the instant window by a day beyond the tolerance so every
        // transaction whose calendar date could qualify is fetched, then
        // compare dates exactly.
        let padding = Duration::days(self.tolerance_days + 1);
        let window = self.store.transactions_in_window(
            tenant,
            customer,
            candidate.occurred_at - padding,
            candidate.occurred_at + padding,
        )?;

        let candidate_date = candidate.occurred_at.date_naive();
        for existing in window {
            let days_apart = (candidate_date - existing.occurred_at.date_naive())
                .num_days()
                .abs();
            if existing.amount == candidate.amount
                && existing.currency == candidate.currency
                && existing.direction == candidate.direction
                && days_apart <= self.tolerance_days
            {
                debug!(
                    existing_id = %existing.id,
                    days_apart,
                    "duplicate by amount, date and direction"
                );
                return Ok(DuplicateCheck::amount_date_direction(existing.id));
            }
        }

        Ok(DuplicateCheck::clear())
    }
}
