//! Transaction evaluation against jurisdiction reporting thresholds

use std::sync::Arc;

use aml_core::{
    BusinessCalendar, Clock, RegionalConfig, Result, RiskLevel, Transaction,
    TransactionRepository,
};
use chrono::Duration;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::types::{DecisionDeadlines, EvaluationContext, StructuringSuspicion, ThresholdDecision};

/// Evaluates transactions against the thresholds of one jurisdiction.
///
/// The monitor holds no per-call state; window lookups go through the
/// injected transaction repository, so evaluations for distinct
/// transactions may run concurrently.
pub struct ThresholdMonitor {
    config: Arc<RegionalConfig>,
    calendar: BusinessCalendar,
    store: Arc<dyn TransactionRepository>,
    clock: Arc<dyn Clock>,
}

impl ThresholdMonitor {
    /// Build a monitor for a regional configuration.
    ///
    /// Fails with a configuration error when the calendar cannot be
    /// compiled, so a malformed workweek surfaces at startup rather than
    /// on the first evaluation.
    pub fn new(
        config: Arc<RegionalConfig>,
        store: Arc<dyn TransactionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let calendar = BusinessCalendar::new(&config.calendar)?;
        Ok(Self {
            config,
            calendar,
            store,
            clock,
        })
    }

    /// Evaluate one transaction and produce a trigger decision.
    ///
    /// The rules are independent; a single transaction may require a TTR
    /// and an IFTI at once. Absence of any trigger is a normal decision
    /// with every flag false, not an error.
    pub fn evaluate(
        &self,
        transaction: &Transaction,
        context: &EvaluationContext,
    ) -> Result<ThresholdDecision> {
        let evaluated_at = self.clock.now();
        let normalized = self.normalize(transaction.amount, transaction)?;

        let requires_ttr = normalized >= self.config.thresholds.ttr_required;
        let ttr_due = if requires_ttr {
            Some(self.calendar.deadline_after(
                transaction.occurred_at,
                self.config.deadlines.ttr_submission,
            )?)
        } else {
            None
        };

        let structuring = self.detect_structuring(transaction)?;

        let requires_ifti = transaction.is_cross_border(&self.config.jurisdiction)
            || transaction.currency != self.config.reporting_currency;
        let ifti_due = if requires_ifti {
            Some(self.calendar.deadline_after(
                transaction.occurred_at,
                self.config.deadlines.ifti_submission,
            )?)
        } else {
            None
        };

        // Suspicion is never raised from the amount alone; it comes from
        // screening, an operator, or a structuring pattern.
        let requires_smr_review =
            context.screening_match || context.operator_suspicion || structuring.is_some();
        let smr_due = if requires_smr_review {
            let days = if context.terrorism_related {
                self.config.deadlines.smr_urgent
            } else {
                self.config.deadlines.smr_submission
            };
            Some(self.calendar.deadline_after(evaluated_at, days)?)
        } else {
            None
        };

        let requires_edd = context.risk_level == Some(RiskLevel::High)
            || context.blocked
            || context.prior_suspicion;

        let decision = ThresholdDecision {
            normalized_amount: normalized,
            requires_ttr,
            requires_smr_review,
            requires_ifti,
            requires_edd,
            structuring,
            deadlines: DecisionDeadlines {
                ttr_due,
                smr_due,
                ifti_due,
            },
            evaluated_at,
        };

        info!(
            transaction_id = %transaction.id,
            normalized_amount = %decision.normalized_amount,
            requires_ttr = decision.requires_ttr,
            requires_smr_review = decision.requires_smr_review,
            requires_ifti = decision.requires_ifti,
            requires_edd = decision.requires_edd,
            "threshold evaluation complete"
        );

        Ok(decision)
    }

    /// Convert a transaction amount into the reporting currency
    fn normalize(&self, amount: Decimal, transaction: &Transaction) -> Result<Decimal> {
        let rate = self.config.rate_to_reporting(transaction.currency)?;
        Ok(amount * rate)
    }

    /// Look for banded transactions clustering inside the detection window.
    ///
    /// The window ends at the evaluated transaction and reaches back
    /// `window_days`. The evaluated transaction participates even when it
    /// has not been persisted yet, and is never counted twice when it has.
    fn detect_structuring(
        &self,
        transaction: &Transaction,
    ) -> Result<Option<StructuringSuspicion>> {
        let rules = &self.config.thresholds.structuring;
        let window_end = transaction.occurred_at;
        let window_start = window_end - Duration::days(i64::from(rules.window_days));

        let mut window = self.store.transactions_in_window(
            transaction.tenant_id,
            transaction.customer_id,
            window_start,
            window_end,
        )?;
        if !window.iter().any(|t| t.id == transaction.id) {
            window.push(transaction.clone());
        }

        let mut banded = 0usize;
        let mut banded_total = Decimal::ZERO;
        for tx in &window {
            let amount = self.normalize(tx.amount, tx)?;
            if amount >= rules.amount_min && amount < rules.amount_max {
                banded += 1;
                banded_total += amount;
            }
        }

        let pattern = banded >= rules.min_tx_count as usize
            && banded_total >= self.config.thresholds.ttr_required;
        if !pattern {
            return Ok(None);
        }

        debug!(
            customer_id = %transaction.customer_id,
            banded_count = banded,
            banded_total = %banded_total,
            "structuring pattern inside detection window"
        );
        Ok(Some(StructuringSuspicion {
            window_start,
            window_end,
            transaction_count: banded,
            total_amount: banded_total,
        }))
    }
}
