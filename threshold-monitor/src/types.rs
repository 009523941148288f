//! Decision types produced by threshold evaluation

use aml_core::RiskLevel;
use chrono::{DateTime, Utc};
use risk_engine::{BlockReason, RiskAssessment};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Caller-supplied facts about the party behind a transaction.
///
/// The monitor never looks up risk scores or screening outcomes itself;
/// upstream components pass their conclusions in, which keeps every
/// evaluation a pure function of its arguments and the transaction window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Risk level assigned by the scoring engine, when the party has one
    pub risk_level: Option<RiskLevel>,

    /// The scoring engine's hard-stop evaluation blocked the party
    pub blocked: bool,

    /// Screening returned a confirmed match for the party
    pub screening_match: bool,

    /// An operator has manually raised suspicion on the party
    pub operator_suspicion: bool,

    /// The suspicion trigger is terrorism-financing related, which
    /// shortens the suspicious-matter deadline to the urgent window
    pub terrorism_related: bool,

    /// A suspicious-matter report or structuring suspicion already exists
    /// for the party from an earlier evaluation
    pub prior_suspicion: bool,
}

impl EvaluationContext {
    /// Seed a context from the scoring engine's outputs.
    ///
    /// Screening and suspicion facts start false; callers layer them on
    /// with struct update syntax.
    pub fn from_scoring(assessment: &RiskAssessment, block: Option<&BlockReason>) -> Self {
        Self {
            risk_level: Some(assessment.level),
            blocked: block.is_some(),
            ..Self::default()
        }
    }
}

/// Evidence of a structuring pattern inside the detection window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuringSuspicion {
    /// Start of the examined window (inclusive)
    pub window_start: DateTime<Utc>,

    /// End of the examined window (inclusive); the evaluated transaction's
    /// own timestamp
    pub window_end: DateTime<Utc>,

    /// Number of window transactions falling inside the structuring band
    pub transaction_count: usize,

    /// Sum of the banded amounts, in the reporting currency
    pub total_amount: Decimal,
}

/// Report submission deadlines attached to a decision.
///
/// A deadline is present exactly when the corresponding trigger fired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionDeadlines {
    /// Threshold transaction report due date
    pub ttr_due: Option<DateTime<Utc>>,

    /// Suspicious matter report due date
    pub smr_due: Option<DateTime<Utc>>,

    /// International funds transfer instruction due date
    pub ifti_due: Option<DateTime<Utc>>,
}

/// Outcome of evaluating one transaction against regional thresholds.
///
/// A decision is immutable once computed. Re-evaluating the same
/// transaction produces a fresh decision rather than patching an old
/// one, and unchanged inputs always reproduce the same decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdDecision {
    /// Transaction amount converted into the reporting currency
    pub normalized_amount: Decimal,

    /// A threshold transaction report is mandatory
    pub requires_ttr: bool,

    /// Grounds exist for a suspicious-matter review
    pub requires_smr_review: bool,

    /// An international funds transfer instruction report is mandatory
    pub requires_ifti: bool,

    /// Enhanced due diligence must be opened for the party
    pub requires_edd: bool,

    /// Structuring evidence, when the window analysis found a pattern
    pub structuring: Option<StructuringSuspicion>,

    /// Submission deadlines for the triggered reports
    pub deadlines: DecisionDeadlines,

    /// When the evaluation ran
    pub evaluated_at: DateTime<Utc>,
}

impl ThresholdDecision {
    /// Whether any reporting or due-diligence obligation was triggered
    pub fn any_trigger(&self) -> bool {
        self.requires_ttr || self.requires_smr_review || self.requires_ifti || self.requires_edd
    }
}
