//! Threshold monitoring for transaction reporting obligations
//!
//! Evaluates each transaction against a jurisdiction's regional
//! configuration and emits a trigger decision covering:
//! - Threshold transaction reports for amounts at or above the cash
//!   reporting threshold
//! - International funds transfer instructions for cross-border or
//!   foreign-currency transfers, regardless of amount
//! - Structuring patterns: repeated just-under-threshold amounts inside
//!   a sliding window
//! - Suspicious-matter review grounds and enhanced due diligence
//!   escalation, from facts supplied by screening and risk scoring
//!
//! Every rule is independently evaluable and pure; deadlines come from
//! the business-day calendar of the regional configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod monitor;
pub mod types;

pub use aml_core::{Error, Result};
pub use monitor::ThresholdMonitor;
pub use types::{
    DecisionDeadlines, EvaluationContext, StructuringSuspicion, ThresholdDecision,
};
