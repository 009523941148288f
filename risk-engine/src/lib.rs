//! Vigil Risk Engine
//!
//! Additive, capped risk scoring for customers, with hard-stop blocking
//! rules evaluated independently of the numeric score

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod scoring;
pub mod types;

pub use aml_core::{Error, Result};
pub use scoring::{
    AmountBand, BusinessProfile, FactorWeights, IndividualProfile, RiskScorer, ScoringConfig,
};
pub use types::{BlockReason, LevelBands, RiskAssessment, RiskFactor, RiskScore};
