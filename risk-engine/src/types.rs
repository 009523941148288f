//! Core types for risk scoring

use aml_core::RiskLevel;
use serde::{Deserialize, Serialize};

/// Risk score (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Create new risk score, clamped to 100
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Clamp an accumulated point total into the score range
    pub fn from_points(points: u32) -> Self {
        Self(points.min(100) as u8)
    }

    /// Get raw score
    pub fn score(&self) -> u8 {
        self.0
    }
}

/// Score boundaries separating the risk tiers
///
/// Scores below `medium_floor` are low risk, scores at or above
/// `high_floor` are high risk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelBands {
    /// Lowest score classified as medium risk
    pub medium_floor: u8,

    /// Lowest score classified as high risk
    pub high_floor: u8,
}

impl Default for LevelBands {
    fn default() -> Self {
        Self {
            medium_floor: 30,
            high_floor: 60,
        }
    }
}

impl LevelBands {
    /// Tier for a score under these bands
    pub fn level_for(&self, score: RiskScore) -> RiskLevel {
        if score.score() >= self.high_floor {
            RiskLevel::High
        } else if score.score() >= self.medium_floor {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// A single named contributor to a risk score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Factor identifier, stable across scoring runs
    pub factor: String,

    /// Points this factor contributed
    pub weight: u8,

    /// Human-readable reason the factor triggered
    pub triggered_reason: String,
}

impl RiskFactor {
    /// Named factor with its contribution and reason
    pub fn new(factor: &str, weight: u8, triggered_reason: impl Into<String>) -> Self {
        Self {
            factor: factor.to_string(),
            weight,
            triggered_reason: triggered_reason.into(),
        }
    }
}

/// Outcome of a scoring call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Capped additive score
    pub score: RiskScore,

    /// Tier the score falls in
    pub level: RiskLevel,

    /// Factors that contributed, in evaluation order
    pub factors: Vec<RiskFactor>,
}

/// Hard-stop grounds evaluated independently of the additive score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Confirmed match against a sanctions list
    ConfirmedSanctionsMatch,

    /// Customer or counterparty jurisdiction is prohibited outright
    ProhibitedJurisdiction {
        /// Offending country code
        country: String,
    },
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfirmedSanctionsMatch => write!(f, "confirmed sanctions match"),
            Self::ProhibitedJurisdiction { country } => {
                write!(f, "prohibited jurisdiction {}", country)
            }
        }
    }
}
