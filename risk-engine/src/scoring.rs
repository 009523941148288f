//! Additive risk scoring for individuals and businesses
//!
//! Every factor contributes a fixed non-negative point value from the
//! configured catalogue; the sum is clamped to [0, 100] and banded into a
//! tier. Scoring is deterministic: the same profile always produces the
//! same assessment, and no factor consults the clock.

use crate::types::{BlockReason, LevelBands, RiskAssessment, RiskFactor, RiskScore};
use aml_core::{EntityKind, Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point contribution of each factor in the catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorWeights {
    /// Customer is a politically exposed person
    pub pep: u8,

    /// Unresolved screening hit against a watchlist
    pub screening_hit: u8,

    /// Customer jurisdiction on the high-risk list
    pub high_risk_country: u8,

    /// Customer jurisdiction on the medium-risk list
    pub medium_risk_country: u8,

    /// Transaction velocity outside the customer's established pattern
    pub velocity_anomaly: u8,

    /// Trust or partnership vehicles with opaque control
    pub opaque_structure: u8,

    /// Ownership chain of more than one corporate layer
    pub layered_ownership: u8,

    /// Business trading for less than two years
    pub young_business: u8,

    /// Years in operation not established
    pub unknown_tenure: u8,

    /// A beneficial owner is a politically exposed person
    pub pep_owner: u8,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            pep: 25,
            screening_hit: 30,
            high_risk_country: 20,
            medium_risk_country: 10,
            velocity_anomaly: 15,
            opaque_structure: 15,
            layered_ownership: 15,
            young_business: 10,
            unknown_tenure: 5,
            pep_owner: 20,
        }
    }
}

/// Points awarded at and above an amount floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountBand {
    /// Lowest amount (reporting currency) in the band
    pub floor: Decimal,

    /// Points contributed by amounts in the band
    pub points: u8,
}

/// Scoring configuration: tier bands, factor weights, jurisdiction lists
/// and amount banding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Tier boundaries
    pub bands: LevelBands,

    /// Factor point catalogue
    pub weights: FactorWeights,

    /// Jurisdictions scored as high risk
    pub high_risk_countries: Vec<String>,

    /// Jurisdictions scored as medium risk
    pub medium_risk_countries: Vec<String>,

    /// Jurisdictions blocked outright, independent of score
    pub prohibited_countries: Vec<String>,

    /// Amount bands in ascending floor order; the highest floor at or
    /// below the amount applies
    pub amount_bands: Vec<AmountBand>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let countries = |codes: &[&str]| codes.iter().map(|c| c.to_string()).collect();
        Self {
            bands: LevelBands::default(),
            weights: FactorWeights::default(),
            high_risk_countries: countries(&[
                "AF", "HT", "IR", "KP", "ML", "MM", "PA", "PK", "SO", "SS", "SY", "UG", "VU",
                "YE",
            ]),
            medium_risk_countries: countries(&[
                "AE", "CN", "JO", "KH", "LA", "LB", "NG", "RU", "TR", "VN",
            ]),
            prohibited_countries: countries(&["IR", "KP", "MM"]),
            amount_bands: vec![
                AmountBand {
                    floor: Decimal::from(10_000),
                    points: 5,
                },
                AmountBand {
                    floor: Decimal::from(50_000),
                    points: 10,
                },
                AmountBand {
                    floor: Decimal::from(100_000),
                    points: 15,
                },
                AmountBand {
                    floor: Decimal::from(500_000),
                    points: 25,
                },
            ],
        }
    }
}

impl ScoringConfig {
    /// Reject band orderings that cannot classify a score
    pub fn validate(&self) -> Result<()> {
        if self.bands.medium_floor >= self.bands.high_floor {
            return Err(Error::Configuration(format!(
                "risk bands out of order: medium_floor {} >= high_floor {}",
                self.bands.medium_floor, self.bands.high_floor
            )));
        }
        if self.bands.high_floor > 100 {
            return Err(Error::Configuration(format!(
                "high_floor {} exceeds the score range",
                self.bands.high_floor
            )));
        }
        for pair in self.amount_bands.windows(2) {
            if pair[0].floor >= pair[1].floor {
                return Err(Error::Configuration(format!(
                    "amount bands must ascend: {} then {}",
                    pair[0].floor, pair[1].floor
                )));
            }
        }
        Ok(())
    }
}

/// Scoring inputs for a natural person
#[derive(Debug, Clone, Default)]
pub struct IndividualProfile {
    /// Politically exposed person flag
    pub is_pep: bool,

    /// Unresolved watchlist screening hit
    pub has_screening_hit: bool,

    /// Country of residence or nationality
    pub country: Option<String>,

    /// Amount of the transaction under evaluation, in the
    /// reporting currency
    pub transaction_amount: Option<Decimal>,

    /// Transaction velocity flagged as anomalous
    pub velocity_anomaly: bool,
}

/// Scoring inputs for a business entity
#[derive(Debug, Clone)]
pub struct BusinessProfile {
    /// Legal form of the entity
    pub kind: EntityKind,

    /// Years the business has been operating, when established
    pub years_in_operation: Option<u32>,

    /// Unresolved watchlist screening hit
    pub has_screening_hit: bool,

    /// A beneficial owner is a politically exposed person
    pub has_pep_owner: bool,

    /// Ownership chain has more than one corporate layer
    pub layered_ownership: bool,

    /// Country of registration
    pub country: Option<String>,

    /// Amount of the transaction under evaluation, in the
    /// reporting currency
    pub transaction_amount: Option<Decimal>,

    /// Transaction velocity flagged as anomalous
    pub velocity_anomaly: bool,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            kind: EntityKind::Company,
            years_in_operation: None,
            has_screening_hit: false,
            has_pep_owner: false,
            layered_ownership: false,
            country: None,
            transaction_amount: None,
            velocity_anomaly: false,
        }
    }
}

/// Risk scorer
#[derive(Debug, Clone)]
pub struct RiskScorer {
    config: ScoringConfig,
}

impl RiskScorer {
    /// Scorer over a validated configuration
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Score a natural person
    pub fn score_individual(&self, profile: &IndividualProfile) -> RiskAssessment {
        let mut factors = Vec::new();

        if profile.is_pep {
            factors.push(RiskFactor::new(
                "pep_status",
                self.config.weights.pep,
                "customer is a politically exposed person",
            ));
        }
        if profile.has_screening_hit {
            factors.push(RiskFactor::new(
                "screening_hit",
                self.config.weights.screening_hit,
                "unresolved watchlist screening hit",
            ));
        }
        if let Some(factor) = self.jurisdiction_factor(profile.country.as_deref()) {
            factors.push(factor);
        }
        if let Some(factor) = self.amount_factor(profile.transaction_amount) {
            factors.push(factor);
        }
        if profile.velocity_anomaly {
            factors.push(RiskFactor::new(
                "velocity_anomaly",
                self.config.weights.velocity_anomaly,
                "transaction velocity outside established pattern",
            ));
        }

        self.assess(factors)
    }

    /// Score a business entity
    pub fn score_business(&self, profile: &BusinessProfile) -> RiskAssessment {
        let mut factors = Vec::new();

        if matches!(profile.kind, EntityKind::Trust | EntityKind::Partnership) {
            factors.push(RiskFactor::new(
                "entity_type",
                self.config.weights.opaque_structure,
                format!("{:?} structures obscure control", profile.kind),
            ));
        }
        match profile.years_in_operation {
            None => factors.push(RiskFactor::new(
                "years_in_operation",
                self.config.weights.unknown_tenure,
                "trading history not established",
            )),
            Some(years) if years < 2 => factors.push(RiskFactor::new(
                "years_in_operation",
                self.config.weights.young_business,
                format!("trading for {} year(s)", years),
            )),
            Some(_) => {}
        }
        if profile.has_screening_hit {
            factors.push(RiskFactor::new(
                "screening_hit",
                self.config.weights.screening_hit,
                "unresolved watchlist screening hit",
            ));
        }
        if profile.has_pep_owner {
            factors.push(RiskFactor::new(
                "pep_owner",
                self.config.weights.pep_owner,
                "a beneficial owner is a politically exposed person",
            ));
        }
        if profile.layered_ownership {
            factors.push(RiskFactor::new(
                "ownership_structure",
                self.config.weights.layered_ownership,
                "ownership chain spans multiple corporate layers",
            ));
        }
        if let Some(factor) = self.jurisdiction_factor(profile.country.as_deref()) {
            factors.push(factor);
        }
        if let Some(factor) = self.amount_factor(profile.transaction_amount) {
            factors.push(factor);
        }
        if profile.velocity_anomaly {
            factors.push(RiskFactor::new(
                "velocity_anomaly",
                self.config.weights.velocity_anomaly,
                "transaction velocity outside established pattern",
            ));
        }

        self.assess(factors)
    }

    /// Hard-stop evaluation, independent of the additive score
    ///
    /// A block can apply even when the numeric score bands as low.
    pub fn should_block(
        &self,
        confirmed_sanctions_match: bool,
        country: Option<&str>,
    ) -> Option<BlockReason> {
        if confirmed_sanctions_match {
            tracing::warn!("hard-stop: confirmed sanctions match");
            return Some(BlockReason::ConfirmedSanctionsMatch);
        }
        if let Some(country) = country {
            if in_list(&self.config.prohibited_countries, country) {
                tracing::warn!(country, "hard-stop: prohibited jurisdiction");
                return Some(BlockReason::ProhibitedJurisdiction {
                    country: country.to_uppercase(),
                });
            }
        }
        None
    }

    fn jurisdiction_factor(&self, country: Option<&str>) -> Option<RiskFactor> {
        let country = country?;
        if in_list(&self.config.high_risk_countries, country) {
            Some(RiskFactor::new(
                "jurisdiction_risk",
                self.config.weights.high_risk_country,
                format!("{} is a high-risk jurisdiction", country.to_uppercase()),
            ))
        } else if in_list(&self.config.medium_risk_countries, country) {
            Some(RiskFactor::new(
                "jurisdiction_risk",
                self.config.weights.medium_risk_country,
                format!("{} is a medium-risk jurisdiction", country.to_uppercase()),
            ))
        } else {
            None
        }
    }

    fn amount_factor(&self, amount: Option<Decimal>) -> Option<RiskFactor> {
        let amount = amount?;
        self.config
            .amount_bands
            .iter()
            .rev()
            .find(|band| amount >= band.floor)
            .map(|band| {
                RiskFactor::new(
                    "transaction_amount",
                    band.points,
                    format!("amount {} at or above band floor {}", amount, band.floor),
                )
            })
    }

    fn assess(&self, factors: Vec<RiskFactor>) -> RiskAssessment {
        let points: u32 = factors.iter().map(|f| f.weight as u32).sum();
        let score = RiskScore::from_points(points);
        RiskAssessment {
            score,
            level: self.config.bands.level_for(score),
            factors,
        }
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }
}

fn in_list(list: &[String], country: &str) -> bool {
    list.iter().any(|c| c.eq_ignore_ascii_case(country))
}
