//! Per-jurisdiction regional configuration
//!
//! Loaded once per tenant at startup and never mutated at runtime. Defaults
//! carry the Australian (AUSTRAC) profile; other jurisdictions override via
//! TOML. `validate` fails fast with a configuration error so malformed
//! calendars or thresholds never reach per-transaction evaluation.

use crate::error::{Error, Result};
use crate::types::{Currency, RiskLevel};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Immutable per-jurisdiction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionalConfig {
    /// Jurisdiction country code (ISO 3166-1 alpha-2)
    pub jurisdiction: String,

    /// Currency thresholds and reports are expressed in
    pub reporting_currency: Currency,

    /// Date tolerance for the fuzzy duplicate-transaction heuristic
    pub duplicate_date_tolerance_days: i64,

    /// Snapshot conversion rates into the reporting currency
    /// (units of reporting currency per unit of the keyed currency)
    pub fx_rates: BTreeMap<Currency, Decimal>,

    /// Monetary thresholds
    pub thresholds: Thresholds,

    /// Report submission deadlines, in business days
    pub deadlines: ReportingDeadlines,

    /// OCDD review intervals per risk tier
    pub ocdd: OcddIntervals,

    /// Ultimate beneficial owner qualification thresholds
    pub ubo: UboThresholds,

    /// Regional business calendar
    pub calendar: CalendarConfig,
}

/// Monetary thresholds for the jurisdiction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Amount at or above which a TTR is mandatory
    pub ttr_required: Decimal,

    /// Amount at or above which identity verification is mandatory
    pub kyc_required: Decimal,

    /// Amount at or above which enhanced due diligence applies
    pub enhanced_dd: Decimal,

    /// Amount band used when weighting international transfers in scoring
    pub international_transfer: Decimal,

    /// Structuring detection parameters
    pub structuring: StructuringConfig,
}

/// Structuring (threshold-splitting) detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuringConfig {
    /// Lookback window in calendar days
    pub window_days: u32,

    /// Minimum number of qualifying transactions in the window
    pub min_tx_count: u32,

    /// Lower bound of the suspicious amount band (inclusive)
    pub amount_min: Decimal,

    /// Upper bound of the suspicious amount band (exclusive)
    pub amount_max: Decimal,
}

/// Regulator submission deadlines, in business days
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingDeadlines {
    /// Threshold transaction report
    pub ttr_submission: u32,

    /// Suspicious matter report
    pub smr_submission: u32,

    /// Suspicious matter report where the suspicion relates to
    /// terrorism financing
    pub smr_urgent: u32,

    /// International funds transfer instruction
    pub ifti_submission: u32,
}

/// Ongoing customer due diligence review intervals (months)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcddIntervals {
    /// Low-risk customers
    pub low_months: u32,

    /// Medium-risk customers
    pub medium_months: u32,

    /// High-risk customers
    pub high_months: u32,
}

impl OcddIntervals {
    /// Review interval for a risk tier
    pub fn months_for(&self, level: RiskLevel) -> u32 {
        match level {
            RiskLevel::Low => self.low_months,
            RiskLevel::Medium => self.medium_months,
            RiskLevel::High => self.high_months,
        }
    }

    /// Date the next ongoing customer due diligence review falls due,
    /// counted in calendar months from the last completed review
    pub fn next_review(
        &self,
        level: RiskLevel,
        last_review: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        crate::calendar::months_after(last_review, self.months_for(level))
    }
}

/// Ultimate beneficial owner qualification thresholds (percent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UboThresholds {
    /// Ownership percentage at or above which a person is a UBO
    pub ownership_pct: Decimal,

    /// Control percentage at or above which a person is a UBO
    pub control_pct: Decimal,
}

impl UboThresholds {
    /// Whether a natural person qualifies as an ultimate beneficial
    /// owner, by shareholding or by voting control
    pub fn qualifies(&self, ownership_pct: Decimal, control_pct: Decimal) -> bool {
        ownership_pct >= self.ownership_pct || control_pct >= self.control_pct
    }
}

/// Regional business calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Working days of the week, lowercase names ("monday".."sunday")
    pub workweek: Vec<String>,

    /// Public holiday dates
    pub holidays: Vec<NaiveDate>,

    /// Fixed UTC offset of the jurisdiction, in minutes
    pub utc_offset_minutes: i32,
}

impl Default for RegionalConfig {
    fn default() -> Self {
        let mut fx_rates = BTreeMap::new();
        fx_rates.insert(Currency::AUD, Decimal::ONE);

        Self {
            jurisdiction: "AU".to_string(),
            reporting_currency: Currency::AUD,
            duplicate_date_tolerance_days: 1,
            fx_rates,
            thresholds: Thresholds::default(),
            deadlines: ReportingDeadlines::default(),
            ocdd: OcddIntervals::default(),
            ubo: UboThresholds::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ttr_required: Decimal::from(10_000),
            kyc_required: Decimal::from(10_000),
            enhanced_dd: Decimal::from(50_000),
            international_transfer: Decimal::from(10_000),
            structuring: StructuringConfig::default(),
        }
    }
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            min_tx_count: 3,
            amount_min: Decimal::from(8_000),
            amount_max: Decimal::from(10_000),
        }
    }
}

impl Default for ReportingDeadlines {
    fn default() -> Self {
        // AUSTRAC: TTR and IFTI within 10 business days, SMR within 3,
        // 24 hours when terrorism financing is suspected
        Self {
            ttr_submission: 10,
            smr_submission: 3,
            smr_urgent: 1,
            ifti_submission: 10,
        }
    }
}

impl Default for OcddIntervals {
    fn default() -> Self {
        Self {
            low_months: 36,
            medium_months: 24,
            high_months: 12,
        }
    }
}

impl Default for UboThresholds {
    fn default() -> Self {
        Self {
            ownership_pct: Decimal::from(25),
            control_pct: Decimal::from(25),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            workweek: vec![
                "monday".to_string(),
                "tuesday".to_string(),
                "wednesday".to_string(),
                "thursday".to_string(),
                "friday".to_string(),
            ],
            holidays: Vec::new(),
            utc_offset_minutes: 600, // AEST
        }
    }
}

impl RegionalConfig {
    /// Parse from TOML
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: RegionalConfig = toml::from_str(raw)
            .map_err(|e| Error::Configuration(format!("invalid regional config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Configuration(format!(
                "cannot read regional config {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!(
            jurisdiction = %config.jurisdiction,
            reporting_currency = %config.reporting_currency,
            "loaded regional config"
        );
        Ok(config)
    }

    /// Conversion rate from `currency` into the reporting currency
    pub fn rate_to_reporting(&self, currency: Currency) -> Result<Decimal> {
        if currency == self.reporting_currency {
            return Ok(Decimal::ONE);
        }
        self.fx_rates.get(&currency).copied().ok_or_else(|| {
            Error::Configuration(format!(
                "no conversion rate from {} to {}",
                currency, self.reporting_currency
            ))
        })
    }

    /// Fail fast on malformed configuration
    pub fn validate(&self) -> Result<()> {
        if self.jurisdiction.len() != 2 {
            return Err(Error::Configuration(format!(
                "jurisdiction must be an ISO 3166-1 alpha-2 code, got {:?}",
                self.jurisdiction
            )));
        }

        if self.thresholds.ttr_required <= Decimal::ZERO {
            return Err(Error::Configuration(
                "ttr_required must be positive".to_string(),
            ));
        }

        let structuring = &self.thresholds.structuring;
        if structuring.amount_min >= structuring.amount_max {
            return Err(Error::Configuration(format!(
                "structuring amount range is empty: [{}, {})",
                structuring.amount_min, structuring.amount_max
            )));
        }
        if structuring.min_tx_count < 2 {
            return Err(Error::Configuration(
                "structuring min_tx_count must be at least 2".to_string(),
            ));
        }
        if structuring.window_days == 0 {
            return Err(Error::Configuration(
                "structuring window_days must be at least 1".to_string(),
            ));
        }

        let deadlines = &self.deadlines;
        for (name, days) in [
            ("ttr_submission", deadlines.ttr_submission),
            ("smr_submission", deadlines.smr_submission),
            ("smr_urgent", deadlines.smr_urgent),
            ("ifti_submission", deadlines.ifti_submission),
        ] {
            if days == 0 {
                return Err(Error::Configuration(format!(
                    "deadline {} must be at least 1 business day",
                    name
                )));
            }
        }

        for (name, pct) in [
            ("ubo ownership_pct", self.ubo.ownership_pct),
            ("ubo control_pct", self.ubo.control_pct),
        ] {
            if pct <= Decimal::ZERO || pct > Decimal::from(100) {
                return Err(Error::Configuration(format!(
                    "{} must be a percentage in (0, 100]",
                    name
                )));
            }
        }

        for (currency, rate) in &self.fx_rates {
            if *rate <= Decimal::ZERO {
                return Err(Error::Configuration(format!(
                    "fx rate for {} must be positive",
                    currency
                )));
            }
        }

        if self.duplicate_date_tolerance_days < 0 {
            return Err(Error::Configuration(
                "duplicate_date_tolerance_days must not be negative".to_string(),
            ));
        }

        crate::calendar::BusinessCalendar::new(&self.calendar).map(|_| ())
    }
}
