//! Report snapshot types
//!
//! A [`ReportData`] is an immutable snapshot of party + transaction +
//! compliance metadata taken at generation time. A later change to the
//! underlying records produces a new snapshot under a new id; nothing
//! recomputes an existing report in place.

use std::fmt;

use aml_core::{
    Currency, Customer, CustomerId, EntityKind, InvestigationId, RiskLevel, TenantId,
    Transaction, TransactionId, TransferDirection,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Report identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Wrap an existing UUID
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Mint a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which mandatory report a snapshot serializes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Threshold transaction report
    Ttr,
    /// Suspicious matter report
    Smr,
    /// International funds transfer instruction report
    Ifti,
}

impl ReportKind {
    /// Regulator code used in references and serialized output
    pub fn code(&self) -> &'static str {
        match self {
            ReportKind::Ttr => "TTR",
            ReportKind::Smr => "SMR",
            ReportKind::Ifti => "IFTI",
        }
    }

    /// Acknowledgement-style reference derived from the report id.
    ///
    /// Stable for a given id, so the same snapshot carries the same
    /// reference in every serialized form.
    pub fn reference(&self, id: ReportId) -> String {
        let hex = id.as_uuid().simple().to_string();
        format!("{}-{}", self.code(), hex[..8].to_uppercase())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Round to the currency's minor unit, half away from zero. The scale is
/// pinned afterwards so equal amounts always render the same digits.
fn minor_rounded(amount: Decimal, currency: Currency) -> Decimal {
    let minor = currency.minor_units();
    let mut rounded =
        amount.round_dp_with_strategy(minor, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(minor);
    rounded
}

/// Snapshot of the reported party at generation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingParty {
    /// Stable customer identifier
    pub customer_id: CustomerId,

    /// Entity kind
    pub kind: EntityKind,

    /// Display name (business name, or given + family name)
    pub name: String,

    /// Date of birth (individuals)
    pub date_of_birth: Option<NaiveDate>,

    /// Registration number (businesses)
    pub registration_number: Option<String>,

    /// Country of residence or registration
    pub country: Option<String>,

    /// Politically-exposed-person flag as held at generation time
    pub is_pep: bool,
}

impl ReportingParty {
    /// Capture the reportable fields of a customer record
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            customer_id: customer.id,
            kind: customer.kind,
            name: customer.display_name(),
            date_of_birth: customer.date_of_birth,
            registration_number: customer.registration_number.clone(),
            country: customer.country.clone(),
            is_pep: customer.is_pep,
        }
    }
}

/// Snapshot of the reported transaction, amounts at minor-unit precision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedTransaction {
    /// Stable transaction identifier
    pub transaction_id: TransactionId,

    /// Amount in the transaction currency
    pub amount: Decimal,

    /// Transaction currency
    pub currency: Currency,

    /// Amount converted into the reporting currency
    pub normalized_amount: Decimal,

    /// Currency the normalized amount is denominated in
    pub reporting_currency: Currency,

    /// Direction relative to the customer
    pub direction: TransferDirection,

    /// Counterparty country, if known
    pub counterparty_country: Option<String>,

    /// Counterparty institution, if known
    pub counterparty_institution: Option<String>,

    /// Originating channel, if known
    pub channel: Option<String>,

    /// When the transaction occurred
    pub occurred_at: DateTime<Utc>,
}

impl ReportedTransaction {
    /// Capture a transaction, rounding both amounts to their currency's
    /// minor unit. `normalized` is the exact converted amount; rounding
    /// happens only here, at the snapshot boundary.
    pub fn snapshot(
        transaction: &Transaction,
        normalized: Decimal,
        reporting_currency: Currency,
    ) -> Self {
        Self {
            transaction_id: transaction.id,
            amount: minor_rounded(transaction.amount, transaction.currency),
            currency: transaction.currency,
            normalized_amount: minor_rounded(normalized, reporting_currency),
            reporting_currency,
            direction: transaction.direction,
            counterparty_country: transaction.counterparty_country.clone(),
            counterparty_institution: transaction.counterparty_institution.clone(),
            channel: transaction.channel.clone(),
            occurred_at: transaction.occurred_at,
        }
    }
}

/// Caller-supplied context for a suspicious matter report
#[derive(Debug, Clone, Default)]
pub struct SuspicionContext {
    /// Narrative grounds for the suspicion
    pub grounds: String,

    /// Terrorism-financing related; shortens the submission window
    pub terrorism_related: bool,

    /// Investigation the suspicion arose from, if any
    pub investigation_id: Option<InvestigationId>,
}

/// Risk factor carried into a suspicious matter report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedRiskFactor {
    /// Stable factor identifier
    pub name: String,

    /// Reason the factor triggered
    pub reason: String,
}

/// Suspicion section of a suspicious matter report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspicionDetails {
    /// Narrative grounds for the suspicion
    pub grounds: String,

    /// Terrorism-financing related flag
    pub terrorism_related: bool,

    /// Originating investigation, if any
    pub investigation_id: Option<InvestigationId>,

    /// Risk score at generation time
    pub risk_score: u8,

    /// Risk tier at generation time
    pub risk_level: RiskLevel,

    /// Factors behind the score, in evaluation order
    pub risk_factors: Vec<ReportedRiskFactor>,
}

/// Transfer routing section of an international funds transfer report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDetails {
    /// Party that instructed the transfer
    pub ordering_party: Option<String>,

    /// Party the funds are destined for
    pub beneficiary_party: Option<String>,

    /// Country the funds left
    pub origin_country: Option<String>,

    /// Country the funds arrive in
    pub destination_country: Option<String>,
}

impl TransferDetails {
    /// Derive routing from the transfer direction: an outbound transfer
    /// is ordered by the customer, an inbound one by the counterparty.
    pub fn derive(party_name: &str, transaction: &Transaction, jurisdiction: &str) -> Self {
        match transaction.direction {
            TransferDirection::Outbound => Self {
                ordering_party: Some(party_name.to_string()),
                beneficiary_party: transaction.counterparty_institution.clone(),
                origin_country: Some(jurisdiction.to_string()),
                destination_country: transaction.counterparty_country.clone(),
            },
            TransferDirection::Inbound => Self {
                ordering_party: transaction.counterparty_institution.clone(),
                beneficiary_party: Some(party_name.to_string()),
                origin_country: transaction.counterparty_country.clone(),
                destination_country: Some(jurisdiction.to_string()),
            },
        }
    }
}

/// Immutable report snapshot.
///
/// Carries everything the serializers read; nothing is looked up at
/// serialization time, so re-serializing an unchanged snapshot is
/// byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    /// Report identifier
    pub id: ReportId,

    /// Report kind
    pub kind: ReportKind,

    /// Acknowledgement-style reference derived from the id
    pub reference: String,

    /// Reporting tenant
    pub tenant_id: TenantId,

    /// Jurisdiction the report is filed in
    pub jurisdiction: String,

    /// Reported party snapshot
    pub party: ReportingParty,

    /// Reported transaction snapshot
    pub transaction: ReportedTransaction,

    /// Suspicion section (suspicious matter reports only)
    pub suspicion: Option<SuspicionDetails>,

    /// Transfer routing section (international transfer reports only)
    pub transfer: Option<TransferDetails>,

    /// Submission deadline with the regulator
    pub submission_due: DateTime<Utc>,

    /// When the snapshot was generated
    pub generated_at: DateTime<Utc>,
}
