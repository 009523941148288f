//! Core domain types shared by the compliance engines
//!
//! All types are designed for:
//! - Deterministic serialization (serde)
//! - Exact arithmetic (Decimal for money)
//! - Opaque stable identifiers (UUID newtypes; display formatting is a
//!   boundary concern)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tenant (reporting entity) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(Uuid);

impl TenantId {
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

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer (party) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

impl CustomerId {
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

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
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

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Investigation (EDD case) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvestigationId(Uuid);

impl InvestigationId {
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

impl fmt::Display for InvestigationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO 4217 currency code
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[non_exhaustive]
pub enum Currency {
    /// Australian Dollar
    AUD,
    /// US Dollar
    USD,
    /// Euro
    EUR,
    /// British Pound
    GBP,
    /// New Zealand Dollar
    NZD,
    /// Singapore Dollar
    SGD,
    /// Japanese Yen
    JPY,
}

impl Currency {
    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::AUD => "AUD",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::NZD => "NZD",
            Currency::SGD => "SGD",
            Currency::JPY => "JPY",
        }
    }

    /// Minor units for amount precision (JPY has none)
    pub fn minor_units(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse from an ISO 4217 code
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "AUD" => Some(Currency::AUD),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "NZD" => Some(Currency::NZD),
            "SGD" => Some(Currency::SGD),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Kind of legal entity being screened or scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Natural person
    Individual,
    /// Registered company
    Company,
    /// Trust structure
    Trust,
    /// Partnership
    Partnership,
    /// Incorporated association
    Association,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Individual => "individual",
            EntityKind::Company => "company",
            EntityKind::Trust => "trust",
            EntityKind::Partnership => "partnership",
            EntityKind::Association => "association",
        };
        write!(f, "{}", s)
    }
}

/// Direction of a funds transfer relative to the tenant's jurisdiction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    /// Funds received by the customer
    Inbound,
    /// Funds sent by the customer
    Outbound,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransferDirection::Inbound => "inbound",
            TransferDirection::Outbound => "outbound",
        };
        write!(f, "{}", s)
    }
}

/// Risk tier derived from a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Routine monitoring
    Low,
    /// Heightened attention
    Medium,
    /// Enhanced due diligence band
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Post-investigation monitoring level applied to a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringLevel {
    /// Routine ongoing due diligence
    Standard,
    /// Enhanced transaction monitoring
    Enhanced,
    /// Relationship blocked; no further transactions
    Blocked,
}

/// A customer (natural person or business entity) owned by a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Stable identifier
    pub id: CustomerId,

    /// Owning tenant
    pub tenant_id: TenantId,

    /// Entity kind
    pub kind: EntityKind,

    /// Given name (individuals)
    pub first_name: Option<String>,

    /// Family name (individuals)
    pub last_name: Option<String>,

    /// Registered name (businesses)
    pub business_name: Option<String>,

    /// Company/trust registration number (businesses)
    pub registration_number: Option<String>,

    /// Date of birth (individuals)
    pub date_of_birth: Option<NaiveDate>,

    /// Contact email
    pub email: Option<String>,

    /// Identifier in the tenant's upstream customer system
    pub external_id: Option<String>,

    /// Country of residence or registration (ISO 3166-1 alpha-2)
    pub country: Option<String>,

    /// Flagged as a politically exposed person
    pub is_pep: bool,

    /// Carries a confirmed sanctions match
    pub has_sanctions_match: bool,

    /// Risk tier from the most recent scoring run
    pub risk_level: Option<RiskLevel>,

    /// Current monitoring level
    pub monitoring_level: MonitoringLevel,

    /// Record creation time
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Name used for screening and report serialization
    pub fn display_name(&self) -> String {
        if let Some(business) = &self.business_name {
            return business.clone();
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        }
    }
}

/// A monetary transaction performed by a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identifier
    pub id: TransactionId,

    /// Owning tenant
    pub tenant_id: TenantId,

    /// Customer on whose behalf the transaction occurred
    pub customer_id: CustomerId,

    /// Amount in `currency` (exact decimal)
    pub amount: Decimal,

    /// Transaction currency
    pub currency: Currency,

    /// Direction relative to the customer
    pub direction: TransferDirection,

    /// Counterparty country (ISO 3166-1 alpha-2), if known
    pub counterparty_country: Option<String>,

    /// Counterparty institution name, if known
    pub counterparty_institution: Option<String>,

    /// Reference id from the tenant's upstream system (idempotency key)
    pub external_ref: Option<String>,

    /// Originating channel (branch, online, agent)
    pub channel: Option<String>,

    /// When the transaction occurred
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether the transfer crosses the given jurisdiction's border
    pub fn is_cross_border(&self, jurisdiction: &str) -> bool {
        match &self.counterparty_country {
            Some(country) => !country.eq_ignore_ascii_case(jurisdiction),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("AUD"), Some(Currency::AUD));
        assert_eq!(Currency::from_code("JPY"), Some(Currency::JPY));
        assert_eq!(Currency::from_code("XXX"), None);
    }

    #[test]
    fn test_currency_minor_units() {
        assert_eq!(Currency::AUD.minor_units(), 2);
        assert_eq!(Currency::JPY.minor_units(), 0);
    }

    #[test]
    fn test_display_name_prefers_business() {
        let mut customer = sample_customer();
        assert_eq!(customer.display_name(), "Jane Citizen");

        customer.business_name = Some("Acme Holdings Pty Ltd".to_string());
        assert_eq!(customer.display_name(), "Acme Holdings Pty Ltd");
    }

    #[test]
    fn test_cross_border() {
        let mut tx = sample_transaction();
        assert!(!tx.is_cross_border("AU"));

        tx.counterparty_country = Some("NZ".to_string());
        assert!(tx.is_cross_border("AU"));

        tx.counterparty_country = Some("au".to_string());
        assert!(!tx.is_cross_border("AU"));
    }

    fn sample_customer() -> Customer {
        Customer {
            id: CustomerId::generate(),
            tenant_id: TenantId::generate(),
            kind: EntityKind::Individual,
            first_name: Some("Jane".to_string()),
            last_name: Some("Citizen".to_string()),
            business_name: None,
            registration_number: None,
            date_of_birth: NaiveDate::from_ymd_opt(1985, 4, 12),
            email: Some("jane@example.com".to_string()),
            external_id: Some("CUST-1001".to_string()),
            country: Some("AU".to_string()),
            is_pep: false,
            has_sanctions_match: false,
            risk_level: None,
            monitoring_level: MonitoringLevel::Standard,
            created_at: Utc::now(),
        }
    }

    fn sample_transaction() -> Transaction {
        Transaction {
            id: TransactionId::generate(),
            tenant_id: TenantId::generate(),
            customer_id: CustomerId::generate(),
            amount: Decimal::new(1_250_00, 2),
            currency: Currency::AUD,
            direction: TransferDirection::Outbound,
            counterparty_country: Some("AU".to_string()),
            counterparty_institution: None,
            external_ref: Some("TXN-42".to_string()),
            channel: Some("online".to_string()),
            occurred_at: Utc::now(),
        }
    }
}
