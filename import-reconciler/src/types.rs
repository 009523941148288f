//! Import row and reconciliation outcome types

use aml_core::{
    Currency, CustomerId, TenantId, Transaction, TransactionId, TransferDirection,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One parsed row of an import file.
///
/// Identity fields drive customer resolution; the remaining fields
/// describe the transaction the row carries. Upstream parsing is a caller
/// concern, so every optional field arrives already split out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Platform customer id, when the source system round-trips it
    pub customer_id: Option<CustomerId>,

    /// Identifier assigned by the originating system
    pub external_id: Option<String>,

    /// Contact email
    pub email: Option<String>,

    /// Given name
    pub first_name: Option<String>,

    /// Family name
    pub last_name: Option<String>,

    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,

    /// Country of residence (ISO 3166-1 alpha-2)
    pub country: Option<String>,

    /// Transaction amount in `currency`
    pub amount: Decimal,

    /// Transaction currency
    pub currency: Currency,

    /// Direction relative to the customer
    pub direction: TransferDirection,

    /// Counterparty country, if known
    pub counterparty_country: Option<String>,

    /// Counterparty institution, if known
    pub counterparty_institution: Option<String>,

    /// Idempotency reference from the originating system
    pub external_ref: Option<String>,

    /// Originating channel
    pub channel: Option<String>,

    /// When the transaction occurred
    pub occurred_at: DateTime<Utc>,
}

impl ImportRecord {
    /// Build the transaction this row describes, once the customer is known
    pub fn into_transaction(self, tenant: TenantId, customer: CustomerId) -> Transaction {
        Transaction {
            id: TransactionId::generate(),
            tenant_id: tenant,
            customer_id: customer,
            amount: self.amount,
            currency: self.currency,
            direction: self.direction,
            counterparty_country: self.counterparty_country,
            counterparty_institution: self.counterparty_institution,
            external_ref: self.external_ref,
            channel: self.channel,
            occurred_at: self.occurred_at,
        }
    }
}

/// How a row was tied to a customer record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Platform customer id matched directly
    InternalId,

    /// Originating-system identifier matched
    ExternalId,

    /// Case-insensitive email matched
    Email,

    /// Exact first name, last name and date-of-birth triple matched
    NameAndBirthDate,

    /// No strategy matched; a new customer record was created
    Created,
}

/// Result of resolving a row to a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOutcome {
    /// False when the customer was newly created for this row
    pub matched: bool,

    /// The resolved or created customer
    pub customer_id: CustomerId,

    /// Strategy that produced the outcome
    pub method: MatchMethod,
}

/// How a candidate transaction was recognized as already present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMethod {
    /// Identical originating-system reference
    ExternalRef,

    /// Same amount, currency and direction on a nearby date
    AmountDateDirection,
}

/// Result of checking a candidate transaction for duplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCheck {
    /// Whether an existing transaction already covers the candidate
    pub is_duplicate: bool,

    /// Strategy that found the existing transaction
    pub method: Option<DuplicateMethod>,

    /// The transaction the candidate duplicates
    pub existing_id: Option<TransactionId>,
}

impl DuplicateCheck {
    /// A clean, not-a-duplicate outcome
    pub fn clear() -> Self {
        Self {
            is_duplicate: false,
            method: None,
            existing_id: None,
        }
    }

    fn found(method: DuplicateMethod, existing_id: TransactionId) -> Self {
        Self {
            is_duplicate: true,
            method: Some(method),
            existing_id: Some(existing_id),
        }
    }

    /// An existing transaction carries the same originating reference
    pub fn external_ref(existing_id: TransactionId) -> Self {
        Self::found(DuplicateMethod::ExternalRef, existing_id)
    }

    /// An existing transaction matches on amount, date and direction
    pub fn amount_date_direction(existing_id: TransactionId) -> Self {
        Self::found(DuplicateMethod::AmountDateDirection, existing_id)
    }
}
