//! Regulator XML serialization
//!
//! Pure transform of a [`ReportData`] snapshot into the submission XML
//! schema. Nothing is read outside the snapshot, so equal snapshots
//! serialize to identical bytes, and free text is escaped by the
//! serializer.
//!
//! # Example Output
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <RegulatoryReport xmlns="urn:vigil:regulatory-report:v1">
//!   <Header>
//!     <ReportId>...</ReportId>
//!     <Reference>TTR-9F8A2C41</Reference>
//!     <Kind>TTR</Kind>
//!     ...
//!   </Header>
//!   <Party>...</Party>
//!   <Transaction>
//!     <Amount Ccy="AUD">10000.00</Amount>
//!     ...
//!   </Transaction>
//! </RegulatoryReport>
//! ```

use aml_core::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::se::to_string as to_xml_string;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ReportData;

const REPORT_NAMESPACE: &str = "urn:vigil:regulatory-report:v1";

/// Serialize a report snapshot to the regulator XML schema
pub fn to_xml(report: &ReportData) -> Result<String> {
    let xml = to_xml_string(&document(report))
        .map_err(|e| Error::Serialization(format!("XML serialization failed: {}", e)))?;

    // Add XML declaration
    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}",
        xml
    ))
}

/// Build the document structure from a snapshot
fn document(report: &ReportData) -> XmlReport {
    XmlReport {
        xmlns: REPORT_NAMESPACE.to_string(),
        header: XmlHeader {
            report_id: report.id.to_string(),
            reference: report.reference.clone(),
            kind: report.kind.code().to_string(),
            jurisdiction: report.jurisdiction.clone(),
            tenant_id: report.tenant_id.to_string(),
            generated_at: report.generated_at,
            submission_due: report.submission_due,
        },
        party: XmlParty {
            customer_id: report.party.customer_id.to_string(),
            entity_kind: report.party.kind.to_string(),
            name: report.party.name.clone(),
            date_of_birth: report.party.date_of_birth,
            registration_number: report.party.registration_number.clone(),
            country: report.party.country.clone(),
            politically_exposed: report.party.is_pep,
        },
        transaction: XmlTransaction {
            transaction_id: report.transaction.transaction_id.to_string(),
            amount: XmlAmount {
                ccy: report.transaction.currency.code().to_string(),
                value: report.transaction.amount,
            },
            normalized_amount: XmlAmount {
                ccy: report.transaction.reporting_currency.code().to_string(),
                value: report.transaction.normalized_amount,
            },
            direction: report.transaction.direction.to_string(),
            counterparty_country: report.transaction.counterparty_country.clone(),
            counterparty_institution: report.transaction.counterparty_institution.clone(),
            channel: report.transaction.channel.clone(),
            occurred_at: report.transaction.occurred_at,
        },
        suspicion: report.suspicion.as_ref().map(|suspicion| XmlSuspicion {
            grounds: suspicion.grounds.clone(),
            terrorism_related: suspicion.terrorism_related,
            investigation_id: suspicion.investigation_id.map(|id| id.to_string()),
            risk_score: suspicion.risk_score,
            risk_level: suspicion.risk_level.to_string(),
            risk_factors: suspicion
                .risk_factors
                .iter()
                .map(|factor| XmlRiskFactor {
                    name: factor.name.clone(),
                    reason: factor.reason.clone(),
                })
                .collect(),
        }),
        transfer: report.transfer.as_ref().map(|transfer| XmlTransfer {
            ordering_party: transfer.ordering_party.clone(),
            beneficiary_party: transfer.beneficiary_party.clone(),
            origin_country: transfer.origin_country.clone(),
            destination_country: transfer.destination_country.clone(),
        }),
    }
}

// Submission schema structures

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "RegulatoryReport")]
struct XmlReport {
    #[serde(rename = "@xmlns")]
    xmlns: String,

    #[serde(rename = "Header")]
    header: XmlHeader,

    #[serde(rename = "Party")]
    party: XmlParty,

    #[serde(rename = "Transaction")]
    transaction: XmlTransaction,

    #[serde(rename = "Suspicion", skip_serializing_if = "Option::is_none")]
    suspicion: Option<XmlSuspicion>,

    #[serde(rename = "Transfer", skip_serializing_if = "Option::is_none")]
    transfer: Option<XmlTransfer>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlHeader {
    #[serde(rename = "ReportId")]
    report_id: String,

    #[serde(rename = "Reference")]
    reference: String,

    #[serde(rename = "Kind")]
    kind: String,

    #[serde(rename = "Jurisdiction")]
    jurisdiction: String,

    #[serde(rename = "TenantId")]
    tenant_id: String,

    #[serde(rename = "GeneratedAt")]
    generated_at: DateTime<Utc>,

    #[serde(rename = "SubmissionDue")]
    submission_due: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlParty {
    #[serde(rename = "CustomerId")]
    customer_id: String,

    #[serde(rename = "EntityKind")]
    entity_kind: String,

    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "DateOfBirth", skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<NaiveDate>,

    #[serde(rename = "RegistrationNumber", skip_serializing_if = "Option::is_none")]
    registration_number: Option<String>,

    #[serde(rename = "Country", skip_serializing_if = "Option::is_none")]
    country: Option<String>,

    #[serde(rename = "PoliticallyExposed")]
    politically_exposed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlAmount {
    #[serde(rename = "@Ccy")]
    ccy: String,

    #[serde(rename = "$text")]
    value: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlTransaction {
    #[serde(rename = "TransactionId")]
    transaction_id: String,

    #[serde(rename = "Amount")]
    amount: XmlAmount,

    #[serde(rename = "NormalizedAmount")]
    normalized_amount: XmlAmount,

    #[serde(rename = "Direction")]
    direction: String,

    #[serde(rename = "CounterpartyCountry", skip_serializing_if = "Option::is_none")]
    counterparty_country: Option<String>,

    #[serde(rename = "CounterpartyInstitution", skip_serializing_if = "Option::is_none")]
    counterparty_institution: Option<String>,

    #[serde(rename = "Channel", skip_serializing_if = "Option::is_none")]
    channel: Option<String>,

    #[serde(rename = "OccurredAt")]
    occurred_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlSuspicion {
    #[serde(rename = "Grounds")]
    grounds: String,

    #[serde(rename = "TerrorismRelated")]
    terrorism_related: bool,

    #[serde(rename = "InvestigationId", skip_serializing_if = "Option::is_none")]
    investigation_id: Option<String>,

    #[serde(rename = "RiskScore")]
    risk_score: u8,

    #[serde(rename = "RiskLevel")]
    risk_level: String,

    #[serde(rename = "RiskFactor", default, skip_serializing_if = "Vec::is_empty")]
    risk_factors: Vec<XmlRiskFactor>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlRiskFactor {
    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "Reason")]
    reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlTransfer {
    #[serde(rename = "OrderingParty", skip_serializing_if = "Option::is_none")]
    ordering_party: Option<String>,

    #[serde(rename = "BeneficiaryParty", skip_serializing_if = "Option::is_none")]
    beneficiary_party: Option<String>,

    #[serde(rename = "OriginCountry", skip_serializing_if = "Option::is_none")]
    origin_country: Option<String>,

    #[serde(rename = "DestinationCountry", skip_serializing_if = "Option::is_none")]
    destination_country: Option<String>,
}
