//! Flat CSV serialization
//!
//! One header row and one record per report. The column set is the union
//! across report kinds so exports of mixed kinds concatenate cleanly;
//! cells outside the report's kind stay empty.

use aml_core::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::ReportData;

/// Serialize a report snapshot to a single-record CSV document
pub fn to_csv(report: &ReportData) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .serialize(Row::from_report(report))
        .map_err(|e| Error::Serialization(format!("CSV serialization failed: {}", e)))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Serialization(format!("CSV buffer flush failed: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::Serialization(format!("CSV output was not UTF-8: {}", e)))
}

/// Union column set; field order defines the header order
#[derive(Debug, Serialize)]
struct Row {
    reference: String,
    kind: String,
    report_id: String,
    tenant_id: String,
    jurisdiction: String,
    generated_at: DateTime<Utc>,
    submission_due: DateTime<Utc>,
    customer_id: String,
    party_kind: String,
    party_name: String,
    date_of_birth: Option<NaiveDate>,
    registration_number: Option<String>,
    country: Option<String>,
    politically_exposed: bool,
    transaction_id: String,
    amount: Decimal,
    currency: String,
    normalized_amount: Decimal,
    reporting_currency: String,
    direction: String,
    counterparty_country: Option<String>,
    counterparty_institution: Option<String>,
    channel: Option<String>,
    occurred_at: DateTime<Utc>,
    grounds: Option<String>,
    terrorism_related: Option<bool>,
    investigation_id: Option<String>,
    risk_score: Option<u8>,
    risk_level: Option<String>,
    risk_factors: Option<String>,
    ordering_party: Option<String>,
    beneficiary_party: Option<String>,
    origin_country: Option<String>,
    destination_country: Option<String>,
}

impl Row {
    fn from_report(report: &ReportData) -> Self {
        let suspicion = report.suspicion.as_ref();
        let transfer = report.transfer.as_ref();
        Self {
            reference: report.reference.clone(),
            kind: report.kind.code().to_string(),
            report_id: report.id.to_string(),
            tenant_id: report.tenant_id.to_string(),
            jurisdiction: report.jurisdiction.clone(),
            generated_at: report.generated_at,
            submission_due: report.submission_due,
            customer_id: report.party.customer_id.to_string(),
            party_kind: report.party.kind.to_string(),
            party_name: report.party.name.clone(),
            date_of_birth: report.party.date_of_birth,
            registration_number: report.party.registration_number.clone(),
            country: report.party.country.clone(),
            politically_exposed: report.party.is_pep,
            transaction_id: report.transaction.transaction_id.to_string(),
            amount: report.transaction.amount,
            currency: report.transaction.currency.code().to_string(),
            normalized_amount: report.transaction.normalized_amount,
            reporting_currency: report.transaction.reporting_currency.code().to_string(),
            direction: report.transaction.direction.to_string(),
            counterparty_country: report.transaction.counterparty_country.clone(),
            counterparty_institution: report.transaction.counterparty_institution.clone(),
            channel: report.transaction.channel.clone(),
            occurred_at: report.transaction.occurred_at,
            grounds: suspicion.map(|s| s.grounds.clone()),
            terrorism_related: suspicion.map(|s| s.terrorism_related),
            investigation_id: suspicion
                .and_then(|s| s.investigation_id)
                .map(|id| id.to_string()),
            risk_score: suspicion.map(|s| s.risk_score),
            risk_level: suspicion.map(|s| s.risk_level.to_string()),
            risk_factors: suspicion.map(|s| {
                s.risk_factors
                    .iter()
                    .map(|factor| factor.name.as_str())
                    .collect::<Vec<_>>()
                    .join(";")
            }),
            ordering_party: transfer.and_then(|t| t.ordering_party.clone()),
            beneficiary_party: transfer.and_then(|t| t.beneficiary_party.clone()),
            origin_country: transfer.and_then(|t| t.origin_country.clone()),
            destination_country: transfer.and_then(|t| t.destination_country.clone()),
        }
    }
}
