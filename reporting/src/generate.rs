//! Report assembly
//!
//! Builders turn a party + transaction bundle and the regional
//! configuration into an immutable [`ReportData`] snapshot. Submission
//! deadlines come from the business calendar; the injected clock supplies
//! the generation instant, which is also the instant a suspicious matter
//! submission window runs from.

use std::sync::Arc;

use aml_core::{
    BusinessCalendar, Clock, Customer, Error, RegionalConfig, Result, TenantId, Transaction,
};
use chrono::{DateTime, Utc};
use risk_engine::RiskAssessment;
use tracing::info;

use crate::types::{
    ReportData, ReportId, ReportKind, ReportedRiskFactor, ReportedTransaction, ReportingParty,
    SuspicionContext, SuspicionDetails, TransferDetails,
};

/// Assembles regulator report snapshots for one jurisdiction.
///
/// Holds no per-call state; generations for distinct bundles may run
/// concurrently.
pub struct ReportGenerator {
    config: Arc<RegionalConfig>,
    calendar: BusinessCalendar,
    clock: Arc<dyn Clock>,
}

impl ReportGenerator {
    /// Build a generator for a regional configuration.
    ///
    /// Fails with a configuration error when the calendar cannot be
    /// compiled, so a malformed workweek surfaces at startup rather than
    /// on the first report.
    pub fn new(config: Arc<RegionalConfig>, clock: Arc<dyn Clock>) -> Result<Self> {
        let calendar = BusinessCalendar::new(&config.calendar)?;
        Ok(Self {
            config,
            calendar,
            clock,
        })
    }

    /// Threshold transaction report.
    ///
    /// The submission window runs from the transaction date.
    pub fn ttr(&self, customer: &Customer, transaction: &Transaction) -> Result<ReportData> {
        let generated_at = self.clock.now();
        let (party, reported) = self.snapshot(customer, transaction)?;
        let due = self.calendar.deadline_after(
            transaction.occurred_at,
            self.config.deadlines.ttr_submission,
        )?;
        Ok(self.assemble(
            ReportKind::Ttr,
            customer.tenant_id,
            generated_at,
            party,
            reported,
            None,
            None,
            due,
        ))
    }

    /// Suspicious matter report.
    ///
    /// The submission window runs from the generation instant, the point
    /// the suspicion was formed. Terrorism-related suspicions use the
    /// urgent window.
    pub fn smr(
        &self,
        customer: &Customer,
        transaction: &Transaction,
        assessment: &RiskAssessment,
        context: &SuspicionContext,
    ) -> Result<ReportData> {
        let grounds = context.grounds.trim();
        if grounds.is_empty() {
            return Err(Error::validation(
                "grounds",
                "a suspicious matter report needs stated grounds",
            ));
        }

        let generated_at = self.clock.now();
        let (party, reported) = self.snapshot(customer, transaction)?;
        let days = if context.terrorism_related {
            self.config.deadlines.smr_urgent
        } else {
            self.config.deadlines.smr_submission
        };
        let due = self.calendar.deadline_after(generated_at, days)?;

        let suspicion = SuspicionDetails {
            grounds: grounds.to_string(),
            terrorism_related: context.terrorism_related,
            investigation_id: context.investigation_id,
            risk_score: assessment.score.score(),
            risk_level: assessment.level,
            risk_factors: assessment
                .factors
                .iter()
                .map(|factor| ReportedRiskFactor {
                    name: factor.factor.clone(),
                    reason: factor.triggered_reason.clone(),
                })
                .collect(),
        };

        Ok(self.assemble(
            ReportKind::Smr,
            customer.tenant_id,
            generated_at,
            party,
            reported,
            Some(suspicion),
            None,
            due,
        ))
    }

    /// International funds transfer instruction report.
    ///
    /// The submission window runs from the transaction date; routing is
    /// derived from the transfer direction.
    pub fn ifti(&self, customer: &Customer, transaction: &Transaction) -> Result<ReportData> {
        let generated_at = self.clock.now();
        let (party, reported) = self.snapshot(customer, transaction)?;
        let transfer =
            TransferDetails::derive(&party.name, transaction, &self.config.jurisdiction);
        let due = self.calendar.deadline_after(
            transaction.occurred_at,
            self.config.deadlines.ifti_submission,
        )?;
        Ok(self.assemble(
            ReportKind::Ifti,
            customer.tenant_id,
            generated_at,
            party,
            reported,
            None,
            Some(transfer),
            due,
        ))
    }

    /// Validate bundle linkage and capture the party + transaction
    /// snapshots. Normalization uses the exact input amount; rounding to
    /// minor units happens inside the snapshot.
    fn snapshot(
        &self,
        customer: &Customer,
        transaction: &Transaction,
    ) -> Result<(ReportingParty, ReportedTransaction)> {
        if transaction.customer_id != customer.id || transaction.tenant_id != customer.tenant_id {
            return Err(Error::validation(
                "transaction",
                "transaction does not belong to the reported party",
            ));
        }
        let rate = self.config.rate_to_reporting(transaction.currency)?;
        let normalized = transaction.amount * rate;
        Ok((
            ReportingParty::from_customer(customer),
            ReportedTransaction::snapshot(transaction, normalized, self.config.reporting_currency),
        ))
    }

    fn assemble(
        &self,
        kind: ReportKind,
        tenant_id: TenantId,
        generated_at: DateTime<Utc>,
        party: ReportingParty,
        transaction: ReportedTransaction,
        suspicion: Option<SuspicionDetails>,
        transfer: Option<TransferDetails>,
        submission_due: DateTime<Utc>,
    ) -> ReportData {
        let id = ReportId::generate();
        let reference = kind.reference(id);
        let report = ReportData {
            id,
            kind,
            reference,
            tenant_id,
            jurisdiction: self.config.jurisdiction.clone(),
            party,
            transaction,
            suspicion,
            transfer,
            submission_due,
            generated_at,
        };

        info!(
            report_id = %report.id,
            reference = %report.reference,
            kind = %report.kind,
            customer_id = %report.party.customer_id,
            submission_due = %report.submission_due,
            "report snapshot assembled"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aml_core::{
        Currency, CustomerId, EntityKind, FixedClock, MonitoringLevel, RiskLevel, TransactionId,
        TransferDirection,
    };
    use chrono::{TimeZone, Utc};
    use risk_engine::{RiskFactor, RiskScore};
    use rust_decimal::Decimal;

    fn customer(tenant: TenantId) -> Customer {
        Customer {
            id: CustomerId::generate(),
            tenant_id: tenant,
            kind: EntityKind::Individual,
            first_name: Some("Mara".to_string()),
            last_name: Some("Okafor".to_string()),
            business_name: None,
            registration_number: None,
            date_of_birth: None,
            email: None,
            external_id: None,
            country: Some("AU".to_string()),
            is_pep: false,
            has_sanctions_match: false,
            risk_level: None,
            monitoring_level: MonitoringLevel::Standard,
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
        }
    }

    // Monday 2024-06-03, 04:00 UTC
    fn tx(customer: &Customer, amount: Decimal, currency: Currency) -> Transaction {
        Transaction {
            id: TransactionId::generate(),
            tenant_id: customer.tenant_id,
            customer_id: customer.id,
            amount,
            currency,
            direction: TransferDirection::Inbound,
            counterparty_country: None,
            counterparty_institution: None,
            external_ref: None,
            channel: Some("branch".to_string()),
            occurred_at: Utc.with_ymd_and_hms(2024, 6, 3, 4, 0, 0).unwrap(),
        }
    }

    fn generator_with(config: RegionalConfig) -> ReportGenerator {
        // Tuesday 2024-06-04 01:00 UTC, mid-morning in the AU offset
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 4, 1, 0, 0).unwrap(),
        ));
        ReportGenerator::new(Arc::new(config), clock).unwrap()
    }

    fn generator() -> ReportGenerator {
        generator_with(RegionalConfig::default())
    }

    fn assessment() -> RiskAssessment {
        RiskAssessment {
            score: RiskScore::new(75),
            level: RiskLevel::High,
            factors: vec![RiskFactor::new(
                "pep_status",
                25,
                "customer is a politically exposed person",
            )],
        }
    }

    #[test]
    fn test_ttr_snapshot_and_deadline() {
        let customer = customer(TenantId::generate());
        let transaction = tx(&customer, Decimal::from(12_000), Currency::AUD);

        let report = generator().ttr(&customer, &transaction).unwrap();

        assert_eq!(report.kind, ReportKind::Ttr);
        assert_eq!(report.reference, report.kind.reference(report.id));
        assert_eq!(report.tenant_id, customer.tenant_id);
        assert_eq!(report.jurisdiction, "AU");
        assert_eq!(report.party.name, "Mara Okafor");
        assert_eq!(report.transaction.normalized_amount, Decimal::from(12_000));
        assert!(report.suspicion.is_none());
        assert!(report.transfer.is_none());

        // Ten business days from Monday 2024-06-03, time of day preserved
        assert_eq!(
            report.submission_due,
            Utc.with_ymd_and_hms(2024, 6, 17, 4, 0, 0).unwrap()
        );
        assert_eq!(
            report.generated_at,
            Utc.with_ymd_and_hms(2024, 6, 4, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_ttr_normalizes_foreign_currency() {
        let mut config = RegionalConfig::default();
        config.fx_rates.insert(Currency::USD, Decimal::new(15, 1));

        let customer = customer(TenantId::generate());
        let transaction = tx(&customer, Decimal::from(7_000), Currency::USD);

        let report = generator_with(config).ttr(&customer, &transaction).unwrap();

        assert_eq!(report.transaction.amount.to_string(), "7000.00");
        assert_eq!(report.transaction.currency, Currency::USD);
        assert_eq!(report.transaction.normalized_amount.to_string(), "10500.00");
        assert_eq!(report.transaction.reporting_currency, Currency::AUD);
    }

    #[test]
    fn test_missing_rate_is_a_configuration_error() {
        let customer = customer(TenantId::generate());
        let transaction = tx(&customer, Decimal::from(9_000), Currency::JPY);

        let err = generator().ttr(&customer, &transaction).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_report_rejects_mismatched_party() {
        let tenant = TenantId::generate();
        let reported = customer(tenant);
        let other = customer(tenant);
        let transaction = tx(&other, Decimal::from(12_000), Currency::AUD);

        let err = generator().ttr(&reported, &transaction).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                field: "transaction",
                ..
            }
        ));
    }

    #[test]
    fn test_smr_requires_grounds() {
        let customer = customer(TenantId::generate());
        let transaction = tx(&customer, Decimal::from(9_000), Currency::AUD);
        let context = SuspicionContext {
            grounds: "   ".to_string(),
            ..SuspicionContext::default()
        };

        let err = generator()
            .smr(&customer, &transaction, &assessment(), &context)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "grounds", .. }));
    }

    #[test]
    fn test_smr_standard_and_urgent_windows() {
        let customer = customer(TenantId::generate());
        let transaction = tx(&customer, Decimal::from(9_000), Currency::AUD);

        let standard = generator()
            .smr(
                &customer,
                &transaction,
                &assessment(),
                &SuspicionContext {
                    grounds: "repeated deposits just under the reporting threshold".to_string(),
                    ..SuspicionContext::default()
                },
            )
            .unwrap();
        // Three business days from Tuesday 2024-06-04
        assert_eq!(
            standard.submission_due,
            Utc.with_ymd_and_hms(2024, 6, 7, 1, 0, 0).unwrap()
        );

        let urgent = generator()
            .smr(
                &customer,
                &transaction,
                &assessment(),
                &SuspicionContext {
                    grounds: "counterparty appears on a terrorism financing list".to_string(),
                    terrorism_related: true,
                    investigation_id: None,
                },
            )
            .unwrap();
        assert_eq!(
            urgent.submission_due,
            Utc.with_ymd_and_hms(2024, 6, 5, 1, 0, 0).unwrap()
        );
        assert!(urgent.suspicion.as_ref().is_some_and(|s| s.terrorism_related));
    }

    #[test]
    fn test_smr_carries_risk_context() {
        let customer = customer(TenantId::generate());
        let transaction = tx(&customer, Decimal::from(9_000), Currency::AUD);
        let case_id = aml_core::InvestigationId::generate();

        let report = generator()
            .smr(
                &customer,
                &transaction,
                &assessment(),
                &SuspicionContext {
                    grounds: "structuring pattern across the past week".to_string(),
                    terrorism_related: false,
                    investigation_id: Some(case_id),
                },
            )
            .unwrap();

        let suspicion = report.suspicion.expect("suspicion section");
        assert_eq!(suspicion.risk_score, 75);
        assert_eq!(suspicion.risk_level, RiskLevel::High);
        assert_eq!(suspicion.investigation_id, Some(case_id));
        assert_eq!(suspicion.risk_factors.len(), 1);
        assert_eq!(suspicion.risk_factors[0].name, "pep_status");
    }

    #[test]
    fn test_ifti_routing_and_deadline() {
        let customer = customer(TenantId::generate());
        let mut transaction = tx(&customer, Decimal::from(50), Currency::AUD);
        transaction.direction = TransferDirection::Outbound;
        transaction.counterparty_country = Some("NZ".to_string());
        transaction.counterparty_institution = Some("Kiwi Savings Bank".to_string());

        let report = generator().ifti(&customer, &transaction).unwrap();

        assert_eq!(report.kind, ReportKind::Ifti);
        assert!(report.reference.starts_with("IFTI-"));
        let transfer = report.transfer.expect("transfer section");
        assert_eq!(transfer.ordering_party.as_deref(), Some("Mara Okafor"));
        assert_eq!(transfer.beneficiary_party.as_deref(), Some("Kiwi Savings Bank"));
        assert_eq!(transfer.origin_country.as_deref(), Some("AU"));
        assert_eq!(transfer.destination_country.as_deref(), Some("NZ"));
        assert_eq!(
            report.submission_due,
            Utc.with_ymd_and_hms(2024, 6, 17, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_each_generation_is_a_new_snapshot() {
        let customer = customer(TenantId::generate());
        let transaction = tx(&customer, Decimal::from(12_000), Currency::AUD);
        let generator = generator();

        let first = generator.ttr(&customer, &transaction).unwrap();
        let second = generator.ttr(&customer, &transaction).unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.reference, second.reference);
        assert_eq!(first.party, second.party);
        assert_eq!(first.transaction, second.transaction);
        assert_eq!(first.submission_due, second.submission_due);
    }
}
