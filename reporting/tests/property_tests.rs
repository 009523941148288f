//! Property-based tests for report generation and serialization
//!
//! These tests use proptest to verify the reporting invariants:
//! - Re-serializing an unchanged snapshot is byte-identical in both
//!   output formats
//! - Free text never reaches the XML output unescaped
//! - Amounts render at the currency's minor-unit precision
//! - The reference string is a pure derivation of kind + report id
//! - Every submission deadline lands on a business day

use std::sync::Arc;

use aml_core::{
    BusinessCalendar, Currency, Customer, CustomerId, EntityKind, FixedClock, MonitoringLevel,
    RegionalConfig, RiskLevel, TenantId, Transaction, TransactionId, TransferDirection,
};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use reporting::{ReportData, ReportGenerator, ReportKind, SuspicionContext};
use risk_engine::{RiskAssessment, RiskFactor, RiskScore};
use rust_decimal::Decimal;

/// Strategy for transaction instants spread across several years
fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (2022i32..2028, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60).prop_map(
        |(year, month, day, hour, minute)| {
            Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
        },
    )
}

/// Strategy for amounts in whole cents
fn cents_strategy() -> impl Strategy<Value = i64> {
    500_000i64..2_000_000
}

fn kind_strategy() -> impl Strategy<Value = ReportKind> {
    prop_oneof![
        Just(ReportKind::Ttr),
        Just(ReportKind::Smr),
        Just(ReportKind::Ifti),
    ]
}

fn name_part_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z]{2,12}"
}

fn individual(tenant: TenantId) -> Customer {
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

fn business(tenant: TenantId, name: &str) -> Customer {
    Customer {
        kind: EntityKind::Company,
        first_name: None,
        last_name: None,
        business_name: Some(name.to_string()),
        registration_number: Some("ACN 004 085 616".to_string()),
        ..individual(tenant)
    }
}

fn transaction(customer: &Customer, amount_cents: i64, occurred_at: DateTime<Utc>) -> Transaction {
    Transaction {
        id: TransactionId::generate(),
        tenant_id: customer.tenant_id,
        customer_id: customer.id,
        amount: Decimal::new(amount_cents, 2),
        currency: Currency::AUD,
        direction: TransferDirection::Outbound,
        counterparty_country: Some("NZ".to_string()),
        counterparty_institution: Some("Kiwi Savings Bank".to_string()),
        external_ref: None,
        channel: None,
        occurred_at,
    }
}

fn generator() -> ReportGenerator {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 4, 1, 0, 0).unwrap(),
    ));
    ReportGenerator::new(Arc::new(RegionalConfig::default()), clock).unwrap()
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

fn build(kind: ReportKind, customer: &Customer, tx: &Transaction) -> ReportData {
    let generator = generator();
    match kind {
        ReportKind::Ttr => generator.ttr(customer, tx).unwrap(),
        ReportKind::Smr => generator
            .smr(
                customer,
                tx,
                &assessment(),
                &SuspicionContext {
                    grounds: "pattern of banded deposits".to_string(),
                    ..SuspicionContext::default()
                },
            )
            .unwrap(),
        ReportKind::Ifti => generator.ifti(customer, tx).unwrap(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: both serializers are pure transforms of the snapshot;
    /// serializing twice yields identical bytes
    #[test]
    fn prop_reserialization_is_byte_identical(
        kind in kind_strategy(),
        cents in cents_strategy(),
        occurred_at in instant_strategy(),
    ) {
        let customer = individual(TenantId::generate());
        let tx = transaction(&customer, cents, occurred_at);
        let report = build(kind, &customer, &tx);

        prop_assert_eq!(
            reporting::xml::to_xml(&report).unwrap(),
            reporting::xml::to_xml(&report).unwrap()
        );
        prop_assert_eq!(
            reporting::csv::to_csv(&report).unwrap(),
            reporting::csv::to_csv(&report).unwrap()
        );
    }

    /// Property: free text is escaped on the way into the XML document
    #[test]
    fn prop_xml_escapes_free_text(
        left in name_part_strategy(),
        right in name_part_strategy(),
        cents in cents_strategy(),
    ) {
        let tenant = TenantId::generate();
        let name = format!("{} & {} <Co>", left, right);
        let customer = business(tenant, &name);
        let tx = transaction(&customer, cents, Utc.with_ymd_and_hms(2024, 6, 3, 4, 0, 0).unwrap());

        let xml = reporting::xml::to_xml(&build(ReportKind::Ttr, &customer, &tx)).unwrap();
        let escaped = format!("{} &amp; {} &lt;Co&gt;", left, right);
        prop_assert!(xml.contains(&escaped));
        prop_assert!(!xml.contains(&name));
    }

    /// Property: amounts serialize with exactly the currency's minor-unit
    /// precision
    #[test]
    fn prop_amounts_render_at_minor_units(
        cents in cents_strategy(),
        occurred_at in instant_strategy(),
    ) {
        let customer = individual(TenantId::generate());
        let tx = transaction(&customer, cents, occurred_at);
        let report = build(ReportKind::Ttr, &customer, &tx);

        let expected = Decimal::new(cents, 2).to_string();
        let xml = reporting::xml::to_xml(&report).unwrap();
        let amount_element = format!("<Amount Ccy=\"AUD\">{}</Amount>", expected);
        prop_assert!(xml.contains(&amount_element));

        let csv = reporting::csv::to_csv(&report).unwrap();
        prop_assert!(csv.contains(&expected));
    }

    /// Property: the reference is a pure derivation of kind + report id,
    /// and both formats embed it verbatim
    #[test]
    fn prop_reference_ties_kind_to_id(
        kind in kind_strategy(),
        cents in cents_strategy(),
    ) {
        let customer = individual(TenantId::generate());
        let tx = transaction(&customer, cents, Utc.with_ymd_and_hms(2024, 6, 3, 4, 0, 0).unwrap());
        let report = build(kind, &customer, &tx);

        let derived = report.kind.reference(report.id);
        prop_assert_eq!(&report.reference, &derived);
        prop_assert!(report.reference.starts_with(report.kind.code()));

        let xml = reporting::xml::to_xml(&report).unwrap();
        let reference_element = format!("<Reference>{}</Reference>", report.reference);
        prop_assert!(xml.contains(&reference_element));

        let csv = reporting::csv::to_csv(&report).unwrap();
        prop_assert!(csv.lines().nth(1).unwrap().starts_with(&report.reference));
    }

    /// Property: every submission deadline lands on a business day
    #[test]
    fn prop_submission_due_lands_on_business_day(
        kind in kind_strategy(),
        cents in cents_strategy(),
        occurred_at in instant_strategy(),
    ) {
        let config = RegionalConfig::default();
        let calendar = BusinessCalendar::new(&config.calendar).unwrap();

        let customer = individual(TenantId::generate());
        let tx = transaction(&customer, cents, occurred_at);
        let report = build(kind, &customer, &tx);

        prop_assert!(calendar.is_business_day(calendar.local_date(report.submission_due)));
    }
}

mod report_scenarios {
    use super::*;

    /// Reports of different kinds share one CSV header, so exported
    /// batches concatenate without re-deriving columns.
    #[test]
    fn test_mixed_kinds_share_csv_header() {
        let customer = individual(TenantId::generate());
        let tx = transaction(
            &customer,
            1_500_000,
            Utc.with_ymd_and_hms(2024, 6, 3, 4, 0, 0).unwrap(),
        );

        let ttr = reporting::csv::to_csv(&build(ReportKind::Ttr, &customer, &tx)).unwrap();
        let smr = reporting::csv::to_csv(&build(ReportKind::Smr, &customer, &tx)).unwrap();
        let ifti = reporting::csv::to_csv(&build(ReportKind::Ifti, &customer, &tx)).unwrap();

        assert_eq!(ttr.lines().next(), smr.lines().next());
        assert_eq!(smr.lines().next(), ifti.lines().next());
    }

    /// An operator narrative with XML and CSV metacharacters survives
    /// both formats.
    #[test]
    fn test_smr_narrative_survives_both_formats() {
        let customer = individual(TenantId::generate());
        let tx = transaction(
            &customer,
            940_000,
            Utc.with_ymd_and_hms(2024, 6, 3, 4, 0, 0).unwrap(),
        );
        let report = generator()
            .smr(
                &customer,
                &tx,
                &assessment(),
                &SuspicionContext {
                    grounds: "deposits kept < threshold, split between branch & online".to_string(),
                    ..SuspicionContext::default()
                },
            )
            .unwrap();

        let xml = reporting::xml::to_xml(&report).unwrap();
        assert!(xml.contains("deposits kept &lt; threshold, split between branch &amp; online"));

        let csv = reporting::csv::to_csv(&report).unwrap();
        assert!(csv.contains("\"deposits kept < threshold, split between branch & online\""));
    }
}
