//! Bounded-concurrency batch processing
//!
//! Runs the row pipeline (resolve customer, check duplicate, persist)
//! across an import batch with a semaphore capping in-flight rows. Row
//! failures are reported per row and never abort the batch; conflicting
//! concurrent creates are arbitrated by the store and surface as typed
//! conflicts on the losing rows.

use std::sync::Arc;

use aml_core::{
    Clock, CustomerRepository, Error, RegionalConfig, Result, TenantId, TransactionId,
    TransactionRepository,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::duplicates::DuplicateChecker;
use crate::resolve::CustomerResolver;
use crate::types::{DuplicateCheck, ImportRecord, MatchMethod, ResolveOutcome};

/// Batch execution limits
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum rows processed concurrently
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_concurrent: 50 }
    }
}

/// Everything that happened to one successfully processed row
#[derive(Debug, Clone)]
pub struct RowReport {
    /// How the row was tied to a customer
    pub resolution: ResolveOutcome,

    /// Duplicate-detection outcome for the row's transaction
    pub duplicate: DuplicateCheck,

    /// Persisted transaction, absent when the row was a duplicate
    pub transaction_id: Option<TransactionId>,
}

/// Per-row outcome, in input order
#[derive(Debug)]
pub struct RowOutcome {
    /// Zero-based position in the submitted batch
    pub row: usize,

    /// The row's report, or the error that stopped it
    pub result: Result<RowReport>,
}

/// Outcome of a whole batch
#[derive(Debug)]
pub struct BatchSummary {
    /// One outcome per submitted row, in input order
    pub outcomes: Vec<RowOutcome>,
}

impl BatchSummary {
    /// Rows that completed the pipeline
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Rows that stopped with an error
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Rows recognized as duplicates of stored transactions
    pub fn duplicates(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .filter(|report| report.duplicate.is_duplicate)
            .count()
    }

    /// Rows that created a customer record
    pub fn created_customers(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .filter(|report| report.resolution.method == MatchMethod::Created)
            .count()
    }
}

/// Shared per-row pipeline
struct RowPipeline {
    resolver: CustomerResolver,
    duplicates: DuplicateChecker,
    transactions: Arc<dyn TransactionRepository>,
}

impl RowPipeline {
    fn process_row(&self, tenant: TenantId, record: ImportRecord) -> Result<RowReport> {
        let resolution = self.resolver.resolve(tenant, &record)?;
        let duplicate = self
            .duplicates
            .check(tenant, resolution.customer_id, &record)?;
        if duplicate.is_duplicate {
            return Ok(RowReport {
                resolution,
                duplicate,
                transaction_id: None,
            });
        }

        let transaction = record.into_transaction(tenant, resolution.customer_id);
        let transaction_id = transaction.id;
        self.transactions.insert_transaction(transaction)?;
        Ok(RowReport {
            resolution,
            duplicate,
            transaction_id: Some(transaction_id),
        })
    }
}

/// Processes import batches with bounded concurrency.
pub struct BatchProcessor {
    pipeline: Arc<RowPipeline>,
    semaphore: Arc<Semaphore>,
}

impl BatchProcessor {
    /// Wire a processor over the customer and transaction stores.
    ///
    /// The duplicate-date tolerance comes from the regional
    /// configuration.
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        transactions: Arc<dyn TransactionRepository>,
        config: &RegionalConfig,
        clock: Arc<dyn Clock>,
        batch: BatchConfig,
    ) -> Self {
        let pipeline = RowPipeline {
            resolver: CustomerResolver::new(customers, clock),
            duplicates: DuplicateChecker::new(
                transactions.clone(),
                config.duplicate_date_tolerance_days,
            ),
            transactions,
        };
        Self {
            pipeline: Arc::new(pipeline),
            semaphore: Arc::new(Semaphore::new(batch.max_concurrent.max(1))),
        }
    }

    /// Process every row of a batch, reporting outcomes in input order.
    ///
    /// Row-level validation and conflict errors land in that row's
    /// outcome; only a collapsed worker fails the batch itself.
    pub async fn process(
        &self,
        tenant: TenantId,
        rows: Vec<ImportRecord>,
    ) -> Result<BatchSummary> {
        let total = rows.len();
        let mut join_set = JoinSet::new();

        for (row, record) in rows.into_iter().enumerate() {
            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|e| Error::Storage(format!("import semaphore closed: {}", e)))?;
            let pipeline = Arc::clone(&self.pipeline);

            join_set.spawn(async move {
                let result = pipeline.process_row(tenant, record);
                drop(permit);
                RowOutcome { row, result }
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            let outcome =
                joined.map_err(|e| Error::Storage(format!("import worker failed: {}", e)))?;
            if let Err(error) = &outcome.result {
                warn!(row = outcome.row, %error, "import row failed");
            }
            outcomes.push(outcome);
        }
        outcomes.sort_by_key(|o| o.row);

        let summary = BatchSummary { outcomes };
        info!(
            rows = total,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            duplicates = summary.duplicates(),
            created_customers = summary.created_customers(),
            "import batch complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aml_core::{
        Currency, Customer, CustomerId, EntityKind, FixedClock, MemoryStore, MonitoringLevel,
        Transaction, TransferDirection,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn row(external_id: &str, amount: i64) -> ImportRecord {
        ImportRecord {
            customer_id: None,
            external_id: Some(external_id.to_string()),
            email: None,
            first_name: Some("Dana".to_string()),
            last_name: Some("Okafor".to_string()),
            date_of_birth: None,
            country: Some("AU".to_string()),
            amount: Decimal::from(amount),
            currency: Currency::AUD,
            direction: TransferDirection::Inbound,
            counterparty_country: None,
            counterparty_institution: None,
            external_ref: None,
            channel: None,
            occurred_at: Utc.with_ymd_and_hms(2024, 6, 4, 2, 0, 0).unwrap(),
        }
    }

    fn processor(store: Arc<MemoryStore>) -> BatchProcessor {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 4, 3, 0, 0).unwrap(),
        ));
        BatchProcessor::new(
            store.clone(),
            store,
            &RegionalConfig::default(),
            clock,
            BatchConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_batch_outcomes_in_input_order() {
        let store = Arc::new(MemoryStore::new());
        let tenant = TenantId::generate();

        let seeded = Customer {
            id: CustomerId::generate(),
            tenant_id: tenant,
            kind: EntityKind::Individual,
            first_name: Some("Lee".to_string()),
            last_name: Some("Park".to_string()),
            business_name: None,
            registration_number: None,
            date_of_birth: None,
            email: None,
            external_id: Some("CRM-1".to_string()),
            country: Some("AU".to_string()),
            is_pep: false,
            has_sanctions_match: false,
            risk_level: None,
            monitoring_level: MonitoringLevel::Standard,
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        };
        let seeded_id = seeded.id;
        store.insert_customer(seeded).unwrap();

        let rows = vec![row("CRM-1", 100), row("CRM-2", 200), row("CRM-3", 300)];
        let summary = processor(store).process(tenant, rows).await.unwrap();

        assert_eq!(summary.outcomes.len(), 3);
        for (index, outcome) in summary.outcomes.iter().enumerate() {
            assert_eq!(outcome.row, index);
        }
        let first = summary.outcomes[0].result.as_ref().unwrap();
        assert_eq!(first.resolution.customer_id, seeded_id);
        assert_eq!(first.resolution.method, MatchMethod::ExternalId);
        assert_eq!(summary.created_customers(), 2);
        assert_eq!(summary.failed(), 0);
    }

    #[tokio::test]
    async fn test_row_errors_do_not_abort_batch() {
        let store = Arc::new(MemoryStore::new());
        let tenant = TenantId::generate();

        let mut nameless = row("CRM-9", 100);
        nameless.external_id = None;
        nameless.first_name = None;

        let rows = vec![row("CRM-1", 100), nameless, row("CRM-2", 300)];
        let summary = processor(store).process(tenant, rows).await.unwrap();

        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.succeeded(), 2);
        assert!(matches!(
            summary.outcomes[1].result,
            Err(Error::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_rows_persist_exactly_once() {
        let store = Arc::new(MemoryStore::new());
        let tenant = TenantId::generate();

        let mut first = row("CRM-1", 500);
        first.external_ref = Some("PAY-77".to_string());
        let mut second = first.clone();
        second.amount = Decimal::from(999);

        let summary = processor(store.clone())
            .process(tenant, vec![first, second])
            .await
            .unwrap();

        // Concurrency makes the loser's fate path-dependent: it is either
        // flagged as a duplicate before inserting, or loses the reference
        // index race and gets a conflict. Exactly one transaction lands.
        let persisted: Vec<_> = summary
            .outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .filter_map(|report| report.transaction_id)
            .collect();
        assert_eq!(persisted.len(), 1);

        let losers_ok = summary
            .outcomes
            .iter()
            .all(|o| match &o.result {
                Ok(_) => true,
                Err(Error::Conflict { .. }) => true,
                Err(other) => panic!("unexpected error: {other:?}"),
            });
        assert!(losers_ok);
    }

    #[tokio::test]
    async fn test_known_duplicate_reports_existing_transaction() {
        let store = Arc::new(MemoryStore::new());
        let tenant = TenantId::generate();
        let customer = CustomerId::generate();

        let seeded = Customer {
            id: customer,
            tenant_id: tenant,
            kind: EntityKind::Individual,
            first_name: Some("Dana".to_string()),
            last_name: Some("Okafor".to_string()),
            business_name: None,
            registration_number: None,
            date_of_birth: None,
            email: None,
            external_id: Some("CRM-1".to_string()),
            country: None,
            is_pep: false,
            has_sanctions_match: false,
            risk_level: None,
            monitoring_level: MonitoringLevel::Standard,
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        };
        store.insert_customer(seeded).unwrap();

        let existing = Transaction {
            id: aml_core::TransactionId::generate(),
            tenant_id: tenant,
            customer_id: customer,
            amount: Decimal::from(500),
            currency: Currency::AUD,
            direction: TransferDirection::Inbound,
            counterparty_country: None,
            counterparty_institution: None,
            external_ref: Some("PAY-77".to_string()),
            channel: None,
            occurred_at: Utc.with_ymd_and_hms(2024, 6, 3, 2, 0, 0).unwrap(),
        };
        let existing_id = existing.id;
        store.insert_transaction(existing).unwrap();

        let mut repeat = row("CRM-1", 500);
        repeat.external_ref = Some("PAY-77".to_string());

        let summary = processor(store)
            .process(tenant, vec![repeat])
            .await
            .unwrap();
        let report = summary.outcomes[0].result.as_ref().unwrap();
        assert!(report.duplicate.is_duplicate);
        assert_eq!(report.duplicate.existing_id, Some(existing_id));
        assert_eq!(report.transaction_id, None);
        assert_eq!(summary.duplicates(), 1);
    }
}
