//! Customer resolution ladder
//!
//! Resolves an import row to a customer through a strict priority order:
//! platform id, originating-system id, email, then name plus date of
//! birth. A row that matches nothing creates a customer when it carries
//! enough identity data, and fails validation when it does not.

use std::sync::Arc;

use aml_core::{
    Clock, Customer, CustomerId, CustomerRepository, EntityKind, Error, MonitoringLevel,
    Result, TenantId,
};
use tracing::{debug, info, warn};

use crate::types::{ImportRecord, MatchMethod, ResolveOutcome};

/// Trimmed, non-empty view of an optional field
fn presence(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

/// Resolves import rows to customer records through the injected store.
///
/// Resolution never caches; concurrent calls that both decide to create
/// are arbitrated by the store's uniqueness indexes, and the loser
/// receives a conflict naming the surviving customer.
pub struct CustomerResolver {
    store: Arc<dyn CustomerRepository>,
    clock: Arc<dyn Clock>,
}

impl CustomerResolver {
    /// Build a resolver over a customer store
    pub fn new(store: Arc<dyn CustomerRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Resolve one row, trying each strategy in priority order and
    /// stopping at the first hit.
    pub fn resolve(&self, tenant: TenantId, record: &ImportRecord) -> Result<ResolveOutcome> {
        if let Some(id) = record.customer_id {
            if self.store.customer(tenant, id)?.is_some() {
                return Ok(matched(id, MatchMethod::InternalId));
            }
            debug!(customer_id = %id, "internal id not found, trying weaker strategies");
        }

        if let Some(external_id) = presence(&record.external_id) {
            if let Some(customer) = self.store.customer_by_external_id(tenant, external_id)? {
                return Ok(matched(customer.id, MatchMethod::ExternalId));
            }
        }

        if let Some(email) = presence(&record.email) {
            if let Some(customer) = self.store.customer_by_email(tenant, email)? {
                return Ok(matched(customer.id, MatchMethod::Email));
            }
        }

        if let (Some(first), Some(last), Some(dob)) = (
            presence(&record.first_name),
            presence(&record.last_name),
            record.date_of_birth,
        ) {
            let candidates = self.store.customers_by_name_dob(tenant, first, last, dob)?;
            if candidates.len() > 1 {
                warn!(
                    first_name = first,
                    last_name = last,
                    candidates = candidates.len(),
                    "ambiguous name and birth-date match, taking earliest record"
                );
            }
            if let Some(customer) = candidates.into_iter().next() {
                return Ok(matched(customer.id, MatchMethod::NameAndBirthDate));
            }
        }

        self.create(tenant, record)
    }

    /// Create a customer for a row no strategy matched.
    ///
    /// The store's uniqueness indexes are the final arbiter: a concurrent
    /// create for the same external id or email surfaces here as a
    /// conflict carrying the winner's id.
    fn create(&self, tenant: TenantId, record: &ImportRecord) -> Result<ResolveOutcome> {
        let (first, last) = match (presence(&record.first_name), presence(&record.last_name)) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(Error::validation(
                    "identity",
                    "insufficient data to resolve or create a customer: \
                     no identifier matched and first or last name is missing",
                ))
            }
        };

        let customer = Customer {
            id: CustomerId::generate(),
            tenant_id: tenant,
            kind: EntityKind::Individual,
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            business_name: None,
            registration_number: None,
            date_of_birth: record.date_of_birth,
            email: presence(&record.email).map(str::to_string),
            external_id: presence(&record.external_id).map(str::to_string),
            country: presence(&record.country).map(str::to_string),
            is_pep: false,
            has_sanctions_match: false,
            risk_level: None,
            monitoring_level: MonitoringLevel::Standard,
            created_at: self.clock.now(),
        };
        let id = customer.id;
        self.store.insert_customer(customer)?;

        info!(customer_id = %id, "created customer from import row");
        Ok(ResolveOutcome {
            matched: false,
            customer_id: id,
            method: MatchMethod::Created,
        })
    }
}

fn matched(customer_id: CustomerId, method: MatchMethod) -> ResolveOutcome {
    ResolveOutcome {
        matched: true,
        customer_id,
        method,
    }
}
