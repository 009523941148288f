//! Investigation persistence
//!
//! Two storage rules the workflow relies on are enforced here, not in
//! service code: a customer can have at most one non-terminal case at a
//! time, and every update is a version compare-and-swap so concurrent
//! writers to the same case are linearized with the loser told its read
//! was stale.

use aml_core::{CustomerId, Error, InvestigationId, Result, TenantId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::types::Investigation;

/// Investigation persistence operations
pub trait InvestigationRepository: Send + Sync {
    /// Store a new case, enforcing at most one active case per customer
    fn insert_investigation(&self, investigation: Investigation) -> Result<()>;

    /// Fetch by id
    fn investigation(
        &self,
        tenant: TenantId,
        id: InvestigationId,
    ) -> Result<Option<Investigation>>;

    /// The customer's current non-terminal case, if any
    fn active_investigation(
        &self,
        tenant: TenantId,
        customer: CustomerId,
    ) -> Result<Option<Investigation>>;

    /// Every case ever opened for the customer, oldest first
    fn investigations_for_customer(
        &self,
        tenant: TenantId,
        customer: CustomerId,
    ) -> Result<Vec<Investigation>>;

    /// Replace a case if and only if its stored version still equals
    /// `expected_version`; returns the persisted record with the version
    /// bumped. A mismatch means another writer got there first, and a
    /// case already in a terminal state rejects every write.
    fn update_investigation(
        &self,
        investigation: Investigation,
        expected_version: u64,
    ) -> Result<Investigation>;
}

/// In-memory investigation store
#[derive(Default)]
pub struct InvestigationStore {
    cases: DashMap<(TenantId, InvestigationId), Investigation>,
    active: DashMap<(TenantId, CustomerId), InvestigationId>,
}

impl InvestigationStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl InvestigationRepository for InvestigationStore {
    fn insert_investigation(&self, investigation: Investigation) -> Result<()> {
        let key = (investigation.tenant_id, investigation.id);
        if self.cases.contains_key(&key) {
            return Err(Error::conflict(
                "investigation.id",
                investigation.id.as_uuid(),
            ));
        }

        if !investigation.status.is_terminal() {
            match self
                .active
                .entry((investigation.tenant_id, investigation.customer_id))
            {
                Entry::Occupied(slot) => {
                    return Err(Error::conflict(
                        "investigation.active",
                        slot.get().as_uuid(),
                    ));
                }
                Entry::Vacant(slot) => {
                    slot.insert(investigation.id);
                }
            }
        }

        self.cases.insert(key, investigation);
        Ok(())
    }

    fn investigation(
        &self,
        tenant: TenantId,
        id: InvestigationId,
    ) -> Result<Option<Investigation>> {
        Ok(self.cases.get(&(tenant, id)).map(|c| c.clone()))
    }

    fn active_investigation(
        &self,
        tenant: TenantId,
        customer: CustomerId,
    ) -> Result<Option<Investigation>> {
        let Some(id) = self.active.get(&(tenant, customer)).map(|id| *id) else {
            return Ok(None);
        };
        self.investigation(tenant, id)
    }

    fn investigations_for_customer(
        &self,
        tenant: TenantId,
        customer: CustomerId,
    ) -> Result<Vec<Investigation>> {
        let mut cases: Vec<Investigation> = self
            .cases
            .iter()
            .filter(|entry| {
                entry.value().tenant_id == tenant && entry.value().customer_id == customer
            })
            .map(|entry| entry.value().clone())
            .collect();
        cases.sort_by(|a, b| {
            a.opened_at
                .cmp(&b.opened_at)
                .then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()))
        });
        Ok(cases)
    }

    fn update_investigation(
        &self,
        investigation: Investigation,
        expected_version: u64,
    ) -> Result<Investigation> {
        let key = (investigation.tenant_id, investigation.id);
        let Some(mut slot) = self.cases.get_mut(&key) else {
            return Err(Error::Storage(format!(
                "investigation {} not found",
                investigation.id
            )));
        };

        if slot.version != expected_version {
            return Err(Error::invalid_state(
                "update_investigation",
                format!(
                    "stale read: stored version {}, expected {}",
                    slot.version, expected_version
                ),
            ));
        }

        if slot.status.is_terminal() {
            return Err(Error::invalid_state(
                "update_investigation",
                format!("{} is terminal", slot.status),
            ));
        }

        let mut next = investigation;
        next.version = expected_version + 1;
        let stored = next.clone();
        let tenant = stored.tenant_id;
        let customer = stored.customer_id;
        let closes = stored.status.is_terminal();
        *slot = next;
        // Release the record lock before touching the index; the index
        // path in insert runs the other way around.
        drop(slot);

        if closes {
            self.active.remove(&(tenant, customer));
        }
        Ok(stored)
    }
}
