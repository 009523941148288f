//! Repository traits and the in-memory store
//!
//! Uniqueness is enforced at the storage layer through index reservation:
//! whichever caller claims the index entry first wins, and the loser gets a
//! conflict error naming the surviving record. Service code above this layer
//! never has to coordinate concurrent creates itself.

use crate::error::{Error, Result};
use crate::types::{Customer, CustomerId, TenantId, Transaction, TransactionId};
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Customer persistence
pub trait CustomerRepository: Send + Sync {
    /// Store a new customer, enforcing per-tenant uniqueness of external id
    /// and email
    fn insert_customer(&self, customer: Customer) -> Result<()>;

    /// Fetch by id
    fn customer(&self, tenant: TenantId, id: CustomerId) -> Result<Option<Customer>>;

    /// Replace an existing customer record
    fn update_customer(&self, customer: Customer) -> Result<()>;

    /// Lookup by the identifier assigned by the originating system
    fn customer_by_external_id(
        &self,
        tenant: TenantId,
        external_id: &str,
    ) -> Result<Option<Customer>>;

    /// Case-insensitive email lookup
    fn customer_by_email(&self, tenant: TenantId, email: &str) -> Result<Option<Customer>>;

    /// Individuals matching the exact name and date-of-birth triple,
    /// names compared case-insensitively
    fn customers_by_name_dob(
        &self,
        tenant: TenantId,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Vec<Customer>>;
}

/// Transaction persistence
pub trait TransactionRepository: Send + Sync {
    /// Store a new transaction, enforcing per-customer uniqueness of the
    /// external reference when one is present
    fn insert_transaction(&self, transaction: Transaction) -> Result<()>;

    /// Fetch by id
    fn transaction(&self, tenant: TenantId, id: TransactionId) -> Result<Option<Transaction>>;

    /// All transactions for a customer, oldest first
    fn transactions_for_customer(
        &self,
        tenant: TenantId,
        customer: CustomerId,
    ) -> Result<Vec<Transaction>>;

    /// Transactions for a customer with `occurred_at` in `[from, to]`,
    /// oldest first
    fn transactions_in_window(
        &self,
        tenant: TenantId,
        customer: CustomerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;

    /// Lookup by originating-system reference
    fn transaction_by_external_ref(
        &self,
        tenant: TenantId,
        customer: CustomerId,
        external_ref: &str,
    ) -> Result<Option<Transaction>>;
}

/// Concurrent in-memory store backing both repositories
#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: DashMap<(TenantId, CustomerId), Customer>,
    customers_by_external: DashMap<(TenantId, String), CustomerId>,
    customers_by_email: DashMap<(TenantId, String), CustomerId>,
    transactions: DashMap<(TenantId, TransactionId), Transaction>,
    transactions_by_ref: DashMap<(TenantId, CustomerId, String), TransactionId>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn claim_external_id(&self, customer: &Customer) -> Result<bool> {
        let Some(external_id) = &customer.external_id else {
            return Ok(false);
        };
        match self
            .customers_by_external
            .entry((customer.tenant_id, external_id.clone()))
        {
            Entry::Occupied(slot) if *slot.get() != customer.id => {
                Err(Error::conflict("customer.external_id", slot.get().as_uuid()))
            }
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(customer.id);
                Ok(true)
            }
        }
    }

    fn claim_email(&self, customer: &Customer) -> Result<bool> {
        let Some(email) = &customer.email else {
            return Ok(false);
        };
        match self
            .customers_by_email
            .entry((customer.tenant_id, email.to_lowercase()))
        {
            Entry::Occupied(slot) if *slot.get() != customer.id => {
                Err(Error::conflict("customer.email", slot.get().as_uuid()))
            }
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(customer.id);
                Ok(true)
            }
        }
    }

    fn release_external_id(&self, tenant: TenantId, external_id: &str) {
        self.customers_by_external
            .remove(&(tenant, external_id.to_string()));
    }

    fn release_email(&self, tenant: TenantId, email: &str) {
        self.customers_by_email
            .remove(&(tenant, email.to_lowercase()));
    }
}

impl CustomerRepository for MemoryStore {
    fn insert_customer(&self, customer: Customer) -> Result<()> {
        if self
            .customers
            .contains_key(&(customer.tenant_id, customer.id))
        {
            return Err(Error::conflict("customer.id", customer.id.as_uuid()));
        }

        let claimed_external = self.claim_external_id(&customer)?;
        match self.claim_email(&customer) {
            Ok(_) => {}
            Err(e) => {
                if claimed_external {
                    if let Some(external_id) = &customer.external_id {
                        self.release_external_id(customer.tenant_id, external_id);
                    }
                }
                return Err(e);
            }
        }

        self.customers
            .insert((customer.tenant_id, customer.id), customer);
        Ok(())
    }

    fn customer(&self, tenant: TenantId, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.customers.get(&(tenant, id)).map(|c| c.clone()))
    }

    fn update_customer(&self, customer: Customer) -> Result<()> {
        let key = (customer.tenant_id, customer.id);
        let Some(previous) = self.customers.get(&key).map(|c| c.clone()) else {
            return Err(Error::Storage(format!(
                "customer {} not found",
                customer.id
            )));
        };

        if previous.external_id != customer.external_id {
            self.claim_external_id(&customer)?;
            if let Some(old) = &previous.external_id {
                self.release_external_id(customer.tenant_id, old);
            }
        }

        let emails_differ = previous.email.as_deref().map(str::to_lowercase)
            != customer.email.as_deref().map(str::to_lowercase);
        if emails_differ {
            self.claim_email(&customer)?;
            if let Some(old) = &previous.email {
                self.release_email(customer.tenant_id, old);
            }
        }

        self.customers.insert(key, customer);
        Ok(())
    }

    fn customer_by_external_id(
        &self,
        tenant: TenantId,
        external_id: &str,
    ) -> Result<Option<Customer>> {
        let Some(id) = self
            .customers_by_external
            .get(&(tenant, external_id.to_string()))
            .map(|id| *id)
        else {
            return Ok(None);
        };
        self.customer(tenant, id)
    }

    fn customer_by_email(&self, tenant: TenantId, email: &str) -> Result<Option<Customer>> {
        let Some(id) = self
            .customers_by_email
            .get(&(tenant, email.to_lowercase()))
            .map(|id| *id)
        else {
            return Ok(None);
        };
        self.customer(tenant, id)
    }

    fn customers_by_name_dob(
        &self,
        tenant: TenantId,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Vec<Customer>> {
        let mut matches: Vec<Customer> = self
            .customers
            .iter()
            .filter(|entry| entry.key().0 == tenant)
            .map(|entry| entry.value().clone())
            .filter(|c| {
                c.date_of_birth == Some(date_of_birth)
                    && c.first_name
                        .as_deref()
                        .is_some_and(|n| n.eq_ignore_ascii_case(first_name))
                    && c.last_name
                        .as_deref()
                        .is_some_and(|n| n.eq_ignore_ascii_case(last_name))
            })
            .collect();
        matches.sort_by_key(|c| (c.created_at, c.id.as_uuid()));
        Ok(matches)
    }
}

impl TransactionRepository for MemoryStore {
    fn insert_transaction(&self, transaction: Transaction) -> Result<()> {
        if self
            .transactions
            .contains_key(&(transaction.tenant_id, transaction.id))
        {
            return Err(Error::conflict("transaction.id", transaction.id.as_uuid()));
        }

        if let Some(external_ref) = &transaction.external_ref {
            let key = (
                transaction.tenant_id,
                transaction.customer_id,
                external_ref.clone(),
            );
            match self.transactions_by_ref.entry(key) {
                Entry::Occupied(slot) => {
                    return Err(Error::conflict(
                        "transaction.external_ref",
                        slot.get().as_uuid(),
                    ));
                }
                Entry::Vacant(slot) => {
                    slot.insert(transaction.id);
                }
            }
        }

        self.transactions
            .insert((transaction.tenant_id, transaction.id), transaction);
        Ok(())
    }

    fn transaction(&self, tenant: TenantId, id: TransactionId) -> Result<Option<Transaction>> {
        Ok(self.transactions.get(&(tenant, id)).map(|t| t.clone()))
    }

    fn transactions_for_customer(
        &self,
        tenant: TenantId,
        customer: CustomerId,
    ) -> Result<Vec<Transaction>> {
        let mut found: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|entry| entry.key().0 == tenant)
            .map(|entry| entry.value().clone())
            .filter(|t| t.customer_id == customer)
            .collect();
        found.sort_by_key(|t| (t.occurred_at, t.id.as_uuid()));
        Ok(found)
    }

    fn transactions_in_window(
        &self,
        tenant: TenantId,
        customer: CustomerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let mut found = self.transactions_for_customer(tenant, customer)?;
        found.retain(|t| t.occurred_at >= from && t.occurred_at <= to);
        Ok(found)
    }

    fn transaction_by_external_ref(
        &self,
        tenant: TenantId,
        customer: CustomerId,
        external_ref: &str,
    ) -> Result<Option<Transaction>> {
        let Some(id) = self
            .transactions_by_ref
            .get(&(tenant, customer, external_ref.to_string()))
            .map(|id| *id)
        else {
            return Ok(None);
        };
        self.transaction(tenant, id)
    }
}
