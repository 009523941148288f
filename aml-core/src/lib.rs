//! Vigil AML Core
//!
//! Shared domain model for the compliance engines: customer and transaction
//! records, per-jurisdiction regional configuration, business-day deadline
//! arithmetic and the in-memory repositories the services run against.
//!
//! # Architecture
//!
//! - **Tenant isolation**: every record and lookup is keyed by tenant
//! - **Storage-level uniqueness**: index reservation arbitrates concurrent creates
//! - **Injected time**: services read the clock through [`Clock`], never directly
//! - **Regional profiles**: thresholds, deadlines and calendars load from TOML

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

// Re-exports
pub use calendar::BusinessCalendar;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::RegionalConfig;
pub use error::{Error, Result};
pub use store::{CustomerRepository, MemoryStore, TransactionRepository};
pub use types::{
    Currency, Customer, CustomerId, EntityKind, InvestigationId, MonitoringLevel, RiskLevel,
    TenantId, Transaction, TransactionId, TransferDirection,
};
