//! Import reconciliation: identity resolution and duplicate detection
//!
//! Ties each row of an import file to a customer record (resolving
//! through platform id, external id, email, then name and birth date),
//! decides whether the row's transaction repeats one already stored, and
//! runs whole batches under bounded concurrency with the storage layer
//! arbitrating create races.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod duplicates;
pub mod process;
pub mod resolve;
pub mod types;

pub use aml_core::{Error, Result};
pub use duplicates::DuplicateChecker;
pub use process::{BatchConfig, BatchProcessor, BatchSummary, RowOutcome, RowReport};
pub use resolve::CustomerResolver;
pub use types::{DuplicateCheck, DuplicateMethod, ImportRecord, MatchMethod, ResolveOutcome};
