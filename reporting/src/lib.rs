//! Regulator report generation
//!
//! Builds immutable snapshots for the mandatory report kinds (threshold
//! transaction, suspicious matter, international funds transfer
//! instruction) and serializes them to the submission XML schema and to
//! flat CSV. Submission deadlines are business-day math over the
//! regional calendar; both serializers are pure transforms, so
//! re-serializing an unchanged snapshot is byte-identical.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod csv;
pub mod generate;
pub mod types;
pub mod xml;

pub use aml_core::{Error, Result};
pub use generate::ReportGenerator;
pub use types::{
    ReportData, ReportId, ReportKind, ReportedRiskFactor, ReportedTransaction, ReportingParty,
    SuspicionContext, SuspicionDetails, TransferDetails,
};
