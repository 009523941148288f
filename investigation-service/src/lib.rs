//! Enhanced due-diligence investigation workflow
//!
//! A state machine over case records:
//! `open → awaiting_customer_info → under_review → escalated → completed`,
//! with `cancelled` reachable from every non-terminal state. One active
//! case per customer is enforced by the store, concurrent writers to the
//! same case are linearized by a version compare-and-swap, and a
//! completed case writes its derived monitoring level back to the
//! customer record.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod store;
pub mod types;
pub mod workflow;

pub use aml_core::{Error, Result};
pub use store::{InvestigationRepository, InvestigationStore};
pub use types::{
    Cancellation, Checklist, ChecklistSection, EscalationEntry, InformationRequest,
    Investigation, InvestigationOutcome, InvestigationStatus, Recommendation, SectionName,
};
pub use workflow::InvestigationWorkflow;
