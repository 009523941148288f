//! Enhanced due-diligence case types

use std::collections::BTreeMap;
use std::fmt;

use aml_core::{CustomerId, InvestigationId, MonitoringLevel, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationStatus {
    /// Opened, no reviewer activity yet
    Open,

    /// Waiting on requested information from the customer
    AwaitingCustomerInfo,

    /// A reviewer is actively working the case
    UnderReview,

    /// Raised to a senior reviewer or compliance officer
    Escalated,

    /// Closed with an outcome; terminal
    Completed,

    /// Closed without an outcome; terminal
    Cancelled,
}

impl InvestigationStatus {
    /// Whether the case can no longer change state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for InvestigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::AwaitingCustomerInfo => "awaiting_customer_info",
            Self::UnderReview => "under_review",
            Self::Escalated => "escalated",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Closing recommendation of a completed investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// No concerns; continue the relationship as-is
    ApproveRelationship,

    /// Continue with routine ongoing monitoring
    OngoingMonitoring,

    /// Continue under enhanced transaction monitoring
    EnhancedMonitoring,

    /// End the relationship
    RejectRelationship,

    /// Findings warrant a suspicious-matter report
    EscalateToSmr,
}

impl Recommendation {
    /// Post-investigation monitoring level the recommendation implies
    pub fn monitoring_level(self) -> MonitoringLevel {
        match self {
            Self::ApproveRelationship | Self::OngoingMonitoring => MonitoringLevel::Standard,
            Self::EnhancedMonitoring | Self::EscalateToSmr => MonitoringLevel::Enhanced,
            Self::RejectRelationship => MonitoringLevel::Blocked,
        }
    }
}

/// Named checklist section of the case file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    /// Identity and contact verification
    CustomerInfo,

    /// Occupation and employer checks
    Employment,

    /// Source of wealth and source of funds
    SourceOfWealth,

    /// Transaction pattern analysis
    PatternAnalysis,
}

/// State of one checklist section.
///
/// Fields are free-form key/value pairs so tenants can extend their
/// checklists without schema changes; `BTreeMap` keeps serialization
/// order stable for audit diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSection {
    /// Section fields, merged update by update
    pub fields: BTreeMap<String, String>,

    /// When the section was last touched by a reviewer
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ChecklistSection {
    /// Merge an update into the section: supplied fields overwrite,
    /// omitted fields are retained, and the review stamp moves to `now`.
    pub fn merge(&mut self, updates: BTreeMap<String, String>, now: DateTime<Utc>) {
        self.fields.extend(updates);
        self.reviewed_at = Some(now);
    }
}

/// The case file checklist, one section per review area
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    /// Identity and contact verification
    pub customer_info: ChecklistSection,

    /// Occupation and employer checks
    pub employment: ChecklistSection,

    /// Source of wealth and source of funds
    pub source_of_wealth: ChecklistSection,

    /// Transaction pattern analysis
    pub pattern_analysis: ChecklistSection,
}

impl Checklist {
    /// Mutable access to a section by name
    pub fn section_mut(&mut self, name: SectionName) -> &mut ChecklistSection {
        match name {
            SectionName::CustomerInfo => &mut self.customer_info,
            SectionName::Employment => &mut self.employment,
            SectionName::SourceOfWealth => &mut self.source_of_wealth,
            SectionName::PatternAnalysis => &mut self.pattern_analysis,
        }
    }

    /// Read access to a section by name
    pub fn section(&self, name: SectionName) -> &ChecklistSection {
        match name {
            SectionName::CustomerInfo => &self.customer_info,
            SectionName::Employment => &self.employment,
            SectionName::SourceOfWealth => &self.source_of_wealth,
            SectionName::PatternAnalysis => &self.pattern_analysis,
        }
    }
}

/// A dated, itemized request for information sent to the customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationRequest {
    /// What was asked for
    pub items: Vec<String>,

    /// When the request went out
    pub requested_at: DateTime<Utc>,
}

/// One escalation of the case; entries are append-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationEntry {
    /// Why the case was escalated
    pub reason: String,

    /// When it was escalated
    pub escalated_at: DateTime<Utc>,
}

/// Closing outcome of a completed investigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationOutcome {
    /// What the review established
    pub findings: String,

    /// Residual-risk summary
    pub risk_summary: String,

    /// The reviewer's recommendation
    pub recommendation: Recommendation,

    /// Monitoring level derived from the recommendation
    pub monitoring_level: MonitoringLevel,

    /// When the case was completed
    pub completed_at: DateTime<Utc>,
}

/// Record of a cancellation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    /// Why the case was abandoned
    pub reason: String,

    /// When it was cancelled
    pub cancelled_at: DateTime<Utc>,
}

/// An enhanced due-diligence case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    /// Stable identifier
    pub id: InvestigationId,

    /// Owning tenant
    pub tenant_id: TenantId,

    /// Customer under investigation
    pub customer_id: CustomerId,

    /// Current lifecycle state
    pub status: InvestigationStatus,

    /// Why the case was opened
    pub reason: String,

    /// Review checklist
    pub checklist: Checklist,

    /// Information requests sent, oldest first
    pub information_requests: Vec<InformationRequest>,

    /// Escalations raised, oldest first
    pub escalations: Vec<EscalationEntry>,

    /// Closing outcome, present once completed
    pub outcome: Option<InvestigationOutcome>,

    /// Cancellation record, present once cancelled
    pub cancellation: Option<Cancellation>,

    /// Storage write token; every successful update increments it
    pub version: u64,

    /// When the case was opened
    pub opened_at: DateTime<Utc>,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl Investigation {
    /// Open a fresh case for a customer
    pub fn open(
        tenant: TenantId,
        customer: CustomerId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InvestigationId::generate(),
            tenant_id: tenant,
            customer_id: customer,
            status: InvestigationStatus::Open,
            reason,
            checklist: Checklist::default(),
            information_requests: Vec::new(),
            escalations: Vec::new(),
            outcome: None,
            cancellation: None,
            version: 1,
            opened_at: now,
            updated_at: now,
        }
    }
}
