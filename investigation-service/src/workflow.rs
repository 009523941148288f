//! Case lifecycle transitions
//!
//! Every transition loads the case, checks the state rule, applies the
//! mutation, and writes back through the store's compare-and-swap. Two
//! operators racing on the same case are linearized by that write: the
//! loser's transition fails with a stale-state error instead of silently
//! clobbering the winner's.

use std::collections::BTreeMap;
use std::sync::Arc;

use aml_core::{
    Clock, CustomerId, CustomerRepository, Error, InvestigationId, Result, TenantId,
};
use tracing::{info, warn};

use crate::store::InvestigationRepository;
use crate::types::{
    Cancellation, EscalationEntry, InformationRequest, Investigation, InvestigationOutcome,
    InvestigationStatus, Recommendation, SectionName,
};

/// Runs the enhanced due-diligence case lifecycle.
pub struct InvestigationWorkflow {
    investigations: Arc<dyn InvestigationRepository>,
    customers: Arc<dyn CustomerRepository>,
    clock: Arc<dyn Clock>,
}

impl InvestigationWorkflow {
    /// Wire the workflow over its stores
    pub fn new(
        investigations: Arc<dyn InvestigationRepository>,
        customers: Arc<dyn CustomerRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            investigations,
            customers,
            clock,
        }
    }

    /// Open a case for a customer.
    ///
    /// The store enforces one active case per customer; a second create
    /// fails with a conflict carrying the existing case's id.
    pub fn create(
        &self,
        tenant: TenantId,
        customer_id: CustomerId,
        reason: &str,
    ) -> Result<Investigation> {
        let reason = non_empty("reason", reason)?;
        if self.customers.customer(tenant, customer_id)?.is_none() {
            return Err(Error::validation("customer_id", "unknown customer"));
        }

        let investigation =
            Investigation::open(tenant, customer_id, reason.to_string(), self.clock.now());
        self.investigations
            .insert_investigation(investigation.clone())?;

        info!(
            investigation_id = %investigation.id,
            customer_id = %customer_id,
            "investigation opened"
        );
        Ok(investigation)
    }

    /// Send the customer a dated, itemized information request.
    ///
    /// Valid from `open` or `under_review`; moves the case to
    /// `awaiting_customer_info`.
    pub fn request_information(
        &self,
        tenant: TenantId,
        id: InvestigationId,
        items: Vec<String>,
    ) -> Result<Investigation> {
        let trimmed: Vec<String> = items.iter().map(|i| i.trim().to_string()).collect();
        if trimmed.is_empty() || trimmed.iter().any(String::is_empty) {
            return Err(Error::validation(
                "items",
                "an information request needs at least one non-empty item",
            ));
        }

        let mut case = self.load(tenant, id)?;
        require_status(
            &case,
            "request_information",
            &[InvestigationStatus::Open, InvestigationStatus::UnderReview],
        )?;

        let now = self.clock.now();
        case.information_requests.push(InformationRequest {
            items: trimmed,
            requested_at: now,
        });
        case.status = InvestigationStatus::AwaitingCustomerInfo;
        case.updated_at = now;
        let expected = case.version;
        self.investigations.update_investigation(case, expected)
    }

    /// Start (or resume) active review of the case.
    ///
    /// Valid from `open` or `awaiting_customer_info`, for instance when
    /// the customer's response arrives.
    pub fn begin_review(&self, tenant: TenantId, id: InvestigationId) -> Result<Investigation> {
        let mut case = self.load(tenant, id)?;
        require_status(
            &case,
            "begin_review",
            &[
                InvestigationStatus::Open,
                InvestigationStatus::AwaitingCustomerInfo,
            ],
        )?;

        case.status = InvestigationStatus::UnderReview;
        case.updated_at = self.clock.now();
        let expected = case.version;
        self.investigations.update_investigation(case, expected)
    }

    /// Escalate the case, appending to its escalation history.
    ///
    /// Valid from any non-terminal state, including `escalated` itself;
    /// prior escalation entries are always retained.
    pub fn escalate(
        &self,
        tenant: TenantId,
        id: InvestigationId,
        reason: &str,
    ) -> Result<Investigation> {
        let reason = non_empty("reason", reason)?;
        let mut case = self.load(tenant, id)?;
        require_status(
            &case,
            "escalate",
            &[
                InvestigationStatus::Open,
                InvestigationStatus::AwaitingCustomerInfo,
                InvestigationStatus::UnderReview,
                InvestigationStatus::Escalated,
            ],
        )?;

        let now = self.clock.now();
        case.escalations.push(EscalationEntry {
            reason: reason.to_string(),
            escalated_at: now,
        });
        case.status = InvestigationStatus::Escalated;
        case.updated_at = now;
        let expected = case.version;
        let stored = self.investigations.update_investigation(case, expected)?;

        warn!(
            investigation_id = %id,
            escalations = stored.escalations.len(),
            "investigation escalated"
        );
        Ok(stored)
    }

    /// Close the case with findings and a recommendation.
    ///
    /// Valid only from `under_review` or `escalated`. The customer's
    /// monitoring level is derived from the recommendation and applied to
    /// the customer record after the case write wins its compare-and-swap.
    pub fn complete(
        &self,
        tenant: TenantId,
        id: InvestigationId,
        findings: &str,
        risk_summary: &str,
        recommendation: Recommendation,
    ) -> Result<Investigation> {
        let findings = non_empty("findings", findings)?;
        let risk_summary = non_empty("risk_summary", risk_summary)?;

        let mut case = self.load(tenant, id)?;
        require_status(
            &case,
            "complete",
            &[
                InvestigationStatus::UnderReview,
                InvestigationStatus::Escalated,
            ],
        )?;

        let now = self.clock.now();
        let monitoring_level = recommendation.monitoring_level();
        case.outcome = Some(InvestigationOutcome {
            findings: findings.to_string(),
            risk_summary: risk_summary.to_string(),
            recommendation,
            monitoring_level,
            completed_at: now,
        });
        case.status = InvestigationStatus::Completed;
        case.updated_at = now;
        let expected = case.version;
        let stored = self.investigations.update_investigation(case, expected)?;

        let Some(mut customer) = self.customers.customer(tenant, stored.customer_id)? else {
            return Err(Error::Storage(format!(
                "customer {} vanished during completion",
                stored.customer_id
            )));
        };
        customer.monitoring_level = monitoring_level;
        self.customers.update_customer(customer)?;

        info!(
            investigation_id = %id,
            recommendation = ?recommendation,
            monitoring_level = ?monitoring_level,
            "investigation completed"
        );
        Ok(stored)
    }

    /// Abandon the case without an outcome. Valid from any non-terminal
    /// state.
    pub fn cancel(
        &self,
        tenant: TenantId,
        id: InvestigationId,
        reason: &str,
    ) -> Result<Investigation> {
        let reason = non_empty("reason", reason)?;
        let mut case = self.load(tenant, id)?;
        require_status(
            &case,
            "cancel",
            &[
                InvestigationStatus::Open,
                InvestigationStatus::AwaitingCustomerInfo,
                InvestigationStatus::UnderReview,
                InvestigationStatus::Escalated,
            ],
        )?;

        let now = self.clock.now();
        case.cancellation = Some(Cancellation {
            reason: reason.to_string(),
            cancelled_at: now,
        });
        case.status = InvestigationStatus::Cancelled;
        case.updated_at = now;
        let expected = case.version;
        self.investigations.update_investigation(case, expected)
    }

    /// Merge fields into a checklist section and stamp its review time.
    ///
    /// A side channel, not a transition: the case status is untouched.
    /// Closed cases reject the mutation to keep their files immutable.
    pub fn update_checklist(
        &self,
        tenant: TenantId,
        id: InvestigationId,
        section: SectionName,
        updates: BTreeMap<String, String>,
    ) -> Result<Investigation> {
        let mut case = self.load(tenant, id)?;
        if case.status.is_terminal() {
            return Err(Error::invalid_state(
                "update_checklist",
                case.status.to_string(),
            ));
        }

        let now = self.clock.now();
        case.checklist.section_mut(section).merge(updates, now);
        case.updated_at = now;
        let expected = case.version;
        self.investigations.update_investigation(case, expected)
    }

    fn load(&self, tenant: TenantId, id: InvestigationId) -> Result<Investigation> {
        self.investigations
            .investigation(tenant, id)?
            .ok_or_else(|| Error::validation("investigation_id", "unknown investigation"))
    }
}

fn require_status(
    case: &Investigation,
    operation: &'static str,
    allowed: &[InvestigationStatus],
) -> Result<()> {
    if allowed.contains(&case.status) {
        Ok(())
    } else {
        Err(Error::invalid_state(operation, case.status.to_string()))
    }
}

fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation(field, "must not be empty"))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InvestigationStore;
    use aml_core::{
        Customer, EntityKind, FixedClock, MemoryStore, MonitoringLevel,
    };
    use chrono::{TimeZone, Utc};

    struct Fixture {
        workflow: InvestigationWorkflow,
        customers: Arc<MemoryStore>,
        tenant: TenantId,
        customer: CustomerId,
    }

    fn fixture() -> Fixture {
        let customers = Arc::new(MemoryStore::new());
        let tenant = TenantId::generate();
        let customer_id = CustomerId::generate();
        customers
            .insert_customer(Customer {
                id: customer_id,
                tenant_id: tenant,
                kind: EntityKind::Individual,
                first_name: Some("Noor".to_string()),
                last_name: Some("Rahman".to_string()),
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
                created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            })
            .unwrap();

        let workflow = InvestigationWorkflow::new(
            Arc::new(InvestigationStore::new()),
            customers.clone(),
            Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 6, 4, 1, 0, 0).unwrap(),
            )),
        );
        Fixture {
            workflow,
            customers,
            tenant,
            customer: customer_id,
        }
    }

    #[test]
    fn test_full_lifecycle_to_smr_escalation() {
        let f = fixture();
        let case = f
            .workflow
            .create(f.tenant, f.customer, "structuring pattern in June window")
            .unwrap();
        assert_eq!(case.status, InvestigationStatus::Open);

        let case = f
            .workflow
            .request_information(
                f.tenant,
                case.id,
                vec!["source of funds".to_string(), "payslips".to_string()],
            )
            .unwrap();
        assert_eq!(case.status, InvestigationStatus::AwaitingCustomerInfo);
        assert_eq!(case.information_requests.len(), 1);
        assert_eq!(case.information_requests[0].items.len(), 2);

        let case = f.workflow.begin_review(f.tenant, case.id).unwrap();
        assert_eq!(case.status, InvestigationStatus::UnderReview);

        let case = f
            .workflow
            .escalate(f.tenant, case.id, "customer explanation inconsistent")
            .unwrap();
        assert_eq!(case.status, InvestigationStatus::Escalated);

        let case = f
            .workflow
            .complete(
                f.tenant,
                case.id,
                "pattern consistent with structuring",
                "high residual risk",
                Recommendation::EscalateToSmr,
            )
            .unwrap();
        assert_eq!(case.status, InvestigationStatus::Completed);
        let outcome = case.outcome.expect("completed case has an outcome");
        assert_eq!(outcome.monitoring_level, MonitoringLevel::Enhanced);

        let customer = f.customers.customer(f.tenant, f.customer).unwrap().unwrap();
        assert_eq!(customer.monitoring_level, MonitoringLevel::Enhanced);
    }

    #[test]
    fn test_create_for_unknown_customer_is_validation_error() {
        let f = fixture();
        let err = f
            .workflow
            .create(f.tenant, CustomerId::generate(), "anything")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                field: "customer_id",
                ..
            }
        ));
    }

    #[test]
    fn test_second_active_case_is_conflict() {
        let f = fixture();
        let first = f
            .workflow
            .create(f.tenant, f.customer, "screening match")
            .unwrap();

        let err = f
            .workflow
            .create(f.tenant, f.customer, "threshold trigger")
            .unwrap_err();
        match err {
            Error::Conflict { existing_id, .. } => {
                assert_eq!(existing_id, first.id.as_uuid());
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_from_open_is_invalid_state() {
        let f = fixture();
        let case = f
            .workflow
            .create(f.tenant, f.customer, "screening match")
            .unwrap();

        let err = f
            .workflow
            .complete(
                f.tenant,
                case.id,
                "findings",
                "summary",
                Recommendation::ApproveRelationship,
            )
            .unwrap_err();
        match err {
            Error::InvalidState { operation, current } => {
                assert_eq!(operation, "complete");
                assert_eq!(current, "open");
            }
            other => panic!("expected invalid state, got {other:?}"),
        }
    }

    #[test]
    fn test_request_information_from_escalated_is_invalid() {
        let f = fixture();
        let case = f
            .workflow
            .create(f.tenant, f.customer, "screening match")
            .unwrap();
        f.workflow
            .escalate(f.tenant, case.id, "senior review needed")
            .unwrap();

        let err = f
            .workflow
            .request_information(f.tenant, case.id, vec!["id documents".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn test_escalations_are_append_only() {
        let f = fixture();
        let case = f
            .workflow
            .create(f.tenant, f.customer, "velocity anomaly")
            .unwrap();

        f.workflow.escalate(f.tenant, case.id, "first pass").unwrap();
        let case = f
            .workflow
            .escalate(f.tenant, case.id, "second opinion")
            .unwrap();

        assert_eq!(case.escalations.len(), 2);
        assert_eq!(case.escalations[0].reason, "first pass");
        assert_eq!(case.escalations[1].reason, "second opinion");
    }

    #[test]
    fn test_cancel_frees_customer_for_new_case() {
        let f = fixture();
        let case = f
            .workflow
            .create(f.tenant, f.customer, "initial trigger")
            .unwrap();
        let cancelled = f
            .workflow
            .cancel(f.tenant, case.id, "opened against wrong customer")
            .unwrap();
        assert_eq!(cancelled.status, InvestigationStatus::Cancelled);
        assert!(cancelled.cancellation.is_some());

        f.workflow
            .create(f.tenant, f.customer, "fresh trigger")
            .unwrap();
    }

    #[test]
    fn test_reject_relationship_blocks_customer() {
        let f = fixture();
        let case = f
            .workflow
            .create(f.tenant, f.customer, "sanctions exposure")
            .unwrap();
        f.workflow.begin_review(f.tenant, case.id).unwrap();
        f.workflow
            .complete(
                f.tenant,
                case.id,
                "confirmed exposure",
                "unacceptable risk",
                Recommendation::RejectRelationship,
            )
            .unwrap();

        let customer = f.customers.customer(f.tenant, f.customer).unwrap().unwrap();
        assert_eq!(customer.monitoring_level, MonitoringLevel::Blocked);
    }

    #[test]
    fn test_checklist_merge_is_a_side_channel() {
        let f = fixture();
        let case = f
            .workflow
            .create(f.tenant, f.customer, "pattern review")
            .unwrap();

        let case = f
            .workflow
            .update_checklist(
                f.tenant,
                case.id,
                SectionName::Employment,
                BTreeMap::from([
                    ("occupation".to_string(), "consultant".to_string()),
                    ("employer".to_string(), "self-employed".to_string()),
                ]),
            )
            .unwrap();
        // Status untouched, section stamped
        assert_eq!(case.status, InvestigationStatus::Open);
        assert!(case.checklist.employment.reviewed_at.is_some());

        let case = f
            .workflow
            .update_checklist(
                f.tenant,
                case.id,
                SectionName::Employment,
                BTreeMap::from([("employer".to_string(), "Acme Pty Ltd".to_string())]),
            )
            .unwrap();
        assert_eq!(case.checklist.employment.fields["occupation"], "consultant");
        assert_eq!(case.checklist.employment.fields["employer"], "Acme Pty Ltd");
    }

    #[test]
    fn test_checklist_rejected_on_closed_case() {
        let f = fixture();
        let case = f
            .workflow
            .create(f.tenant, f.customer, "review")
            .unwrap();
        f.workflow
            .cancel(f.tenant, case.id, "withdrawn")
            .unwrap();

        let err = f
            .workflow
            .update_checklist(
                f.tenant,
                case.id,
                SectionName::CustomerInfo,
                BTreeMap::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn test_blank_reason_is_validation_error() {
        let f = fixture();
        let err = f.workflow.create(f.tenant, f.customer, "   ").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "reason", .. }));
    }

    #[test]
    fn test_racing_writers_are_linearized() {
        use std::sync::Barrier;
        use std::thread;

        let f = fixture();
        let case = f
            .workflow
            .create(f.tenant, f.customer, "competing reviewers")
            .unwrap();
        f.workflow.begin_review(f.tenant, case.id).unwrap();

        let workflow = Arc::new(f.workflow);
        let barrier = Arc::new(Barrier::new(2));

        let escalator = {
            let workflow = workflow.clone();
            let barrier = barrier.clone();
            let (tenant, id) = (f.tenant, case.id);
            thread::spawn(move || {
                barrier.wait();
                workflow.escalate(tenant, id, "needs senior sign-off")
            })
        };
        let completer = {
            let workflow = workflow.clone();
            let barrier = barrier.clone();
            let (tenant, id) = (f.tenant, case.id);
            thread::spawn(move || {
                barrier.wait();
                workflow.complete(
                    tenant,
                    id,
                    "explained and documented",
                    "low residual risk",
                    Recommendation::ApproveRelationship,
                )
            })
        };

        let escalate_result = escalator.join().unwrap();
        let complete_result = completer.join().unwrap();

        // Whatever the interleaving, the case ends in exactly the state
        // of the writer whose compare-and-swap landed last valid: a
        // completed close when `complete` won, an escalated case when it
        // lost its read race.
        let final_case = workflow
            .investigations
            .investigation(f.tenant, case.id)
            .unwrap()
            .unwrap();
        match (&escalate_result, &complete_result) {
            (Ok(_), Ok(_)) => {
                assert_eq!(final_case.status, InvestigationStatus::Completed);
            }
            (Ok(_), Err(Error::InvalidState { .. })) => {
                assert_eq!(final_case.status, InvestigationStatus::Escalated);
            }
            (Err(Error::InvalidState { .. }), Ok(_)) => {
                assert_eq!(final_case.status, InvestigationStatus::Completed);
            }
            other => panic!("unexpected outcome pair: {other:?}"),
        }
    }
}
