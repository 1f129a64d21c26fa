//! End-to-end breakdown workflow against the in-memory store.
//!
//! Follows one piece of equipment from a FAULTY report, through the
//! breakdown check, a rejected and then an approved reorder, to resolution
//! and a fresh report afterwards.

use std::sync::Arc;

use lab_monitor::adapters::memory::{InMemoryStore, StaticRecipientDirectory};
use lab_monitor::adapters::notification::GatewayNotificationDispatcher;
use lab_monitor::adapters::websocket::{RecordingGateway, Target};
use lab_monitor::application::handlers::{
    GetBreakdownHandler, GetBreakdownQuery, PublishStatusCommand, PublishStatusHandler,
    RaiseAlertHandler, ReportBreakdownCommand, ReportBreakdownHandler, ResolveAlertCommand,
    ResolveAlertHandler, ResolveBreakdownCommand, ResolveBreakdownHandler,
    RespondToBreakdownAlertCommand, RespondToBreakdownAlertHandler, ReviewReorderCommand,
    ReviewReorderHandler, SubmitReorderCommand, SubmitReorderHandler,
};
use lab_monitor::domain::alert::{AlertError, AlertPriority, AlertType, ThresholdRules};
use lab_monitor::domain::breakdown::{
    BreakdownStatus, ReorderDetails, ReorderStatus, ReorderUrgency, ReviewDecision, WorkflowError,
};
use lab_monitor::domain::equipment::{OperationalStatus, StatusReport};
use lab_monitor::domain::foundation::{AuthenticatedSubject, EquipmentId, Role, UserId};
use lab_monitor::ports::RoomKey;

// =============================================================================
// Test Infrastructure
// =============================================================================

const DIRECTORY: &str = r#"{
    "policyMakers": ["policy-1"],
    "labs": [{"labId": "LAB-A", "managers": ["manager-1"], "equipment": ["EQ-1"]}]
}"#;

struct Lab {
    gateway: Arc<RecordingGateway>,
    publish: PublishStatusHandler,
    resolve_alert: ResolveAlertHandler,
    respond: RespondToBreakdownAlertHandler,
    report: ReportBreakdownHandler,
    submit: SubmitReorderHandler,
    review: ReviewReorderHandler,
    resolve: ResolveBreakdownHandler,
    get: GetBreakdownHandler,
}

impl Lab {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let directory = Arc::new(StaticRecipientDirectory::from_json(DIRECTORY).unwrap());
        let raise = Arc::new(RaiseAlertHandler::new(
            store.clone(),
            gateway.clone(),
            directory.clone(),
            Arc::new(GatewayNotificationDispatcher::new(gateway.clone())),
        ));

        Self {
            publish: PublishStatusHandler::new(
                store.clone(),
                gateway.clone(),
                raise.clone(),
                ThresholdRules::default(),
            ),
            resolve_alert: ResolveAlertHandler::new(store.clone(), gateway.clone(), directory.clone()),
            respond: RespondToBreakdownAlertHandler::new(
                store.clone(),
                store.clone(),
                gateway.clone(),
                directory,
            ),
            report: ReportBreakdownHandler::new(store.clone(), gateway.clone(), raise),
            submit: SubmitReorderHandler::new(store.clone(), gateway.clone()),
            review: ReviewReorderHandler::new(store.clone(), gateway.clone()),
            resolve: ResolveBreakdownHandler::new(store.clone(), gateway.clone()),
            get: GetBreakdownHandler::new(store),
            gateway,
        }
    }
}

fn manager() -> AuthenticatedSubject {
    AuthenticatedSubject::new(UserId::new("manager-1").unwrap(), Role::LabManager)
}

fn policy_maker() -> AuthenticatedSubject {
    AuthenticatedSubject::new(UserId::new("policy-1").unwrap(), Role::PolicyMaker)
}

fn eq1() -> EquipmentId {
    EquipmentId::new("EQ-1").unwrap()
}

fn parts() -> ReorderDetails {
    ReorderDetails {
        equipment_name: "Spindle motor".to_string(),
        quantity: 1,
        urgency: ReorderUrgency::High,
        reason: Some("burnt out".to_string()),
        estimated_cost: Some(480.0),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn faulty_report_through_reorder_to_resolution() {
    let lab = Lab::new();

    // EQ-1 reports FAULTY; the engine raises a HIGH breakdown check.
    let published = lab
        .publish
        .handle(PublishStatusCommand {
            equipment_id: "EQ-1".to_string(),
            report: StatusReport {
                status: Some(OperationalStatus::Faulty),
                ..StatusReport::default()
            },
        })
        .await
        .unwrap();
    let check = published.raised[0].clone();
    assert_eq!(check.alert_type, AlertType::EquipmentBreakdownCheck);
    assert_eq!(check.priority, AlertPriority::High);

    let alert_new = lab.gateway.named("alert-new");
    assert_eq!(alert_new.len(), 1);
    assert!(alert_new[0].target.includes(&RoomKey::user(&manager().id)));

    // The check cannot be closed through the generic path.
    let err = lab
        .resolve_alert
        .handle(ResolveAlertCommand {
            alert_id: check.id,
            resolver: manager(),
            note: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, AlertError::RequiresBreakdownDecision(check.id));

    // The manager confirms it; a REPORTED breakdown opens.
    let confirmed = lab
        .respond
        .handle(RespondToBreakdownAlertCommand {
            alert_id: check.id,
            responder: manager(),
            is_breakdown: true,
            reason: Some("spindle does not turn".to_string()),
        })
        .await
        .unwrap();
    assert!(confirmed.alert.resolved);
    let breakdown = confirmed.breakdown.unwrap();
    assert_eq!(breakdown.status, BreakdownStatus::Reported);
    assert!(breakdown.is_auto_detected);

    // Submit, reject with a comment, resubmit, approve.
    let first = lab
        .submit
        .handle(SubmitReorderCommand {
            breakdown_id: breakdown.id,
            details: parts(),
            requester: manager(),
        })
        .await
        .unwrap();
    assert_eq!(first.breakdown.status, BreakdownStatus::ReorderPending);

    let rejected = lab
        .review
        .handle(ReviewReorderCommand {
            reorder_request_id: first.request.id,
            decision: ReviewDecision::Rejected,
            comment: Some("get a second quote".to_string()),
            reviewer: policy_maker(),
        })
        .await
        .unwrap();
    assert_eq!(rejected.breakdown.status, BreakdownStatus::ReorderRejected);

    let second = lab
        .submit
        .handle(SubmitReorderCommand {
            breakdown_id: breakdown.id,
            details: parts(),
            requester: manager(),
        })
        .await
        .unwrap();
    assert_ne!(second.request.id, first.request.id);

    let approved = lab
        .review
        .handle(ReviewReorderCommand {
            reorder_request_id: second.request.id,
            decision: ReviewDecision::Approved,
            comment: None,
            reviewer: policy_maker(),
        })
        .await
        .unwrap();
    assert_eq!(approved.breakdown.status, BreakdownStatus::ReorderApproved);

    let reviewed = lab.gateway.named("reorder-reviewed");
    assert_eq!(reviewed.len(), 2);
    assert!(reviewed
        .iter()
        .all(|d| d.target == Target::Room(RoomKey::User(manager().id))));

    // Repaired.
    let resolved = lab
        .resolve
        .handle(ResolveBreakdownCommand {
            breakdown_id: breakdown.id,
            resolver: manager(),
        })
        .await
        .unwrap();
    assert_eq!(resolved.status, BreakdownStatus::Resolved);

    let details = lab
        .get
        .handle(GetBreakdownQuery {
            breakdown_id: breakdown.id,
        })
        .await
        .unwrap();
    let statuses: Vec<_> = details.reorder_requests.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![ReorderStatus::Rejected, ReorderStatus::Approved]);

    // No active record remains, so a new report is accepted.
    let again = lab
        .report
        .handle(ReportBreakdownCommand {
            equipment_id: eq1(),
            reason: "coolant leak".to_string(),
            reporter: manager(),
        })
        .await
        .unwrap();
    assert_eq!(again.breakdown.status, BreakdownStatus::Reported);
    assert_ne!(again.breakdown.id, breakdown.id);
}

#[tokio::test]
async fn second_report_while_active_is_rejected_with_existing_id() {
    let lab = Lab::new();
    let report = || ReportBreakdownCommand {
        equipment_id: eq1(),
        reason: "belt snapped".to_string(),
        reporter: manager(),
    };

    let first = lab.report.handle(report()).await.unwrap();
    let err = lab.report.handle(report()).await.unwrap_err();

    assert_eq!(
        err,
        WorkflowError::DuplicateActiveBreakdown {
            existing: first.breakdown.id
        }
    );
}

#[tokio::test]
async fn resolved_breakdown_rejects_reorder_and_stays_resolved() {
    let lab = Lab::new();
    let reported = lab
        .report
        .handle(ReportBreakdownCommand {
            equipment_id: eq1(),
            reason: "fuse blown".to_string(),
            reporter: manager(),
        })
        .await
        .unwrap()
        .breakdown;
    lab.resolve
        .handle(ResolveBreakdownCommand {
            breakdown_id: reported.id,
            resolver: manager(),
        })
        .await
        .unwrap();

    let err = lab
        .submit
        .handle(SubmitReorderCommand {
            breakdown_id: reported.id,
            details: parts(),
            requester: manager(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.current_state(), Some("RESOLVED"));

    let details = lab
        .get
        .handle(GetBreakdownQuery {
            breakdown_id: reported.id,
        })
        .await
        .unwrap();
    assert_eq!(details.breakdown.status, BreakdownStatus::Resolved);
    assert!(details.reorder_requests.is_empty());
}

#[tokio::test]
async fn resolving_an_alert_twice_announces_once() {
    let lab = Lab::new();
    let reported = lab
        .report
        .handle(ReportBreakdownCommand {
            equipment_id: eq1(),
            reason: "display dead".to_string(),
            reporter: manager(),
        })
        .await
        .unwrap();
    let alert = reported.alert.unwrap();
    let resolve = || ResolveAlertCommand {
        alert_id: alert.id,
        resolver: manager(),
        note: Some("acknowledged".to_string()),
    };

    let first = lab.resolve_alert.handle(resolve()).await.unwrap();
    let second = lab.resolve_alert.handle(resolve()).await.unwrap();

    assert!(first.newly_resolved);
    assert!(!second.newly_resolved);
    assert_eq!(lab.gateway.named("alert-resolved").len(), 1);
}
