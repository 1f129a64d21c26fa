//! Shared wiring for handler tests: in-memory store, recording gateway,
//! a seeded recipient directory.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapters::memory::{InMemoryStore, StaticRecipientDirectory};
use crate::adapters::notification::GatewayNotificationDispatcher;
use crate::adapters::websocket::RecordingGateway;
use crate::domain::alert::ThresholdRules;
use crate::domain::breakdown::{BreakdownRecord, BreakdownStatus};
use crate::domain::foundation::{
    AuthenticatedSubject, DomainError, EquipmentId, ErrorCode, Role, UserId,
};
use crate::ports::{BreakdownRepository, Notification, NotificationDispatcher};

use super::alert::{RaiseAlertHandler, ResolveAlertHandler};
use super::breakdown::{
    ReportBreakdownHandler, RespondToBreakdownAlertHandler, ResolveBreakdownHandler,
    ReviewReorderHandler, SubmitReorderHandler,
};
use super::equipment::PublishStatusHandler;

const DIRECTORY: &str = r#"{
    "policyMakers": ["policy-1"],
    "labs": [
        {"labId": "LAB-A", "managers": ["manager-1"], "trainers": ["trainer-1"], "equipment": ["EQ-1"]}
    ]
}"#;

pub fn manager() -> AuthenticatedSubject {
    AuthenticatedSubject::new(UserId::new("manager-1").unwrap(), Role::LabManager)
}

pub fn policy_maker() -> AuthenticatedSubject {
    AuthenticatedSubject::new(UserId::new("policy-1").unwrap(), Role::PolicyMaker)
}

pub fn trainer() -> AuthenticatedSubject {
    AuthenticatedSubject::new(UserId::new("trainer-1").unwrap(), Role::Trainer)
}

struct FailingDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn dispatch(&self, _notification: Notification) -> Result<(), DomainError> {
        Err(DomainError::new(ErrorCode::InternalError, "Simulated dispatch failure"))
    }
}

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub gateway: Arc<RecordingGateway>,
    pub directory: Arc<StaticRecipientDirectory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl Fixture {
    pub fn new() -> Self {
        let gateway = Arc::new(RecordingGateway::new());
        Self {
            store: Arc::new(InMemoryStore::new()),
            dispatcher: Arc::new(GatewayNotificationDispatcher::new(gateway.clone())),
            gateway,
            directory: Arc::new(StaticRecipientDirectory::from_json(DIRECTORY).unwrap()),
        }
    }

    pub fn with_failing_dispatcher() -> Self {
        Self {
            dispatcher: Arc::new(FailingDispatcher),
            ..Self::new()
        }
    }

    pub fn raise_alert_handler(&self) -> RaiseAlertHandler {
        RaiseAlertHandler::new(
            self.store.clone(),
            self.gateway.clone(),
            self.directory.clone(),
            self.dispatcher.clone(),
        )
    }

    pub fn resolve_alert_handler(&self) -> ResolveAlertHandler {
        ResolveAlertHandler::new(self.store.clone(), self.gateway.clone(), self.directory.clone())
    }

    pub fn publish_status_handler(&self) -> PublishStatusHandler {
        PublishStatusHandler::new(
            self.store.clone(),
            self.gateway.clone(),
            Arc::new(self.raise_alert_handler()),
            ThresholdRules::default(),
        )
    }

    pub fn report_breakdown_handler(&self) -> ReportBreakdownHandler {
        ReportBreakdownHandler::new(
            self.store.clone(),
            self.gateway.clone(),
            Arc::new(self.raise_alert_handler()),
        )
    }

    pub fn respond_handler(&self) -> RespondToBreakdownAlertHandler {
        RespondToBreakdownAlertHandler::new(
            self.store.clone(),
            self.store.clone(),
            self.gateway.clone(),
            self.directory.clone(),
        )
    }

    pub fn submit_reorder_handler(&self) -> SubmitReorderHandler {
        SubmitReorderHandler::new(self.store.clone(), self.gateway.clone())
    }

    pub fn review_reorder_handler(&self) -> ReviewReorderHandler {
        ReviewReorderHandler::new(self.store.clone(), self.gateway.clone())
    }

    pub fn resolve_breakdown_handler(&self) -> ResolveBreakdownHandler {
        ResolveBreakdownHandler::new(self.store.clone(), self.gateway.clone())
    }

    /// Stores a REPORTED breakdown for EQ-1.
    pub async fn seed_breakdown(&self) -> BreakdownRecord {
        let record = BreakdownRecord::report(
            EquipmentId::new("EQ-1").unwrap(),
            "spindle seized",
            false,
            Some(manager().id),
        )
        .unwrap();
        self.store.insert_reported(&record).await.unwrap();
        record
    }

    /// Overwrites a stored breakdown's status, bypassing the workflow.
    pub async fn force_status(&self, record: &BreakdownRecord, status: BreakdownStatus) {
        let current = BreakdownRepository::find_by_id(self.store.as_ref(), &record.id)
            .await
            .unwrap()
            .unwrap();
        let mut next = current.clone();
        next.status = status;
        assert!(self
            .store
            .update_if_status(&next, current.status)
            .await
            .unwrap()
            .is_applied());
    }
}
