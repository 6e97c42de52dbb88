//! Workflow service: applies events to persisted applications
//!
//! Loads the application, runs the pure transition function and writes the
//! result back under an optimistic concurrency guard. A stale write is
//! retried once against a fresh read; a second conflict goes back to the
//! caller.
//!
//! Rows owned by other services (payments, assessments) that must move with
//! the application are passed as [`LinkedWrite`]s and land in the same
//! transaction as the status change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    evaluate_payment_gate, notification_intents, transition, Actor, Application,
    AssessmentStatus, AssessmentType, NotificationIntent, PaymentGate, PaymentStatus,
    TransitionContext, TransitionOutcome, UserRole, WorkflowEvent,
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ApplicationRow, APPLICATION_COLUMNS};

/// A payment or assessment row written in the same transaction as a
/// workflow transition
#[derive(Debug, Clone, PartialEq)]
pub enum LinkedWrite {
    /// Settle a payment that is still PENDING
    SettlePayment {
        payment_id: Uuid,
        status: PaymentStatus,
    },
    /// Insert a SCHEDULED assessment for the application
    InsertAssessment {
        assessment_id: Uuid,
        auditor_id: Uuid,
        assessment_type: AssessmentType,
        scheduled_at: DateTime<Utc>,
    },
    /// Move an assessment out of `expected`; `None` fields keep their value
    UpdateAssessment {
        assessment_id: Uuid,
        expected: AssessmentStatus,
        status: AssessmentStatus,
        passed: Option<bool>,
        score: Option<Decimal>,
        notes: Option<String>,
    },
}

/// Persistence collaborator for application workflow state
#[axum::async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Read an application by id
    async fn load(&self, application_id: Uuid) -> AppResult<Application>;

    /// Write the outcome if `application.version` is still current, together
    /// with the audit entry, notification intents and linked rows. Returns
    /// [`AppError::ConcurrencyConflict`] on a stale version; nothing is
    /// written when any part fails.
    async fn commit(
        &self,
        application: &Application,
        outcome: &TransitionOutcome,
        actor: &Actor,
        intents: &[NotificationIntent],
        linked: &[LinkedWrite],
    ) -> AppResult<Application>;
}

/// PostgreSQL-backed [`ApplicationStore`]
#[derive(Clone)]
pub struct PgApplicationStore {
    db: PgPool,
}

impl PgApplicationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Convert a row, reporting corrupt rows to operators
pub(crate) fn application_from_row(row: ApplicationRow) -> AppResult<Application> {
    let id = row.id;
    Application::try_from(row).map_err(|err| {
        tracing::error!(application_id = %id, alert = true, "{}", err);
        AppError::from(err)
    })
}

#[axum::async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn load(&self, application_id: Uuid) -> AppResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        ))
        .bind(application_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application".to_string()))?;

        application_from_row(row)
    }

    async fn commit(
        &self,
        application: &Application,
        outcome: &TransitionOutcome,
        actor: &Actor,
        intents: &[NotificationIntent],
        linked: &[LinkedWrite],
    ) -> AppResult<Application> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications SET
                workflow_status = $3,
                revision_count = $4,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(application.id)
        .bind(application.version)
        .bind(outcome.to.as_str())
        .bind(i32::try_from(outcome.revision_count).unwrap_or(i32::MAX))
        .fetch_optional(&mut *tx)
        .await?;

        // Zero rows: someone else wrote first. Dropping tx rolls back.
        let Some(row) = row else {
            return Err(AppError::ConcurrencyConflict(format!(
                "application {} is no longer at version {}",
                application.id, application.version
            )));
        };

        sqlx::query(
            r#"
            INSERT INTO workflow_transitions (
                application_id, from_status, to_status, event, event_name,
                actor_id, actor_role, revision_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(application.id)
        .bind(outcome.from.as_str())
        .bind(outcome.to.as_str())
        .bind(sqlx::types::Json(&outcome.event))
        .bind(outcome.event.name())
        .bind(actor.user_id)
        .bind(actor.role.as_str())
        .bind(i32::try_from(outcome.revision_count).unwrap_or(i32::MAX))
        .execute(&mut *tx)
        .await?;

        for intent in intents {
            sqlx::query(
                r#"
                INSERT INTO notifications (
                    user_id, application_id, notification_type, title, message, action_url
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(intent.user_id)
            .bind(application.id)
            .bind(intent.notification_type.as_str())
            .bind(&intent.title)
            .bind(&intent.message)
            .bind(&intent.action_url)
            .execute(&mut *tx)
            .await?;
        }

        for write in linked {
            write_linked(&mut tx, application.id, write).await?;
        }

        tx.commit().await?;

        application_from_row(row)
    }
}

async fn write_linked(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
    write: &LinkedWrite,
) -> AppResult<()> {
    match write {
        LinkedWrite::SettlePayment { payment_id, status } => {
            let result = sqlx::query(
                r#"
                UPDATE payments SET
                    status = $3,
                    paid_at = CASE WHEN $3 = 'COMPLETED' THEN NOW() ELSE NULL END
                WHERE id = $1 AND application_id = $2 AND status = 'PENDING'
                "#,
            )
            .bind(payment_id)
            .bind(application_id)
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::InvalidStateTransition(format!(
                    "payment {} is no longer pending",
                    payment_id
                )));
            }
        }
        LinkedWrite::InsertAssessment {
            assessment_id,
            auditor_id,
            assessment_type,
            scheduled_at,
        } => {
            sqlx::query(
                r#"
                INSERT INTO assessments (
                    id, application_id, auditor_id, assessment_type, status, scheduled_at
                )
                VALUES ($1, $2, $3, $4, 'SCHEDULED', $5)
                "#,
            )
            .bind(assessment_id)
            .bind(application_id)
            .bind(auditor_id)
            .bind(assessment_type.as_str())
            .bind(scheduled_at)
            .execute(&mut **tx)
            .await?;
        }
        LinkedWrite::UpdateAssessment {
            assessment_id,
            expected,
            status,
            passed,
            score,
            notes,
        } => {
            let result = sqlx::query(
                r#"
                UPDATE assessments SET
                    status = $4,
                    passed = COALESCE($5, passed),
                    score = COALESCE($6, score),
                    notes = COALESCE($7, notes),
                    updated_at = NOW()
                WHERE id = $1 AND application_id = $2 AND status = $3
                "#,
            )
            .bind(assessment_id)
            .bind(application_id)
            .bind(expected.as_str())
            .bind(status.as_str())
            .bind(passed)
            .bind(score)
            .bind(notes)
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::InvalidStateTransition(format!(
                    "assessment {} is no longer {}",
                    assessment_id,
                    expected.as_str()
                )));
            }
        }
    }
    Ok(())
}

/// Applies workflow events to applications held in an [`ApplicationStore`]
#[derive(Clone)]
pub struct WorkflowService<S> {
    store: S,
}

impl WorkflowService<PgApplicationStore> {
    /// Create a WorkflowService over the PostgreSQL store
    pub fn with_pool(db: PgPool) -> Self {
        Self::new(PgApplicationStore::new(db))
    }
}

impl<S: ApplicationStore> WorkflowService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load an application the actor is allowed to see
    pub async fn load_for(&self, application_id: Uuid, actor: &Actor) -> AppResult<Application> {
        let application = self.store.load(application_id).await?;
        ensure_can_access(&application, actor)?;
        Ok(application)
    }

    /// Apply an event sent by an API client.
    ///
    /// Payment and assessment events carry rows owned by their services and
    /// are only accepted through those services.
    pub async fn apply_client_event(
        &self,
        application_id: Uuid,
        event: WorkflowEvent,
        actor: &Actor,
    ) -> AppResult<Application> {
        if is_service_owned(&event) {
            return Err(AppError::InvalidStateTransition(format!(
                "{} can only be recorded through its payment or assessment endpoint",
                event.name()
            )));
        }
        self.apply_event(application_id, event, actor).await
    }

    /// Apply `event` on behalf of `actor`, retrying once on a concurrent write
    pub async fn apply_event(
        &self,
        application_id: Uuid,
        event: WorkflowEvent,
        actor: &Actor,
    ) -> AppResult<Application> {
        self.apply_event_linked(application_id, event, actor, &[])
            .await
    }

    /// Apply `event` and write `linked` rows in the same transaction,
    /// retrying once on a concurrent write
    pub async fn apply_event_linked(
        &self,
        application_id: Uuid,
        event: WorkflowEvent,
        actor: &Actor,
        linked: &[LinkedWrite],
    ) -> AppResult<Application> {
        match self.try_apply(application_id, &event, actor, linked).await {
            Err(AppError::ConcurrencyConflict(reason)) => {
                tracing::warn!(
                    application_id = %application_id,
                    event = event.name(),
                    "Concurrent update ({}), retrying once",
                    reason
                );
                self.try_apply(application_id, &event, actor, linked).await
            }
            result => result,
        }
    }

    async fn try_apply(
        &self,
        application_id: Uuid,
        event: &WorkflowEvent,
        actor: &Actor,
        linked: &[LinkedWrite],
    ) -> AppResult<Application> {
        let application = self.load_for(application_id, actor).await?;
        let context = TransitionContext::for_application(&application, actor.role);
        let outcome = transition(application.workflow_status, event, &context)?;
        let intents =
            notification_intents(&application, &outcome, application.applicant_language);

        let updated = self
            .store
            .commit(&application, &outcome, actor, &intents, linked)
            .await?;

        tracing::info!(
            application_id = %application_id,
            from = %outcome.from,
            to = %outcome.to,
            revision_count = outcome.revision_count,
            actor_role = %actor.role,
            "Workflow transition committed"
        );

        Ok(updated)
    }

    /// Payment the applicant owes right now, if any
    pub async fn payment_gate(
        &self,
        application_id: Uuid,
        actor: &Actor,
    ) -> AppResult<Option<PaymentGate>> {
        let application = self.load_for(application_id, actor).await?;
        Ok(evaluate_payment_gate(
            application.workflow_status,
            application.revision_count,
        ))
    }
}

fn is_service_owned(event: &WorkflowEvent) -> bool {
    matches!(
        event,
        WorkflowEvent::PaymentRequested { .. }
            | WorkflowEvent::PaymentConfirmed { .. }
            | WorkflowEvent::AssessmentSchedule { .. }
            | WorkflowEvent::AssessmentStart
            | WorkflowEvent::AssessmentReportFiled
            | WorkflowEvent::AssessmentComplete { .. }
    )
}

/// Applicants only see their own applications; staff see all
pub(crate) fn ensure_can_access(application: &Application, actor: &Actor) -> AppResult<()> {
    if actor.role == UserRole::Applicant && application.applicant_id != actor.user_id {
        // Don't reveal that the application exists
        return Err(AppError::NotFound("Application".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::{
        ApplicationNumber, ApplicationStatus, CultivationMethod, FarmDetails, Language,
        Milestone, NotificationType, PaymentReceipt, WorkflowStatus,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store that can simulate competing writers
    #[derive(Default)]
    struct MemoryStore {
        applications: Mutex<HashMap<Uuid, Application>>,
        notifications: Mutex<Vec<NotificationIntent>>,
        linked: Mutex<Vec<LinkedWrite>>,
        /// Linked writes fail as if their row had already moved on
        reject_linked: AtomicUsize,
        conflicts_to_inject: AtomicUsize,
        commits: AtomicUsize,
    }

    impl MemoryStore {
        fn insert(&self, application: Application) {
            self.applications
                .lock()
                .unwrap()
                .insert(application.id, application);
        }

        fn get(&self, id: Uuid) -> Application {
            self.applications.lock().unwrap()[&id].clone()
        }
    }

    #[axum::async_trait]
    impl ApplicationStore for MemoryStore {
        async fn load(&self, application_id: Uuid) -> AppResult<Application> {
            self.applications
                .lock()
                .unwrap()
                .get(&application_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Application".to_string()))
        }

        async fn commit(
            &self,
            application: &Application,
            outcome: &TransitionOutcome,
            _actor: &Actor,
            intents: &[NotificationIntent],
            linked: &[LinkedWrite],
        ) -> AppResult<Application> {
            let mut applications = self.applications.lock().unwrap();
            let stored = applications
                .get_mut(&application.id)
                .ok_or_else(|| AppError::NotFound("Application".to_string()))?;

            // Another writer slips in first
            if self.conflicts_to_inject.load(Ordering::SeqCst) > 0 {
                self.conflicts_to_inject.fetch_sub(1, Ordering::SeqCst);
                stored.version += 1;
            }

            if stored.version != application.version {
                return Err(AppError::ConcurrencyConflict("stale version".to_string()));
            }

            if !linked.is_empty() && self.reject_linked.load(Ordering::SeqCst) > 0 {
                return Err(AppError::InvalidStateTransition(
                    "linked row is no longer pending".to_string(),
                ));
            }

            stored.workflow_status = outcome.to;
            stored.status = ApplicationStatus::from(outcome.to);
            stored.revision_count = outcome.revision_count;
            stored.version += 1;
            self.commits.fetch_add(1, Ordering::SeqCst);
            self.notifications
                .lock()
                .unwrap()
                .extend_from_slice(intents);
            self.linked.lock().unwrap().extend_from_slice(linked);
            Ok(stored.clone())
        }
    }

    fn application(status: WorkflowStatus, applicant_id: Uuid) -> Application {
        Application {
            id: Uuid::new_v4(),
            application_number: ApplicationNumber::new(2024, 1).unwrap(),
            applicant_id,
            product_id: Uuid::new_v4(),
            status: ApplicationStatus::from(status),
            workflow_status: status,
            revision_count: 0,
            max_free_revisions: 3,
            farm: FarmDetails {
                farm_name: "Doi Saket Farm".to_string(),
                province: "Chiang Mai".to_string(),
                area_rai: Decimal::from(12),
                crop: "Cannabis sativa".to_string(),
                strain: None,
                cultivation_method: CultivationMethod::Greenhouse,
            },
            applicant_language: Language::English,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn actor(role: UserRole) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role,
            preferred_language: Language::Thai,
        }
    }

    #[tokio::test]
    async fn test_apply_event_commits_and_notifies() {
        let store = MemoryStore::default();
        let reviewer = actor(UserRole::Reviewer);
        let app = application(WorkflowStatus::UnderReview, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        let updated = service
            .apply_event(id, WorkflowEvent::ReviewReject, &reviewer)
            .await
            .unwrap();

        assert_eq!(updated.workflow_status, WorkflowStatus::RevisionRequested);
        assert_eq!(updated.revision_count, 1);
        assert_eq!(updated.version, 1);

        let notifications = service.store.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications[0].notification_type,
            NotificationType::RevisionRequested
        );
    }

    #[tokio::test]
    async fn test_conflict_is_retried_once() {
        let store = MemoryStore::default();
        store.conflicts_to_inject.store(1, Ordering::SeqCst);
        let app = application(WorkflowStatus::UnderReview, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        let updated = service
            .apply_event(id, WorkflowEvent::ReviewApprove, &actor(UserRole::Reviewer))
            .await
            .unwrap();

        assert_eq!(updated.workflow_status, WorkflowStatus::ReviewApproved);
        assert_eq!(service.store.commits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_conflict_surfaces() {
        let store = MemoryStore::default();
        store.conflicts_to_inject.store(2, Ordering::SeqCst);
        let app = application(WorkflowStatus::UnderReview, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        let result = service
            .apply_event(id, WorkflowEvent::ReviewApprove, &actor(UserRole::Reviewer))
            .await;

        assert!(matches!(result, Err(AppError::ConcurrencyConflict(_))));
        assert_eq!(
            service.store.get(id).workflow_status,
            WorkflowStatus::UnderReview
        );
    }

    #[tokio::test]
    async fn test_invalid_event_does_not_write() {
        let store = MemoryStore::default();
        let app = application(WorkflowStatus::UnderReview, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        let result = service
            .apply_event(
                id,
                WorkflowEvent::AssessmentComplete {
                    assessment_type: shared::AssessmentType::Onsite,
                    passed: true,
                },
                &actor(UserRole::Auditor),
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
        assert_eq!(service.store.commits.load(Ordering::SeqCst), 0);
        assert_eq!(service.store.get(id).version, 0);
    }

    #[tokio::test]
    async fn test_applicant_cannot_touch_other_applications() {
        let store = MemoryStore::default();
        let app = application(WorkflowStatus::Draft, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        let result = service
            .apply_event(id, WorkflowEvent::Submit, &actor(UserRole::Applicant))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_owner_submits_and_sees_payment_gate() {
        let store = MemoryStore::default();
        let owner = actor(UserRole::Applicant);
        let app = application(WorkflowStatus::Draft, owner.user_id);
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        service
            .apply_event(id, WorkflowEvent::Submit, &owner)
            .await
            .unwrap();

        let gate = service.payment_gate(id, &owner).await.unwrap().unwrap();
        assert_eq!(gate.milestone, shared::Milestone::DocumentReview);
        assert_eq!(gate.amount, Decimal::from(5000));
    }

    fn settled_receipt(milestone: Milestone) -> PaymentReceipt {
        PaymentReceipt {
            milestone,
            status: PaymentStatus::Completed,
            amount: milestone.standard_fee().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_client_cannot_confirm_payment() {
        let store = MemoryStore::default();
        let app = application(WorkflowStatus::PaymentPendingReview, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        let result = service
            .apply_client_event(
                id,
                WorkflowEvent::PaymentConfirmed {
                    receipt: settled_receipt(Milestone::DocumentReview),
                },
                &actor(UserRole::Admin),
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
        assert_eq!(service.store.commits.load(Ordering::SeqCst), 0);
        assert_eq!(
            service.store.get(id).workflow_status,
            WorkflowStatus::PaymentPendingReview
        );
    }

    #[tokio::test]
    async fn test_client_cannot_send_service_owned_events() {
        let store = MemoryStore::default();
        let app = application(WorkflowStatus::Submitted, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        let admin = actor(UserRole::Admin);
        for event in [
            WorkflowEvent::PaymentRequested {
                milestone: Milestone::DocumentReview,
            },
            WorkflowEvent::AssessmentStart,
            WorkflowEvent::AssessmentReportFiled,
        ] {
            let result = service.apply_client_event(id, event, &admin).await;
            assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
        }
        assert_eq!(service.store.commits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_client_review_events_still_apply() {
        let store = MemoryStore::default();
        let app = application(WorkflowStatus::UnderReview, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        let updated = service
            .apply_client_event(id, WorkflowEvent::ReviewApprove, &actor(UserRole::Reviewer))
            .await
            .unwrap();

        assert_eq!(updated.workflow_status, WorkflowStatus::ReviewApproved);
    }

    #[tokio::test]
    async fn test_linked_write_lands_with_transition() {
        let store = MemoryStore::default();
        let app = application(WorkflowStatus::PaymentPendingReview, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let settle = LinkedWrite::SettlePayment {
            payment_id: Uuid::new_v4(),
            status: PaymentStatus::Completed,
        };
        let service = WorkflowService::new(store);
        let updated = service
            .apply_event_linked(
                id,
                WorkflowEvent::PaymentConfirmed {
                    receipt: settled_receipt(Milestone::DocumentReview),
                },
                &Actor::system(),
                std::slice::from_ref(&settle),
            )
            .await
            .unwrap();

        assert_eq!(updated.workflow_status, WorkflowStatus::PaymentConfirmedReview);
        assert_eq!(*service.store.linked.lock().unwrap(), vec![settle]);
    }

    #[tokio::test]
    async fn test_linked_write_is_written_once_after_retry() {
        let store = MemoryStore::default();
        store.conflicts_to_inject.store(1, Ordering::SeqCst);
        let app = application(WorkflowStatus::OnsiteAssessmentScheduled, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let start = LinkedWrite::UpdateAssessment {
            assessment_id: Uuid::new_v4(),
            expected: AssessmentStatus::Scheduled,
            status: AssessmentStatus::InProgress,
            passed: None,
            score: None,
            notes: None,
        };
        let service = WorkflowService::new(store);
        service
            .apply_event_linked(
                id,
                WorkflowEvent::AssessmentStart,
                &actor(UserRole::Auditor),
                std::slice::from_ref(&start),
            )
            .await
            .unwrap();

        assert_eq!(service.store.linked.lock().unwrap().len(), 1);
        assert_eq!(service.store.commits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_linked_write_leaves_workflow_untouched() {
        let store = MemoryStore::default();
        store.reject_linked.store(1, Ordering::SeqCst);
        let app = application(WorkflowStatus::PaymentPendingReview, Uuid::new_v4());
        let id = app.id;
        store.insert(app);

        let service = WorkflowService::new(store);
        let result = service
            .apply_event_linked(
                id,
                WorkflowEvent::PaymentConfirmed {
                    receipt: settled_receipt(Milestone::DocumentReview),
                },
                &Actor::system(),
                &[LinkedWrite::SettlePayment {
                    payment_id: Uuid::new_v4(),
                    status: PaymentStatus::Completed,
                }],
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
        assert_eq!(service.store.commits.load(Ordering::SeqCst), 0);
        assert_eq!(service.store.get(id).version, 0);
        assert!(service.store.notifications.lock().unwrap().is_empty());
    }
}
