//! Payment service: milestone invoices and payment-service callbacks

use chrono::{Days, Utc};
use shared::{
    evaluate_payment_gate, Actor, Milestone, Payment, PaymentStatus, WorkflowEvent,
    WorkflowStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::error::{AppError, AppResult};
use crate::models::{PaymentRow, PAYMENT_COLUMNS};
use crate::services::workflow::{LinkedWrite, PgApplicationStore, WorkflowService};

/// Payment service for milestone fees
#[derive(Clone)]
pub struct PaymentService {
    db: PgPool,
    workflow: WorkflowService<PgApplicationStore>,
    payment_due_days: u32,
}

fn payment_from_row(row: PaymentRow) -> AppResult<Payment> {
    let id = row.id;
    Payment::try_from(row).map_err(|err| {
        tracing::error!(payment_id = %id, alert = true, "{}", err);
        AppError::from(err)
    })
}

/// What a payment-service callback does to a stored payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settlement {
    /// The payment is pending and takes the reported status
    Apply,
    /// The same result was already recorded; replay it
    AlreadyRecorded,
}

/// Decide how a reported `reported` status applies to a payment in `current`
pub(crate) fn settlement(current: PaymentStatus, reported: PaymentStatus) -> AppResult<Settlement> {
    if reported == PaymentStatus::Pending {
        return Err(AppError::ValidationError(
            "payment result must be COMPLETED, FAILED or CANCELLED".to_string(),
        ));
    }
    if !current.is_settled() {
        return Ok(Settlement::Apply);
    }
    if current == reported {
        return Ok(Settlement::AlreadyRecorded);
    }
    Err(AppError::InvalidStateTransition(format!(
        "payment is already {}",
        current.as_str()
    )))
}

/// Gated statuses that have not yet recorded an invoice
fn awaits_invoice(status: WorkflowStatus) -> bool {
    matches!(
        status,
        WorkflowStatus::Submitted | WorkflowStatus::ReviewApproved
    )
}

/// Postgres reports a unique index violation with SQLSTATE 23505
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

impl PaymentService {
    /// Create a new PaymentService instance
    pub fn new(db: PgPool, config: &WorkflowConfig) -> Self {
        Self {
            workflow: WorkflowService::with_pool(db.clone()),
            db,
            payment_due_days: config.payment_due_days,
        }
    }

    /// Issue an invoice for the payment the application currently owes.
    ///
    /// Returns the open invoice if one already exists for the milestone.
    pub async fn request_payment(&self, actor: &Actor, application_id: Uuid) -> AppResult<Payment> {
        let application = self.workflow.load_for(application_id, actor).await?;

        let gate = evaluate_payment_gate(application.workflow_status, application.revision_count)
            .ok_or_else(|| {
                AppError::InvalidStateTransition(format!(
                    "no payment is due in status {}",
                    application.workflow_status
                ))
            })?;

        let payment = match self
            .find_pending(application_id, gate.milestone)
            .await?
        {
            Some(existing) => existing,
            None => {
                let due_date = Utc::now()
                    .date_naive()
                    .checked_add_days(Days::new(u64::from(self.payment_due_days)))
                    .ok_or_else(|| AppError::Internal("payment due date overflow".to_string()))?;

                let inserted = sqlx::query_as::<_, PaymentRow>(&format!(
                    r#"
                    INSERT INTO payments (application_id, milestone, amount, status, due_date)
                    VALUES ($1, $2, $3, 'PENDING', $4)
                    RETURNING {}
                    "#,
                    PAYMENT_COLUMNS
                ))
                .bind(application_id)
                .bind(i16::from(gate.milestone.number()))
                .bind(gate.amount)
                .bind(due_date)
                .fetch_one(&self.db)
                .await;

                match inserted {
                    Ok(row) => {
                        tracing::info!(
                            application_id = %application_id,
                            milestone = gate.milestone.number(),
                            amount = %gate.amount,
                            "Payment requested"
                        );
                        payment_from_row(row)?
                    }
                    // A concurrent request issued the invoice first
                    Err(err) if is_unique_violation(&err) => self
                        .find_pending(application_id, gate.milestone)
                        .await?
                        .ok_or(AppError::DatabaseError(err))?,
                    Err(err) => return Err(err.into()),
                }
            }
        };

        // Gated statuses that have not yet recorded the invoice move to pending
        if awaits_invoice(application.workflow_status) {
            let requested = self
                .workflow
                .apply_event(
                    application_id,
                    WorkflowEvent::PaymentRequested {
                        milestone: gate.milestone,
                    },
                    &Actor::system(),
                )
                .await;

            if let Err(err) = requested {
                // A concurrent request may already have moved the application
                let current = self.workflow.load_for(application_id, actor).await?;
                let same_gate = evaluate_payment_gate(current.workflow_status, current.revision_count)
                    .map(|open| open.milestone)
                    == Some(gate.milestone);
                if awaits_invoice(current.workflow_status) || !same_gate {
                    return Err(err);
                }
            }
        }

        Ok(payment)
    }

    /// Record the result reported by the payment service.
    ///
    /// A completed payment confirms the milestone in the workflow in the same
    /// transaction. Replaying a result that is already recorded returns the
    /// stored payment.
    pub async fn record_payment_result(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> AppResult<Payment> {
        let existing = self.get_payment(payment_id).await?;
        if settlement(existing.status, status)? == Settlement::AlreadyRecorded {
            return Ok(existing);
        }

        let recorded = if status == PaymentStatus::Completed {
            let receipt = Payment {
                status,
                ..existing.clone()
            }
            .receipt();
            self.workflow
                .apply_event_linked(
                    existing.application_id,
                    WorkflowEvent::PaymentConfirmed { receipt },
                    &Actor::system(),
                    &[LinkedWrite::SettlePayment { payment_id, status }],
                )
                .await
                .map(|_| ())
        } else {
            self.settle_without_transition(payment_id, status).await
        };

        if let Err(err) = recorded {
            // A concurrent callback may have recorded the same result
            let current = self.get_payment(payment_id).await?;
            return match settlement(current.status, status) {
                Ok(Settlement::AlreadyRecorded) => Ok(current),
                _ => Err(err),
            };
        }

        let payment = self.get_payment(payment_id).await?;
        tracing::info!(
            payment_id = %payment_id,
            application_id = %payment.application_id,
            status = payment.status.as_str(),
            "Payment result recorded"
        );
        Ok(payment)
    }

    /// Failed and cancelled payments leave the workflow waiting
    async fn settle_without_transition(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE payments SET status = $2, paid_at = NULL WHERE id = $1 AND status = 'PENDING'",
        )
        .bind(payment_id)
        .bind(status.as_str())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidStateTransition(format!(
                "payment {} is no longer pending",
                payment_id
            )));
        }
        Ok(())
    }

    /// Get a payment by ID
    pub async fn get_payment(&self, payment_id: Uuid) -> AppResult<Payment> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment".to_string()))?;

        payment_from_row(row)
    }

    /// List payments for an application, newest first
    pub async fn list_payments(&self, actor: &Actor, application_id: Uuid) -> AppResult<Vec<Payment>> {
        let _ = self.workflow.load_for(application_id, actor).await?;

        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE application_id = $1 ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(application_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(payment_from_row).collect()
    }

    async fn find_pending(
        &self,
        application_id: Uuid,
        milestone: Milestone,
    ) -> AppResult<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            SELECT {} FROM payments
            WHERE application_id = $1 AND milestone = $2 AND status = 'PENDING'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(application_id)
        .bind(i16::from(milestone.number()))
        .fetch_optional(&self.db)
        .await?;

        row.map(payment_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_payment_takes_any_result() {
        for reported in [
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Cancelled,
        ] {
            assert_eq!(
                settlement(PaymentStatus::Pending, reported).unwrap(),
                Settlement::Apply
            );
        }
    }

    #[test]
    fn test_pending_is_not_a_result() {
        assert!(matches!(
            settlement(PaymentStatus::Pending, PaymentStatus::Pending),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            settlement(PaymentStatus::Completed, PaymentStatus::Pending),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_replayed_result_is_idempotent() {
        assert_eq!(
            settlement(PaymentStatus::Completed, PaymentStatus::Completed).unwrap(),
            Settlement::AlreadyRecorded
        );
        assert_eq!(
            settlement(PaymentStatus::Failed, PaymentStatus::Failed).unwrap(),
            Settlement::AlreadyRecorded
        );
    }

    #[test]
    fn test_settled_payment_rejects_a_different_result() {
        assert!(matches!(
            settlement(PaymentStatus::Completed, PaymentStatus::Failed),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert!(matches!(
            settlement(PaymentStatus::Cancelled, PaymentStatus::Completed),
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_only_unrecorded_gates_await_an_invoice() {
        assert!(awaits_invoice(WorkflowStatus::Submitted));
        assert!(awaits_invoice(WorkflowStatus::ReviewApproved));
        assert!(!awaits_invoice(WorkflowStatus::PaymentPendingReview));
        assert!(!awaits_invoice(WorkflowStatus::RejectedPaymentRequired));
    }

    #[test]
    fn test_only_database_errors_are_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }
}
