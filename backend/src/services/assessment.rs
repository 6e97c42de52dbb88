//! Assessment service: scheduling and recording auditor assessments

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    passes_score, Actor, Assessment, AssessmentStatus, AssessmentType, WorkflowEvent,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::error::{AppError, AppResult};
use crate::models::{AssessmentRow, ASSESSMENT_COLUMNS};
use crate::services::workflow::{LinkedWrite, PgApplicationStore, WorkflowService};

/// Assessment service for auditors
#[derive(Clone)]
pub struct AssessmentService {
    db: PgPool,
    workflow: WorkflowService<PgApplicationStore>,
    pass_score: Decimal,
}

/// Input for scheduling an assessment
#[derive(Debug, Deserialize)]
pub struct ScheduleAssessmentInput {
    pub assessment_type: AssessmentType,
    pub scheduled_at: DateTime<Utc>,
    /// Defaults to the scheduling auditor
    pub auditor_id: Option<Uuid>,
}

/// Input for filing an assessment report
#[derive(Debug, Deserialize)]
pub struct AssessmentReportInput {
    pub score: Decimal,
    pub notes: Option<String>,
}

/// Input for the final verdict
#[derive(Debug, Deserialize)]
pub struct CompleteAssessmentInput {
    /// Explicit verdict; when absent the score decides
    pub passed: Option<bool>,
    pub score: Option<Decimal>,
}

fn assessment_from_row(row: AssessmentRow) -> AppResult<Assessment> {
    let id = row.id;
    Assessment::try_from(row).map_err(|err| {
        tracing::error!(assessment_id = %id, alert = true, "{}", err);
        AppError::from(err)
    })
}

fn validate_score(score: Decimal) -> AppResult<()> {
    shared::validate_assessment_score(score).map_err(|msg| AppError::Validation {
        field: "score".to_string(),
        message: msg.to_string(),
        message_th: "คะแนนต้องอยู่ระหว่าง 0 ถึง 100".to_string(),
    })
}

/// Verdict for a completed assessment: the explicit flag wins, otherwise the
/// score decides against `pass_mark`
pub(crate) fn assessment_verdict(
    passed: Option<bool>,
    score: Option<Decimal>,
    pass_mark: Decimal,
) -> AppResult<bool> {
    passed
        .or_else(|| score.map(|s| passes_score(s, pass_mark)))
        .ok_or_else(|| AppError::Validation {
            field: "passed".to_string(),
            message: "A verdict or a score is required".to_string(),
            message_th: "ต้องระบุผลการประเมินหรือคะแนน".to_string(),
        })
}

fn ensure_status(assessment: &Assessment, expected: AssessmentStatus) -> AppResult<()> {
    if assessment.status != expected {
        return Err(AppError::InvalidStateTransition(format!(
            "assessment is {}",
            assessment.status.as_str()
        )));
    }
    Ok(())
}

impl AssessmentService {
    /// Create a new AssessmentService instance
    pub fn new(db: PgPool, config: &WorkflowConfig) -> Self {
        Self {
            workflow: WorkflowService::with_pool(db.clone()),
            db,
            pass_score: config.assessment_pass_score,
        }
    }

    /// Schedule an assessment for a paid application
    pub async fn schedule_assessment(
        &self,
        actor: &Actor,
        application_id: Uuid,
        input: ScheduleAssessmentInput,
    ) -> AppResult<Assessment> {
        let assessment_id = Uuid::new_v4();
        self.workflow
            .apply_event_linked(
                application_id,
                WorkflowEvent::AssessmentSchedule {
                    assessment_type: input.assessment_type,
                },
                actor,
                &[LinkedWrite::InsertAssessment {
                    assessment_id,
                    auditor_id: input.auditor_id.unwrap_or(actor.user_id),
                    assessment_type: input.assessment_type,
                    scheduled_at: input.scheduled_at,
                }],
            )
            .await?;

        self.get_assessment(assessment_id).await
    }

    /// Start a scheduled assessment
    pub async fn start_assessment(&self, actor: &Actor, assessment_id: Uuid) -> AppResult<Assessment> {
        let assessment = self.get_assessment(assessment_id).await?;
        ensure_status(&assessment, AssessmentStatus::Scheduled)?;

        self.workflow
            .apply_event_linked(
                assessment.application_id,
                WorkflowEvent::AssessmentStart,
                actor,
                &[LinkedWrite::UpdateAssessment {
                    assessment_id,
                    expected: AssessmentStatus::Scheduled,
                    status: AssessmentStatus::InProgress,
                    passed: None,
                    score: None,
                    notes: None,
                }],
            )
            .await?;

        self.get_assessment(assessment_id).await
    }

    /// File the auditor's report. The verdict follows separately.
    pub async fn file_report(
        &self,
        actor: &Actor,
        assessment_id: Uuid,
        input: AssessmentReportInput,
    ) -> AppResult<Assessment> {
        validate_score(input.score)?;
        let assessment = self.get_assessment(assessment_id).await?;
        ensure_status(&assessment, AssessmentStatus::InProgress)?;

        self.workflow
            .apply_event_linked(
                assessment.application_id,
                WorkflowEvent::AssessmentReportFiled,
                actor,
                &[LinkedWrite::UpdateAssessment {
                    assessment_id,
                    expected: AssessmentStatus::InProgress,
                    status: AssessmentStatus::InProgress,
                    passed: None,
                    score: Some(input.score),
                    notes: input.notes,
                }],
            )
            .await?;

        self.get_assessment(assessment_id).await
    }

    /// Record the verdict. A pass certifies the application; a fail sends it
    /// back to the applicant under the revision policy.
    pub async fn complete_assessment(
        &self,
        actor: &Actor,
        assessment_id: Uuid,
        input: CompleteAssessmentInput,
    ) -> AppResult<Assessment> {
        if let Some(score) = input.score {
            validate_score(score)?;
        }
        let assessment = self.get_assessment(assessment_id).await?;
        ensure_status(&assessment, AssessmentStatus::InProgress)?;

        let score = input.score.or(assessment.score);
        let passed = assessment_verdict(input.passed, score, self.pass_score)?;

        self.workflow
            .apply_event_linked(
                assessment.application_id,
                WorkflowEvent::AssessmentComplete {
                    assessment_type: assessment.assessment_type,
                    passed,
                },
                actor,
                &[LinkedWrite::UpdateAssessment {
                    assessment_id,
                    expected: AssessmentStatus::InProgress,
                    status: AssessmentStatus::Completed,
                    passed: Some(passed),
                    score,
                    notes: None,
                }],
            )
            .await?;

        tracing::info!(
            assessment_id = %assessment_id,
            application_id = %assessment.application_id,
            passed,
            "Assessment completed"
        );

        self.get_assessment(assessment_id).await
    }

    /// Get an assessment by ID
    pub async fn get_assessment(&self, assessment_id: Uuid) -> AppResult<Assessment> {
        let row = sqlx::query_as::<_, AssessmentRow>(&format!(
            "SELECT {} FROM assessments WHERE id = $1",
            ASSESSMENT_COLUMNS
        ))
        .bind(assessment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment".to_string()))?;

        assessment_from_row(row)
    }

    /// List assessments for an application
    pub async fn list_assessments(
        &self,
        actor: &Actor,
        application_id: Uuid,
    ) -> AppResult<Vec<Assessment>> {
        let _ = self.workflow.load_for(application_id, actor).await?;

        let rows = sqlx::query_as::<_, AssessmentRow>(&format!(
            "SELECT {} FROM assessments WHERE application_id = $1 ORDER BY scheduled_at DESC",
            ASSESSMENT_COLUMNS
        ))
        .bind(application_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(assessment_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_verdict_wins_over_score() {
        assert!(!assessment_verdict(Some(false), Some(Decimal::from(95)), Decimal::from(70)).unwrap());
        assert!(assessment_verdict(Some(true), Some(Decimal::from(10)), Decimal::from(70)).unwrap());
        assert!(assessment_verdict(Some(true), None, Decimal::from(70)).unwrap());
    }

    #[test]
    fn test_score_decides_against_pass_mark() {
        assert!(assessment_verdict(None, Some(Decimal::from(70)), Decimal::from(70)).unwrap());
        assert!(assessment_verdict(None, Some(Decimal::new(885, 1)), Decimal::from(70)).unwrap());
        assert!(!assessment_verdict(None, Some(Decimal::new(6999, 2)), Decimal::from(70)).unwrap());
    }

    #[test]
    fn test_missing_verdict_and_score_is_a_validation_error() {
        let result = assessment_verdict(None, None, Decimal::from(70));
        assert!(matches!(
            result,
            Err(AppError::Validation { ref field, .. }) if field == "passed"
        ));
    }
}
