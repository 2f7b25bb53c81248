use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::engine::{EvaluationEngine, EvaluationError, EvaluationInput, EvaluationReport};
use super::repository::{
    EvaluationId, EvaluationRecord, EvaluationRepository, EvaluationSummaryView, RepositoryError,
};

/// Service composing the scoring engine with evaluation persistence.
pub struct EvaluationService<R> {
    repository: Arc<R>,
    engine: Arc<EvaluationEngine>,
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

/// Completed questionnaire as posted by the result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSubmission {
    pub quiz_id: String,
    #[serde(default)]
    pub answers: Value,
    #[serde(default)]
    pub profile: Option<String>,
}

impl<R> EvaluationService<R>
where
    R: EvaluationRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: Arc<EvaluationEngine>) -> Self {
        Self { repository, engine }
    }

    pub fn engine(&self) -> &EvaluationEngine {
        &self.engine
    }

    /// Score a completed questionnaire and persist the normalized answers with the score.
    pub fn submit(
        &self,
        submission: EvaluationSubmission,
    ) -> Result<EvaluationReport, EvaluationServiceError> {
        let EvaluationSubmission {
            quiz_id,
            answers,
            profile,
        } = submission;

        let mut report = self.engine.evaluate(&EvaluationInput {
            quiz_id,
            answers,
            stored_score: None,
        })?;

        let now = Utc::now();
        let record = EvaluationRecord {
            id: next_evaluation_id(),
            quiz_id: report.quiz_id.clone(),
            score: Some(report.score.score),
            answers: Value::Object(
                report
                    .answers
                    .iter()
                    .map(|answer| (answer.question_id.clone(), Value::from(answer.value)))
                    .collect(),
            ),
            created_at: now,
            completed_at: Some(now),
            profile,
        };

        let stored = self.repository.insert(record)?;
        info!(
            evaluation_id = %stored.id.0,
            quiz_id = %stored.quiz_id,
            score = report.score.score,
            level = report.maturity.level_number,
            "evaluation stored"
        );

        report.evaluation_id = Some(stored.id.0);
        Ok(report)
    }

    /// Fetch a stored evaluation and recompute its report.
    pub fn report(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<EvaluationReport, EvaluationServiceError> {
        let record = self
            .repository
            .fetch(evaluation_id)?
            .ok_or(RepositoryError::NotFound)?;

        let mut report = self.engine.evaluate(&record.input())?;
        report.evaluation_id = Some(record.id.0);
        Ok(report)
    }

    pub fn recent(
        &self,
        profile: Option<&str>,
        limit: usize,
    ) -> Result<Vec<EvaluationSummaryView>, EvaluationServiceError> {
        let records = self.repository.recent(profile, limit)?;
        Ok(records.iter().map(EvaluationRecord::summary_view).collect())
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
