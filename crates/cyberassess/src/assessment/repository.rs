use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::engine::EvaluationInput;

/// Identifier wrapper for persisted evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

/// Persisted questionnaire submission as handed over by the data-access layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    /// Quiz id the answers belong to.
    #[serde(rename = "type")]
    pub quiz_id: String,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub answers: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Owning profile id.
    #[serde(default)]
    pub profile: Option<String>,
}

impl EvaluationRecord {
    pub fn input(&self) -> EvaluationInput {
        EvaluationInput {
            quiz_id: self.quiz_id.clone(),
            answers: self.answers.clone(),
            stored_score: self.score,
        }
    }

    pub fn summary_view(&self) -> EvaluationSummaryView {
        EvaluationSummaryView {
            evaluation_id: self.id.clone(),
            quiz_id: self.quiz_id.clone(),
            score: self.score,
            completed_at: self.completed_at,
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait EvaluationRepository: Send + Sync {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError>;
    /// Most recently created records first, optionally restricted to one profile.
    fn recent(
        &self,
        profile: Option<&str>,
        limit: usize,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Listing entry without answers or recommendations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummaryView {
    pub evaluation_id: EvaluationId,
    pub quiz_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
