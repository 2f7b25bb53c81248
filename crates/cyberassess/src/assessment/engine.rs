use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::answers::{normalize_with, LegacyKeyTable, NormalizedAnswers};
use super::catalog::QuizCatalog;
use super::config::ScoringConfig;
use super::maturity::{MaturityResult, MaturityScale};
use super::quiz::{QuizDefinition, QuizKind};
use super::recommendations::{recommend, weakest_categories, Recommendation};
use super::scoring::{aggregate, reconcile_stored_score, CategoryScore, ScoreReconciliation};

/// Stateless evaluator that applies the quiz catalog and scoring config to stored answers.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    catalog: Arc<QuizCatalog>,
    config: ScoringConfig,
}

impl EvaluationEngine {
    pub fn new(catalog: QuizCatalog, config: ScoringConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config,
        }
    }

    pub fn standard() -> Self {
        Self::new(QuizCatalog::standard(), ScoringConfig::default())
    }

    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn quiz(&self, quiz_id: &str) -> Result<&QuizDefinition, EvaluationError> {
        self.catalog
            .get(quiz_id)
            .ok_or_else(|| EvaluationError::QuizNotFound {
                quiz_id: quiz_id.to_string(),
            })
    }

    pub fn normalize(&self, raw: &Value, quiz: &QuizDefinition) -> NormalizedAnswers {
        normalize_with(raw, quiz, &LegacyKeyTable::for_quiz(quiz), &self.config)
    }

    pub fn evaluate(&self, input: &EvaluationInput) -> Result<EvaluationReport, EvaluationError> {
        let quiz = self.quiz(&input.quiz_id)?;
        let answers = self.normalize(&input.answers, quiz);
        let summary = aggregate(&answers, quiz);
        let score = reconcile_stored_score(input.stored_score, &summary, quiz);
        let maturity: MaturityResult = MaturityScale::for_kind(quiz.kind).level(score.score).into();
        let recommendations = recommend(&answers, quiz);
        let weakest = weakest_categories(&summary.categories, self.config.weakest_category_count);

        debug!(
            quiz_id = %quiz.id,
            total = summary.total,
            score = score.score,
            level = maturity.level_number,
            filled = answers.filled_count(),
            "evaluation scored"
        );

        Ok(EvaluationReport {
            evaluation_id: None,
            quiz_id: quiz.id.clone(),
            quiz_kind: quiz.kind,
            quiz_title: quiz.title.clone(),
            percentage: summary.percentage(),
            total_score: summary.total,
            max_score: summary.max_total,
            score,
            categories: summary.categories,
            maturity,
            weakest_categories: weakest,
            recommendations,
            answers,
        })
    }
}

impl Default for EvaluationEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Answers to score, optionally with the score persisted alongside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationInput {
    pub quiz_id: String,
    #[serde(default)]
    pub answers: Value,
    #[serde(default)]
    pub stored_score: Option<i32>,
}

/// Everything the result view needs, recomputed from the answers on every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_id: Option<String>,
    pub quiz_id: String,
    pub quiz_kind: QuizKind,
    pub quiz_title: String,
    pub total_score: i32,
    pub max_score: i32,
    pub percentage: i32,
    pub score: ScoreReconciliation,
    pub categories: Vec<CategoryScore>,
    pub maturity: MaturityResult,
    pub weakest_categories: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub answers: NormalizedAnswers,
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("no quiz definition found for '{quiz_id}'")]
    QuizNotFound { quiz_id: String },
}
