//! Cybersecurity maturity assessment: quiz catalog, answer normalization,
//! scoring, maturity classification and remediation recommendations.
//!
//! The scoring functions are pure; [`EvaluationEngine`] composes them and
//! [`EvaluationService`] adds persistence through [`EvaluationRepository`].

pub mod answers;
pub mod catalog;
mod config;
mod engine;
pub mod export;
pub mod maturity;
pub mod quiz;
pub mod recommendations;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use answers::{
    normalize, normalize_with, AnswerSource, LegacyKeyTable, NormalizedAnswers, ResolvedAnswer,
};
pub use catalog::{advanced_quiz, initial_quiz, QuizCatalog};
pub use config::{ScoringConfig, DEFAULT_FILL_VALUE, DEFAULT_WEAKEST_CATEGORY_COUNT};
pub use engine::{EvaluationEngine, EvaluationError, EvaluationInput, EvaluationReport};
pub use export::write_recommendations_csv;
pub use maturity::{classify, classify_kind, MaturityLevel, MaturityResult, MaturityScale};
pub use quiz::{
    AnswerOption, CopyRule, QuestionDefinition, QuizDefinition, QuizDefinitionError, QuizKind,
    ADVANCED_QUIZ_ID, INITIAL_QUIZ_ID,
};
pub use recommendations::{
    recommend, recommendation_text, weakest_categories, Recommendation, RecommendationBand,
};
pub use repository::{
    EvaluationId, EvaluationRecord, EvaluationRepository, EvaluationSummaryView, RepositoryError,
};
pub use router::{evaluation_router, QuizSummaryView};
pub use scoring::{aggregate, reconcile_stored_score, CategoryScore, ScoreReconciliation, ScoreSummary};
pub use service::{EvaluationService, EvaluationServiceError, EvaluationSubmission};
