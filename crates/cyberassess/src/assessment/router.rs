use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::engine::{EvaluationError, EvaluationInput};
use super::quiz::{QuizDefinition, QuizKind};
use super::repository::{EvaluationId, EvaluationRepository, RepositoryError};
use super::service::{EvaluationService, EvaluationServiceError, EvaluationSubmission};

/// Router builder exposing scoring, stored evaluation and quiz endpoints.
pub fn evaluation_router<R>(service: Arc<EvaluationService<R>>) -> Router
where
    R: EvaluationRepository + 'static,
{
    Router::new()
        .route("/api/v1/evaluations", post(submit_handler::<R>))
        .route(
            "/api/v1/evaluations/:evaluation_id",
            get(report_handler::<R>),
        )
        .route("/api/v1/scores", post(score_handler::<R>))
        .route("/api/v1/quizzes", get(quizzes_handler::<R>))
        .route("/api/v1/quizzes/:quiz_id", get(quiz_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummaryView {
    pub id: String,
    pub kind: QuizKind,
    pub title: String,
    pub questions: usize,
    pub max_score: i32,
    pub categories: Vec<String>,
}

impl From<&QuizDefinition> for QuizSummaryView {
    fn from(quiz: &QuizDefinition) -> Self {
        Self {
            id: quiz.id.clone(),
            kind: quiz.kind,
            title: quiz.title.clone(),
            questions: quiz.questions.len(),
            max_score: quiz.max_total(),
            categories: quiz.categories().into_iter().map(str::to_string).collect(),
        }
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    axum::Json(submission): axum::Json<EvaluationSubmission>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.submit(submission) {
        Ok(report) => (StatusCode::CREATED, axum::Json(report)).into_response(),
        Err(EvaluationServiceError::Evaluation(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(EvaluationServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "evaluation already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    let id = EvaluationId(evaluation_id);
    match service.report(&id) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(EvaluationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "evaluation_id": id.0,
                "error": "evaluation not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(EvaluationServiceError::Evaluation(err)) => {
            error!(evaluation_id = %id.0, error = %err, "stored evaluation references an unknown quiz");
            let payload = json!({
                "error": "could not load evaluation",
                "detail": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    axum::Json(input): axum::Json<EvaluationInput>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.engine().evaluate(&input) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err @ EvaluationError::QuizNotFound { .. }) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn quizzes_handler<R>(State(service): State<Arc<EvaluationService<R>>>) -> Response
where
    R: EvaluationRepository + 'static,
{
    let quizzes: Vec<QuizSummaryView> = service
        .engine()
        .catalog()
        .quizzes()
        .iter()
        .map(QuizSummaryView::from)
        .collect();
    (StatusCode::OK, axum::Json(quizzes)).into_response()
}

pub(crate) async fn quiz_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(quiz_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.engine().quiz(&quiz_id) {
        Ok(quiz) => (StatusCode::OK, axum::Json(quiz.clone())).into_response(),
        Err(err) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
