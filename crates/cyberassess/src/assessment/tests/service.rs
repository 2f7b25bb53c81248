use super::common::*;
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::assessment::{
    AnswerSource, EvaluationEngine, EvaluationError, EvaluationId, EvaluationRecord,
    EvaluationService, EvaluationServiceError, EvaluationSubmission, RepositoryError,
    INITIAL_QUIZ_ID,
};

fn record(id: &str, quiz_id: &str, score: Option<i32>, profile: &str, day: u32) -> EvaluationRecord {
    let created_at = Utc
        .with_ymd_and_hms(2024, 3, day, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    EvaluationRecord {
        id: EvaluationId(id.to_string()),
        quiz_id: quiz_id.to_string(),
        score,
        answers: initial_answers_summing_to_31(),
        created_at,
        completed_at: Some(created_at + Duration::minutes(12)),
        profile: Some(profile.to_string()),
    }
}

#[test]
fn submit_persists_normalized_answers_and_score() {
    let (service, repository) = build_service();

    let report = service
        .submit(EvaluationSubmission {
            quiz_id: INITIAL_QUIZ_ID.to_string(),
            answers: json!({ "q1": "3", "q2": null }),
            profile: Some("profile-1".to_string()),
        })
        .expect("submission stored");

    let evaluation_id = EvaluationId(report.evaluation_id.clone().expect("id assigned"));
    let stored = repository
        .fetch_record(&evaluation_id)
        .expect("record persisted");

    let answers = stored.answers.as_object().expect("answers stored as object");
    assert_eq!(answers.len(), 15);
    assert_eq!(answers["politicas-1"], 3);
    assert_eq!(answers["politicas-2"], 3);
    assert_eq!(stored.score, Some(report.score.score));
    assert_eq!(stored.quiz_id, INITIAL_QUIZ_ID);
    assert_eq!(stored.profile.as_deref(), Some("profile-1"));
    assert_eq!(
        report.answers.get("politicas-2").map(|answer| &answer.source),
        Some(&AnswerSource::Averaged)
    );
}

#[test]
fn report_recomputes_from_stored_answers() {
    let (service, _) = build_service();

    let submitted = service
        .submit(EvaluationSubmission {
            quiz_id: INITIAL_QUIZ_ID.to_string(),
            answers: initial_answers_summing_to_31(),
            profile: None,
        })
        .expect("submission stored");
    let evaluation_id = EvaluationId(submitted.evaluation_id.clone().expect("id assigned"));

    let report = service.report(&evaluation_id).expect("report loads");

    assert_eq!(report.total_score, submitted.total_score);
    assert_eq!(report.categories, submitted.categories);
    assert_eq!(report.maturity, submitted.maturity);
    assert_eq!(report.score.stored_score, Some(31));
}

#[test]
fn legacy_percentage_records_are_reclassified() {
    let (service, repository) = build_service();
    repository.seed(record("eval-legacy", INITIAL_QUIZ_ID, Some(82), "profile-1", 4));

    let report = service
        .report(&EvaluationId("eval-legacy".to_string()))
        .expect("report loads");

    assert_eq!(report.score.score, 31);
    assert_eq!(report.score.stored_score, Some(82));
    assert!(report.score.legacy_percentage);
    assert_eq!(report.maturity.level_number, 4);
    assert_eq!(report.evaluation_id.as_deref(), Some("eval-legacy"));
}

#[test]
fn missing_records_surface_not_found() {
    let (service, _) = build_service();

    let error = service
        .report(&EvaluationId("eval-404".to_string()))
        .expect_err("record missing");

    assert!(matches!(
        error,
        EvaluationServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[test]
fn records_for_unknown_quizzes_fail_evaluation() {
    let (service, repository) = build_service();
    repository.seed(record("eval-retired", "evaluacion-retirada", Some(50), "profile-1", 5));

    let error = service
        .report(&EvaluationId("eval-retired".to_string()))
        .expect_err("quiz no longer defined");

    match error {
        EvaluationServiceError::Evaluation(EvaluationError::QuizNotFound { quiz_id }) => {
            assert_eq!(quiz_id, "evaluacion-retirada")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn recent_lists_newest_first_per_profile() {
    let (service, repository) = build_service();
    repository.seed(record("eval-a", INITIAL_QUIZ_ID, Some(20), "profile-1", 1));
    repository.seed(record("eval-b", INITIAL_QUIZ_ID, Some(25), "profile-1", 3));
    repository.seed(record("eval-c", INITIAL_QUIZ_ID, Some(30), "profile-2", 2));

    let recent = service.recent(Some("profile-1"), 5).expect("listing loads");
    let ids: Vec<_> = recent.iter().map(|view| view.evaluation_id.0.as_str()).collect();
    assert_eq!(ids, vec!["eval-b", "eval-a"]);

    let all = service.recent(None, 2).expect("listing loads");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].evaluation_id.0, "eval-b");
    assert_eq!(all[1].evaluation_id.0, "eval-c");
}

#[test]
fn repository_outages_are_propagated() {
    let service = EvaluationService::new(
        Arc::new(UnavailableRepository),
        Arc::new(EvaluationEngine::standard()),
    );

    let submit = service.submit(EvaluationSubmission {
        quiz_id: INITIAL_QUIZ_ID.to_string(),
        answers: json!({}),
        profile: None,
    });
    assert!(matches!(
        submit,
        Err(EvaluationServiceError::Repository(RepositoryError::Unavailable(_)))
    ));

    assert!(service.recent(None, 10).is_err());
}
