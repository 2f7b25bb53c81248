use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::response::Response;
use serde_json::{json, Map, Value};

use crate::assessment::catalog::initial_quiz;
use crate::assessment::repository::{
    EvaluationId, EvaluationRecord, EvaluationRepository, RepositoryError,
};
use crate::assessment::router::evaluation_router;
use crate::assessment::service::EvaluationService;
use crate::assessment::EvaluationEngine;

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, record: EvaluationRecord) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id.clone(), record);
    }

    pub(super) fn fetch_record(&self, id: &EvaluationId) -> Option<EvaluationRecord> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl EvaluationRepository for MemoryRepository {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn recent(
        &self,
        profile: Option<&str>,
        limit: usize,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard
            .values()
            .filter(|record| profile.map_or(true, |p| record.profile.as_deref() == Some(p)))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}

pub(super) struct ConflictRepository;

impl EvaluationRepository for ConflictRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Ok(None)
    }

    fn recent(
        &self,
        _profile: Option<&str>,
        _limit: usize,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(
        &self,
        _profile: Option<&str>,
        _limit: usize,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<EvaluationService<MemoryRepository>>, MemoryRepository) {
    let repository = MemoryRepository::default();
    let service = Arc::new(EvaluationService::new(
        Arc::new(repository.clone()),
        Arc::new(EvaluationEngine::standard()),
    ));
    (service, repository)
}

pub(super) fn router_with_service(
    service: Arc<EvaluationService<MemoryRepository>>,
) -> axum::Router {
    evaluation_router(service)
}

/// Every initial question answered with the same value.
pub(super) fn uniform_initial_answers(value: i32) -> Value {
    let answers: Map<String, Value> = initial_quiz()
        .questions
        .iter()
        .map(|question| (question.id.clone(), json!(value)))
        .collect();
    Value::Object(answers)
}

/// Initial answers summing to 31 points.
pub(super) fn initial_answers_summing_to_31() -> Value {
    json!({
        "politicas-1": 3, "politicas-2": 3, "politicas-3": 3,
        "accesos-1": 3, "accesos-2": 3, "accesos-3": 2,
        "datos-1": 2, "datos-2": 2, "datos-3": 2,
        "incidentes-1": 2, "incidentes-2": 2, "incidentes-3": 1,
        "indicadores-1": 1, "indicadores-2": 1, "indicadores-3": 1
    })
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json")
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request builds")
}
