use cyberassess::assessment::{
    EvaluationEngine, EvaluationId, EvaluationRecord, EvaluationRepository, RepositoryError,
};
use cyberassess::config::AppConfig;
use cyberassess::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    records: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
}

impl InMemoryEvaluationRepository {
    /// Stores a record as-is, replacing any previous record with the same id.
    pub(crate) fn seed(&self, record: EvaluationRecord) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id.clone(), record);
    }
}

impl EvaluationRepository for InMemoryEvaluationRepository {
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
        let mut records: Vec<EvaluationRecord> = guard
            .values()
            .filter(|record| match profile {
                Some(profile) => record.profile.as_deref() == Some(profile),
                None => true,
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        records.truncate(limit);
        Ok(records)
    }
}

/// Engine built from the configured catalog, optionally extended by an extra JSON file.
pub(crate) fn build_engine(
    config: &AppConfig,
    extra_catalog: Option<&Path>,
) -> Result<EvaluationEngine, AppError> {
    let mut catalog = config.catalog()?;
    if let Some(path) = extra_catalog {
        catalog.extend_from_path(path)?;
    }
    Ok(EvaluationEngine::new(catalog, config.scoring.clone()))
}
