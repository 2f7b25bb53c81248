use crate::cli::ServeArgs;
use crate::infra::{build_engine, AppState, InMemoryEvaluationRepository};
use crate::routes::with_evaluation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cyberassess::assessment::EvaluationService;
use cyberassess::config::AppConfig;
use cyberassess::error::AppError;
use cyberassess::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(build_engine(&config, None)?);
    info!(
        quizzes = engine.catalog().quizzes().len(),
        gap_fill_default = config.scoring.default_fill_value,
        "quiz catalog loaded"
    );
    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let evaluation_service = Arc::new(EvaluationService::new(repository, engine));

    let app = with_evaluation_routes(evaluation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "maturity assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
