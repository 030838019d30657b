use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryOnboardingRegistry};
use crate::routes::with_onboarding_routes;
use agriloop::config::AppConfig;
use agriloop::error::AppError;
use agriloop::telemetry;
use agriloop::workflows::onboarding::{OnboardingService, UploadPolicy};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = Arc::new(InMemoryOnboardingRegistry::seeded());
    let policy = UploadPolicy::new(config.uploads.max_upload_bytes);
    let onboarding_service = Arc::new(OnboardingService::new(registry, policy));

    let app = with_onboarding_routes(onboarding_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "onboarding service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
