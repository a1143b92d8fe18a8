use crate::cli::ServeArgs;
use crate::infra::{build_report, AppState};
use crate::routes::report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use repo_insights::config::AppConfig;
use repo_insights::error::AppError;
use repo_insights::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.report.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    // Tables are reread per request; a failed load here is not fatal.
    if let Err(err) = build_report(&config.report.data_dir) {
        warn!(data_dir = %config.report.data_dir.display(), error = %err, "report tables not loadable yet");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        data_dir: Arc::new(config.report.data_dir.clone()),
    };

    let app = report_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.report.data_dir.display(),
        "repository insights report ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
