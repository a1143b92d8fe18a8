use crate::infra::{build_report, build_section, AppState, ASSET_ROUTE};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use repo_insights::error::AppError;
use repo_insights::report::render::{render_html, render_json, render_section_json, HtmlOptions};
use repo_insights::report::{ReportBlueprint, ReportError};
use serde_json::json;
use std::io::ErrorKind;
use tracing::debug;

pub(crate) fn report_routes() -> Router {
    Router::new()
        .route("/report", get(report_page))
        .route("/api/v1/report", get(report_document))
        .route("/api/v1/report/sections/:key", get(section_document))
        .route(&format!("{ASSET_ROUTE}/:name"), get(asset_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

// Table loading is synchronous file IO, kept off the async workers.
async fn assemble<T, F>(work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ReportError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    Ok(result?)
}

pub(crate) async fn report_page(
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let data_dir = state.data_dir.clone();
    let report = assemble(move || build_report(&data_dir)).await?;
    let html = render_html(&report, &HtmlOptions::with_asset_base(ASSET_ROUTE));
    Ok((
        [(header::CONTENT_TYPE, mime::TEXT_HTML_UTF_8.to_string())],
        html,
    ))
}

pub(crate) async fn report_document(
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let data_dir = state.data_dir.clone();
    let report = assemble(move || build_report(&data_dir)).await?;
    Ok(Json(render_json(&report)?))
}

pub(crate) async fn section_document(
    Extension(state): Extension<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let data_dir = state.data_dir.clone();
    let section = assemble(move || build_section(&data_dir, &key)).await?;
    Ok(Json(render_section_json(&section)?))
}

/// Serves images the blueprint references from the data directory. Any other
/// name is a 404, so the route cannot read arbitrary files.
pub(crate) async fn asset_endpoint(
    Extension(state): Extension<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    if !ReportBlueprint::standard().references_image(&name) {
        debug!(asset = %name, "rejected unknown asset");
        return Ok(asset_not_found(&name));
    }

    let bytes = match tokio::fs::read(state.data_dir.join(&name)).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(asset_not_found(&name)),
        Err(err) => return Err(AppError::Io(err)),
    };

    let content_type = mime_guess::from_path(&name)
        .first_or_octet_stream()
        .to_string();
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn asset_not_found(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("asset '{name}' not found") })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::fixture_dir;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state(data_dir: PathBuf, ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            data_dir: Arc::new(data_dir),
        }
    }

    fn app(state: AppState) -> Router {
        report_routes().layer(Extension(state))
    }

    async fn fetch(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router responds")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body read");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn report_page_renders_html() {
        let response = fetch(app(state(fixture_dir(), true)), "/report").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );

        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body read");
        let html = String::from_utf8(bytes.to_vec()).expect("utf-8 html");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("vegaEmbed(").count(), 6);
    }

    #[tokio::test]
    async fn report_document_lists_sections() {
        let response = fetch(app(state(fixture_dir(), true)), "/api/v1/report").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["title"], "GitHub Repository Analysis");
        assert_eq!(body["sections"].as_array().map(Vec::len), Some(13));
    }

    #[tokio::test]
    async fn section_document_includes_vega_lite() {
        let response = fetch(
            app(state(fixture_dir(), true)),
            "/api/v1/report/sections/repositories_by_year",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["key"], "repositories_by_year");
        assert_eq!(body["vega_lite"]["mark"]["type"], "area");
    }

    #[tokio::test]
    async fn unknown_section_is_not_found() {
        let response = fetch(
            app(state(fixture_dir(), true)),
            "/api/v1/report/sections/does_not_exist",
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains("does_not_exist")));
    }

    #[tokio::test]
    async fn missing_tables_fail_with_server_error() {
        let response = fetch(
            app(state(fixture_dir().join("absent"), true)),
            "/api/v1/report",
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_report_requests_are_served() {
        let router = app(state(fixture_dir(), true));
        let uris = [
            "/report",
            "/api/v1/report",
            "/api/v1/report/sections/repositories_by_season",
        ];
        let requests: Vec<_> = uris
            .into_iter()
            .map(|uri| {
                let router = router.clone();
                tokio::spawn(async move { fetch(router, uri).await.status() })
            })
            .collect();

        for request in requests {
            assert_eq!(request.await.expect("request task"), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn failed_assembly_surfaces_as_report_error() {
        let err = assemble(|| -> Result<(), ReportError> {
            Err(ReportError::UnknownSection("gone".into()))
        })
        .await
        .expect_err("assembly fails");

        assert!(matches!(err, AppError::Report(ReportError::UnknownSection(_))));
    }

    #[tokio::test]
    async fn assets_only_serve_referenced_images() {
        let response = fetch(
            app(state(fixture_dir(), true)),
            "/assets/languages_per_repository.png",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

        let response = fetch(app(state(fixture_dir(), true)), "/assets/names_most_pop.csv").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = fetch(app(state(fixture_dir(), false)), "/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = fetch(app(state(fixture_dir(), true)), "/ready").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }
}
