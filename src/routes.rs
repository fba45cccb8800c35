use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};

use crate::auth::require_api_key;
use crate::cnfg::AppConfig;
use crate::error::HttpError;
use crate::render::Renderer;
use crate::validate;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub renderer: Arc<dyn Renderer>,
}

/// Assembles the router: CORS restricted to the configured origin, security
/// headers on every response, api-key middleware in front of the render
/// routes.
pub fn app(config: Arc<AppConfig>, renderer: Arc<dyn Renderer>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
        ])
        .allow_credentials(true);

    let state = AppState { config, renderer };

    let protected = Router::new()
        .route("/screenshot", post(screenshot))
        .route("/alter-resume", post(alter_resume))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .with_state(state);

    let app = Router::new()
        .merge(protected)
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ));

    Ok(app)
}

async fn healthz() -> &'static str {
    "Pong"
}

#[derive(Deserialize)]
pub struct ScreenshotRequest {
    pub url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlterResumeRequest {
    pub html_content: Option<String>,
}

async fn screenshot(
    State(state): State<AppState>,
    Json(payload): Json<ScreenshotRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let url = validate::screenshot_url(payload.url.as_deref(), state.config.validation)?;

    let png = state.renderer.screenshot(&url).await?;
    tracing::info!("Screenshot taken successfully");

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

async fn alter_resume(
    State(state): State<AppState>,
    Json(payload): Json<AlterResumeRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let html = validate::html_content(payload.html_content.as_deref())?;

    let pdf = state.renderer.document(&html).await?;
    tracing::info!("Resume PDF generated successfully");

    Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf))
}
