use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::HttpError;
use crate::routes::AppState;

/// Gate on the shared-secret `x-api-key` header. Requests that fail here
/// never reach validation or the render gateway.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    tracing::debug!("authenticating");

    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(key) if key == state.config.api_key => next.run(request).await,
        _ => {
            tracing::error!("Authentication failed: Invalid API key");
            HttpError::Forbidden.into_response()
        }
    }
}
