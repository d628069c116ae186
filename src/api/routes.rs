use axum::{
    routing::post,
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tower_http::cors::{CorsLayer, Any};
use tracing::{error, info, warn};

use crate::error::{Result, AppError};
use crate::api::models::AnalyzeRequest;
use crate::analyzer::AnalysisResult;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/analyze",
            post(analyze_handler)
                .options(options_ok)
                .fallback(method_not_allowed),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        AppError::ValidationError("Invalid JSON payload".to_string())
    })?;

    info!(url = %req.url, "Processing analysis request");
    let start_time = std::time::Instant::now();

    let result = state.analyzer.analyze(&req.url).await;

    let elapsed = start_time.elapsed();
    match &result {
        Ok(analysis) => info!(
            url = %req.url,
            ?elapsed,
            reduction = analysis.metrics.reduction_pct,
            "Analysis completed"
        ),
        Err(err @ AppError::ValidationError(_)) => warn!(url = %req.url, "{}", err),
        Err(err) => error!(url = %req.url, ?elapsed, "{}", err),
    }

    result.map(Json)
}

/// Plain OPTIONS; real CORS preflights are answered by the layer.
async fn options_ok() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}
