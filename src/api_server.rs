// Axum API Server Module
//
// Purpose: REST surface over the decision engine and heatmap service
// CPU-bound model work runs on the blocking pool; heatmaps are cached in moka

#[cfg(feature = "api")]
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

#[cfg(feature = "api")]
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "api")]
use moka::future::Cache;

#[cfg(feature = "api")]
use serde::Deserialize;

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use anyhow::Context;

#[cfg(feature = "api")]
use crate::{
    advice::{advise, render_markdown},
    config::ServiceConfig,
    data::{find_region, EnvironmentalReading, GridPoint, PipelineChoice, REGION_PRESETS},
    decision::{DecisionEngine, PredictionOutcome},
    error::PredictionError,
    models::ModelStack,
    spatial::{GridStatus, HeatmapRequest, HeatmapService},
};

// ============================================================================
// Application State
// ============================================================================

#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    pub models: Arc<ModelStack>,
    pub engine: Arc<DecisionEngine>,
    pub heatmap: Arc<HeatmapService>,
    /// Heatmap responses keyed by `HeatmapRequest::cache_key`
    pub cache: Cache<String, serde_json::Value>,
    pub config: Arc<ServiceConfig>,
}

#[cfg(feature = "api")]
impl AppState {
    pub async fn new(config: ServiceConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading model stack from {:?}...", config.models_dir);
        let models_dir = config.models_dir.clone();
        let stack = tokio::task::spawn_blocking(move || ModelStack::load(&models_dir))
            .await
            .context("Model loading task panicked")?
            .with_context(|| format!("Failed to load models from {:?}", config.models_dir))?;

        Ok(Self::from_stack(stack, config))
    }

    /// State around an already-built stack
    pub fn from_stack(stack: ModelStack, config: ServiceConfig) -> Self {
        let models = Arc::new(stack);
        let engine = Arc::new(DecisionEngine::new(Arc::clone(&models)));
        let heatmap = Arc::new(HeatmapService::new(Arc::clone(&models)).with_deadline(config.grid_deadline));

        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(config.heatmap_cache_ttl)
            .build();

        Self {
            models,
            engine,
            heatmap,
            cache,
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Region presets
        .route("/api/regions", get(list_regions))

        // Single-point predictions
        .route("/api/predict", post(predict))
        .route("/api/predict/region", post(predict_region))
        .route("/api/predict/map", post(predict_map))

        // Grid heatmap
        .route("/api/heatmap", post(heatmap))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

// ============================================================================
// Request Types
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub reading: EnvironmentalReading,
    #[serde(default)]
    pub pipeline: PipelineChoice,
    pub location: String,
}

#[cfg(feature = "api")]
#[derive(Debug, Deserialize)]
pub struct RegionPredictRequest {
    pub region: String,
    #[serde(default)]
    pub pipeline: PipelineChoice,
}

#[cfg(feature = "api")]
#[derive(Debug, Deserialize)]
pub struct MapPredictRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub pipeline: PipelineChoice,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "hybrid_available": state.models.hybrid_available(),
    }))
}

#[cfg(feature = "api")]
async fn list_regions() -> impl IntoResponse {
    Json(serde_json::json!({
        "regions": REGION_PRESETS,
    }))
}

/// Run one decision on the blocking pool and shape the response
#[cfg(feature = "api")]
async fn run_prediction(
    state: AppState,
    reading: EnvironmentalReading,
    pipeline: PipelineChoice,
    location: String,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let engine = state.engine.clone();

    let outcome = tokio::task::spawn_blocking(move || engine.predict(&reading, pipeline, &location))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?;

    let response = match outcome {
        PredictionOutcome::Available(result) => {
            let advisory = advise(&result);
            let summary = render_markdown(&result, &advisory);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "available",
                    "prediction": result,
                    "advisory": advisory,
                    "summary": summary,
                })),
            )
        }
        unavailable @ PredictionOutcome::Unavailable { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::to_value(&unavailable).map_err(|e| AppError::Internal(e.to_string()))?),
        ),
    };

    Ok(response)
}

#[cfg(feature = "api")]
async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    tracing::info!("Prediction for '{}' ({} pipeline)", payload.location, payload.pipeline);
    run_prediction(state, payload.reading, payload.pipeline, payload.location).await
}

#[cfg(feature = "api")]
async fn predict_region(
    State(state): State<AppState>,
    Json(payload): Json<RegionPredictRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let preset = find_region(&payload.region)
        .ok_or_else(|| AppError::NotFound(format!("Unknown region: {}", payload.region)))?;

    tracing::info!("Region prediction for {} ({} pipeline)", preset.name, payload.pipeline);
    run_prediction(state, preset.reading, payload.pipeline, preset.name.to_string()).await
}

#[cfg(feature = "api")]
async fn predict_map(
    State(state): State<AppState>,
    Json(payload): Json<MapPredictRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if !(-90.0..=90.0).contains(&payload.latitude) || !(-180.0..=180.0).contains(&payload.longitude) {
        return Err(AppError::BadRequest(format!(
            "Invalid coordinate ({}, {})",
            payload.latitude, payload.longitude
        )));
    }

    let point = GridPoint::new(payload.latitude, payload.longitude);
    run_prediction(
        state,
        EnvironmentalReading::map_click_default(),
        payload.pipeline,
        point.location_label(),
    )
    .await
}

#[cfg(feature = "api")]
async fn heatmap(
    State(state): State<AppState>,
    Json(request): Json<HeatmapRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;

    let cache_key = request.cache_key();
    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Heatmap cache hit: {}", cache_key);
        return Ok(Json(cached));
    }

    tracing::info!(
        "Heatmap: center ({}, {}), radius {} km, resolution {}",
        request.center.latitude,
        request.center.longitude,
        request.radius_km,
        request.resolution
    );

    let service = state.heatmap.clone();
    let report = tokio::task::spawn_blocking(move || service.generate(&request))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    let body = serde_json::to_value(&report).map_err(|e| AppError::Internal(e.to_string()))?;
    if report.status == GridStatus::Scored {
        state.cache.insert(cache_key, body.clone()).await;
    }

    Ok(Json(body))
}

// ============================================================================
// Error Handling
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Timeout(String),
    Unavailable(String),
    Internal(String),
}

#[cfg(feature = "api")]
impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::InvalidRequest(_) => AppError::BadRequest(err.to_string()),
            PredictionError::DeadlineExceeded { .. } => AppError::Timeout(err.to_string()),
            PredictionError::Cancelled => AppError::Unavailable(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
