// API Integration Tests
//
// Purpose: Exercise every endpoint against fixture models
// Run with: cargo test --features api --test api_integration_tests

mod common;

#[cfg(feature = "api")]
mod api_tests {
    use super::common::ModelDir;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use catch_scorer_rust::{create_router, AppState, ModelStack, ServiceConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt; // for oneshot

    // Helper: Create test app over fixture artifacts
    fn create_test_app(tag: &str, hybrid: bool) -> axum::Router {
        let dir = if hybrid { ModelDir::with_hybrid(tag) } else { ModelDir::base(tag) };
        let stack = ModelStack::load(dir.path()).expect("fixture stack loads");
        let state = AppState::from_stack(stack, ServiceConfig::default());
        create_router(state)
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    // =========================================================================
    // Section 1: Health + Regions
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app("api_health", true);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert_eq!(body["hybrid_available"], true);
    }

    #[tokio::test]
    async fn test_regions() {
        let app = create_test_app("api_regions", false);

        let response = app
            .oneshot(Request::builder().uri("/api/regions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        let regions = body["regions"].as_array().unwrap();
        assert_eq!(regions.len(), 5);
        assert_eq!(regions[0]["name"], "Vizag");
    }

    // =========================================================================
    // Section 2: Predictions
    // =========================================================================

    #[tokio::test]
    async fn test_predict_reading() {
        let app = create_test_app("api_predict", false);

        let response = app
            .oneshot(post_json(
                "/api/predict",
                json!({
                    "reading": {
                        "sea_surface_temperature": 28.0,
                        "salinity": 33.0,
                        "dissolved_oxygen": 6.4,
                        "historical_catch": 200.0
                    },
                    "location": "Vizag"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(body["status"], "available");
        assert_eq!(body["prediction"]["availability"], true);
        assert_eq!(body["prediction"]["quantity_kg"], 200.0);
        assert_eq!(body["prediction"]["juvenile_risk"], "Low");
        assert_eq!(body["advisory"]["verdict"], "safe");
        assert!(body["summary"].as_str().unwrap().starts_with("## Vizag"));
    }

    #[tokio::test]
    async fn test_predict_region_unknown_is_404() {
        let app = create_test_app("api_region_404", false);

        let response = app
            .oneshot(post_json("/api/predict/region", json!({"region": "Atlantis"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_response(response).await;
        assert!(body["error"].as_str().unwrap().contains("Atlantis"));
    }

    #[tokio::test]
    async fn test_predict_region_hybrid_fallback() {
        let app = create_test_app("api_region_fallback", false);

        let response = app
            .oneshot(post_json("/api/predict/region", json!({"region": "goa", "pipeline": "hybrid"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(body["prediction"]["location_label"], "Goa");
        assert_eq!(body["prediction"]["pipeline_used"], "default");
    }

    #[tokio::test]
    async fn test_predict_map_click() {
        let app = create_test_app("api_map", false);

        let response = app
            .oneshot(post_json("/api/predict/map", json!({"latitude": 16.5, "longitude": 82.25})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(body["prediction"]["location_label"], "Lat:16.5, Lon:82.25");
    }

    // =========================================================================
    // Section 3: Heatmap
    // =========================================================================

    #[tokio::test]
    async fn test_heatmap() {
        let app = create_test_app("api_heatmap", false);

        let response = app
            .oneshot(post_json(
                "/api/heatmap",
                json!({
                    "center": {"latitude": 16.9891, "longitude": 82.2475},
                    "radius_km": 25.0,
                    "resolution": 10,
                    "dimension": "juvenile_risk_probability"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(body["status"], "scored");
        assert_eq!(body["intensities"].as_array().unwrap().len(), 100);
        assert_eq!(body["safe_zones"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_heatmap_invalid_radius_is_400() {
        let app = create_test_app("api_heatmap_400", false);

        let response = app
            .oneshot(post_json("/api/heatmap", json!({"radius_km": 500.0})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_response(response).await;
        assert!(body["error"].as_str().unwrap().contains("radius_km"));
    }
}
