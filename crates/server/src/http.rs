//! HTTP Endpoints
//!
//! REST API for the sales assistant widget and dashboard.

use axum::{
    extract::{FromRequest, Json, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use sales_assist_agent::PromotionContext;
use sales_assist_config::Promotion;
use sales_assist_core::{
    Intent, Rating, RatingRequest, ReplyRequest, ReplyResponse, SalesStage,
};
use sales_assist_persistence::StatsRow;

use crate::metrics::{metrics_handler, record_rating, record_reply};
use crate::state::AppState;
use crate::ServerError;

const LOCAL_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let timeout = Duration::from_secs(config.server.timeout_seconds);
    drop(config); // Release lock before building router

    Router::new()
        // Reply widget
        .route("/api/reply", post(generate_reply))
        .route("/api/rate", post(rate_reply))
        // Dashboard
        .route("/api/stats", get(stats))
        .route("/api/promotions/active", get(active_promotion))
        .route("/api/variants/summary", get(variants_summary))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        // Admin endpoints
        .route("/admin/reload-variants", post(reload_variants))
        .route("/admin/reload-config", post(reload_config))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", LOCAL_ORIGIN);
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(LOCAL_ORIGIN))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// JSON body extractor whose rejections use the API error shape
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);

/// Missing or blank stage means the first funnel stage
fn parse_stage(stage: Option<&str>) -> Result<SalesStage, ServerError> {
    match stage.map(str::trim).filter(|s| !s.is_empty()) {
        Some(stage) => Ok(stage.parse()?),
        None => Ok(SalesStage::default()),
    }
}

/// Generate-reply body; accepts the widget's camelCase names
#[derive(Debug, Deserialize)]
pub struct ReplyBody {
    #[serde(default, alias = "customerMessage")]
    pub customer_message: String,
    #[serde(default, alias = "customerName")]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default, alias = "contextNote")]
    pub context_note: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub premium: bool,
}

impl ReplyBody {
    pub fn into_request(self) -> Result<ReplyRequest, ServerError> {
        Ok(ReplyRequest {
            customer_message: self.customer_message,
            customer_name: self.customer_name,
            stage: parse_stage(self.stage.as_deref())?,
            context_note: self.context_note,
            channel: self.channel,
            premium: self.premium,
        })
    }
}

/// Rating body; accepts the widget's camelCase names
///
/// Every field is required: a rating is only meaningful against the
/// intent and stage the reply was shown under.
#[derive(Debug, Deserialize)]
pub struct RateBody {
    #[serde(alias = "intentTag", alias = "intent")]
    pub intent_tag: String,
    pub stage: String,
    #[serde(alias = "replyText")]
    pub reply_text: String,
    pub rating: String,
}

impl RateBody {
    pub fn into_request(self) -> Result<RatingRequest, ServerError> {
        Ok(RatingRequest {
            intent_tag: self.intent_tag.parse::<Intent>()?,
            stage: self.stage.parse::<SalesStage>()?,
            reply_text: self.reply_text,
            rating: self.rating.parse::<Rating>()?,
        })
    }
}

/// POST /api/reply
async fn generate_reply(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReplyBody>,
) -> Result<Json<ReplyResponse>, ServerError> {
    let started = Instant::now();
    let request = body.into_request()?;
    let response = state.assistant.generate_reply(&request).await?;

    record_reply(
        response.source.as_str(),
        response.intent_tag.as_str(),
        started.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(Json(response))
}

/// POST /api/rate
async fn rate_reply(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RateBody>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let request = body.into_request()?;
    state.assistant.record_rating(&request).await?;
    record_rating(request.rating.as_str());

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// GET /api/stats
async fn stats(State(state): State<AppState>) -> Json<Vec<StatsRow>> {
    Json(state.assistant.stats_rows().await)
}

#[derive(Debug, Deserialize)]
pub struct ActivePromotionQuery {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
}

/// GET /api/promotions/active
async fn active_promotion(
    State(state): State<AppState>,
    Query(query): Query<ActivePromotionQuery>,
) -> Result<Json<Option<Promotion>>, ServerError> {
    let stage = parse_stage(query.stage.as_deref())?;
    let intent = match query.intent.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
        Some(intent) => intent.parse::<Intent>()?,
        None => Intent::General,
    };
    let channel = query
        .channel
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(sales_assist_core::reply::DEFAULT_CHANNEL);

    let ctx = PromotionContext::new(channel, stage, intent);
    Ok(Json(state.assistant.promotions().select_active(&ctx, Utc::now())))
}

/// GET /api/variants/summary
async fn variants_summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.assistant.variants().summary())
}

/// Liveness with a short state summary
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let summary = state.assistant.variants().summary();

    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "variants": { "blocks": summary.blocks, "variants": summary.variants },
            "stats": { "backend": state.assistant.stats().backend() },
            "promotions": { "count": state.assistant.promotions().len() },
        }
    }))
}

/// Readiness: variants loaded and, when configured, generator reachable
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut checks = serde_json::Map::new();
    let mut ready = true;

    let variants_loaded = state.assistant.variants().is_loaded();
    checks.insert(
        "variants".to_string(),
        serde_json::json!({ "status": if variants_loaded { "ok" } else { "empty" } }),
    );
    if !variants_loaded {
        ready = false;
    }

    let generator_status = match state.assistant.generator() {
        None => "disabled",
        Some(generator) => {
            match tokio::time::timeout(Duration::from_secs(2), generator.is_available()).await {
                Ok(true) => "ok",
                Ok(false) => {
                    ready = false;
                    "unreachable"
                }
                Err(_) => {
                    ready = false;
                    "timeout"
                }
            }
        }
    };
    checks.insert(
        "generator".to_string(),
        serde_json::json!({ "status": generator_status }),
    );

    let status = if ready { "ready" } else { "not_ready" };
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": status,
            "checks": checks
        })),
    )
}

/// POST /admin/reload-variants
async fn reload_variants(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    let blocks = state.reload_variants().await?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "blocks": blocks
    })))
}

/// POST /admin/reload-config
///
/// Reloads settings from disk and replaces the promotion catalog.
async fn reload_config(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    state.reload_config()?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "promotions": state.assistant.promotions().len()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_body_accepts_camel_case() {
        let body: ReplyBody = serde_json::from_value(serde_json::json!({
            "customerMessage": "no tengo tiempo",
            "customerName": "Ana",
            "stage": "discovery",
            "contextNote": "viene de Instagram"
        }))
        .unwrap();

        let request = body.into_request().unwrap();
        assert_eq!(request.customer_message, "no tengo tiempo");
        assert_eq!(request.name(), Some("Ana"));
        assert_eq!(request.stage, SalesStage::Discovery);
        assert_eq!(request.context_note.as_deref(), Some("viene de Instagram"));
    }

    #[test]
    fn test_missing_stage_defaults_unknown_stage_rejected() {
        assert_eq!(parse_stage(None).unwrap(), SalesStage::Integration);
        assert_eq!(parse_stage(Some("  ")).unwrap(), SalesStage::Integration);
        assert!(matches!(
            parse_stage(Some("negotiation")),
            Err(ServerError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_rate_body_requires_intent_and_stage() {
        let missing = serde_json::from_value::<RateBody>(serde_json::json!({
            "replyText": "Hola",
            "rating": "good"
        }));
        assert!(missing.is_err());

        let body: RateBody = serde_json::from_value(serde_json::json!({
            "intentTag": "",
            "stage": "",
            "replyText": "Hola",
            "rating": "good"
        }))
        .unwrap();
        assert!(matches!(body.into_request(), Err(ServerError::InvalidRequest(_))));
    }

    #[test]
    fn test_rate_body_rejects_unknown_rating() {
        let body: RateBody = serde_json::from_value(serde_json::json!({
            "intentTag": "price",
            "stage": "close",
            "replyText": "Listo",
            "rating": "great"
        }))
        .unwrap();

        assert!(matches!(body.into_request(), Err(ServerError::InvalidRating(_))));
    }
}
