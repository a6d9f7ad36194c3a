//! # HTTP Routes
//!
//! JSON handlers over [`PackService`](crate::service::PackService).
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  /health              store health + server time (503 if down)    │
//! │  GET  /packs               current catalog                              │
//! │  POST /packs               replace catalog                              │
//! │  POST /calculate           solve + log                                  │
//! │  GET  /calculations        recent log entries (?limit=n)               │
//! │  GET  /calculations/{id}   one log entry                                │
//! │  *                         404 NOT_FOUND                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Extractor rejections are taken as `Result` so malformed bodies and query
//! strings come back in the same `{ code, message }` shape as every other
//! failure.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use packcalc_core::{Breakdown, CalculationRecord};

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ts: DateTime<Utc>,
}

/// Body of `GET /packs` and `POST /packs`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PacksBody {
    pub packs: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Body of `POST /calculate`.
///
/// `packs` overrides the stored catalog for this one call.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub items: i64,
    #[serde(default)]
    pub packs: Option<Vec<i64>>,
}

/// Result of `POST /calculate`.
///
/// ```json
/// {
///   "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
///   "counts": { "250": 1, "2000": 1, "5000": 2 },
///   "total_items": 12250,
///   "pack_count": 4,
///   "waste": 249
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub id: String,
    pub counts: Breakdown,
    pub total_items: i64,
    pub pack_count: i64,
    pub waste: i64,
}

impl From<CalculationRecord> for CalculateResponse {
    fn from(record: CalculationRecord) -> Self {
        let waste = record.waste();
        CalculateResponse {
            id: record.id,
            counts: record.breakdown,
            total_items: record.total_items,
            pack_count: record.pack_count,
            waste,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub calculations: Vec<CalculationRecord>,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = if state.service.is_healthy().await {
        (StatusCode::OK, "ok")
    } else {
        warn!("Health check failed: store unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        code,
        Json(HealthResponse {
            status,
            ts: Utc::now(),
        }),
    )
}

pub async fn get_packs(State(state): State<AppState>) -> ApiResult<PacksBody> {
    let packs = state.service.get_packs().await?;
    Ok(Json(PacksBody { packs }))
}

pub async fn set_packs(
    State(state): State<AppState>,
    body: Result<Json<PacksBody>, JsonRejection>,
) -> ApiResult<OkResponse> {
    let Json(body) = body?;
    state.service.set_packs(&body.packs).await?;
    Ok(Json(OkResponse { ok: true }))
}

pub async fn calculate(
    State(state): State<AppState>,
    body: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResult<CalculateResponse> {
    let Json(request) = body?;

    let record = match request.packs {
        Some(packs) => state.service.calculate_with(request.items, &packs).await?,
        None => state.service.calculate(request.items).await?,
    };

    Ok(Json(record.into()))
}

pub async fn list_calculations(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<HistoryResponse> {
    let Query(query) = query?;
    let calculations = state.service.history(query.limit).await?;
    Ok(Json(HistoryResponse { calculations }))
}

pub async fn get_calculation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CalculationRecord> {
    let record = state.service.calculation(&id).await?;
    Ok(Json(record))
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    debug!(path = %uri.path(), "No route");
    ApiError::not_found(format!("No route for {}", uri.path()))
}
