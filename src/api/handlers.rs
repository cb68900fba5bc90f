use crate::api::requests::{HeatmapQuery, RegisterRequest, RouteQuery, TelemetryRequest};
use crate::api::responses::{
    ActionResponse, ActionStatus, BinResponse, ErrorCode, ErrorResponse, HealthResponse,
    HealthStatus, HeatmapPointResponse, RouteResponse,
};
use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

#[derive(Debug, Error)]
enum TimestampError {
    #[error("timestamp format error: {0}")]
    Format(#[from] time::error::Format),
}

pub enum ApiResponse<T> {
    Success { status: StatusCode, body: T },
    Error { status: StatusCode, body: ErrorResponse },
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success { status, body } => (status, Json(body)).into_response(),
            ApiResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    build_health_response(&state, SystemTime::now())
}

pub async fn post_telemetry(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TelemetryRequest>,
) -> impl IntoResponse {
    build_telemetry_response(&state, &request, SystemTime::now())
}

pub async fn get_bins(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    build_bins_response(&state, SystemTime::now())
}

pub async fn get_bin(
    State(state): State<Arc<AppState>>,
    Path(bin_id): Path<String>,
) -> impl IntoResponse {
    build_bin_response(&state, &bin_id, SystemTime::now())
}

pub async fn register_bin(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    build_register_response(&state, &request, SystemTime::now())
}

pub async fn delete_bin(
    State(state): State<Arc<AppState>>,
    Path(bin_id): Path<String>,
) -> impl IntoResponse {
    build_delete_response(&state, &bin_id, SystemTime::now())
}

pub async fn mark_emptied(
    State(state): State<Arc<AppState>>,
    Path(bin_id): Path<String>,
) -> impl IntoResponse {
    build_emptied_response(&state, &bin_id, SystemTime::now())
}

pub async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HeatmapQuery>,
) -> impl IntoResponse {
    build_heatmap_response(&state, &query, SystemTime::now())
}

pub async fn get_route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> impl IntoResponse {
    build_route_response(&state, &query, SystemTime::now())
}

fn build_health_response(state: &AppState, now: SystemTime) -> ApiResponse<HealthResponse> {
    let bins = match state.service().bins() {
        Ok(bins) => bins.len(),
        Err(err) => return error_response(&err, now),
    };
    match format_timestamp(now) {
        Ok(timestamp) => ok(HealthResponse {
            status: HealthStatus::Ok,
            bins,
            timestamp,
        }),
        Err(err) => internal_error(&err.to_string()),
    }
}

fn build_telemetry_response(
    state: &AppState,
    request: &TelemetryRequest,
    now: SystemTime,
) -> ApiResponse<ActionResponse> {
    let ts = match request.ts {
        Some(seconds) => match from_unix_seconds(seconds) {
            Ok(ts) => ts,
            Err(err) => return error_response(&err, now),
        },
        None => now,
    };

    match state.service().ingest_telemetry(
        &request.bin_id,
        request.distance_cm,
        request.fill_percent,
        ts,
    ) {
        Ok(sample) => ok(ActionResponse {
            status: ActionStatus::Ok,
            bin_id: sample.bin_id,
        }),
        Err(err) => error_response(&err, now),
    }
}

fn build_bins_response(state: &AppState, now: SystemTime) -> ApiResponse<Vec<BinResponse>> {
    match state.service().bins() {
        Ok(bins) => ok(bins.iter().map(BinResponse::from).collect()),
        Err(err) => error_response(&err, now),
    }
}

fn build_bin_response(state: &AppState, bin_id: &str, now: SystemTime) -> ApiResponse<BinResponse> {
    match state.service().bin(bin_id) {
        Ok(bin) => ok(BinResponse::from(&bin)),
        Err(err) => error_response(&err, now),
    }
}

fn build_register_response(
    state: &AppState,
    request: &RegisterRequest,
    now: SystemTime,
) -> ApiResponse<ActionResponse> {
    match state.service().register_bin(
        &request.bin_id,
        &request.name,
        request.lat,
        request.lng,
        now,
    ) {
        Ok(outcome) => ok(ActionResponse {
            status: outcome.into(),
            bin_id: request.bin_id.trim().to_string(),
        }),
        Err(err) => error_response(&err, now),
    }
}

fn build_delete_response(
    state: &AppState,
    bin_id: &str,
    now: SystemTime,
) -> ApiResponse<ActionResponse> {
    match state.service().delete_bin(bin_id) {
        Ok(()) => ok(ActionResponse {
            status: ActionStatus::Deleted,
            bin_id: bin_id.to_string(),
        }),
        Err(err) => error_response(&err, now),
    }
}

fn build_emptied_response(
    state: &AppState,
    bin_id: &str,
    now: SystemTime,
) -> ApiResponse<BinResponse> {
    match state.service().mark_emptied(bin_id, now) {
        Ok(bin) => ok(BinResponse::from(&bin)),
        Err(err) => error_response(&err, now),
    }
}

fn build_heatmap_response(
    state: &AppState,
    query: &HeatmapQuery,
    now: SystemTime,
) -> ApiResponse<Vec<HeatmapPointResponse>> {
    let window_minutes = query
        .minutes
        .unwrap_or_else(|| state.default_window_minutes());
    match state.service().compute_heatmap(window_minutes, now) {
        Ok(points) => ok(points.iter().map(HeatmapPointResponse::from).collect()),
        Err(err) => error_response(&err, now),
    }
}

fn build_route_response(
    state: &AppState,
    query: &RouteQuery,
    now: SystemTime,
) -> ApiResponse<RouteResponse> {
    match state.service().compute_route(&query.start, &query.end, now) {
        Ok(plan) => ok(RouteResponse::from(&plan)),
        Err(err) => error_response(&err, now),
    }
}

fn ok<T>(body: T) -> ApiResponse<T> {
    ApiResponse::Success {
        status: StatusCode::OK,
        body,
    }
}

fn error_response<T>(err: &AppError, now: SystemTime) -> ApiResponse<T> {
    let (status, error_code) = match err {
        AppError::StartNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::StartNotFound),
        AppError::EndNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::EndNotFound),
        AppError::BinNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::BinNotFound),
        AppError::InvalidWindow(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidWindow),
        AppError::InvalidReading(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidReading)
        }
        AppError::InvalidCoordinate { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidCoordinate)
        }
        AppError::InvalidTimestamp(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidTimestamp)
        }
        AppError::InvalidBin(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidBin),
        AppError::StateLock => return internal_error(&err.to_string()),
    };

    match format_timestamp(now) {
        Ok(timestamp) => ApiResponse::Error {
            status,
            body: ErrorResponse {
                error_code,
                error_message: err.to_string(),
                timestamp,
            },
        },
        Err(format_err) => internal_error(&format_err.to_string()),
    }
}

fn internal_error<T>(message: &str) -> ApiResponse<T> {
    error!(detail = message, "Internal error while handling request");
    let timestamp = format_timestamp(SystemTime::now()).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format internal error timestamp");
        FALLBACK_TIMESTAMP.to_string()
    });
    ApiResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            error_code: ErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp,
        },
    }
}

fn format_timestamp(timestamp: SystemTime) -> Result<String, TimestampError> {
    let datetime = OffsetDateTime::from(timestamp);
    Ok(datetime.format(&Rfc3339)?)
}

/// Negative, non-finite and overflowing values are rejected.
fn from_unix_seconds(seconds: f64) -> Result<SystemTime, AppError> {
    let offset =
        Duration::try_from_secs_f64(seconds).map_err(|_| AppError::InvalidTimestamp(seconds))?;
    UNIX_EPOCH
        .checked_add(offset)
        .ok_or(AppError::InvalidTimestamp(seconds))
}
