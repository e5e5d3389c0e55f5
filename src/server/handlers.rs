use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock};

use crate::approvals::{build_inbox, decide, ActionExecutor, InboxItem};
use crate::config::Config;
use crate::usage::{build_usage_chart, UsageChart};

use super::dto::*;

/// Shared application state
pub struct AppState {
    pub config: RwLock<Config>,
    pub executor: Arc<dyn ActionExecutor>,
}

impl AppState {
    pub fn new(config: Config, executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            config: RwLock::new(config),
            executor,
        }
    }

    fn config(&self) -> Config {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Get current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config();
    Json(ApiResponse::success(ConfigDto::from(&config)))
}

/// Bucket raw query stats into a chart
pub async fn usage_chart(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UsageChartRequest>,
) -> impl IntoResponse {
    let defaults = state.config().usage;
    let range = req.time_range.unwrap_or(defaults.time_range);
    let granularity = req.granularity.unwrap_or(defaults.granularity);
    let now = req.now.unwrap_or_else(Utc::now);

    match build_usage_chart(&req.stats, range, granularity, now) {
        Ok(chart) => {
            tracing::debug!(
                buckets = chart.buckets.len(),
                points = chart.points.len(),
                "built usage chart"
            );
            (StatusCode::OK, Json(ApiResponse::success(chart)))
        }
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<UsageChart>::error(e.to_string())),
        ),
    }
}

/// List inbox items for a tab
pub async fn list_pending_actions(Json(req): Json<InboxRequest>) -> impl IntoResponse {
    let items = build_inbox(&req.pending_actions, req.tab);
    Json(ApiResponse::<Vec<InboxItem>>::success(items))
}

/// Resolve and execute an accept/reject decision
pub async fn decide_pending_action(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DecideRequest>,
) -> impl IntoResponse {
    let call = match decide(&req.action, req.decision) {
        Ok(call) => call,
        Err(e) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<DecisionDto>::error(e.to_string())),
            )
        }
    };

    match state.executor.execute(&call).await {
        Ok(()) => {
            let dto = DecisionDto {
                id: req.action.id().to_string(),
                operation: call.operation().to_string(),
                message: call.success_message().to_string(),
                call,
            };
            (StatusCode::OK, Json(ApiResponse::success(dto)))
        }
        Err(e) => {
            tracing::warn!(operation = call.operation(), error = %e, "decision failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::<DecisionDto>::error(format!(
                    "{}: {}",
                    call.failure_message(),
                    e
                ))),
            )
        }
    }
}
