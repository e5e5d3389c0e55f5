use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::approvals::{Decision, ExecutorCall, InboxTab, PendingAction};
use crate::config::Config;
use crate::usage::{Granularity, RawUsageStat, TimeRange};

/// Generic API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Usage chart request; range and granularity fall back to the configured defaults
#[derive(Deserialize)]
pub struct UsageChartRequest {
    pub stats: Vec<RawUsageStat>,
    pub time_range: Option<TimeRange>,
    pub granularity: Option<Granularity>,
    /// Pin the reference time, mostly for reproducible charts
    pub now: Option<DateTime<Utc>>,
}

/// Inbox listing request
#[derive(Deserialize)]
pub struct InboxRequest {
    pub pending_actions: Vec<PendingAction>,
    #[serde(default)]
    pub tab: InboxTab,
}

/// Accept/reject request for one pending action
#[derive(Deserialize)]
pub struct DecideRequest {
    pub action: PendingAction,
    pub decision: Decision,
}

/// Result of an executed decision
#[derive(Serialize)]
pub struct DecisionDto {
    pub id: String,
    pub operation: String,
    pub call: ExecutorCall,
    pub message: String,
}

/// Config DTO for API responses
#[derive(Serialize)]
pub struct ConfigDto {
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub usage_time_range: String,
    pub usage_granularity: String,
    pub server_port: u16,
    pub log_level: String,
}

impl From<&Config> for ConfigDto {
    fn from(config: &Config) -> Self {
        Self {
            api_base_url: config.api.base_url.clone(),
            api_timeout_secs: config.api.timeout_secs,
            usage_time_range: config.usage.time_range.to_string(),
            usage_granularity: config.usage.granularity.to_string(),
            server_port: config.server.port,
            log_level: config.log_level.clone(),
        }
    }
}
