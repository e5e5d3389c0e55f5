use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::resolver::ExecutorCall;
use super::types::{PendingAction, PendingActionResponse};
use crate::config::ApiConfig;
use crate::error::ExecutorError;
use crate::usage::{Granularity, RawUsageStat, TimeRange, UsageStatsPayload};

/// Carries out a resolved approve/deny call against the backend
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, call: &ExecutorCall) -> Result<(), ExecutorError>;
}

/// HTTP request a call translates to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpRequestPlan {
    pub path: String,
    pub body: serde_json::Value,
}

/// Map a call onto the backend REST endpoint and JSON body it posts
pub fn request_plan(call: &ExecutorCall) -> HttpRequestPlan {
    match call {
        ExecutorCall::AcceptDatasetAccess(args) | ExecutorCall::RejectDatasetAccess(args) => {
            let verb = if matches!(call, ExecutorCall::AcceptDatasetAccess(_)) {
                "approve"
            } else {
                "deny"
            };
            HttpRequestPlan {
                path: format!(
                    "/api/v2/data_products/{}/output_ports/{}/input_ports/{}",
                    args.data_product_id, args.output_port_id, verb
                ),
                body: serde_json::json!({
                    "consuming_data_product_id": args.consuming_data_product_id,
                }),
            }
        }
        ExecutorCall::AcceptTechnicalAssetLink(args)
        | ExecutorCall::RejectTechnicalAssetLink(args) => {
            let verb = if matches!(call, ExecutorCall::AcceptTechnicalAssetLink(_)) {
                "approve_link_request"
            } else {
                "deny_link_request"
            };
            HttpRequestPlan {
                path: format!(
                    "/api/v2/data_products/{}/output_ports/{}/technical_assets/{}",
                    args.data_product_id, args.output_port_id, verb
                ),
                body: serde_json::json!({
                    "technical_asset_id": args.technical_asset_id,
                }),
            }
        }
        ExecutorCall::AcceptRoleAssignment(args) | ExecutorCall::RejectRoleAssignment(args) => {
            let status = if matches!(call, ExecutorCall::AcceptRoleAssignment(_)) {
                "approved"
            } else {
                "denied"
            };
            HttpRequestPlan {
                path: format!(
                    "/api/v2/authz/role_assignments/data_product/{}/decide",
                    args.assignment_id
                ),
                body: serde_json::json!({ "decision": status }),
            }
        }
    }
}

/// HTTP client for the portal backend: fetches inbox and usage data, posts decisions
pub struct PortalClient {
    client: reqwest::Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ExecutorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ExecutorError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ExecutorError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    /// Pending actions waiting on the current user
    pub async fn fetch_pending_actions(&self) -> Result<Vec<PendingAction>, ExecutorError> {
        let response = self
            .client
            .get(self.url("/api/v2/users/current/pending_actions"))
            .send()
            .await?;
        let payload: PendingActionResponse = Self::check(response).await?.json().await?;
        Ok(payload.pending_actions)
    }

    /// Daily query stats for one output port
    pub async fn fetch_usage_stats(
        &self,
        data_product_id: &str,
        output_port_id: &str,
        range: TimeRange,
        granularity: Granularity,
    ) -> Result<Vec<RawUsageStat>, ExecutorError> {
        let day_range = match range {
            TimeRange::LastMonth => 30,
            TimeRange::Last90Days => 90,
            TimeRange::LastYear => 365,
            TimeRange::LastDays(days) => days.max(1),
        };
        let response = self
            .client
            .get(self.url(&format!(
                "/api/v2/data_products/{}/output_ports/{}/query_stats",
                data_product_id, output_port_id
            )))
            .query(&[
                ("granularity", granularity.as_str().to_string()),
                ("day_range", day_range.to_string()),
            ])
            .send()
            .await?;
        let payload: UsageStatsPayload = Self::check(response).await?.json().await?;
        Ok(payload.into_stats())
    }
}

#[async_trait]
impl ActionExecutor for PortalClient {
    async fn execute(&self, call: &ExecutorCall) -> Result<(), ExecutorError> {
        let plan = request_plan(call);
        tracing::debug!(operation = call.operation(), path = %plan.path, "posting decision");

        let response = self
            .client
            .post(self.url(&plan.path))
            .json(&plan.body)
            .send()
            .await?;
        Self::check(response).await?;

        tracing::info!(operation = call.operation(), "decision accepted by backend");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approvals::resolver::*;

    #[test]
    fn test_plan_dataset_access() {
        let call = ExecutorCall::RejectDatasetAccess(DatasetAccessArgs {
            output_port_id: "op-1".to_string(),
            data_product_id: "dp-owner".to_string(),
            consuming_data_product_id: "dp-consumer".to_string(),
        });
        let plan = request_plan(&call);
        assert_eq!(
            plan.path,
            "/api/v2/data_products/dp-owner/output_ports/op-1/input_ports/deny"
        );
        assert_eq!(plan.body["consuming_data_product_id"], "dp-consumer");
    }

    #[test]
    fn test_plan_technical_asset_link() {
        let call = ExecutorCall::AcceptTechnicalAssetLink(TechnicalAssetLinkArgs {
            output_port_id: "op-1".to_string(),
            data_product_id: "dp-owner".to_string(),
            technical_asset_id: "ta-1".to_string(),
        });
        let plan = request_plan(&call);
        assert!(plan.path.ends_with("/technical_assets/approve_link_request"));
        assert_eq!(plan.body["technical_asset_id"], "ta-1");
    }

    #[test]
    fn test_plan_role_assignment() {
        let args = RoleAssignmentArgs {
            assignment_id: "ra-1".to_string(),
            data_product_id: "dp-1".to_string(),
        };
        let accept = request_plan(&ExecutorCall::AcceptRoleAssignment(args.clone()));
        let reject = request_plan(&ExecutorCall::RejectRoleAssignment(args));
        assert_eq!(accept.path, "/api/v2/authz/role_assignments/data_product/ra-1/decide");
        assert_eq!(accept.body, serde_json::json!({ "decision": "approved" }));
        assert_eq!(reject.body, serde_json::json!({ "decision": "denied" }));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let executor = PortalClient::new(&ApiConfig {
            base_url: "http://portal.local/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(executor.url("/api/x"), "http://portal.local/api/x");
    }
}
