use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision state of a request, as last reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Approved,
    #[default]
    Pending,
    Denied,
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecisionStatus::Approved => "approved",
            DecisionStatus::Pending => "pending",
            DecisionStatus::Denied => "denied",
        })
    }
}

/// The owner's answer to a pending action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Requester {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// First letter of each name, empty when both names are blank
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .next()
            .into_iter()
            .chain(self.last_name.chars().next())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProductRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPortRef {
    pub id: String,
    pub name: String,
    /// Data product that owns the output port
    pub data_product_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalAssetRef {
    pub id: String,
    pub name: String,
    /// Data product that produces the technical asset
    pub owner_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: String,
    pub name: String,
}

/// A data product asking for read access to an output port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetAccessRequest {
    pub id: String,
    #[serde(default)]
    pub justification: String,
    /// Consuming data product
    pub data_product_id: String,
    pub data_product: DataProductRef,
    pub output_port: OutputPortRef,
    #[serde(default)]
    pub requested_by: Option<Requester>,
    #[serde(default)]
    pub requested_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: DecisionStatus,
}

/// A technical asset asking to be exposed through an output port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalAssetLinkRequest {
    pub id: String,
    pub output_port_id: String,
    pub technical_asset_id: String,
    pub output_port: OutputPortRef,
    pub technical_asset: TechnicalAssetRef,
    #[serde(default)]
    pub requested_by: Option<Requester>,
    #[serde(default)]
    pub requested_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: DecisionStatus,
}

/// A user asking for a role on a data product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignmentRequest {
    pub id: String,
    pub data_product: DataProductRef,
    #[serde(default)]
    pub role: Option<RoleRef>,
    #[serde(default)]
    pub requested_by: Option<Requester>,
    #[serde(default)]
    pub requested_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub decision: DecisionStatus,
}

/// Any request waiting on an owner's decision.
///
/// The wire tag is `pending_action_type`; an unknown tag fails deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pending_action_type")]
pub enum PendingAction {
    #[serde(rename = "DataProductOutputPort")]
    DatasetAccess(DatasetAccessRequest),
    #[serde(rename = "TechnicalAssetOutputPort")]
    TechnicalAssetLink(TechnicalAssetLinkRequest),
    #[serde(rename = "DataProductRoleAssignment")]
    RoleAssignment(RoleAssignmentRequest),
}

/// Variant discriminant, used for inbox filtering and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PendingActionType {
    #[serde(rename = "DataProductOutputPort")]
    DatasetAccess,
    #[serde(rename = "TechnicalAssetOutputPort")]
    TechnicalAssetLink,
    #[serde(rename = "DataProductRoleAssignment")]
    RoleAssignment,
}

impl PendingActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingActionType::DatasetAccess => "DataProductOutputPort",
            PendingActionType::TechnicalAssetLink => "TechnicalAssetOutputPort",
            PendingActionType::RoleAssignment => "DataProductRoleAssignment",
        }
    }
}

impl PendingAction {
    pub fn id(&self) -> &str {
        match self {
            PendingAction::DatasetAccess(req) => &req.id,
            PendingAction::TechnicalAssetLink(req) => &req.id,
            PendingAction::RoleAssignment(req) => &req.id,
        }
    }

    pub fn action_type(&self) -> PendingActionType {
        match self {
            PendingAction::DatasetAccess(_) => PendingActionType::DatasetAccess,
            PendingAction::TechnicalAssetLink(_) => PendingActionType::TechnicalAssetLink,
            PendingAction::RoleAssignment(_) => PendingActionType::RoleAssignment,
        }
    }

    pub fn requested_by(&self) -> Option<&Requester> {
        match self {
            PendingAction::DatasetAccess(req) => req.requested_by.as_ref(),
            PendingAction::TechnicalAssetLink(req) => req.requested_by.as_ref(),
            PendingAction::RoleAssignment(req) => req.requested_by.as_ref(),
        }
    }

    pub fn requested_on(&self) -> Option<DateTime<Utc>> {
        match self {
            PendingAction::DatasetAccess(req) => req.requested_on,
            PendingAction::TechnicalAssetLink(req) => req.requested_on,
            PendingAction::RoleAssignment(req) => req.requested_on,
        }
    }

    pub fn status(&self) -> DecisionStatus {
        match self {
            PendingAction::DatasetAccess(req) => req.status,
            PendingAction::TechnicalAssetLink(req) => req.status,
            PendingAction::RoleAssignment(req) => req.decision,
        }
    }
}

/// Backend envelope for the current user's pending actions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingActionResponse {
    pub pending_actions: Vec<PendingAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_variants() {
        let json = r#"[
            {
                "pending_action_type": "DataProductOutputPort",
                "id": "req-1",
                "justification": "quarterly reporting",
                "data_product_id": "dp-consumer",
                "data_product": {"id": "dp-consumer", "name": "Sales"},
                "output_port": {"id": "op-1", "name": "Orders", "data_product_id": "dp-owner"},
                "requested_by": {"first_name": "Ada", "last_name": "Lovelace"},
                "requested_on": "2024-03-01T10:00:00Z",
                "status": "pending"
            },
            {
                "pending_action_type": "DataProductRoleAssignment",
                "id": "ra-1",
                "data_product": {"id": "dp-1", "name": "Sales"},
                "role": null,
                "requested_by": null,
                "requested_on": null,
                "decision": "denied"
            }
        ]"#;

        let actions: Vec<PendingAction> = serde_json::from_str(json).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action_type(), PendingActionType::DatasetAccess);
        assert_eq!(actions[0].status(), DecisionStatus::Pending);
        assert_eq!(actions[1].id(), "ra-1");
        assert_eq!(actions[1].status(), DecisionStatus::Denied);
        assert!(actions[1].requested_by().is_none());
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let json = r#"{"pending_action_type": "DatasetRoleAssignment", "id": "x"}"#;
        assert!(serde_json::from_str::<PendingAction>(json).is_err());
    }

    #[test]
    fn test_requester_initials() {
        let requester = Requester {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            ..Default::default()
        };
        assert_eq!(requester.initials(), "AL");
        assert_eq!(requester.full_name(), "Ada Lovelace");
        assert_eq!(Requester::default().initials(), "");
    }
}
