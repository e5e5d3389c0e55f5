use serde::Serialize;

use super::types::*;
use crate::error::ResolveError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetAccessArgs {
    pub output_port_id: String,
    /// Data product that owns the output port
    pub data_product_id: String,
    pub consuming_data_product_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalAssetLinkArgs {
    pub output_port_id: String,
    /// Data product that owns the output port
    pub data_product_id: String,
    pub technical_asset_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAssignmentArgs {
    pub assignment_id: String,
    pub data_product_id: String,
}

/// One executor operation together with the arguments it needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", content = "args", rename_all = "camelCase")]
pub enum ExecutorCall {
    AcceptDatasetAccess(DatasetAccessArgs),
    RejectDatasetAccess(DatasetAccessArgs),
    AcceptTechnicalAssetLink(TechnicalAssetLinkArgs),
    RejectTechnicalAssetLink(TechnicalAssetLinkArgs),
    AcceptRoleAssignment(RoleAssignmentArgs),
    RejectRoleAssignment(RoleAssignmentArgs),
}

impl ExecutorCall {
    /// Operation name as exposed to callers
    pub fn operation(&self) -> &'static str {
        match self {
            ExecutorCall::AcceptDatasetAccess(_) => "acceptDatasetAccess",
            ExecutorCall::RejectDatasetAccess(_) => "rejectDatasetAccess",
            ExecutorCall::AcceptTechnicalAssetLink(_) => "acceptTechnicalAssetLink",
            ExecutorCall::RejectTechnicalAssetLink(_) => "rejectTechnicalAssetLink",
            ExecutorCall::AcceptRoleAssignment(_) => "acceptRoleAssignment",
            ExecutorCall::RejectRoleAssignment(_) => "rejectRoleAssignment",
        }
    }

    pub fn decision(&self) -> Decision {
        match self {
            ExecutorCall::AcceptDatasetAccess(_)
            | ExecutorCall::AcceptTechnicalAssetLink(_)
            | ExecutorCall::AcceptRoleAssignment(_) => Decision::Accept,
            ExecutorCall::RejectDatasetAccess(_)
            | ExecutorCall::RejectTechnicalAssetLink(_)
            | ExecutorCall::RejectRoleAssignment(_) => Decision::Reject,
        }
    }

    /// Feedback shown once the backend confirms the call
    pub fn success_message(&self) -> &'static str {
        match self {
            ExecutorCall::AcceptDatasetAccess(_) | ExecutorCall::AcceptTechnicalAssetLink(_) => {
                "Dataset request has been successfully approved"
            }
            ExecutorCall::RejectDatasetAccess(_) | ExecutorCall::RejectTechnicalAssetLink(_) => {
                "Dataset access request has been successfully rejected"
            }
            ExecutorCall::AcceptRoleAssignment(_) => {
                "User has been granted access to the data product"
            }
            ExecutorCall::RejectRoleAssignment(_) => {
                "User access to the data product has been denied"
            }
        }
    }

    /// Feedback shown when the backend call fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            ExecutorCall::AcceptDatasetAccess(_) => "Failed to approve data product dataset link",
            ExecutorCall::RejectDatasetAccess(_) => "Failed to reject data product dataset link",
            ExecutorCall::AcceptTechnicalAssetLink(_) => {
                "Failed to approve data output dataset link"
            }
            ExecutorCall::RejectTechnicalAssetLink(_) => {
                "Failed to reject data output dataset link"
            }
            ExecutorCall::AcceptRoleAssignment(_) => {
                "Failed to grant user access to the data product"
            }
            ExecutorCall::RejectRoleAssignment(_) => {
                "Failed to deny user access to the data product"
            }
        }
    }
}

fn dataset_access_args(req: &DatasetAccessRequest) -> DatasetAccessArgs {
    DatasetAccessArgs {
        output_port_id: req.output_port.id.clone(),
        data_product_id: req.output_port.data_product_id.clone(),
        consuming_data_product_id: req.data_product.id.clone(),
    }
}

fn technical_asset_link_args(req: &TechnicalAssetLinkRequest) -> TechnicalAssetLinkArgs {
    TechnicalAssetLinkArgs {
        output_port_id: req.output_port_id.clone(),
        data_product_id: req.output_port.data_product_id.clone(),
        technical_asset_id: req.technical_asset_id.clone(),
    }
}

fn role_assignment_args(req: &RoleAssignmentRequest) -> RoleAssignmentArgs {
    RoleAssignmentArgs {
        assignment_id: req.id.clone(),
        data_product_id: req.data_product.id.clone(),
    }
}

/// The executor call that approves `action`.
///
/// Callers must only pass actions that are still pending; the backend owns
/// that state and this mapping does not consult it.
pub fn resolve_acceptance(action: &PendingAction) -> ExecutorCall {
    match action {
        PendingAction::DatasetAccess(req) => {
            ExecutorCall::AcceptDatasetAccess(dataset_access_args(req))
        }
        PendingAction::TechnicalAssetLink(req) => {
            ExecutorCall::AcceptTechnicalAssetLink(technical_asset_link_args(req))
        }
        PendingAction::RoleAssignment(req) => {
            ExecutorCall::AcceptRoleAssignment(role_assignment_args(req))
        }
    }
}

/// The executor call that denies `action`. Same precondition as [`resolve_acceptance`].
pub fn resolve_rejection(action: &PendingAction) -> ExecutorCall {
    match action {
        PendingAction::DatasetAccess(req) => {
            ExecutorCall::RejectDatasetAccess(dataset_access_args(req))
        }
        PendingAction::TechnicalAssetLink(req) => {
            ExecutorCall::RejectTechnicalAssetLink(technical_asset_link_args(req))
        }
        PendingAction::RoleAssignment(req) => {
            ExecutorCall::RejectRoleAssignment(role_assignment_args(req))
        }
    }
}

/// Check the last known status, then resolve the call for `decision`.
pub fn decide(action: &PendingAction, decision: Decision) -> Result<ExecutorCall, ResolveError> {
    let status = action.status();
    if status != DecisionStatus::Pending {
        return Err(ResolveError::InvalidState {
            id: action.id().to_string(),
            status,
        });
    }

    Ok(match decision {
        Decision::Accept => resolve_acceptance(action),
        Decision::Reject => resolve_rejection(action),
    })
}
