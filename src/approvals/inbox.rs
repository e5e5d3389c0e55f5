use serde::{Deserialize, Serialize};

use super::display::{project_for_display, DisplayProjection};
use super::types::{PendingAction, PendingActionType};

/// Inbox tab selecting which kinds of requests are listed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum InboxTab {
    #[default]
    All,
    /// Role requests on data products
    DataProduct,
    /// Output port access and technical asset links
    Dataset,
}

impl InboxTab {
    pub fn includes(&self, action_type: PendingActionType) -> bool {
        match self {
            InboxTab::All => true,
            InboxTab::DataProduct => action_type == PendingActionType::RoleAssignment,
            InboxTab::Dataset => matches!(
                action_type,
                PendingActionType::DatasetAccess | PendingActionType::TechnicalAssetLink
            ),
        }
    }
}

/// One inbox row: the raw action plus its display projection
#[derive(Debug, Clone, Serialize)]
pub struct InboxItem {
    pub id: String,
    pub action: PendingAction,
    pub display: DisplayProjection,
}

pub fn filter_by_tab(actions: &[PendingAction], tab: InboxTab) -> Vec<&PendingAction> {
    actions
        .iter()
        .filter(|action| tab.includes(action.action_type()))
        .collect()
}

/// Project every action visible under `tab`, keeping input order
pub fn build_inbox(actions: &[PendingAction], tab: InboxTab) -> Vec<InboxItem> {
    filter_by_tab(actions, tab)
        .into_iter()
        .map(|action| InboxItem {
            id: action.id().to_string(),
            action: action.clone(),
            display: project_for_display(action),
        })
        .collect()
}

pub fn find_action<'a>(actions: &'a [PendingAction], id: &str) -> Option<&'a PendingAction> {
    actions.iter().find(|action| action.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approvals::types::*;

    fn actions() -> Vec<PendingAction> {
        let json = r#"[
            {
                "pending_action_type": "DataProductRoleAssignment",
                "id": "ra-1",
                "data_product": {"id": "dp-1", "name": "Sales"},
                "decision": "pending"
            },
            {
                "pending_action_type": "TechnicalAssetOutputPort",
                "id": "link-1",
                "output_port_id": "op-1",
                "technical_asset_id": "ta-1",
                "output_port": {"id": "op-1", "name": "Orders", "data_product_id": "dp-1"},
                "technical_asset": {"id": "ta-1", "name": "orders", "owner_id": "dp-1"},
                "status": "pending"
            }
        ]"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_tab_filtering() {
        let actions = actions();
        assert_eq!(filter_by_tab(&actions, InboxTab::All).len(), 2);

        let product = filter_by_tab(&actions, InboxTab::DataProduct);
        assert_eq!(product.len(), 1);
        assert_eq!(product[0].id(), "ra-1");

        let dataset = filter_by_tab(&actions, InboxTab::Dataset);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset[0].action_type(), PendingActionType::TechnicalAssetLink);
    }

    #[test]
    fn test_build_inbox_projects_items() {
        let inbox = build_inbox(&actions(), InboxTab::All);
        assert_eq!(inbox[0].id, "ra-1");
        assert_eq!(inbox[0].display.navigation_target, "/studio/dp-1#team");
        assert_eq!(inbox[1].display.tag.render(), "Orders Output Port");
    }

    #[test]
    fn test_find_action() {
        let actions = actions();
        assert!(find_action(&actions, "link-1").is_some());
        assert!(find_action(&actions, "missing").is_none());
    }
}
