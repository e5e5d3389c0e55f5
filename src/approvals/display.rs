use serde::Serialize;
use std::collections::BTreeMap;

use super::types::*;

/// Date format used for request timestamps in the inbox
pub const REQUESTED_ON_FORMAT: &str = "%d/%m/%Y";

/// Which resource icon an inbox item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconCategory {
    Dataset,
    DataProduct,
}

/// An untranslated message with `{{name}}` placeholders and their values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub template: &'static str,
    pub params: BTreeMap<&'static str, String>,
}

impl MessageTemplate {
    fn new(template: &'static str) -> Self {
        Self {
            template,
            params: BTreeMap::new(),
        }
    }

    fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.insert(key, value.into());
        self
    }

    /// Substitute every known placeholder; unknown ones are left as-is
    pub fn render(&self) -> String {
        let mut out = self.template.to_string();
        for (key, value) in &self.params {
            out = out.replace(&format!("{{{{{}}}}}", key), value);
        }
        out
    }
}

/// A named in-app link embedded in the description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub path: String,
}

/// Everything needed to render one inbox row without matching on the variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayProjection {
    pub action_type: PendingActionType,
    pub icon: IconCategory,
    pub description: MessageTemplate,
    pub tooltip: MessageTemplate,
    pub tag: MessageTemplate,
    pub navigation_target: String,
    pub links: Vec<Link>,
    pub justification: Option<String>,
    pub requester_initials: String,
    pub requested_on: Option<String>,
}

pub fn data_product_path(data_product_id: &str) -> String {
    format!("/studio/{}", data_product_id)
}

pub fn data_product_tab_path(data_product_id: &str, tab: &str) -> String {
    format!("/studio/{}#{}", data_product_id, tab)
}

pub fn output_port_path(data_product_id: &str, output_port_id: &str, tab: &str) -> String {
    format!("/marketplace/{}/{}#{}", data_product_id, output_port_id, tab)
}

pub fn technical_asset_path(owner_id: &str, technical_asset_id: &str) -> String {
    format!("/studio/{}/technical-assets/{}", owner_id, technical_asset_id)
}

/// Map a pending action onto its display fields.
pub fn project_for_display(action: &PendingAction) -> DisplayProjection {
    let requester = action.requested_by().cloned().unwrap_or_default();
    let requester_initials = requester.initials();
    let requested_on = action
        .requested_on()
        .map(|ts| ts.format(REQUESTED_ON_FORMAT).to_string());

    match action {
        PendingAction::DatasetAccess(req) => {
            let port_path =
                output_port_path(&req.output_port.data_product_id, &req.output_port.id, "producers");
            DisplayProjection {
                action_type: action.action_type(),
                icon: IconCategory::Dataset,
                description: MessageTemplate::new(
                    "{{first_name}} {{last_name}} requests read access to the {{output_port}} Output Port on behalf of the {{data_product}} Data Product",
                )
                .with("first_name", &requester.first_name)
                .with("last_name", &requester.last_name)
                .with("output_port", &req.output_port.name)
                .with("data_product", &req.data_product.name),
                tooltip: MessageTemplate::new(
                    "Accepting will grant the {{data_product}} Data Product read access to the {{output_port}} Output Port",
                )
                .with("data_product", &req.data_product.name)
                .with("output_port", &req.output_port.name),
                tag: MessageTemplate::new("{{name}} Output Port").with("name", &req.output_port.name),
                links: vec![
                    Link {
                        label: req.output_port.name.clone(),
                        path: port_path.clone(),
                    },
                    Link {
                        label: req.data_product.name.clone(),
                        path: data_product_path(&req.data_product_id),
                    },
                ],
                navigation_target: port_path,
                justification: Some(req.justification.clone()).filter(|j| !j.is_empty()),
                requester_initials,
                requested_on,
            }
        }
        PendingAction::TechnicalAssetLink(req) => {
            let port_path =
                output_port_path(&req.output_port.data_product_id, &req.output_port.id, "consumers");
            DisplayProjection {
                action_type: action.action_type(),
                icon: IconCategory::Dataset,
                description: MessageTemplate::new(
                    "{{first_name}} {{last_name}} requests the addition of the Technical Asset {{technical_asset}} to the {{output_port}} Output Port",
                )
                .with("first_name", &requester.first_name)
                .with("last_name", &requester.last_name)
                .with("technical_asset", &req.technical_asset.name)
                .with("output_port", &req.output_port.name),
                tooltip: MessageTemplate::new(
                    "Accepting will expose the Technical Asset through the {{output_port}} Output Port.",
                )
                .with("output_port", &req.output_port.name),
                tag: MessageTemplate::new("{{name}} Output Port").with("name", &req.output_port.name),
                links: vec![
                    Link {
                        label: req.technical_asset.name.clone(),
                        path: technical_asset_path(
                            &req.technical_asset.owner_id,
                            &req.technical_asset_id,
                        ),
                    },
                    Link {
                        label: req.output_port.name.clone(),
                        path: port_path.clone(),
                    },
                ],
                navigation_target: port_path,
                justification: None,
                requester_initials,
                requested_on,
            }
        }
        PendingAction::RoleAssignment(req) => {
            let role = req
                .role
                .as_ref()
                .map(|r| r.name.clone())
                .unwrap_or_default();
            DisplayProjection {
                action_type: action.action_type(),
                icon: IconCategory::DataProduct,
                description: MessageTemplate::new(
                    "{{first_name}} {{last_name}} requests to become {{role}} for the {{data_product}} Data Product",
                )
                .with("first_name", &requester.first_name)
                .with("last_name", &requester.last_name)
                .with("role", &role)
                .with("data_product", &req.data_product.name),
                tooltip: MessageTemplate::new(
                    "Accepting will grant the user the role of {{role}} in the {{data_product}} Data Product",
                )
                .with("role", role)
                .with("data_product", &req.data_product.name),
                tag: MessageTemplate::new("{{name}} Data Product")
                    .with("name", &req.data_product.name),
                links: vec![Link {
                    label: req.data_product.name.clone(),
                    path: data_product_path(&req.data_product.id),
                }],
                navigation_target: data_product_tab_path(&req.data_product.id, "team"),
                justification: None,
                requester_initials,
                requested_on,
            }
        }
    }
}
