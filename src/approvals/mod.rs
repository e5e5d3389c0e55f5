pub mod display;
pub mod executor;
pub mod inbox;
pub mod resolver;
pub mod types;

pub use display::{project_for_display, DisplayProjection, IconCategory, MessageTemplate};
pub use executor::{request_plan, ActionExecutor, HttpRequestPlan, PortalClient};
pub use inbox::{build_inbox, filter_by_tab, find_action, InboxItem, InboxTab};
pub use resolver::{decide, resolve_acceptance, resolve_rejection, ExecutorCall};
pub use types::*;
