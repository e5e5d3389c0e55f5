//! Data portal core: output port usage charts and the pending request inbox.

pub mod approvals;
pub mod config;
pub mod error;
pub mod server;
pub mod usage;
