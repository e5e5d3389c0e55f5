use thiserror::Error;

use crate::approvals::DecisionStatus;

/// Errors produced while turning raw usage stats into chart data
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("malformed usage date '{date}': {reason}")]
    MalformedInput { date: String, reason: String },
}

/// Errors produced when a decision is requested for a pending action
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("pending action {id} is already {status}, only pending actions can be decided")]
    InvalidState { id: String, status: DecisionStatus },

    #[error("no pending action with id {0}")]
    NotFound(String),
}

/// Errors returned by an action executor
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("request to backend failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Errors raised while loading, saving or editing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Store(#[from] confy::ConfyError),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
