use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Startup misconfiguration. Fatal: the process refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key}={value:?} is invalid, expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("UPSTREAM_TARGETS must name at least one target")]
    NoTargets,

    #[error("UPSTREAM_TARGETS names {0:?} more than once")]
    DuplicateTarget(String),
}

/// Failure of a single upstream call. Scoped to one inbound request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream {target} unavailable: {source}")]
    Unavailable {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream {target} timed out after {after_ms}ms")]
    Timeout { target: String, after_ms: u128 },

    #[error("upstream {target} returned status {status}")]
    BadStatus { target: String, status: u16 },

    #[error("upstream {target} sent a body larger than {limit} bytes")]
    BodyTooLarge { target: String, limit: usize },

    #[error("upstream {target} sent an invalid body: {reason}")]
    Decode { target: String, reason: String },

    #[error("upstream {target} call aborted: {reason}")]
    Aborted { target: String, reason: String },
}

impl UpstreamError {
    pub fn target(&self) -> &str {
        match self {
            Self::Unavailable { target, .. }
            | Self::Timeout { target, .. }
            | Self::BadStatus { target, .. }
            | Self::BodyTooLarge { target, .. }
            | Self::Decode { target, .. }
            | Self::Aborted { target, .. } => target,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
