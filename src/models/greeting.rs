use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

/// Shape every upstream body must have. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamMessage {
    pub message: String,
}

impl UpstreamMessage {
    /// Schema-checked extraction of `message` from a decoded upstream body.
    pub fn extract(target: &str, body: serde_json::Value) -> Result<String, UpstreamError> {
        serde_json::from_value::<Self>(body)
            .map(|m| m.message)
            .map_err(|e| UpstreamError::Decode {
                target: target.to_string(),
                reason: e.to_string(),
            })
    }
}

/// The outcome of one upstream call: the extracted message, or why it failed.
pub type UpstreamResult = Result<String, UpstreamError>;

/// Merged response, keyed by target name in configured order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Greetings(pub IndexMap<String, String>);

impl Greetings {
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
