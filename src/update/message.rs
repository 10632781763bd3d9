//! Control messages posted to a waiting version.

use serde::{Deserialize, Serialize};

/// Instruction for the update worker.
///
/// Serialized as `{"type":"SKIP_WAITING"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Stop waiting and become the active version.
    SkipWaiting,
}

impl ControlMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
