use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body sent to the remote settlement endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRequest {
    pub players: Vec<SettlementPlayer>,
    pub rate_point: i64,
    pub rate_yen: i64,
    /// Three-player ruleset toggle.
    pub sanma: bool,
    /// Webhook the remote endpoint relays its result to; may be empty.
    pub webhook_url: String,
}

/// One participant of a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementPlayer {
    pub name: String,
    pub score: i64,
    /// External identifier resolved from the user profiles.
    pub id: String,
}

/// Status value the remote endpoint uses to report success.
pub const REMOTE_SUCCESS: &str = "success";

/// Body returned by the remote settlement endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteReply {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl RemoteReply {
    pub fn is_success(&self) -> bool {
        self.status == REMOTE_SUCCESS
    }
}

/// Outcome of a submission, mirroring the notification shown to the user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettlementResponse {
    /// True when the remote endpoint settled the scores.
    pub success: bool,
    pub message: String,
}

impl SettlementResponse {
    pub fn settled(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
