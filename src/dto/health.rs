use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether a settlement is being sent right now.
    pub submitting: bool,
}

impl HealthResponse {
    /// The store is reachable.
    pub fn ok(submitting: bool) -> Self {
        Self {
            status: "ok".to_string(),
            submitting,
        }
    }

    /// The store failed its health check; edits will not be saved.
    pub fn degraded(submitting: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            submitting,
        }
    }
}
