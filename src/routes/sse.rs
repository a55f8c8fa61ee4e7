use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/notifications",
    tag = "sse",
    responses((status = 200, description = "Notification stream", content_type = "text/event-stream", body = String))
)]
/// Stream notifications as they are shown and cleared.
pub async fn notification_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let (receiver, initial) = sse_service::subscribe_notifications(&state);
    info!("New notification SSE connection");
    sse_service::to_sse_stream(receiver, initial)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/notifications", get(notification_stream))
}
