use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::settlement::SettlementResponse, error::AppError, services::settlement_service,
    state::SharedState,
};

/// Settlement submission endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/settlement", post(submit))
}

/// Validate the form and send it to the remote endpoint.
///
/// Validation, network and remote failures answer `200` with `success: false`;
/// the same message is pushed to the notification stream.
#[utoipa::path(
    post,
    path = "/settlement",
    tag = "settlement",
    responses(
        (status = 200, description = "Attempt finished", body = SettlementResponse),
        (status = 409, description = "A settlement is already in flight")
    )
)]
pub async fn submit(
    State(state): State<SharedState>,
) -> Result<Json<SettlementResponse>, AppError> {
    Ok(Json(settlement_service::submit(&state).await?))
}
