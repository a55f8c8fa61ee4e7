use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::form::{FormSnapshot, PlayerUpdateRequest, RateUpdateRequest, SanmaRequest},
    error::AppError,
    services::form_service,
    state::SharedState,
};

/// Main form endpoints. Every edit answers with the refreshed form.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/form", get(get_form))
        .route("/form/players/{row_id}", put(update_player))
        .route("/form/rate", put(update_rate))
        .route("/form/sanma", put(set_sanma))
}

/// Return the player rows, rate, mode, suggestions and submit state.
#[utoipa::path(
    get,
    path = "/form",
    tag = "form",
    responses((status = 200, description = "Current form", body = FormSnapshot))
)]
pub async fn get_form(State(state): State<SharedState>) -> Json<FormSnapshot> {
    Json(form_service::snapshot(&state).await)
}

/// Edit a player's name and/or score. The rows are saved right away.
#[utoipa::path(
    put,
    path = "/form/players/{row_id}",
    tag = "form",
    params(("row_id" = Uuid, Path, description = "Identifier of the player row")),
    request_body = PlayerUpdateRequest,
    responses(
        (status = 200, description = "Row updated", body = FormSnapshot),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown row")
    )
)]
pub async fn update_player(
    State(state): State<SharedState>,
    Path(row_id): Path<Uuid>,
    Json(payload): Json<PlayerUpdateRequest>,
) -> Result<Json<FormSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(
        form_service::update_player(&state, row_id, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/form/rate",
    tag = "form",
    request_body = RateUpdateRequest,
    responses((status = 200, description = "Rate draft updated", body = FormSnapshot))
)]
/// Replace the rate draft.
pub async fn update_rate(
    State(state): State<SharedState>,
    Json(payload): Json<RateUpdateRequest>,
) -> Json<FormSnapshot> {
    Json(form_service::update_rate(&state, payload).await)
}

#[utoipa::path(
    put,
    path = "/form/sanma",
    tag = "form",
    request_body = SanmaRequest,
    responses((status = 200, description = "Mode updated", body = FormSnapshot))
)]
/// Switch three-player mode on or off.
pub async fn set_sanma(
    State(state): State<SharedState>,
    Json(payload): Json<SanmaRequest>,
) -> Json<FormSnapshot> {
    Json(form_service::set_sanma(&state, payload.enabled).await)
}
