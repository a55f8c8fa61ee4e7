use axum::{Json, Router, extract::State, routing::get};
use validator::Validate;

use crate::{
    dto::settings::{SettingsInput, SettingsView},
    error::AppError,
    services::form_service,
    state::SharedState,
};

/// Settings form endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/settings", get(get_settings).put(save_settings))
}

#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    responses((status = 200, description = "Current settings", body = SettingsView))
)]
/// Return the endpoint, webhook and user rows.
pub async fn get_settings(State(state): State<SharedState>) -> Json<SettingsView> {
    Json(form_service::settings(&state).await)
}

#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    request_body = SettingsInput,
    responses(
        (status = 200, description = "Settings saved", body = SettingsView),
        (status = 400, description = "Invalid payload"),
        (status = 503, description = "Settings could not be written")
    )
)]
/// Save the settings form in one write.
pub async fn save_settings(
    State(state): State<SharedState>,
    Json(payload): Json<SettingsInput>,
) -> Result<Json<SettingsView>, AppError> {
    payload.validate()?;
    Ok(Json(form_service::persist_settings(&state, payload).await?))
}
