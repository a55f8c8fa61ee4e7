use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the settlement form API.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::notification_stream,
        crate::routes::form::get_form,
        crate::routes::form::update_player,
        crate::routes::form::update_rate,
        crate::routes::form::set_sanma,
        crate::routes::settings::get_settings,
        crate::routes::settings::save_settings,
        crate::routes::settlement::submit,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::notification::NotificationKind,
            crate::dto::notification::NotificationView,
            crate::dto::form::FormSnapshot,
            crate::dto::form::PlayerRowView,
            crate::dto::form::RateView,
            crate::dto::form::SubmitControlView,
            crate::dto::form::PlayerUpdateRequest,
            crate::dto::form::RateUpdateRequest,
            crate::dto::form::SanmaRequest,
            crate::dto::settings::SettingsInput,
            crate::dto::settings::UserProfileInput,
            crate::dto::settings::SettingsView,
            crate::dto::settings::UserProfileView,
            crate::dto::settlement::SettlementResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "form", description = "Player rows, rate and mode of the settlement form"),
        (name = "settings", description = "Endpoint, webhook and user profile settings"),
        (name = "settlement", description = "Settlement submission"),
    )
)]
pub struct ApiDoc;
