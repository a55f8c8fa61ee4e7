//! DTOs for the settings form.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::SettingsEntity,
    dto::validation::{validate_optional_http_url, validate_user_id},
    state::form::USER_SLOTS,
};

/// Explicit save of the settings form. Rows missing a name or an id are dropped.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct SettingsInput {
    /// Remote settlement endpoint.
    #[validate(custom(function = "validate_optional_http_url"))]
    pub endpoint_url: String,
    /// Webhook forwarded to the endpoint; may be empty.
    #[validate(custom(function = "validate_optional_http_url"))]
    pub notify_url: String,
    /// Name/id rows, at most one per settings slot.
    #[validate(length(max = 10), nested)]
    pub users: Vec<UserProfileInput>,
}

/// One settings row as typed.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UserProfileInput {
    /// Display name matched against the player rows.
    #[validate(length(max = 64))]
    pub name: String,
    /// Chat user id sent with the settlement.
    #[validate(custom(function = "validate_user_id"))]
    pub id: String,
}

/// Settings as rendered by the form, with blank rows up to the slot count.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettingsView {
    /// Remote settlement endpoint, empty when unset.
    pub endpoint_url: String,
    /// Webhook forwarded to the endpoint.
    pub notify_url: String,
    /// Exactly one entry per settings slot.
    pub users: Vec<UserProfileView>,
}

/// One rendered settings row.
#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq, Eq)]
pub struct UserProfileView {
    pub name: String,
    pub id: String,
}

impl From<&SettingsEntity> for SettingsView {
    fn from(settings: &SettingsEntity) -> Self {
        let mut users: Vec<UserProfileView> = settings
            .users
            .iter()
            .take(USER_SLOTS)
            .map(|user| UserProfileView {
                name: user.name.clone(),
                id: user.id.clone(),
            })
            .collect();
        users.resize_with(USER_SLOTS, UserProfileView::default);

        Self {
            endpoint_url: settings.endpoint_url.clone(),
            notify_url: settings.notify_url.clone(),
            users,
        }
    }
}
