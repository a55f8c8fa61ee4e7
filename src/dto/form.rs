//! DTOs for the main settlement form.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{notification::NotificationView, settings::SettingsView},
    state::{
        form::{FormState, RateDraft},
        submission::SubmitControl,
    },
};

/// Everything the form displays, in render order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormSnapshot {
    pub players: Vec<PlayerRowView>,
    pub rate: RateView,
    /// Three-player mode.
    pub sanma: bool,
    /// Configured user names offered as completions.
    pub suggestions: Vec<String>,
    pub settings: SettingsView,
    pub submit: SubmitControlView,
    pub notification: Option<NotificationView>,
}

impl FormSnapshot {
    pub fn from_form(
        form: &FormState,
        control: SubmitControl,
        notification: Option<NotificationView>,
    ) -> Self {
        Self {
            players: form
                .players()
                .map(|(row_id, row)| PlayerRowView {
                    row_id,
                    name: row.name.clone(),
                    score: row.score.clone(),
                })
                .collect(),
            rate: form.rate().into(),
            sanma: form.sanma(),
            suggestions: form.suggestions().to_vec(),
            settings: SettingsView::from(form.settings()),
            submit: control.into(),
            notification,
        }
    }
}

/// One player row as typed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerRowView {
    /// Stable row identifier used to address edits.
    pub row_id: Uuid,
    pub name: String,
    /// Raw score text.
    pub score: String,
}

/// Rate fields; `null` when blank.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct RateView {
    pub point: Option<i64>,
    pub yen: Option<i64>,
}

impl From<RateDraft> for RateView {
    fn from(rate: RateDraft) -> Self {
        Self {
            point: rate.point,
            yen: rate.yen,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmitControlView {
    pub disabled: bool,
    pub label: String,
}

impl From<SubmitControl> for SubmitControlView {
    fn from(control: SubmitControl) -> Self {
        Self {
            disabled: control.disabled,
            label: control.label.to_string(),
        }
    }
}

/// Edit of one player row; omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct PlayerUpdateRequest {
    #[validate(length(max = 64))]
    pub name: Option<String>,
    /// Free text; rows whose score is not an integer are left out of a settlement.
    #[validate(length(max = 32))]
    pub score: Option<String>,
}

/// New rate draft. Fields accept numbers or numeric strings; `null` clears a field.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RateUpdateRequest {
    #[serde(default)]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub point: Option<i64>,
    #[serde(default)]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub yen: Option<i64>,
}

/// Three-player mode toggle.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SanmaRequest {
    pub enabled: bool,
}
