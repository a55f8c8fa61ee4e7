use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::format_system_time, state::notification::Notification};

/// Style classification of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    /// Non-fatal problem, such as an edit that could not be saved.
    Warning,
}

/// Message currently displayed to the user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationView {
    pub message: String,
    /// `None` once the display period elapsed; the text stays visible unstyled.
    pub kind: Option<NotificationKind>,
    /// RFC 3339 timestamp of when the message was shown.
    pub shown_at: String,
}

impl From<Notification> for NotificationView {
    fn from(notification: Notification) -> Self {
        Self {
            message: notification.message,
            kind: notification.kind,
            shown_at: format_system_time(notification.shown_at),
        }
    }
}
