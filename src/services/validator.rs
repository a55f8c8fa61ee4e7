//! Pure checks gating a settlement submission.
//!
//! Checks run in a fixed order and the first failure is the one reported, so
//! the user always sees the most fundamental problem first.

use thiserror::Error;
use tracing::debug;

use crate::{
    dao::models::{RateEntity, SettingsEntity},
    dto::settlement::{SettlementPlayer, SettlementRequest},
    state::form::{PlayerRow, RateDraft},
};

/// Minimum number of participants required by the remote endpoint.
pub const MIN_PARTICIPANTS: usize = 3;

/// Reasons a settlement request cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The endpoint URL is blank.
    #[error("settlement endpoint URL is not configured")]
    EndpointNotConfigured,
    /// The settings hold no name/id pairs.
    #[error("no users are configured")]
    NoUsersConfigured,
    /// Fewer than [`MIN_PARTICIPANTS`] rows have both a name and a score.
    #[error("at least {MIN_PARTICIPANTS} players are required (got {found})")]
    InsufficientPlayers {
        /// Complete rows on the form.
        found: usize,
    },
    /// Point or yen is missing or zero.
    #[error("rate is not configured")]
    RateNotConfigured,
    /// A participant's name matches no configured user.
    #[error("player `{name}` does not match any configured user")]
    UnknownPlayer {
        /// Name as typed.
        name: String,
    },
    /// A participant's name matches several configured users.
    #[error("player `{name}` matches more than one configured user")]
    AmbiguousPlayer {
        /// Name as typed.
        name: String,
    },
}

/// Player with a name and an integer score, before id resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Trimmed name.
    pub name: String,
    /// Parsed score.
    pub score: i64,
}

/// Build the request for the current form, or report the first failing check.
pub fn validate<'a>(
    settings: &SettingsEntity,
    rows: impl IntoIterator<Item = &'a PlayerRow>,
    rate: RateDraft,
    sanma: bool,
) -> Result<SettlementRequest, ValidationError> {
    if settings.endpoint_url.trim().is_empty() {
        return Err(ValidationError::EndpointNotConfigured);
    }
    if settings.users.is_empty() {
        return Err(ValidationError::NoUsersConfigured);
    }

    let participants = participants(rows);
    if participants.len() < MIN_PARTICIPANTS {
        return Err(ValidationError::InsufficientPlayers {
            found: participants.len(),
        });
    }

    let rate = usable_rate(rate).ok_or(ValidationError::RateNotConfigured)?;

    let players = participants
        .into_iter()
        .map(|participant| {
            let id = resolve_id(settings, &participant.name)?;
            Ok(SettlementPlayer {
                name: participant.name,
                score: participant.score,
                id,
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(SettlementRequest {
        players,
        rate_point: rate.point,
        rate_yen: rate.yen,
        sanma,
        webhook_url: settings.notify_url.clone(),
    })
}

/// Rows with a trimmed name and a score that parses as an integer, in form order.
pub fn participants<'a>(rows: impl IntoIterator<Item = &'a PlayerRow>) -> Vec<Participant> {
    rows.into_iter()
        .filter_map(|row| {
            let name = row.name.trim();
            let score = row.score.trim();
            if name.is_empty() || score.is_empty() {
                return None;
            }
            match score.parse::<i64>() {
                Ok(score) => Some(Participant {
                    name: name.to_string(),
                    score,
                }),
                Err(err) => {
                    debug!(name, score, error = %err, "skipping row with non-integer score");
                    None
                }
            }
        })
        .collect()
}

/// The rate, when both fields are present and positive.
pub fn usable_rate(rate: RateDraft) -> Option<RateEntity> {
    match (rate.point, rate.yen) {
        (Some(point), Some(yen)) if point > 0 && yen > 0 => Some(RateEntity { point, yen }),
        _ => None,
    }
}

fn resolve_id(settings: &SettingsEntity, name: &str) -> Result<String, ValidationError> {
    let mut matches = settings.users.iter().filter(|user| user.name == name);
    match (matches.next(), matches.next()) {
        (Some(user), None) => Ok(user.id.clone()),
        (None, _) => Err(ValidationError::UnknownPlayer { name: name.into() }),
        (Some(_), Some(_)) => Err(ValidationError::AmbiguousPlayer { name: name.into() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::UserProfileEntity;

    fn user(name: &str, id: &str) -> UserProfileEntity {
        UserProfileEntity {
            name: name.into(),
            id: id.into(),
        }
    }

    fn row(name: &str, score: &str) -> PlayerRow {
        PlayerRow {
            name: name.into(),
            score: score.into(),
        }
    }

    fn settings() -> SettingsEntity {
        SettingsEntity {
            endpoint_url: "https://script.example.test/exec".into(),
            notify_url: "https://hook.example.test".into(),
            users: vec![user("A", "1"), user("B", "2"), user("C", "3")],
            rate: None,
        }
    }

    fn rows() -> Vec<PlayerRow> {
        vec![row("A", "1000"), row("B", "-500"), row("C", "-500")]
    }

    const RATE: RateDraft = RateDraft {
        point: Some(1),
        yen: Some(1),
    };

    #[test]
    fn three_player_scenario_resolves_ids() {
        let request = validate(&settings(), &rows(), RATE, false).unwrap();
        assert_eq!(
            request.players,
            vec![
                SettlementPlayer {
                    name: "A".into(),
                    score: 1000,
                    id: "1".into()
                },
                SettlementPlayer {
                    name: "B".into(),
                    score: -500,
                    id: "2".into()
                },
                SettlementPlayer {
                    name: "C".into(),
                    score: -500,
                    id: "3".into()
                },
            ]
        );
        assert_eq!(request.rate_point, 1);
        assert_eq!(request.rate_yen, 1);
        assert!(!request.sanma);
        assert_eq!(request.webhook_url, "https://hook.example.test");
    }

    #[test]
    fn two_participants_are_insufficient() {
        let rows = vec![row("A", "1000"), row("B", "-1000"), row("C", "")];
        assert_eq!(
            validate(&settings(), &rows, RATE, false),
            Err(ValidationError::InsufficientPlayers { found: 2 })
        );
    }

    #[test]
    fn missing_endpoint_is_reported_before_everything_else() {
        let settings = SettingsEntity {
            endpoint_url: "  ".into(),
            users: Vec::new(),
            ..settings()
        };
        assert_eq!(
            validate(&settings, &[], RateDraft::default(), false),
            Err(ValidationError::EndpointNotConfigured)
        );
    }

    #[test]
    fn missing_users_precede_player_count() {
        let settings = SettingsEntity {
            users: Vec::new(),
            ..settings()
        };
        assert_eq!(
            validate(&settings, &[], RateDraft::default(), false),
            Err(ValidationError::NoUsersConfigured)
        );
    }

    #[test]
    fn player_count_precedes_rate() {
        assert_eq!(
            validate(&settings(), &rows()[..1], RateDraft::default(), false),
            Err(ValidationError::InsufficientPlayers { found: 1 })
        );
    }

    #[test]
    fn rate_requires_both_positive_fields() {
        for rate in [
            RateDraft::default(),
            RateDraft {
                point: Some(1000),
                yen: None,
            },
            RateDraft {
                point: Some(0),
                yen: Some(100),
            },
            RateDraft {
                point: Some(1000),
                yen: Some(-1),
            },
        ] {
            assert_eq!(
                validate(&settings(), &rows(), rate, false),
                Err(ValidationError::RateNotConfigured)
            );
        }
    }

    #[test]
    fn rate_precedes_name_lookup() {
        let rows = vec![row("A", "1"), row("B", "2"), row("Z", "3")];
        assert_eq!(
            validate(&settings(), &rows, RateDraft::default(), false),
            Err(ValidationError::RateNotConfigured)
        );
    }

    #[test]
    fn unknown_name_is_a_validation_error() {
        let rows = vec![row("A", "1"), row("B", "2"), row("Z", "3")];
        assert_eq!(
            validate(&settings(), &rows, RATE, false),
            Err(ValidationError::UnknownPlayer { name: "Z".into() })
        );
    }

    #[test]
    fn duplicated_user_name_is_ambiguous() {
        let mut settings = settings();
        settings.users.push(user("B", "22"));
        assert_eq!(
            validate(&settings, &rows(), RATE, false),
            Err(ValidationError::AmbiguousPlayer { name: "B".into() })
        );
    }

    #[test]
    fn participants_are_trimmed_and_require_integer_scores() {
        let rows = vec![
            row("  A ", " 1000 "),
            row("B", "12.5"),
            row("", "300"),
            row("C", "abc"),
            row("D", "-300"),
        ];
        assert_eq!(
            participants(&rows),
            vec![
                Participant {
                    name: "A".into(),
                    score: 1000
                },
                Participant {
                    name: "D".into(),
                    score: -300
                },
            ]
        );
    }

    #[test]
    fn sanma_flag_is_forwarded() {
        let request = validate(&settings(), &rows(), RATE, true).unwrap();
        assert!(request.sanma);
    }
}
