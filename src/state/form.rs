use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;
use uuid::Uuid;

use crate::dao::models::{PlayerInputEntity, RateEntity, SettingsEntity};

/// Number of player rows shown on the main form.
pub const PLAYER_SLOTS: usize = 4;
/// Number of user profile rows shown on the settings form.
pub const USER_SLOTS: usize = 10;

/// Raw contents of a player row as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRow {
    /// Player name, matched against the configured users.
    pub name: String,
    /// Score text; parsed only when the settlement is built.
    pub score: String,
}

/// Partial edit of a player row; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PlayerPatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement score text.
    pub score: Option<String>,
}

/// Rate fields as currently entered; blank fields are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateDraft {
    /// Points per unit.
    pub point: Option<i64>,
    /// Yen per unit.
    pub yen: Option<i64>,
}

impl From<RateEntity> for RateDraft {
    fn from(rate: RateEntity) -> Self {
        Self {
            point: Some(rate.point),
            yen: Some(rate.yen),
        }
    }
}

/// Edit addressed to a row the form does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown player row `{0}`")]
pub struct UnknownRow(pub Uuid);

/// In-memory mirror of everything the form displays.
///
/// Player rows are keyed by a stable identifier so persisted values follow the
/// row they were typed into, whatever order rows are rendered in.
#[derive(Debug, Clone)]
pub struct FormState {
    players: IndexMap<Uuid, PlayerRow>,
    settings: SettingsEntity,
    rate: RateDraft,
    sanma: bool,
    suggestions: Vec<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::restore(Vec::new(), SettingsEntity::default())
    }
}

impl FormState {
    /// Rebuild the form from persisted records.
    ///
    /// Stored rows keep their identifier; rows saved without one get a fresh
    /// identifier in stored order. The result always holds exactly
    /// [`PLAYER_SLOTS`] rows.
    pub fn restore(inputs: Vec<PlayerInputEntity>, settings: SettingsEntity) -> Self {
        let mut players: IndexMap<Uuid, PlayerRow> = IndexMap::with_capacity(PLAYER_SLOTS);
        for input in inputs.into_iter().take(PLAYER_SLOTS) {
            let id = input
                .row_id
                .filter(|id| !players.contains_key(id))
                .unwrap_or_else(Uuid::new_v4);
            players.insert(
                id,
                PlayerRow {
                    name: input.name,
                    score: input.score,
                },
            );
        }
        while players.len() < PLAYER_SLOTS {
            players.insert(Uuid::new_v4(), PlayerRow::default());
        }

        let rate = settings.rate.map(RateDraft::from).unwrap_or_default();
        let mut form = Self {
            players,
            settings: SettingsEntity::default(),
            rate,
            sanma: false,
            suggestions: Vec::new(),
        };
        form.apply_settings(settings);
        form
    }

    /// Player rows in display order.
    pub fn players(&self) -> impl Iterator<Item = (Uuid, &PlayerRow)> {
        self.players.iter().map(|(id, row)| (*id, row))
    }

    /// Apply a partial edit to one row.
    pub fn update_player(&mut self, id: Uuid, patch: PlayerPatch) -> Result<(), UnknownRow> {
        let row = self.players.get_mut(&id).ok_or(UnknownRow(id))?;
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(score) = patch.score {
            row.score = score;
        }
        Ok(())
    }

    /// Blank every score field, keeping names.
    pub fn clear_scores(&mut self) {
        for row in self.players.values_mut() {
            row.score.clear();
        }
    }

    /// Rows in the shape they are persisted in.
    pub fn player_entities(&self) -> Vec<PlayerInputEntity> {
        self.players
            .iter()
            .map(|(id, row)| PlayerInputEntity {
                row_id: Some(*id),
                name: row.name.clone(),
                score: row.score.clone(),
            })
            .collect()
    }

    /// Rate as currently entered.
    pub fn rate(&self) -> RateDraft {
        self.rate
    }

    /// Replace the rate draft.
    pub fn set_rate(&mut self, rate: RateDraft) {
        self.rate = rate;
    }

    /// Whether three-player mode is on.
    pub fn sanma(&self) -> bool {
        self.sanma
    }

    /// Toggle three-player mode.
    pub fn set_sanma(&mut self, enabled: bool) {
        self.sanma = enabled;
    }

    /// Settings as last restored or saved.
    pub fn settings(&self) -> &SettingsEntity {
        &self.settings
    }

    /// Replace the mirrored settings and rebuild the name suggestions.
    pub fn apply_settings(&mut self, settings: SettingsEntity) {
        self.suggestions = suggestions_for(&settings);
        self.settings = settings;
    }

    /// Remember the rate last used for a settlement.
    pub fn remember_rate(&mut self, rate: RateEntity) {
        self.settings.rate = Some(rate);
    }

    /// Names offered as completions for the player name fields.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

fn suggestions_for(settings: &SettingsEntity) -> Vec<String> {
    let mut seen = HashSet::new();
    settings
        .users
        .iter()
        .filter(|user| !user.name.is_empty())
        .filter(|user| seen.insert(user.name.as_str()))
        .map(|user| user.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::UserProfileEntity;

    fn input(row_id: Option<Uuid>, name: &str, score: &str) -> PlayerInputEntity {
        PlayerInputEntity {
            row_id,
            name: name.into(),
            score: score.into(),
        }
    }

    #[test]
    fn empty_restore_yields_blank_slots() {
        let form = FormState::default();
        assert_eq!(form.players().count(), PLAYER_SLOTS);
        assert!(form.players().all(|(_, row)| *row == PlayerRow::default()));
        assert_eq!(form.rate(), RateDraft::default());
        assert!(!form.sanma());
    }

    #[test]
    fn restore_keeps_row_identity_and_pads() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let form = FormState::restore(
            vec![input(Some(second), "B", "-500"), input(Some(first), "A", "1000")],
            SettingsEntity::default(),
        );

        let rows: Vec<_> = form.players().collect();
        assert_eq!(rows.len(), PLAYER_SLOTS);
        assert_eq!(rows[0].0, second);
        assert_eq!(rows[0].1.name, "B");
        assert_eq!(rows[1].0, first);
        assert_eq!(rows[1].1.score, "1000");
        assert_eq!(*rows[2].1, PlayerRow::default());
    }

    #[test]
    fn restore_assigns_ids_to_legacy_and_duplicate_rows() {
        let shared = Uuid::new_v4();
        let form = FormState::restore(
            vec![
                input(None, "A", "1"),
                input(Some(shared), "B", "2"),
                input(Some(shared), "C", "3"),
            ],
            SettingsEntity::default(),
        );

        let ids: HashSet<_> = form.players().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), PLAYER_SLOTS);
        let names: Vec<_> = form.players().map(|(_, row)| row.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", ""]);
    }

    #[test]
    fn restore_ignores_rows_beyond_capacity() {
        let inputs = (0..6).map(|i| input(None, &format!("P{i}"), "0")).collect();
        let form = FormState::restore(inputs, SettingsEntity::default());
        assert_eq!(form.players().count(), PLAYER_SLOTS);
    }

    #[test]
    fn update_and_clear_scores() {
        let mut form = FormState::default();
        let id = form.players().next().unwrap().0;
        form.update_player(
            id,
            PlayerPatch {
                name: Some("A".into()),
                score: Some("1000".into()),
            },
        )
        .unwrap();
        form.update_player(
            id,
            PlayerPatch {
                score: Some("2000".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let (_, row) = form.players().next().unwrap();
        assert_eq!(row.name, "A");
        assert_eq!(row.score, "2000");

        form.clear_scores();
        let (_, row) = form.players().next().unwrap();
        assert_eq!(row.name, "A");
        assert!(row.score.is_empty());
    }

    #[test]
    fn update_unknown_row_fails() {
        let mut form = FormState::default();
        let stray = Uuid::new_v4();
        assert_eq!(
            form.update_player(stray, PlayerPatch::default()),
            Err(UnknownRow(stray))
        );
    }

    #[test]
    fn suggestions_skip_blank_and_duplicate_names() {
        let settings = SettingsEntity {
            users: vec![
                UserProfileEntity {
                    name: "A".into(),
                    id: "1".into(),
                },
                UserProfileEntity {
                    name: String::new(),
                    id: "2".into(),
                },
                UserProfileEntity {
                    name: "A".into(),
                    id: "3".into(),
                },
                UserProfileEntity {
                    name: "B".into(),
                    id: "4".into(),
                },
            ],
            rate: Some(RateEntity { point: 1000, yen: 100 }),
            ..Default::default()
        };
        let form = FormState::restore(Vec::new(), settings);
        assert_eq!(form.suggestions(), ["A", "B"]);
        assert_eq!(
            form.rate(),
            RateDraft {
                point: Some(1000),
                yen: Some(100)
            }
        );
    }
}
