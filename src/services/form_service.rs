//! Keeps the in-memory form and the durable store in step. Reads come from the
//! mirror; every edit updates the mirror first and then writes through.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{
            RateEntity, SettingsEntity, StoreKey, UserProfileEntity, decode_inputs, inputs_entry,
            rate_entry,
        },
        storage::StorageResult,
    },
    dto::{
        form::{FormSnapshot, PlayerUpdateRequest, RateUpdateRequest},
        notification::{NotificationKind, NotificationView},
        settings::{SettingsInput, SettingsView},
    },
    error::ServiceError,
    state::{
        SharedState,
        form::{FormState, PlayerPatch, RateDraft},
    },
};

/// Message shown after an explicit settings save.
pub const SETTINGS_SAVED: &str = "Settings saved.";

/// Rebuild the form mirror from whatever the store currently holds.
pub async fn restore(state: &SharedState) -> StorageResult<()> {
    let entries = state.store().get(&StoreKey::ALL).await?;
    let inputs = decode_inputs(&entries)?;
    let settings = SettingsEntity::from_entries(&entries)?;
    debug!(
        rows = inputs.len(),
        users = settings.users.len(),
        "restoring form from store"
    );

    let restored = FormState::restore(inputs, settings);
    state.with_form_mut(|form| *form = restored).await;
    Ok(())
}

/// Write every player row, in display order, under the inputs key.
///
/// Concurrent saves are applied in turn, each with the rows current when its
/// turn comes.
pub async fn persist_inputs(state: &SharedState) -> StorageResult<()> {
    state
        .write_form(|form| inputs_entry(&form.player_entities()))
        .await
}

/// Everything the form currently displays.
pub async fn snapshot(state: &SharedState) -> FormSnapshot {
    let control = state.submit_control();
    let notification = state.notifications().current().map(NotificationView::from);
    state
        .read_form(|form| FormSnapshot::from_form(form, control, notification))
        .await
}

/// Apply an edit to one player row and save the rows.
///
/// A storage failure does not undo the edit; it is logged and shown as a warning.
pub async fn update_player(
    state: &SharedState,
    row_id: Uuid,
    request: PlayerUpdateRequest,
) -> Result<FormSnapshot, ServiceError> {
    let patch = PlayerPatch {
        name: request.name,
        score: request.score,
    };
    state
        .with_form_mut(|form| form.update_player(row_id, patch))
        .await?;

    if let Err(err) = persist_inputs(state).await {
        warn!(row_id = %row_id, error = %err, "failed to save player rows");
        state
            .notifications()
            .show(format!("Could not save inputs: {err}"), NotificationKind::Warning);
    }

    Ok(snapshot(state).await)
}

/// Replace the rate draft. The rate is only persisted by a successful validation.
pub async fn update_rate(state: &SharedState, request: RateUpdateRequest) -> FormSnapshot {
    let draft = RateDraft {
        point: request.point,
        yen: request.yen,
    };
    state.with_form_mut(|form| form.set_rate(draft)).await;
    snapshot(state).await
}

/// Toggle three-player mode.
pub async fn set_sanma(state: &SharedState, enabled: bool) -> FormSnapshot {
    state.with_form_mut(|form| form.set_sanma(enabled)).await;
    snapshot(state).await
}

/// Settings as currently mirrored.
pub async fn settings(state: &SharedState) -> SettingsView {
    state
        .read_form(|form| SettingsView::from(form.settings()))
        .await
}

/// Read the settings back from the store, bypassing the mirror.
pub async fn load_settings(state: &SharedState) -> StorageResult<SettingsEntity> {
    let entries = state.store().get(&StoreKey::SETTINGS).await?;
    SettingsEntity::from_entries(&entries)
}

/// Persist the endpoint, webhook and user profiles in one write, then refresh
/// the mirror and its name suggestions.
pub async fn persist_settings(
    state: &SharedState,
    input: SettingsInput,
) -> Result<SettingsView, ServiceError> {
    let users: Vec<UserProfileEntity> = input
        .users
        .into_iter()
        .map(|user| UserProfileEntity {
            name: user.name.trim().to_string(),
            id: user.id.trim().to_string(),
        })
        .filter(|user| !user.name.is_empty() && !user.id.is_empty())
        .collect();

    let rate = state.read_form(|form| form.settings().rate).await;
    let settings = SettingsEntity {
        endpoint_url: input.endpoint_url.trim().to_string(),
        notify_url: input.notify_url.trim().to_string(),
        users,
        rate,
    };

    state.store().set(settings.profile_entries()).await?;
    info!(users = settings.users.len(), "settings saved");

    let view = SettingsView::from(&settings);
    state.with_form_mut(|form| form.apply_settings(settings)).await;
    state
        .notifications()
        .show(SETTINGS_SAVED, NotificationKind::Success);
    Ok(view)
}

/// Remember `rate` as the last one used, in the mirror and in the store.
pub async fn persist_rate(state: &SharedState, rate: RateEntity) -> StorageResult<()> {
    state.with_form_mut(|form| form.remember_rate(rate)).await;
    state.store().set(rate_entry(rate)).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::BoxFuture;
    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            kv_store::{KeyValueStore, memory::MemoryStore},
            models::StoreEntries,
            settlement_gateway::{GatewayResult, SettlementGateway},
            storage::StorageError,
        },
        dto::{
            settings::UserProfileInput,
            settlement::{RemoteReply, SettlementRequest},
        },
        state::AppState,
    };

    struct UnusedGateway;

    impl SettlementGateway for UnusedGateway {
        fn submit(
            &self,
            _endpoint: &str,
            _request: &SettlementRequest,
        ) -> BoxFuture<'static, GatewayResult<RemoteReply>> {
            Box::pin(std::future::pending())
        }
    }

    /// Reads succeed from an inner memory store; every write fails.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, keys: &[StoreKey]) -> BoxFuture<'static, StorageResult<StoreEntries>> {
            self.0.get(keys)
        }

        fn set(&self, _entries: StoreEntries) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async {
                Err(StorageError::unavailable(
                    "disk full".into(),
                    std::io::Error::other("ENOSPC"),
                ))
            })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn state_with(store: Arc<dyn KeyValueStore>) -> SharedState {
        AppState::new(&AppConfig::default(), store, Arc::new(UnusedGateway))
    }

    fn profile(name: &str, id: &str) -> UserProfileInput {
        UserProfileInput {
            name: name.into(),
            id: id.into(),
        }
    }

    #[tokio::test]
    async fn settings_round_trip_through_restore() {
        let store = MemoryStore::new();
        let state = state_with(Arc::new(store.clone()));

        persist_settings(
            &state,
            SettingsInput {
                endpoint_url: " https://script.example.test/exec ".into(),
                notify_url: "https://hook.example.test".into(),
                users: vec![
                    profile(" A ", "1"),
                    profile("B", ""),
                    profile("", "3"),
                    profile("C", " 4 "),
                ],
            },
        )
        .await
        .unwrap();

        let restored = state_with(Arc::new(store));
        restore(&restored).await.unwrap();
        let settings = restored.read_form(|form| form.settings().clone()).await;
        assert_eq!(settings.endpoint_url, "https://script.example.test/exec");
        assert_eq!(settings.notify_url, "https://hook.example.test");
        assert_eq!(
            settings.users,
            vec![
                UserProfileEntity {
                    name: "A".into(),
                    id: "1".into()
                },
                UserProfileEntity {
                    name: "C".into(),
                    id: "4".into()
                },
            ]
        );
        let suggestions = restored.read_form(|form| form.suggestions().to_vec()).await;
        assert_eq!(suggestions, ["A", "C"]);
    }

    #[tokio::test]
    async fn settings_save_shows_success_and_keeps_rate() {
        let store = MemoryStore::with_entries(StoreEntries::from([(
            StoreKey::Rate,
            json!({ "point": 1000, "yen": 100 }),
        )]));
        let state = state_with(Arc::new(store.clone()));
        restore(&state).await.unwrap();

        persist_settings(&state, SettingsInput::default()).await.unwrap();

        let shown = state.notifications().current().unwrap();
        assert_eq!(shown.message, SETTINGS_SAVED);
        assert_eq!(shown.kind, Some(NotificationKind::Success));
        let loaded = load_settings(&state).await.unwrap();
        assert_eq!(loaded.rate, Some(RateEntity { point: 1000, yen: 100 }));
    }

    #[tokio::test]
    async fn persist_inputs_is_idempotent() {
        let store = MemoryStore::new();
        let state = state_with(Arc::new(store.clone()));
        let row_id = state.read_form(|form| form.players().next().unwrap().0).await;
        update_player(
            &state,
            row_id,
            PlayerUpdateRequest {
                name: Some("A".into()),
                score: Some("1000".into()),
            },
        )
        .await
        .unwrap();

        persist_inputs(&state).await.unwrap();
        let first = store.get(&[StoreKey::MainInputs]).await.unwrap();
        persist_inputs(&state).await.unwrap();
        let second = store.get(&[StoreKey::MainInputs]).await.unwrap();
        assert_eq!(first, second);

        let rows = decode_inputs(&second).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].row_id, Some(row_id));
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[0].score, "1000");
    }

    #[tokio::test]
    async fn edits_survive_a_restart() {
        let store = MemoryStore::new();
        let state = state_with(Arc::new(store.clone()));
        let ids: Vec<Uuid> = state
            .read_form(|form| form.players().map(|(id, _)| id).collect())
            .await;
        update_player(
            &state,
            ids[2],
            PlayerUpdateRequest {
                name: Some("C".into()),
                score: Some("-300".into()),
            },
        )
        .await
        .unwrap();

        let restarted = state_with(Arc::new(store));
        restore(&restarted).await.unwrap();
        let snapshot = snapshot(&restarted).await;
        let row = snapshot
            .players
            .iter()
            .find(|row| row.row_id == ids[2])
            .unwrap();
        assert_eq!(row.name, "C");
        assert_eq!(row.score, "-300");
    }

    #[tokio::test]
    async fn storage_failure_keeps_edit_and_warns() {
        let state = state_with(Arc::new(ReadOnlyStore(MemoryStore::new())));
        let row_id = state.read_form(|form| form.players().next().unwrap().0).await;

        let snapshot = update_player(
            &state,
            row_id,
            PlayerUpdateRequest {
                name: Some("A".into()),
                score: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(snapshot.players[0].name, "A");
        let shown = state.notifications().current().unwrap();
        assert_eq!(shown.kind, Some(NotificationKind::Warning));
    }

    #[tokio::test]
    async fn failed_settings_save_is_reported() {
        let state = state_with(Arc::new(ReadOnlyStore(MemoryStore::new())));
        let result = persist_settings(&state, SettingsInput::default()).await;
        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
        assert!(state.notifications().current().is_none());
    }

    #[tokio::test]
    async fn unknown_row_is_rejected() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let result = update_player(&state, Uuid::new_v4(), PlayerUpdateRequest::default()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn rate_draft_is_not_persisted_until_settlement() {
        let store = MemoryStore::new();
        let state = state_with(Arc::new(store.clone()));
        let snapshot = update_rate(
            &state,
            RateUpdateRequest {
                point: Some(1000),
                yen: Some(50),
            },
        )
        .await;
        assert_eq!(snapshot.rate.point, Some(1000));
        assert!(store.get(&[StoreKey::Rate]).await.unwrap().is_empty());

        persist_rate(&state, RateEntity { point: 1000, yen: 50 }).await.unwrap();
        assert_eq!(
            load_settings(&state).await.unwrap().rate,
            Some(RateEntity { point: 1000, yen: 50 })
        );
    }
}
