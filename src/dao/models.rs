use std::collections::HashMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use uuid::Uuid;

use crate::dao::storage::{StorageError, StorageResult};

/// Values read from or written to a key/value store in one call.
pub type StoreEntries = HashMap<StoreKey, Value>;

/// Fixed set of keys understood by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Ordered list of player rows as last edited.
    MainInputs,
    /// URL of the remote settlement endpoint.
    EndpointUrl,
    /// Webhook relayed to the remote endpoint for result notifications.
    NotifyUrl,
    /// Configured user profiles.
    Users,
    /// Point to currency conversion rate last used for a settlement.
    Rate,
}

impl StoreKey {
    /// Every key, in storage order.
    pub const ALL: [StoreKey; 5] = [
        StoreKey::MainInputs,
        StoreKey::EndpointUrl,
        StoreKey::NotifyUrl,
        StoreKey::Users,
        StoreKey::Rate,
    ];

    /// Keys making up the settings record.
    pub const SETTINGS: [StoreKey; 4] = [
        StoreKey::EndpointUrl,
        StoreKey::NotifyUrl,
        StoreKey::Users,
        StoreKey::Rate,
    ];

    /// Name of the key inside the backing store.
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreKey::MainInputs => "mainInputs",
            StoreKey::EndpointUrl => "gasApiUrl",
            StoreKey::NotifyUrl => "webhookUrl",
            StoreKey::Users => "users",
            StoreKey::Rate => "rate",
        }
    }
}

/// Player row as persisted under [`StoreKey::MainInputs`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInputEntity {
    /// Stable identifier of the form row. Older records carry none and are matched by position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<Uuid>,
    /// Player name as typed.
    #[serde(default)]
    pub name: String,
    /// Raw score text; blank when the field was left empty.
    #[serde(default)]
    pub score: String,
}

/// User profile mapping a display name to an external identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfileEntity {
    /// Name typed on the form.
    pub name: String,
    /// Chat user id sent to the endpoint.
    pub id: String,
}

/// Conversion rate persisted under [`StoreKey::Rate`].
#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateEntity {
    /// Points per unit.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub point: i64,
    /// Yen per unit.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub yen: i64,
}

/// Aggregate settings record spread over the settings keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsEntity {
    /// Remote settlement endpoint.
    pub endpoint_url: String,
    /// Webhook forwarded with each settlement.
    pub notify_url: String,
    /// Configured name/id pairs.
    pub users: Vec<UserProfileEntity>,
    /// Last rate used by a validated settlement.
    pub rate: Option<RateEntity>,
}

impl SettingsEntity {
    /// Rebuild the settings record from the raw store entries; absent keys take their defaults.
    pub fn from_entries(entries: &StoreEntries) -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: decode(entries, StoreKey::EndpointUrl)?.unwrap_or_default(),
            notify_url: decode(entries, StoreKey::NotifyUrl)?.unwrap_or_default(),
            users: decode(entries, StoreKey::Users)?.unwrap_or_default(),
            rate: decode(entries, StoreKey::Rate)?,
        })
    }

    /// Entries written by an explicit settings save. The rate is owned by the settlement flow.
    pub fn profile_entries(&self) -> StoreEntries {
        StoreEntries::from([
            (
                StoreKey::EndpointUrl,
                Value::String(self.endpoint_url.clone()),
            ),
            (StoreKey::NotifyUrl, Value::String(self.notify_url.clone())),
            (StoreKey::Users, encode(&self.users)),
        ])
    }
}

/// Decode the list of persisted player rows.
pub fn decode_inputs(entries: &StoreEntries) -> StorageResult<Vec<PlayerInputEntity>> {
    Ok(decode(entries, StoreKey::MainInputs)?.unwrap_or_default())
}

/// Entry holding the given player rows.
pub fn inputs_entry(rows: &[PlayerInputEntity]) -> StoreEntries {
    StoreEntries::from([(StoreKey::MainInputs, encode(rows))])
}

/// Entry holding the given rate.
pub fn rate_entry(rate: RateEntity) -> StoreEntries {
    StoreEntries::from([(StoreKey::Rate, encode(&rate))])
}

fn decode<T>(entries: &StoreEntries, key: StoreKey) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
{
    match entries.get(&key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|source| StorageError::Malformed {
                key: key.as_str(),
                source,
            }),
    }
}

fn encode<T>(value: &T) -> Value
where
    T: ?Sized + Serialize,
{
    // Plain structs of strings and integers always serialise.
    serde_json::to_value(value).unwrap_or(Value::Null)
}
