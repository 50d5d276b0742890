//! Livestream event and account payloads.

use crate::livestream_api::types::{
    Logo, id_from_number_or_string, optional_id, tags_from_list_or_csv,
};
use serde::{Deserialize, Serialize};

/// An event is Livestream's container for one live broadcast and the videos posted to it.
///
/// See: <https://livestream.com/developers/docs/api/#event-object>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub owner_account_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<Logo>,
    /// Whether the event is broadcasting right now.
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "tags_from_list_or_csv")]
    pub tags: Vec<String>,
}

/// An account visible to an API key.
///
/// See: <https://livestream.com/developers/docs/api/#account-object>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub picture: Option<Logo>,
}
