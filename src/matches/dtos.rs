use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{DRIVER_SLOTS, MatchFields, MatchRow, SNACK_SLOTS};

/// Longest accepted game key; keys are short opaque codes, not prose.
const MAX_KEY_LEN: usize = 64;

/// Wire shape of a match record (camelCase). Used both as upsert input and
/// as the list response value; every field is optional on input and
/// defaulted, so a partial payload fully replaces the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MatchData {
    pub club: String,
    pub address: String,
    pub time: String,
    pub location: String,
    pub jersey_parent: String,
    pub drivers: Vec<String>,
    pub snack_parents: Vec<String>,
    pub attendance: BTreeMap<String, String>,
}

impl Default for MatchData {
    fn default() -> Self {
        Self {
            club: String::new(),
            address: String::new(),
            time: String::new(),
            location: String::new(),
            jersey_parent: String::new(),
            drivers: vec![String::new(); DRIVER_SLOTS],
            snack_parents: vec![String::new(); SNACK_SLOTS],
            attendance: BTreeMap::new(),
        }
    }
}

impl MatchData {
    /// Pad or truncate the driver/snack slots to their fixed sizes.
    pub fn normalized(mut self) -> Self {
        self.drivers.resize(DRIVER_SLOTS, String::new());
        self.snack_parents.resize(SNACK_SLOTS, String::new());
        self
    }

    /// Normalized persistence form.
    pub fn into_fields(self) -> MatchFields {
        let data = self.normalized();
        MatchFields {
            club: data.club,
            address: data.address,
            time: data.time,
            location: data.location,
            jersey_parent: data.jersey_parent,
            drivers: data.drivers,
            snack_parents: data.snack_parents,
            attendance: data.attendance,
        }
    }
}

impl From<MatchRow> for MatchData {
    /// Row-to-wire mapping. NULL or malformed JSONB columns read back as the
    /// documented defaults rather than failing the whole listing.
    fn from(row: MatchRow) -> Self {
        let drivers = row
            .drivers
            .and_then(|v| serde_json::from_value(v.0).ok())
            .unwrap_or_else(|| vec![String::new(); DRIVER_SLOTS]);
        let snack_parents = row
            .snack_parents
            .and_then(|v| serde_json::from_value(v.0).ok())
            .unwrap_or_else(|| vec![String::new(); SNACK_SLOTS]);
        let attendance = row
            .attendance
            .and_then(|v| serde_json::from_value(v.0).ok())
            .unwrap_or_default();
        Self {
            club: row.club.unwrap_or_default(),
            address: row.address.unwrap_or_default(),
            time: row.time.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
            jersey_parent: row.jersey_parent.unwrap_or_default(),
            drivers,
            snack_parents,
            attendance,
        }
        .normalized()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpsertMatchRequest {
    #[serde(default)]
    pub key: String,
    pub match_data: Option<MatchData>,
}

impl UpsertMatchRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.key.trim().is_empty() || self.match_data.is_none() {
            return Err("Missing key or matchData".to_string());
        }
        if self.key.len() > MAX_KEY_LEN {
            return Err("Key too long".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListMatchesResponse {
    pub matches: BTreeMap<String, MatchData>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearResponse {
    pub success: bool,
    pub deleted: u64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    pub success: bool,
    pub created: bool,
    pub columns_added: Vec<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use sqlx::types::Json;

    fn row(drivers: Option<serde_json::Value>) -> MatchRow {
        MatchRow {
            id: 1,
            game_key: "g1".to_string(),
            club: None,
            address: None,
            time: None,
            location: None,
            jersey_parent: None,
            drivers: drivers.map(Json),
            snack_parents: None,
            attendance: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_payload_gets_all_defaults() {
        let data: MatchData = serde_json::from_value(json!({})).unwrap();
        assert_eq!(data.club, "");
        assert_eq!(data.drivers, vec!["", "", ""]);
        assert_eq!(data.snack_parents, vec!["", ""]);
        assert!(data.attendance.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<MatchData, _> =
            serde_json::from_value(json!({"club": "OC Cesson", "coach": "nope"}));
        assert!(result.is_err());
    }

    #[test]
    fn camel_case_renames_apply() {
        let data: MatchData = serde_json::from_value(json!({
            "jerseyParent": "Marie",
            "snackParents": ["Paul"]
        }))
        .unwrap();
        assert_eq!(data.jersey_parent, "Marie");
        assert_eq!(data.snack_parents, vec!["Paul"]);
    }

    #[test]
    fn normalized_pads_and_truncates_slots() {
        let data = MatchData {
            drivers: vec!["Alice".to_string()],
            snack_parents: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        }
        .normalized();
        assert_eq!(data.drivers, vec!["Alice", "", ""]);
        assert_eq!(data.snack_parents, vec!["a", "b"]);
    }

    #[test]
    fn null_jsonb_columns_read_back_as_defaults() {
        let data = MatchData::from(row(None));
        assert_eq!(data.drivers, vec!["", "", ""]);
        assert_eq!(data.snack_parents, vec!["", ""]);
        assert!(data.attendance.is_empty());
    }

    #[test]
    fn malformed_jsonb_reads_back_as_defaults() {
        let data = MatchData::from(row(Some(json!({"not": "a list"}))));
        assert_eq!(data.drivers, vec!["", "", ""]);
    }

    #[test]
    fn stored_drivers_survive_round_trip() {
        let data = MatchData::from(row(Some(json!(["Alice", "", ""]))));
        assert_eq!(data.drivers, vec!["Alice", "", ""]);
    }

    #[test]
    fn upsert_request_requires_key_and_data() {
        let missing_key: UpsertMatchRequest =
            serde_json::from_value(json!({"matchData": {}})).unwrap();
        assert!(missing_key.validate().is_err());

        let missing_data: UpsertMatchRequest =
            serde_json::from_value(json!({"key": "g1"})).unwrap();
        assert!(missing_data.validate().is_err());

        let blank_key: UpsertMatchRequest =
            serde_json::from_value(json!({"key": "   ", "matchData": {}})).unwrap();
        assert!(blank_key.validate().is_err());

        let valid: UpsertMatchRequest =
            serde_json::from_value(json!({"key": "g1", "matchData": {}})).unwrap();
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn overlong_key_is_rejected() {
        let request: UpsertMatchRequest = serde_json::from_value(json!({
            "key": "k".repeat(65),
            "matchData": {}
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
