//! Persisted check state
//!
//! The state file is a flat JSON object. Only the keys below are interpreted;
//! every other key is carried through load/save untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use packwatch_api::CheckStatus;

use crate::error::CoreError;

pub const LAST_CHECK_AT: &str = "last_check_at";
pub const LAST_STATUS: &str = "last_status";
pub const LOCAL_VERSION_ID: &str = "local_version_id";
pub const REMOTE_VERSION_ID: &str = "remote_version_id";
pub const REMOTE_VERSION_NUMBER: &str = "remote_version_number";
pub const LAST_NOTIFIED_VERSION_ID: &str = "last_notified_version_id";
pub const LAST_NOTIFIED_AT: &str = "last_notified_at";
pub const LAST_NOTIFIED_CONSOLE_AT: &str = "last_notified_minecraft_at";

/// Render a timestamp the way it is stored: UTC, whole seconds, `+00:00`
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse a stored timestamp
///
/// Accepts RFC 3339 with `Z` or a numeric offset. A timestamp without an
/// offset is read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// In-memory view of the state file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckState {
    entries: Map<String, Value>,
}

impl CheckState {
    /// Empty state, as on first run
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for any key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// String value for a key, `None` if absent or not a string
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Set a string value
    pub fn set_str(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .insert(key.to_string(), Value::String(value.into()));
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outcome of the last cycle
    #[must_use]
    pub fn last_status(&self) -> Option<CheckStatus> {
        self.get_str(LAST_STATUS).and_then(|s| s.parse().ok())
    }

    pub fn set_last_status(&mut self, status: CheckStatus) {
        self.set_str(LAST_STATUS, status.as_str());
    }

    pub fn set_last_check_at(&mut self, at: DateTime<Utc>) {
        self.set_str(LAST_CHECK_AT, format_timestamp(at));
    }

    /// Remote id an update notification was last attempted for
    #[must_use]
    pub fn last_notified_version_id(&self) -> Option<&str> {
        self.get_str(LAST_NOTIFIED_VERSION_ID)
    }

    /// Record a notification attempt for `version_id`
    pub fn mark_notified(&mut self, version_id: &str, at: DateTime<Utc>) {
        self.set_str(LAST_NOTIFIED_VERSION_ID, version_id);
        self.set_str(LAST_NOTIFIED_AT, format_timestamp(at));
    }

    /// Last successful in-game announcement, `None` if absent or unparsable
    #[must_use]
    pub fn last_notified_console_at(&self) -> Option<DateTime<Utc>> {
        self.get_str(LAST_NOTIFIED_CONSOLE_AT)
            .and_then(parse_timestamp)
    }

    pub fn set_last_notified_console_at(&mut self, at: DateTime<Utc>) {
        self.set_str(LAST_NOTIFIED_CONSOLE_AT, format_timestamp(at));
    }

    /// Record the versions compared in this cycle
    pub fn record_versions(&mut self, local_id: &str, remote_id: &str, remote_number: &str) {
        self.set_str(LOCAL_VERSION_ID, local_id);
        self.set_str(REMOTE_VERSION_ID, remote_id);
        self.set_str(REMOTE_VERSION_NUMBER, remote_number);
    }

    /// Parse state from JSON text
    ///
    /// Anything other than a JSON object is rejected.
    ///
    /// # Errors
    /// Returns `CoreError::State` if the text is not a JSON object
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(entries)) => Ok(Self { entries }),
            Ok(other) => Err(CoreError::State(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
            Err(e) => Err(CoreError::State(e.to_string())),
        }
    }

    /// Pretty JSON with keys in sorted order
    ///
    /// # Errors
    /// Returns `CoreError::State` if serialization fails
    pub fn to_json(&self) -> Result<String, CoreError> {
        let sorted: BTreeMap<&String, &Value> = self.entries.iter().collect();
        serde_json::to_string_pretty(&sorted).map_err(|e| CoreError::State(e.to_string()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// File-backed state store
///
/// One cycle loads the whole record, edits it and writes it back; the
/// scheduler never runs two cycles at once, so no locking is done here.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, falling back to empty if the file is missing or corrupt
    pub async fn load(&self) -> CheckState {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet");
                return CheckState::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file unreadable, starting empty");
                return CheckState::new();
            }
        };

        CheckState::from_json(&text).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "state file corrupt, starting empty");
            CheckState::new()
        })
    }

    /// Write the full state, creating parent directories as needed
    ///
    /// The file is replaced atomically via a sibling temporary file.
    ///
    /// # Errors
    /// Returns `CoreError::State` if the directory or file cannot be written
    pub async fn save(&self, state: &CheckState) -> Result<(), CoreError> {
        let json = state.to_json()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::State(format!("{}: {e}", parent.display())))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| CoreError::State(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CoreError::State(format!("{}: {e}", self.path.display())))?;

        debug!(path = %self.path.display(), keys = state.len(), "state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(format_timestamp(at), "2025-03-09T14:05:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap();

        assert_eq!(parse_timestamp("2025-03-09T14:05:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-09T14:05:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-09T16:05:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-09T14:05:00"), Some(expected));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(CheckState::from_json("[1, 2]").is_err());
        assert!(CheckState::from_json("{not json").is_err());
        assert!(CheckState::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn test_non_string_values_read_as_absent() {
        let state = CheckState::from_json(r#"{"last_notified_version_id": 42}"#).unwrap();
        assert_eq!(state.last_notified_version_id(), None);
        assert!(state.get(LAST_NOTIFIED_VERSION_ID).is_some());
    }

    #[test]
    fn test_to_json_sorted_and_indented() {
        let mut state = CheckState::new();
        state.set_str("zeta", "z");
        state.set_str("alpha", "a");

        assert_eq!(
            state.to_json().unwrap(),
            "{\n  \"alpha\": \"a\",\n  \"zeta\": \"z\"\n}"
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{{{").unwrap();

        let store = StateStore::new(path);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_parents_and_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.json");
        let store = StateStore::new(&path);

        let mut state = CheckState::from_json(r#"{"operator_note": {"pinned": true}}"#).unwrap();
        state.set_last_status(CheckStatus::UpToDate);
        store.save(&state).await.unwrap();

        let reloaded = store.load().await;
        assert_eq!(reloaded, state);
        assert_eq!(reloaded.last_status(), Some(CheckStatus::UpToDate));
        assert_eq!(
            reloaded.get("operator_note"),
            Some(&serde_json::json!({"pinned": true}))
        );
        assert!(!dir.path().join("nested/deeper/state.json.tmp").exists());
    }
}
