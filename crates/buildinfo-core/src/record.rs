//! The build metadata record.
//!
//! [`BuildMetadata`] is an insertion-ordered, flat JSON object. The six
//! well-known fields are seeded by [`BuildMetadata::seeded`]; callers may add
//! any number of extra fields, which survive persistence and label encoding
//! in their original order.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier of the build.
pub const BUILD_ID: &str = "buildId";
/// ISO-8601 creation instant.
pub const BUILD_TIMESTAMP: &str = "buildTimestamp";
/// Resolved build version.
pub const BUILD_VERSION: &str = "buildVersion";
/// Full commit identifier of the source revision.
pub const COMMIT_SHA: &str = "commitSha";
/// `clean` or `dirty`.
pub const COMMIT_STATUS: &str = "commitStatus";
/// First line of the commit message.
pub const COMMIT_TITLE: &str = "commitTitle";

/// Whether the working tree had uncommitted changes at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitStatus {
    Clean,
    Dirty,
}

impl CommitStatus {
    pub fn from_dirty(dirty: bool) -> Self {
        if dirty { Self::Dirty } else { Self::Clean }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
        }
    }

    /// Parse the persisted form. Anything other than `clean`/`dirty` is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "clean" => Some(Self::Clean),
            "dirty" => Some(Self::Dirty),
            _ => None,
        }
    }
}

impl fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CommitStatus> for Value {
    fn from(status: CommitStatus) -> Self {
        Value::String(status.as_str().to_string())
    }
}

/// A flat build metadata record.
///
/// Serializes transparently as a JSON object. Deserializing anything other
/// than an object fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildMetadata {
    fields: Map<String, Value>,
}

impl BuildMetadata {
    /// An empty record with no fields at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// A record seeded for creation at `created_at`: id and timestamp set,
    /// the four derivable fields present as `null` placeholders.
    pub fn seeded(created_at: DateTime<Utc>) -> Self {
        let mut record = Self::new();
        record.insert(BUILD_ID, created_at.timestamp_millis());
        record.insert(
            BUILD_TIMESTAMP,
            created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        record.insert(BUILD_VERSION, Value::Null);
        record.insert(COMMIT_SHA, Value::Null);
        record.insert(COMMIT_STATUS, Value::Null);
        record.insert(COMMIT_TITLE, Value::Null);
        record
    }

    /// Parse a record from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The value of `key` if it is a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Set `key`, keeping its position if already present and appending it
    /// otherwise. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Whether `key` still needs a value: missing, `null`, or an empty string.
    pub fn is_unset(&self, key: &str) -> bool {
        match self.fields.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    /// Merge `overrides` over the current fields in order. Existing keys are
    /// replaced in place; unknown keys are appended verbatim.
    pub fn overlay<I, K, V>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in overrides {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn build_id(&self) -> Option<&Value> {
        self.get(BUILD_ID)
    }

    pub fn build_timestamp(&self) -> Option<&str> {
        self.get_str(BUILD_TIMESTAMP)
    }

    pub fn build_version(&self) -> Option<&str> {
        self.get_str(BUILD_VERSION)
    }

    pub fn commit_sha(&self) -> Option<&str> {
        self.get_str(COMMIT_SHA)
    }

    pub fn commit_title(&self) -> Option<&str> {
        self.get_str(COMMIT_TITLE)
    }

    pub fn commit_status(&self) -> Option<CommitStatus> {
        self.get_str(COMMIT_STATUS).and_then(CommitStatus::parse)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for BuildMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        record.overlay(iter);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_seeded_field_order_and_placeholders() {
        let record = BuildMetadata::seeded(fixed_instant());
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(
            keys,
            vec![
                BUILD_ID,
                BUILD_TIMESTAMP,
                BUILD_VERSION,
                COMMIT_SHA,
                COMMIT_STATUS,
                COMMIT_TITLE
            ]
        );
        assert_eq!(record.build_id(), Some(&json!(1_714_564_800_000_i64)));
        assert_eq!(record.build_timestamp(), Some("2024-05-01T12:00:00.000Z"));
        assert!(record.is_unset(BUILD_VERSION));
        assert!(record.is_unset(COMMIT_SHA));
    }

    #[test]
    fn test_overlay_replaces_in_place_and_appends_new_keys() {
        let mut record = BuildMetadata::seeded(fixed_instant());
        record.overlay([("pipeline", "nightly"), (COMMIT_SHA, "abc123")]);

        assert_eq!(record.commit_sha(), Some("abc123"));
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys[3], COMMIT_SHA);
        assert_eq!(keys.last(), Some(&"pipeline"));
    }

    #[test]
    fn test_is_unset_treats_empty_string_as_missing() {
        let record: BuildMetadata = [
            ("a", json!("")),
            ("b", json!(null)),
            ("c", json!("x")),
            ("d", json!(0)),
        ]
        .into_iter()
        .collect();
        assert!(record.is_unset("a"));
        assert!(record.is_unset("b"));
        assert!(!record.is_unset("c"));
        assert!(!record.is_unset("d"));
        assert!(record.is_unset("missing"));
    }

    #[test]
    fn test_json_rejects_non_object() {
        assert!(BuildMetadata::from_json(b"[1, 2, 3]").is_err());
        assert!(BuildMetadata::from_json(b"\"text\"").is_err());
        assert!(BuildMetadata::from_json(b"{").is_err());
    }

    #[test]
    fn test_pretty_json_preserves_key_order() {
        let record: BuildMetadata = [("zeta", json!(1)), ("alpha", json!(null))]
            .into_iter()
            .collect();
        let text = record.to_json_pretty().unwrap();
        assert_eq!(text, "{\n  \"zeta\": 1,\n  \"alpha\": null\n}");
        assert_eq!(BuildMetadata::from_json(text.as_bytes()).unwrap(), record);
    }

    #[test]
    fn test_commit_status_accessor() {
        let mut record = BuildMetadata::new();
        assert_eq!(record.commit_status(), None);
        record.insert(COMMIT_STATUS, CommitStatus::Dirty);
        assert_eq!(record.commit_status(), Some(CommitStatus::Dirty));
        record.insert(COMMIT_STATUS, "unknown");
        assert_eq!(record.commit_status(), None);
    }
}
