//! Creating, persisting, and loading build records.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::git::Derivation;
use crate::record::{
    BUILD_VERSION, BuildMetadata, COMMIT_SHA, COMMIT_STATUS, COMMIT_TITLE, CommitStatus,
};
use crate::store::{FsStore, RecordStore};
use crate::{BuildInfoError, VERSION_SUFFIX_SEPARATOR};

/// Builds records from overrides plus derived facts, and moves them in and
/// out of a [`RecordStore`].
///
/// Not synchronized: concurrent `create` calls against the same path race
/// and the last writer wins.
#[derive(Debug, Clone)]
pub struct BuildInfoManager<D, S = FsStore> {
    derivation: D,
    store: S,
}

impl<D: Derivation> BuildInfoManager<D, FsStore> {
    /// A manager persisting to the local filesystem.
    pub fn new(derivation: D) -> Self {
        Self::with_store(derivation, FsStore)
    }
}

impl<D: Derivation, S: RecordStore> BuildInfoManager<D, S> {
    pub fn with_store(derivation: D, store: S) -> Self {
        Self { derivation, store }
    }

    pub fn derivation(&self) -> &D {
        &self.derivation
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a record stamped with the current instant and write it to
    /// `path`. See [`BuildInfoManager::create_at`].
    pub fn create<I, K, V>(&self, overrides: I, path: &Path) -> Result<BuildMetadata, BuildInfoError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.create_at(Utc::now(), overrides, path)
    }

    /// Create a record stamped with `created_at` and write it to `path`.
    ///
    /// `overrides` are merged over the seeded record. Each derivable field
    /// left unset afterwards is filled from the [`Derivation`]; supplied
    /// values are never queried or replaced. Nothing is written unless the
    /// whole record was assembled.
    pub fn create_at<I, K, V>(
        &self,
        created_at: DateTime<Utc>,
        overrides: I,
        path: &Path,
    ) -> Result<BuildMetadata, BuildInfoError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        if path.as_os_str().is_empty() {
            return Err(BuildInfoError::Configuration(format!(
                "a file path is required, e.g. \"{}\"",
                crate::DEFAULT_FILE_PATH
            )));
        }

        let mut record = BuildMetadata::seeded(created_at);
        record.overlay(overrides);

        if record.is_unset(BUILD_VERSION) {
            debug!("Deriving buildVersion locally");
            let version = self.determine_build_version(None, None)?;
            record.insert(BUILD_VERSION, version);
        }

        if record.is_unset(COMMIT_SHA) {
            debug!("Deriving commitSha locally");
            record.insert(COMMIT_SHA, self.derivation.commit_id()?);
        }

        if record.is_unset(COMMIT_TITLE) {
            debug!("Deriving commitTitle locally");
            let title = self
                .derivation
                .commit_message()?
                .and_then(|message| message.lines().next().map(str::to_string));
            record.insert(COMMIT_TITLE, title.map_or(Value::Null, Value::String));
        }

        if record.is_unset(COMMIT_STATUS) {
            debug!("Deriving commitStatus locally");
            let status = CommitStatus::from_dirty(self.derivation.is_dirty()?);
            record.insert(COMMIT_STATUS, status);
        }

        let json = record.to_json_pretty().map_err(BuildInfoError::Serialize)?;
        self.store
            .write_creating_dirs(path, json.as_bytes())
            .map_err(|source| BuildInfoError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), fields = record.len(), "Created build info");

        Ok(record)
    }

    /// Load the record at `path`.
    ///
    /// Returns `Ok(None)` when nothing is stored there. Nothing is derived;
    /// the stored `buildId` and `buildTimestamp` come back untouched.
    pub fn load(&self, path: &Path) -> Result<Option<BuildMetadata>, BuildInfoError> {
        debug!(path = %path.display(), "Reading build info");

        let Some(bytes) = self.store.read(path).map_err(|source| BuildInfoError::Io {
            path: path.to_path_buf(),
            source,
        })?
        else {
            debug!(path = %path.display(), "No build info found");
            return Ok(None);
        };

        BuildMetadata::from_json(&bytes)
            .map(Some)
            .map_err(|source| BuildInfoError::CorruptRecord {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Resolve a version string.
    ///
    /// `base` is used verbatim when non-empty; otherwise the nearest tag
    /// description is asked for, and its absence is
    /// [`BuildInfoError::VersionUnresolved`]. A non-empty `suffix` is joined
    /// as `"<base>__<suffix>"`.
    pub fn determine_build_version(
        &self,
        base: Option<&str>,
        suffix: Option<&str>,
    ) -> Result<String, BuildInfoError> {
        let mut version = match base.filter(|b| !b.is_empty()) {
            Some(base) => base.to_string(),
            None => {
                debug!("Deriving version base locally");
                self.derivation
                    .describe_tags()?
                    .filter(|tag| !tag.is_empty())
                    .ok_or(BuildInfoError::VersionUnresolved)?
            }
        };

        if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
            version.push_str(VERSION_SUFFIX_SEPARATOR);
            version.push_str(suffix);
        }

        Ok(version)
    }
}
