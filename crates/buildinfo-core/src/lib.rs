#![deny(unsafe_code)]

//! Build metadata records for CI/CD pipelines.
//!
//! A [`BuildMetadata`] record captures the version, commit, and dirty state of
//! a source tree at build time. The [`BuildInfoManager`] creates records
//! (filling gaps from git via the [`Derivation`] capability), persists them
//! as JSON, and loads them back. The [`LabelCodec`] projects a record onto
//! namespaced container image labels and reconstructs a record from labels
//! read off a built image.

use std::path::PathBuf;

/// Git-backed derivation of version and commit facts.
pub mod git;
/// Namespaced container label encoding and decoding.
pub mod labels;
/// Record creation, persistence, and version derivation.
pub mod manager;
/// The build metadata record type.
pub mod record;
/// Byte storage for persisted records.
pub mod store;

pub use git::{Derivation, GitCli, GitError};
pub use labels::{LABEL_NAMESPACE, LabelCodec};
pub use manager::BuildInfoManager;
pub use record::{BuildMetadata, CommitStatus};
pub use store::{FsStore, RecordStore};

/// Default location of the persisted record, relative to the working directory.
pub const DEFAULT_FILE_PATH: &str = "./build-info.json";

/// Separator placed between a version base and its suffix.
pub const VERSION_SUFFIX_SEPARATOR: &str = "__";

/// Errors produced while creating, loading, or deriving build metadata.
#[derive(Debug, thiserror::Error)]
pub enum BuildInfoError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("build info at {path} is not a valid JSON object: {source}")]
    CorruptRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to derive version base: no base given and no reachable git tag")]
    VersionUnresolved,

    #[error(transparent)]
    Derivation(#[from] GitError),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize build info: {0}")]
    Serialize(#[source] serde_json::Error),
}
