//! Version-control queries used to fill gaps in a build record.
//!
//! [`Derivation`] is the seam: the manager only ever asks for the four facts
//! below. [`GitCli`] answers them by shelling out to the `git` binary in a
//! repository directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Errors from invoking git.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{dir} is not a git repository")]
    NotARepository { dir: PathBuf },

    #[error("git {command} failed: {stderr}")]
    Command { command: String, stderr: String },
}

/// Answers version-control questions about the working tree.
///
/// Empty answers are reported as `None`. Errors are reserved for total
/// failures such as a missing git binary or a directory outside any
/// repository.
pub trait Derivation {
    /// Full identifier of the `HEAD` commit.
    fn commit_id(&self) -> Result<String, GitError>;

    /// Full message of the last commit, if there is one.
    fn commit_message(&self) -> Result<Option<String>, GitError>;

    /// Nearest reachable tag description, with a dirty marker when the
    /// working tree has uncommitted changes.
    fn describe_tags(&self) -> Result<Option<String>, GitError>;

    /// Whether the working tree has uncommitted changes.
    fn is_dirty(&self) -> Result<bool, GitError>;
}

impl<T: Derivation + ?Sized> Derivation for &T {
    fn commit_id(&self) -> Result<String, GitError> {
        (**self).commit_id()
    }

    fn commit_message(&self) -> Result<Option<String>, GitError> {
        (**self).commit_message()
    }

    fn describe_tags(&self) -> Result<Option<String>, GitError> {
        (**self).describe_tags()
    }

    fn is_dirty(&self) -> Result<bool, GitError> {
        (**self).is_dirty()
    }
}

/// [`Derivation`] backed by the `git` command-line tool.
#[derive(Debug, Clone)]
pub struct GitCli {
    bin: PathBuf,
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(bin: impl Into<PathBuf>, repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            repo_dir: repo_dir.into(),
        }
    }

    /// Use `git` from `PATH` against `repo_dir`.
    pub fn in_dir(repo_dir: impl Into<PathBuf>) -> Self {
        Self::new("git", repo_dir)
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Run git with `args`, returning trimmed stdout or `None` when empty.
    fn run(&self, args: &[&str]) -> Result<Option<String>, GitError> {
        debug!(bin = %self.bin.display(), dir = %self.repo_dir.display(), ?args, "Running git");

        let output = Command::new(&self.bin)
            .args(args)
            .current_dir(&self.repo_dir)
            .env("LC_ALL", "C")
            .env_remove("LANGUAGE")
            .output()
            .map_err(|source| GitError::Spawn {
                bin: self.bin.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("not a git repository") {
                return Err(GitError::NotARepository {
                    dir: self.repo_dir.clone(),
                });
            }
            return Err(GitError::Command {
                command: args.join(" "),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!stdout.is_empty()).then_some(stdout))
    }

    /// Like [`GitCli::run`], but a failing command inside a repository is an
    /// empty answer rather than an error.
    fn run_soft(&self, args: &[&str]) -> Result<Option<String>, GitError> {
        match self.run(args) {
            Err(GitError::Command { command, stderr }) => {
                debug!(%command, %stderr, "git query returned no value");
                Ok(None)
            }
            other => other,
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl Derivation for GitCli {
    fn commit_id(&self) -> Result<String, GitError> {
        self.run(&["rev-parse", "HEAD"])?
            .ok_or_else(|| GitError::Command {
                command: "rev-parse HEAD".to_string(),
                stderr: "empty output".to_string(),
            })
    }

    fn commit_message(&self) -> Result<Option<String>, GitError> {
        self.run_soft(&["log", "-1", "--pretty=%B"])
    }

    fn describe_tags(&self) -> Result<Option<String>, GitError> {
        self.run_soft(&["describe", "--tags", "--dirty"])
    }

    fn is_dirty(&self) -> Result<bool, GitError> {
        Ok(self.run(&["status", "--porcelain"])?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let git = GitCli::new("/nonexistent/definitely-not-git", ".");
        let err = git.commit_id().unwrap_err();
        assert!(matches!(err, GitError::Spawn { .. }), "got {err:?}");
    }

    #[test]
    fn test_missing_binary_is_not_softened() {
        let git = GitCli::new("/nonexistent/definitely-not-git", ".");
        assert!(git.describe_tags().is_err());
        assert!(git.commit_message().is_err());
    }

    #[test]
    fn test_outside_repository_is_not_softened() {
        let available = Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success());
        if !available {
            return;
        }
        let dir = tempfile::TempDir::new().unwrap();
        let git = GitCli::in_dir(dir.path());

        // Recognised regardless of the caller's locale
        let err = git.describe_tags().unwrap_err();
        assert!(matches!(err, GitError::NotARepository { .. }), "got {err:?}");
        let err = git.commit_message().unwrap_err();
        assert!(matches!(err, GitError::NotARepository { .. }), "got {err:?}");
    }

    #[test]
    fn test_default_runs_in_current_dir() {
        let git = GitCli::default();
        assert_eq!(git.repo_dir(), Path::new("."));
    }
}
