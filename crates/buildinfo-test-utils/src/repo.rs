//! Throwaway git repositories for end-to-end tests.
//!
//! Tests that need a real repository should call [`git_available`] first and
//! return early when it is false, so the suite still passes on machines
//! without git.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Whether a usable `git` binary is on `PATH`.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// A git repository in a temp directory, deleted on drop.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Initialise an empty repository with a local identity.
    pub fn init() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "--quiet"]);
        repo.git(&["config", "user.name", "Build Bot"]);
        repo.git(&["config", "user.email", "build-bot@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "tag.gpgsign", "false"]);
        repo
    }

    /// A repository with one commit tagged `tag`.
    pub fn tagged(tag: &str, message: &str) -> Self {
        let repo = Self::init();
        repo.write("README.md", "hello\n");
        repo.commit(message);
        repo.git(&["tag", tag]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the repository root.
    pub fn write(&self, name: &str, contents: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create dirs");
        }
        std::fs::write(path, contents).expect("failed to write file");
    }

    /// Stage everything and commit.
    pub fn commit(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "--quiet", "-m", message]);
    }

    /// Full id of `HEAD`.
    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// Run git in the repository and return trimmed stdout; panics on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .expect("failed to run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}
