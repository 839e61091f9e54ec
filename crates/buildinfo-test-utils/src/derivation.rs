//! A scripted [`Derivation`] that records which queries were made.

use std::cell::RefCell;

use buildinfo_core::{Derivation, GitError};

/// Answers every query from canned values and logs each call by name.
///
/// # Example
///
/// ```ignore
/// let git = ScriptedDerivation::new()
///     .tag("v1.2.3")
///     .message("Add retries\n\nBody");
/// ```
#[derive(Debug)]
pub struct ScriptedDerivation {
    commit_id: String,
    message: Option<String>,
    tag: Option<String>,
    dirty: bool,
    not_a_repository: bool,
    calls: RefCell<Vec<&'static str>>,
}

impl ScriptedDerivation {
    /// A clean repository at a fixed commit with no tags and no message.
    pub fn new() -> Self {
        Self {
            commit_id: "4b825dc642cb6eb9a060e54bf8d69288fbee4904".to_string(),
            message: None,
            tag: None,
            dirty: false,
            not_a_repository: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every query fails as if run outside a repository.
    pub fn outside_repository() -> Self {
        Self {
            not_a_repository: true,
            ..Self::new()
        }
    }

    pub fn commit_id(mut self, id: &str) -> Self {
        self.commit_id = id.to_string();
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    /// Names of the queries made so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, name: &'static str) -> Result<(), GitError> {
        self.calls.borrow_mut().push(name);
        if self.not_a_repository {
            return Err(GitError::NotARepository { dir: ".".into() });
        }
        Ok(())
    }
}

impl Default for ScriptedDerivation {
    fn default() -> Self {
        Self::new()
    }
}

impl Derivation for ScriptedDerivation {
    fn commit_id(&self) -> Result<String, GitError> {
        self.record("commit_id")?;
        Ok(self.commit_id.clone())
    }

    fn commit_message(&self) -> Result<Option<String>, GitError> {
        self.record("commit_message")?;
        Ok(self.message.clone())
    }

    fn describe_tags(&self) -> Result<Option<String>, GitError> {
        self.record("describe_tags")?;
        Ok(self.tag.clone())
    }

    fn is_dirty(&self) -> Result<bool, GitError> {
        self.record("is_dirty")?;
        Ok(self.dirty)
    }
}
