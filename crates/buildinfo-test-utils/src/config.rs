//! Configuration builders for tests.

use buildinfo_config::BuildInfoConfig;

/// Fluent builder for [`BuildInfoConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .file_path("out/build-info.json")
///     .namespace("com.acme")
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: BuildInfoConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: BuildInfoConfig::default(),
        }
    }

    pub fn file_path(mut self, path: &str) -> Self {
        self.config.record.file_path = path.to_string();
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.config.labels.namespace = Some(namespace.to_string());
        self
    }

    pub fn git_bin(mut self, bin: &str) -> Self {
        self.config.git.bin = bin.to_string();
        self
    }

    pub fn repo_dir(mut self, dir: &str) -> Self {
        self.config.git.repo_dir = dir.to_string();
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> BuildInfoConfig {
        self.config
    }

    /// Render as TOML, for tests that go through a config file.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(&self.config).expect("config serializes to TOML")
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
