//! Container label projection of a build record.
//!
//! Every record field becomes one label `<prefix><key>=<value>`, where the
//! prefix is an optional caller namespace followed by [`LABEL_NAMESPACE`]:
//!
//! ```text
//! --label "com.acme.buildinfo.commitSha=0123abc"
//! ```
//!
//! Encoding stringifies values, so decoding yields string fields only. The
//! round trip preserves keys and the string form of values, not JSON types.

use serde_json::Value;

use crate::record::BuildMetadata;

/// Fixed namespace segment under which record fields are labeled.
pub const LABEL_NAMESPACE: &str = "buildinfo";

/// Encodes records to labels and decodes them back under one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCodec {
    prefix: String,
}

impl LabelCodec {
    /// A codec for `namespace`. `None` or an empty namespace labels fields
    /// directly under [`LABEL_NAMESPACE`].
    pub fn new(namespace: Option<&str>) -> Self {
        let prefix = match namespace.filter(|ns| !ns.is_empty()) {
            Some(ns) => format!("{ns}.{LABEL_NAMESPACE}."),
            None => format!("{LABEL_NAMESPACE}."),
        };
        Self { prefix }
    }

    /// The full key prefix, including the trailing dot.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Label key/value pairs for every field, in record order.
    pub fn labels(&self, record: &BuildMetadata) -> Vec<(String, String)> {
        record
            .iter()
            .map(|(key, value)| (format!("{}{key}", self.prefix), stringify(value)))
            .collect()
    }

    /// One `--label "<key>=<value>"` token per field, each a single
    /// shell-safe argument.
    pub fn encode(&self, record: &BuildMetadata) -> Vec<String> {
        self.labels(record)
            .into_iter()
            .map(|(key, value)| format!("--label {}", quote(&format!("{key}={value}"))))
            .collect()
    }

    /// [`LabelCodec::encode`] joined by single spaces, ready to splice into a
    /// `docker build` command line.
    pub fn docker_args(&self, record: &BuildMetadata) -> String {
        self.encode(record).join(" ")
    }

    /// Rebuild a record from labels read off an artifact.
    ///
    /// Labels outside this codec's prefix belong to other tools and are
    /// skipped, as is a key equal to the bare prefix.
    pub fn decode<I, K, V>(&self, labels: I) -> BuildMetadata
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        labels
            .into_iter()
            .filter_map(|(key, value)| {
                let field = key.as_ref().strip_prefix(self.prefix.as_str())?;
                (!field.is_empty()).then(|| (field.to_string(), Value::String(value.into())))
            })
            .collect()
    }
}

impl Default for LabelCodec {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Plain string coercion: strings verbatim, `null` as `null`, scalars in
/// their textual form, nested values as compact JSON.
///
/// Floats with no fractional part below `1e21` print as integers and `-0.0`
/// prints as `0`, the way JavaScript's `String()` renders them.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f == 0.0 => "0".to_string(),
            Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Double-quote `s` with JSON string escaping.
fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
