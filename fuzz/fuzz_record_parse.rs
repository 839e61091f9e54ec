//! Fuzz target for parsing persisted build records.
//!
//! Run with: cargo +nightly fuzz run fuzz_record_parse
//!
//! Feeds arbitrary bytes to `BuildMetadata::from_json`, and re-encodes any
//! record that parses, to find panics in parsing or label projection.

#![no_main]

use buildinfo_core::{BuildMetadata, LabelCodec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = BuildMetadata::from_json(data) {
        let _ = record.to_json_pretty();
        let _ = LabelCodec::default().docker_args(&record);
    }
});
