//! Fuzz target for label decoding.
//!
//! Run with: cargo +nightly fuzz run fuzz_label_decode
//!
//! The first byte picks how much of the input is the namespace; the rest is
//! split on newlines into `key=value` labels.

#![no_main]

use buildinfo_core::LabelCodec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let split = (split as usize).min(text.len());
    if !text.is_char_boundary(split) {
        return;
    }
    let (namespace, body) = text.split_at(split);

    let codec = LabelCodec::new(Some(namespace));
    let labels = body
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()));

    // Every decoded field must re-encode under the same prefix
    let record = codec.decode(labels);
    for (key, _) in codec.labels(&record) {
        assert!(key.starts_with(codec.prefix()));
    }
});
