//! Compile-time metadata about the `buildinfo` binary itself.

/// Version text for `--version`: crate version, short git hash, and build
/// profile, e.g. `"0.1.0 (abc1234, release)"`.
pub const VERSION_STRING: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILDINFO_GIT_HASH"),
    ", ",
    env!("BUILDINFO_BUILD_PROFILE"),
    ")"
);
