#![deny(unsafe_code)]

//! Shared test utilities for the buildinfo workspace.
//!
//! Provides a scripted [`Derivation`](buildinfo_core::Derivation), an
//! in-memory store, a throwaway git repository, config builders, and
//! tracing helpers so that individual crate tests stay concise.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! buildinfo-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod derivation;
pub mod repo;
pub mod store;
pub mod tracing_setup;
