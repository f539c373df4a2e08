//! ## Crate layout
//! - `build`: build-script discovery and registry codegen.
//! - `config`: the optional `plugweave.toml` read by `build`.
//! - `core`: plugin contracts, registrations and the minimal host.
//!
//! A crate declaring plugins calls `plugweave::build!()` from its `build.rs`
//! and `plugweave::start!()` once in its `lib.rs`; the host then reads
//! `PluginRegistry::registrations()`.

pub use plugweave_build as build;
pub use plugweave_config_build as config;
pub use plugweave_core as core;

// contracts are usable as `plugweave::Plugin` without the prelude
pub use plugweave_core::{Plugin, PluginError, ServiceCollection, ServiceRegistrar};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use plugweave_build::build;
pub use plugweave_core::start;

///
/// Prelude
/// the contracts a plugin crate implements, plus the host
///

pub mod prelude {
    pub use crate::core::{PluginHost, prelude::*};
}
