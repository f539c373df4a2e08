//! ## Crate layout
//! - `plugin`: the capability contracts generated code binds to.
//! - `registration`: records produced by a generated `PluginRegistry`.
//! - `service`: the type-keyed collection handed to service registrars.
//! - `host`: a minimal consumer that initializes registrations in order.
//!
//! Nothing in this crate discovers anything at runtime; discovery happens in
//! `plugweave-build` and is replayed through `PluginSource::registrations`.

mod macros;

pub mod error;
pub mod host;
pub mod plugin;
pub mod registration;
pub mod service;

pub use error::PluginError;
pub use host::{NavigationEntry, PluginHost};
pub use plugin::{ComponentMetadata, ModuleHandle, Plugin, ServiceRegistrar};
pub use registration::{ComponentInfo, PluginRegistration, PluginSource};
pub use service::ServiceCollection;

///
/// Prelude
///
/// Glob-importing the prelude brings both contracts into scope; build-time
/// discovery accepts `use plugweave::prelude::*` as proof of the import.
///

pub mod prelude {
    pub use crate::{
        error::PluginError,
        plugin::{ComponentMetadata, ModuleHandle, Plugin, ServiceRegistrar},
        registration::{ComponentInfo, PluginRegistration, PluginSource},
        service::ServiceCollection,
    };
}
