use crate::{error::PluginError, service::ServiceCollection};
use std::fmt;

/// Default navigation order for components that declare none.
pub const DEFAULT_ORDER: i32 = 100;

/// Default navigation visibility for components that declare none.
pub const DEFAULT_SHOW_IN_NAVIGATION: bool = true;

///
/// Plugin
///
/// Capability contract for a build-time discovered plugin. Implementors must
/// also be `Default`; the generated registry constructs each plugin with
/// `Default::default()`.
///

pub trait Plugin: Send + Sync + 'static {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Called once by the host before any service registration.
    fn initialize(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Handle of the compiled unit that owns this plugin.
    fn module(&self) -> ModuleHandle
    where
        Self: Sized,
    {
        ModuleHandle::of::<Self>()
    }
}

///
/// ServiceRegistrar
///
/// Optional second capability; a plugin implementing it gets a chance to add
/// services after initialization.
///

pub trait ServiceRegistrar: Send + Sync + 'static {
    fn register_services(&self, services: &mut ServiceCollection);
}

///
/// ModuleHandle
///
/// Identifies the crate a plugin type was compiled into.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ModuleHandle {
    name: &'static str,
}

impl ModuleHandle {
    /// Handle for the crate that declares `T`, taken from its type path.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        let path = std::any::type_name::<T>();
        let name = path.split("::").next().unwrap_or(path);

        Self { name }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

///
/// ComponentMetadata
///
/// Navigation metadata a template may declare through
/// `@attribute [PluginComponent(...)]`. Absent fields take the defaults below.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComponentMetadata {
    pub display_name: Option<String>,
    pub order: i32,
    pub show_in_navigation: bool,
}

impl Default for ComponentMetadata {
    fn default() -> Self {
        Self {
            display_name: None,
            order: DEFAULT_ORDER,
            show_in_navigation: DEFAULT_SHOW_IN_NAVIGATION,
        }
    }
}
