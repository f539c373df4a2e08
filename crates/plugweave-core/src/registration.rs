use crate::plugin::{ModuleHandle, Plugin, ServiceRegistrar};
use std::{fmt, sync::Arc};

///
/// PluginSource
///
/// Fixed registration contract implemented by the generated `PluginRegistry`.
///

pub trait PluginSource {
    /// Every plugin of the module, in qualified type name order.
    fn registrations() -> Vec<PluginRegistration>;
}

///
/// ComponentInfo
///
/// One routable template component, as extracted at build time.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ComponentInfo {
    pub type_name: &'static str,
    pub route: &'static str,
    pub display_name: &'static str,
    pub order: i32,
    pub show_in_navigation: bool,
}

///
/// PluginRegistration
///
/// Identity fields are read from the plugin instance when the generated
/// factory runs, not captured at build time.
///

#[derive(Clone)]
pub struct PluginRegistration {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub module: ModuleHandle,
    pub plugin: Arc<dyn Plugin>,
    pub service_registrar: Option<Arc<dyn ServiceRegistrar>>,
    pub components: Vec<ComponentInfo>,
}

impl PluginRegistration {
    #[must_use]
    pub const fn has_service_registrar(&self) -> bool {
        self.service_registrar.is_some()
    }

    /// Look up a component by its route.
    #[must_use]
    pub fn component(&self, route: &str) -> Option<&ComponentInfo> {
        self.components.iter().find(|c| c.route == route)
    }
}

impl fmt::Debug for PluginRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("description", &self.description)
            .field("module", &self.module)
            .field("service_registrar", &self.has_service_registrar())
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}
