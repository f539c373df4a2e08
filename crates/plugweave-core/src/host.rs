use crate::{
    error::PluginError,
    registration::{PluginRegistration, PluginSource},
    service::ServiceCollection,
};
use std::collections::BTreeSet;

///
/// NavigationEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NavigationEntry {
    pub plugin_id: String,
    pub route: &'static str,
    pub display_name: &'static str,
    pub order: i32,
}

///
/// PluginHost
///
/// Minimal consumer of generated registrations: checks ids, runs each
/// plugin's `initialize`, then its service registration hook.
///

#[derive(Debug, Default)]
pub struct PluginHost {
    registrations: Vec<PluginRegistration>,
}

impl PluginHost {
    #[must_use]
    pub const fn new(registrations: Vec<PluginRegistration>) -> Self {
        Self { registrations }
    }

    /// Build a host from a generated `PluginSource`.
    #[must_use]
    pub fn from_source<S: PluginSource>() -> Self {
        Self::new(S::registrations())
    }

    #[must_use]
    pub fn registrations(&self) -> &[PluginRegistration] {
        &self.registrations
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PluginRegistration> {
        self.registrations.iter().find(|r| r.id == id)
    }

    /// Initialize every plugin in registration order and collect the services
    /// registered by those that implement `ServiceRegistrar`.
    pub fn start(&self) -> Result<ServiceCollection, PluginError> {
        let mut seen = BTreeSet::new();
        for reg in &self.registrations {
            if !seen.insert(reg.id.as_str()) {
                return Err(PluginError::DuplicateId(reg.id.clone()));
            }
        }

        for reg in &self.registrations {
            reg.plugin.initialize()?;
        }

        let mut services = ServiceCollection::new();
        for registrar in self
            .registrations
            .iter()
            .filter_map(|reg| reg.service_registrar.as_ref())
        {
            registrar.register_services(&mut services);
        }

        Ok(services)
    }

    /// Visible components across all plugins, ordered by (order, display name).
    #[must_use]
    pub fn navigation(&self) -> Vec<NavigationEntry> {
        let mut entries: Vec<_> = self
            .registrations
            .iter()
            .flat_map(|reg| {
                reg.components
                    .iter()
                    .filter(|c| c.show_in_navigation)
                    .map(|c| NavigationEntry {
                        plugin_id: reg.id.clone(),
                        route: c.route,
                        display_name: c.display_name,
                        order: c.order,
                    })
            })
            .collect();

        entries.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.display_name.cmp(b.display_name))
                .then_with(|| a.route.cmp(b.route))
        });

        entries
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        plugin::{ModuleHandle, Plugin, ServiceRegistrar},
        registration::ComponentInfo,
    };
    use std::sync::Arc;

    #[derive(Default)]
    struct Weather;

    impl Plugin for Weather {
        fn id(&self) -> &str {
            "weather"
        }

        fn name(&self) -> &str {
            "Weather"
        }

        fn version(&self) -> &str {
            "0.1.0"
        }
    }

    impl ServiceRegistrar for Weather {
        fn register_services(&self, services: &mut ServiceCollection) {
            services.insert(String::from("forecast"));
        }
    }

    #[derive(Default)]
    struct Broken;

    impl Plugin for Broken {
        fn id(&self) -> &str {
            "broken"
        }

        fn name(&self) -> &str {
            "Broken"
        }

        fn version(&self) -> &str {
            "0.0.1"
        }

        fn initialize(&self) -> Result<(), PluginError> {
            Err(PluginError::initialize(self.id(), "missing config"))
        }
    }

    const fn component(route: &'static str, name: &'static str, order: i32) -> ComponentInfo {
        ComponentInfo {
            type_name: "Pages::Page",
            route,
            display_name: name,
            order,
            show_in_navigation: true,
        }
    }

    fn weather(components: Vec<ComponentInfo>) -> PluginRegistration {
        let plugin = Arc::new(Weather);

        PluginRegistration {
            id: plugin.id().to_string(),
            name: plugin.name().to_string(),
            version: plugin.version().to_string(),
            description: plugin.description().to_string(),
            module: ModuleHandle::of::<Weather>(),
            plugin: plugin.clone(),
            service_registrar: Some(plugin),
            components,
        }
    }

    fn broken() -> PluginRegistration {
        let plugin = Arc::new(Broken);

        PluginRegistration {
            id: plugin.id().to_string(),
            name: plugin.name().to_string(),
            version: plugin.version().to_string(),
            description: String::new(),
            module: plugin.module(),
            plugin,
            service_registrar: None,
            components: Vec::new(),
        }
    }

    #[test]
    fn start_runs_service_registration() {
        let host = PluginHost::new(vec![weather(Vec::new())]);
        let services = host.start().expect("start should succeed");

        let registered = services.get::<String>();
        assert_eq!(registered.as_deref().map(String::as_str), Some("forecast"));
    }

    #[test]
    fn start_propagates_initialize_failure() {
        let host = PluginHost::new(vec![weather(Vec::new()), broken()]);
        let err = host.start().unwrap_err();

        let PluginError::Initialize { id, .. } = err else {
            panic!("expected an initialize failure, got {err:?}");
        };
        assert_eq!(id, "broken");
    }

    #[test]
    fn start_rejects_duplicate_ids() {
        let host = PluginHost::new(vec![weather(Vec::new()), weather(Vec::new())]);

        let err = host.start().unwrap_err();
        let PluginError::DuplicateId(id) = err else {
            panic!("expected a duplicate id, got {err:?}");
        };
        assert_eq!(id, "weather");
    }

    #[test]
    fn navigation_is_sorted_and_filters_hidden() {
        let mut hidden = component("/admin", "Admin", 0);
        hidden.show_in_navigation = false;

        let host = PluginHost::new(vec![weather(vec![
            component("/b", "Beta", 100),
            hidden,
            component("/a", "Alpha", 100),
            component("/home", "Home", 1),
        ])]);

        let routes: Vec<_> = host.navigation().iter().map(|e| e.route).collect();
        assert_eq!(routes, vec!["/home", "/a", "/b"]);
        let weather = host.get("weather").expect("weather is registered");
        assert!(weather.component("/admin").is_some());
    }
}
