use crate::{
    diagnostic::{DiagnosticKind, Diagnostics},
    model::{CandidateComponent, CandidatePlugin, MergedRegistration, ModuleRegistrations},
};
use std::collections::BTreeMap;

/// Merge plugins with the components found in their module.
///
/// Discovery is plugin driven: a module without plugins produces nothing,
/// and every component of a module is attached to every plugin of that
/// module. Modules with more than one plugin are flagged, since nothing
/// records which plugin a component belongs to.
pub fn correlate(
    plugins: Vec<CandidatePlugin>,
    mut components: BTreeMap<String, Vec<CandidateComponent>>,
    diagnostics: &mut Diagnostics,
) -> Vec<ModuleRegistrations> {
    let mut by_module: BTreeMap<String, Vec<CandidatePlugin>> = BTreeMap::new();
    for plugin in plugins {
        by_module
            .entry(plugin.declaring_module_name.clone())
            .or_default()
            .push(plugin);
    }

    let mut modules = Vec::with_capacity(by_module.len());

    for (module_name, mut plugins) in by_module {
        plugins.sort();
        plugins.dedup_by(|a, b| a.qualified_type_name == b.qualified_type_name);

        let mut pool = components.remove(&module_name).unwrap_or_default();
        sort_components(&mut pool);

        if plugins.len() > 1 && !pool.is_empty() {
            let names: Vec<_> = plugins
                .iter()
                .map(|p| p.qualified_type_name.as_str())
                .collect();
            diagnostics.warn(
                DiagnosticKind::AmbiguousOwnership,
                &module_name,
                format!(
                    "{} plugins share {} component(s); each is registered with all of them: {}",
                    plugins.len(),
                    pool.len(),
                    names.join(", ")
                ),
            );
        }

        let registrations = plugins
            .into_iter()
            .map(|plugin| MergedRegistration {
                plugin,
                components: pool.clone(),
            })
            .collect();

        modules.push(ModuleRegistrations {
            module_name,
            registrations,
        });
    }

    for (module_name, orphans) in components {
        if !orphans.is_empty() {
            diagnostics.note(
                DiagnosticKind::OrphanComponents,
                module_name,
                format!(
                    "{} component(s) dropped; module declares no plugin",
                    orphans.len()
                ),
            );
        }
    }

    modules
}

// sort_components
// input order depends on file system walk order; emit order must not
fn sort_components(components: &mut [CandidateComponent]) {
    components.sort_by(|a, b| {
        a.qualified_type_name
            .cmp(&b.qualified_type_name)
            .then_with(|| a.route.cmp(&b.route))
            .then_with(|| a.display_name.cmp(&b.display_name))
            .then_with(|| a.order.cmp(&b.order))
            .then_with(|| a.show_in_navigation.cmp(&b.show_in_navigation))
    });
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(name: &str, module: &str) -> CandidatePlugin {
        CandidatePlugin {
            qualified_type_name: name.to_string(),
            declaring_module_name: module.to_string(),
            has_service_registrar: false,
        }
    }

    fn component(name: &str, route: &str) -> CandidateComponent {
        CandidateComponent {
            qualified_type_name: name.to_string(),
            route: route.to_string(),
            display_name: name.to_string(),
            order: 100,
            show_in_navigation: true,
        }
    }

    fn pool(
        module: &str,
        components: Vec<CandidateComponent>,
    ) -> BTreeMap<String, Vec<CandidateComponent>> {
        BTreeMap::from([(module.to_string(), components)])
    }

    #[test]
    fn two_plugins_each_get_all_three_components() {
        let mut diags = Diagnostics::new();
        let modules = correlate(
            vec![plugin("crate::B", "demo"), plugin("crate::A", "demo")],
            pool(
                "demo",
                vec![
                    component("Pages::C", "/c"),
                    component("Pages::A", "/a"),
                    component("Pages::B", "/b"),
                ],
            ),
            &mut diags,
        );

        assert_eq!(modules.len(), 1);
        let regs = &modules[0].registrations;
        assert_eq!(regs.len(), 2);
        assert_eq!(regs[0].plugin.qualified_type_name, "crate::A");
        assert_eq!(regs[1].plugin.qualified_type_name, "crate::B");

        for reg in regs {
            let routes: Vec<_> = reg.components.iter().map(|c| c.route.as_str()).collect();
            assert_eq!(routes, vec!["/a", "/b", "/c"]);
        }
        assert_eq!(diags.of_kind(DiagnosticKind::AmbiguousOwnership).count(), 1);
    }

    #[test]
    fn components_without_plugins_are_dropped() {
        let mut diags = Diagnostics::new();
        let modules = correlate(
            Vec::new(),
            pool("demo", vec![component("Pages::A", "/a")]),
            &mut diags,
        );

        assert!(modules.is_empty());
        assert_eq!(diags.of_kind(DiagnosticKind::OrphanComponents).count(), 1);
    }

    #[test]
    fn modules_do_not_share_components() {
        let mut diags = Diagnostics::new();
        let mut components = pool("one", vec![component("Pages::A", "/a")]);
        components.insert("two".to_string(), vec![component("Pages::B", "/b")]);

        let modules = correlate(
            vec![plugin("crate::X", "one"), plugin("crate::Y", "two")],
            components,
            &mut diags,
        );

        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].registrations[0].components[0].route, "/a");
        assert_eq!(modules[1].registrations[0].components[0].route, "/b");
        assert!(diags.is_empty());
    }

    #[test]
    fn single_plugin_without_components_is_kept() {
        let mut diags = Diagnostics::new();
        let solo = vec![plugin("crate::Solo", "demo")];
        let modules = correlate(solo, BTreeMap::new(), &mut diags);

        assert_eq!(modules[0].registrations.len(), 1);
        assert!(modules[0].registrations[0].components.is_empty());
        assert!(diags.is_empty());
    }
}
