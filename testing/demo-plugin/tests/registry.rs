use plugweave::core::{PluginHost, PluginSource};
use plugweave_demo_plugin::{Forecast, PluginRegistry};

#[test]
fn registry_lists_only_real_plugins() {
    let registrations = PluginRegistry::registrations();

    let ids: Vec<_> = registrations.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["forecast"]);

    let forecast = &registrations[0];
    assert_eq!(forecast.name, "Forecast");
    assert_eq!(forecast.version, "1.2.0");
    assert_eq!(forecast.description, "Daily temperature forecasts");
    assert_eq!(forecast.module.name(), "plugweave_demo_plugin");
    assert!(forecast.has_service_registrar());
}

#[test]
fn templates_become_components_in_sorted_order() {
    let registrations = PluginRegistry::registrations();
    let components = &registrations[0].components;

    let summary: Vec<_> = components
        .iter()
        .map(|c| {
            let shown = c.show_in_navigation;
            (c.type_name, c.route, c.display_name, c.order, shown)
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            (
                "Components::Pages::ForecastPage",
                "/forecast",
                "Forecast Page",
                100,
                true
            ),
            (
                "Components::Pages::ForecastSettings",
                "/forecast/settings",
                "Settings",
                10,
                false
            ),
            ("Components::Pages::Radar", "/radar", "Radar", 5, true),
        ]
    );
}

#[test]
fn trait_and_inherent_entry_points_agree() {
    let via_trait = <PluginRegistry as PluginSource>::registrations();
    let via_type = PluginRegistry::registrations();

    assert_eq!(via_trait.len(), via_type.len());
    assert_eq!(via_trait[0].components, via_type[0].components);
}

#[test]
fn host_starts_plugins_and_builds_navigation() {
    let host = PluginHost::from_source::<PluginRegistry>();
    let services = host.start().expect("demo plugins initialize");

    let forecast = services
        .get::<Forecast>()
        .expect("forecast service registered");
    assert_eq!(forecast.city, "Lisbon");

    let routes: Vec<_> = host.navigation().into_iter().map(|n| n.route).collect();
    assert_eq!(routes, vec!["/radar", "/forecast"]);
}
