//! Build-time plugin discovery and registration codegen.
//!
//! The pipeline is pure: `generate` takes parsed sources and template texts
//! and returns generated Rust source. All file system access lives in
//! `driver`, which the `build!` macro calls from a build script.
//!
//! - `discover`   finds types implementing `Plugin` / `ServiceRegistrar`
//! - `template`   extracts routed components from `.razor` templates
//! - `correlate`  merges both per module
//! - `emit`       renders the `PluginRegistry` source

mod macros;

pub mod correlate;
pub mod diagnostic;
pub mod discover;
pub mod driver;
pub mod emit;
pub mod model;
pub mod paths;
pub mod scan;
pub mod template;

pub use diagnostic::{CargoSink, Diagnostic, DiagnosticKind, DiagnosticSink, Diagnostics, Severity};
pub use discover::{Contracts, SourceUnit};
pub use driver::{BuildContext, BuildReport, run, run_from_env};
pub use model::{
    CandidateComponent, CandidatePlugin, GeneratedArtifact, MergedRegistration,
    ModuleRegistrations,
};
pub use paths::CratePaths;
pub use template::{TemplateFile, TemplateRules};

use plugweave_config_build::ConfigError;
use std::{collections::BTreeMap, path::PathBuf};
use thiserror::Error as ThisError;

///
/// BuildError
///
/// Hard failures of the build driver. Everything the pipeline itself
/// tolerates is reported through `Diagnostics` instead.
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("environment variable {0} is not set")]
    Env(&'static str),
}

///
/// ModuleInput
///
/// Everything one module contributes to a generation pass.
///

#[derive(Clone)]
pub struct ModuleInput {
    pub name: String,
    pub sources: Vec<SourceUnit>,
    pub templates: Vec<TemplateFile>,
}

impl ModuleInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: Vec::new(),
            templates: Vec::new(),
        }
    }
}

/// Run discovery, extraction, correlation and emission over `inputs`.
///
/// Returns one artifact per module that declares at least one plugin, in
/// module name order.
pub fn generate(
    inputs: &[ModuleInput],
    contracts: &Contracts,
    rules: &TemplateRules,
    paths: &CratePaths,
    diagnostics: &mut Diagnostics,
) -> Vec<GeneratedArtifact> {
    let mut plugins = Vec::new();
    let mut components: BTreeMap<String, Vec<CandidateComponent>> = BTreeMap::new();

    for input in inputs {
        plugins.extend(discover::discover_plugins(
            &input.name,
            &input.sources,
            contracts,
            diagnostics,
        ));

        let found = template::extract_components(&input.templates, rules, diagnostics);
        components
            .entry(input.name.clone())
            .or_default()
            .extend(found);
    }

    correlate::correlate(plugins, components, diagnostics)
        .iter()
        .filter_map(|module| emit::emit(module, paths))
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    const PLUGINS: &str = r#"
        use plugweave::prelude::*;

        #[derive(Default)]
        pub struct Weather;

        impl Plugin for Weather {
            fn id(&self) -> &str { "weather" }
            fn name(&self) -> &str { "Weather" }
            fn version(&self) -> &str { "1.0.0" }
        }

        impl ServiceRegistrar for Weather {
            fn register_services(&self, _: &mut ServiceCollection) {}
        }

        #[derive(Default)]
        pub struct Clock;

        impl plugweave::core::Plugin for Clock {
            fn id(&self) -> &str { "clock" }
            fn name(&self) -> &str { "Clock" }
            fn version(&self) -> &str { "0.1.0" }
        }
    "#;

    fn source(text: &str) -> SourceUnit {
        SourceUnit::parse("src/lib.rs", vec!["crate".to_string()], text).expect("fixture parses")
    }

    fn templates() -> Vec<TemplateFile> {
        vec![
            TemplateFile::new(
                "Components/Pages/SamplePage.razor",
                "@page \"/sample\"\n<h1>Sample</h1>\n",
            ),
            TemplateFile::new(
                "Components/Pages/Home.razor",
                "@page \"/home\"\n@attribute [PluginComponent(DisplayName = \"Home\", Order = 1, ShowInNavigation = false)]\n",
            ),
            TemplateFile::new("Components/Pages/Forecast.razor", "@page \"/forecast\"\n"),
            TemplateFile::new("Components/Shared/Footer.razor", "<footer></footer>\n"),
        ]
    }

    fn input(sources: &str, templates: Vec<TemplateFile>) -> ModuleInput {
        ModuleInput {
            name: "demo".to_string(),
            sources: vec![source(sources)],
            templates,
        }
    }

    fn run(inputs: &[ModuleInput]) -> (Vec<GeneratedArtifact>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let artifacts = generate(
            inputs,
            &Contracts::default(),
            &TemplateRules::default(),
            &CratePaths::default(),
            &mut diags,
        );

        (artifacts, diags)
    }

    #[test]
    fn zero_plugins_produce_no_artifact() {
        let lonely = TemplateFile::new("Components/Pages/Lonely.razor", "@page \"/lonely\"");
        let (artifacts, diags) = run(&[input("pub struct NotAPlugin;", vec![lonely])]);

        assert!(artifacts.is_empty());
        assert_eq!(diags.of_kind(DiagnosticKind::OrphanComponents).count(), 1);
    }

    #[test]
    fn two_plugins_share_three_components() {
        let (artifacts, diags) = run(&[input(PLUGINS, templates())]);

        assert_eq!(artifacts.len(), 1);
        assert_eq!(diags.of_kind(DiagnosticKind::AmbiguousOwnership).count(), 1);

        let source = &artifacts[0].source;
        syn::parse_file(source).expect("generated source should parse");

        for route in ["\"/sample\"", "\"/home\"", "\"/forecast\""] {
            assert_eq!(source.matches(route).count(), 2, "{route}");
        }
        assert!(source.contains("\"Sample Page\""));
        assert!(!source.contains("Footer"));

        // Weather carries a registrar, Clock does not
        let registrar = "dyn :: plugweave :: core :: ServiceRegistrar";
        assert_eq!(source.matches(registrar).count(), 1);
    }

    #[test]
    fn pipeline_is_byte_identical_across_runs_and_input_order() {
        let forward = input(PLUGINS, templates());
        let mut reversed = forward.clone();
        reversed.templates.reverse();

        let (first, _) = run(&[forward.clone()]);
        let (second, _) = run(&[forward]);
        let (third, _) = run(&[reversed]);

        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn modules_generate_independently() {
        let mut other = input(PLUGINS, Vec::new());
        other.name = "other".to_string();

        let (artifacts, _) = run(&[input(PLUGINS, templates()), other]);
        let names: Vec<_> = artifacts.iter().map(|a| a.module_name.as_str()).collect();

        assert_eq!(names, vec!["demo", "other"]);
        assert!(!artifacts[1].source.contains("/sample"));
    }
}
