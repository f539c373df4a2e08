//! Build-time records. Constructed once per generation pass and never
//! mutated; only `GeneratedArtifact` text survives the pass.

///
/// CandidatePlugin
///
/// A declared type that implements the plugin contract. Identity is
/// `qualified_type_name` within `declaring_module_name`.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CandidatePlugin {
    pub qualified_type_name: String,
    pub declaring_module_name: String,
    pub has_service_registrar: bool,
}

///
/// CandidateComponent
///
/// A template file that declares a route. `qualified_type_name` comes from
/// path heuristics and is not verified against any real type.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CandidateComponent {
    pub qualified_type_name: String,
    pub route: String,
    pub display_name: String,
    pub order: i32,
    pub show_in_navigation: bool,
}

///
/// MergedRegistration
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MergedRegistration {
    pub plugin: CandidatePlugin,
    pub components: Vec<CandidateComponent>,
}

///
/// ModuleRegistrations
///
/// Every merged registration of one module, plugins in qualified name order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleRegistrations {
    pub module_name: String,
    pub registrations: Vec<MergedRegistration>,
}

///
/// GeneratedArtifact
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedArtifact {
    pub module_name: String,
    pub source: String,
}
