use crate::{
    model::{CandidateComponent, GeneratedArtifact, MergedRegistration, ModuleRegistrations},
    paths::CratePaths,
};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

/// Name of the generated registration type.
pub const REGISTRY_IDENT: &str = "PluginRegistry";

/// Render one module's registrations, or `None` when it has no plugins.
#[must_use]
pub fn emit(module: &ModuleRegistrations, paths: &CratePaths) -> Option<GeneratedArtifact> {
    if module.registrations.is_empty() {
        return None;
    }

    let tokens = RegistryBuilder::new(module, paths).generate();
    let source = format!(
        "// @generated by plugweave-build for module `{}`; do not edit.\n{tokens}\n",
        module.module_name
    );

    Some(GeneratedArtifact {
        module_name: module.module_name.clone(),
        source,
    })
}

///
/// RegistryBuilder
///

pub(crate) struct RegistryBuilder<'a> {
    pub(crate) module: &'a ModuleRegistrations,
    pub(crate) paths: &'a CratePaths,
}

impl<'a> RegistryBuilder<'a> {
    #[must_use]
    pub(crate) const fn new(module: &'a ModuleRegistrations, paths: &'a CratePaths) -> Self {
        Self { module, paths }
    }

    /// Generate the registry type and its `PluginSource` impl.
    #[must_use]
    pub(crate) fn generate(&self) -> TokenStream {
        let core = &self.paths.core;
        let registry = format_ident!("{REGISTRY_IDENT}");

        let mut locals = quote!();
        let mut entries = quote!();

        for reg in &self.module.registrations {
            let (local, entry) = self.registration(reg);
            locals.extend(local);
            entries.extend(entry);
        }

        quote! {
            /// Plugins and routable components discovered at build time.
            pub struct #registry;

            impl #core::PluginSource for #registry {
                #[allow(non_snake_case, clippy::redundant_clone)]
                fn registrations() -> ::std::vec::Vec<#core::PluginRegistration> {
                    #locals

                    ::std::vec![
                        #entries
                    ]
                }
            }

            impl #registry {
                /// Every registration, in plugin type name order.
                #[must_use]
                pub fn registrations() -> ::std::vec::Vec<#core::PluginRegistration> {
                    <Self as #core::PluginSource>::registrations()
                }
            }
        }
    }

    // registration
    // returns the local bindings and the vec entry for one plugin
    fn registration(&self, reg: &MergedRegistration) -> (TokenStream, TokenStream) {
        let core = &self.paths.core;
        let name = &reg.plugin.qualified_type_name;
        let ty = type_path(name);

        let plugin = plugin_ident(name);
        let components = components_ident(name);
        let component_items = reg.components.iter().map(|c| self.component(c));

        let service_registrar = if reg.plugin.has_service_registrar {
            quote! {
                ::std::option::Option::Some(
                    ::std::sync::Arc::clone(&#plugin)
                        as ::std::sync::Arc<dyn #core::ServiceRegistrar>
                )
            }
        } else {
            quote!(::std::option::Option::None)
        };

        let local = quote! {
            let #plugin = ::std::sync::Arc::new(
                <#ty as ::core::default::Default>::default()
            );
            let #components: ::std::vec::Vec<#core::ComponentInfo> = ::std::vec![
                #(#component_items),*
            ];
        };

        let entry = quote! {
            #core::PluginRegistration {
                id: ::std::string::ToString::to_string(#core::Plugin::id(&*#plugin)),
                name: ::std::string::ToString::to_string(#core::Plugin::name(&*#plugin)),
                version: ::std::string::ToString::to_string(#core::Plugin::version(&*#plugin)),
                description: ::std::string::ToString::to_string(
                    #core::Plugin::description(&*#plugin)
                ),
                module: #core::Plugin::module(&*#plugin),
                plugin: ::std::sync::Arc::clone(&#plugin) as ::std::sync::Arc<dyn #core::Plugin>,
                service_registrar: #service_registrar,
                components: #components,
            },
        };

        (local, entry)
    }

    fn component(&self, component: &CandidateComponent) -> TokenStream {
        let core = &self.paths.core;
        let CandidateComponent {
            qualified_type_name,
            route,
            display_name,
            order,
            show_in_navigation,
        } = component;

        quote! {
            #core::ComponentInfo {
                type_name: #qualified_type_name,
                route: #route,
                display_name: #display_name,
                order: #order,
                show_in_navigation: #show_in_navigation,
            }
        }
    }
}

// type_path
// names come from parsed identifiers, so every segment is a valid ident
fn type_path(qualified_type_name: &str) -> TokenStream {
    let segments = qualified_type_name
        .split("::")
        .map(|segment| format_ident!("{segment}"));

    quote!(#(#segments)::*)
}

/// Local identifier for a plugin instance.
#[must_use]
pub fn plugin_ident(qualified_type_name: &str) -> Ident {
    format_ident!("plugin_{}", escape_path(qualified_type_name))
}

/// Local identifier for a plugin's component list.
#[must_use]
pub fn components_ident(qualified_type_name: &str) -> Ident {
    format_ident!("components_{}", escape_path(qualified_type_name))
}

// escape_path
// injective: '_' is doubled, so a single '_' followed by 's_' can only come
// from a '::' separator
fn escape_path(path: &str) -> String {
    path.split("::")
        .map(|segment| segment.trim_start_matches("r#").replace('_', "__"))
        .collect::<Vec<_>>()
        .join("_s_")
}

///
/// TESTS
///
