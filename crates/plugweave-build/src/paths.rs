use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

const INTERNAL_CRATES: &[&str] = &["plugweave-build", "plugweave-core"];

/// Environment variable overriding the runtime crate path in generated code.
pub const CORE_CRATE_ENV: &str = "PLUGWEAVE_CORE_CRATE";

fn env_path(name: &str) -> Option<TokenStream> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .and_then(|value| syn::parse_str::<Path>(&value).ok())
        .map(|path| quote!(#path))
}

///
/// CratePaths
///
/// Resolves the runtime crate root referenced by generated code. Consumers go
/// through the `plugweave` facade; crates inside this workspace that cannot
/// depend on the facade use `plugweave_core` directly. `PLUGWEAVE_CORE_CRATE`
/// overrides both.
///

#[derive(Clone, Debug)]
pub struct CratePaths {
    pub core: TokenStream,
}

impl Default for CratePaths {
    fn default() -> Self {
        Self {
            core: quote!(::plugweave::core),
        }
    }
}

impl CratePaths {
    /// Resolve crate paths for generated code, honoring environment overrides.
    #[must_use]
    pub fn new() -> Self {
        let pkg = std::env::var("CARGO_PKG_NAME").unwrap_or_default();

        let core = if INTERNAL_CRATES.contains(&pkg.as_str()) {
            quote!(::plugweave_core)
        } else {
            quote!(::plugweave::core)
        };

        Self {
            core: env_path(CORE_CRATE_ENV).unwrap_or(core),
        }
    }
}

///
/// TESTS
///
