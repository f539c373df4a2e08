//! Type discovery over parsed crate sources.
//!
//! Finds `impl <Contract> for <Type>` blocks whose trait resolves to one of
//! the capability contracts and whose self type resolves to a type declared
//! in the crate. Resolution is name based; the generated registry's
//! `Arc<dyn Trait>` coercions are what make the compiler confirm each match.

use crate::{
    diagnostic::{DiagnosticKind, Diagnostics},
    model::CandidatePlugin,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Component, Path, PathBuf},
};
use syn::{Attribute, Ident, Item, Type, UseTree};

// guards alias and re-export chains
const MAX_RESOLVE_DEPTH: u8 = 8;

const CONTRACT_NAMESPACES: &[&str] = &[
    "plugweave",
    "plugweave::core",
    "plugweave::core::plugin",
    "plugweave::core::prelude",
    "plugweave::prelude",
    "plugweave_core",
    "plugweave_core::plugin",
    "plugweave_core::prelude",
];

///
/// ContractPath
///
/// A trait identified by its simple name and the namespaces it may be
/// reached through.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractPath {
    pub name: String,
    pub namespaces: BTreeSet<String>,
}

impl ContractPath {
    pub fn new<I, S>(name: impl Into<String>, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            namespaces: namespaces.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn matches(&self, segments: &[String]) -> bool {
        let Some((last, prefix)) = segments.split_last() else {
            return false;
        };

        *last == self.name && self.namespaces.contains(&prefix.join("::"))
    }
}

///
/// Contracts
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contracts {
    pub plugin: ContractPath,
    pub service_registrar: ContractPath,
}

impl Default for Contracts {
    fn default() -> Self {
        Self {
            plugin: ContractPath::new("Plugin", CONTRACT_NAMESPACES.iter().copied()),
            service_registrar: ContractPath::new(
                "ServiceRegistrar",
                CONTRACT_NAMESPACES.iter().copied(),
            ),
        }
    }
}

///
/// SourceUnit
///
/// One parsed source file and the module path it is mounted at.
///

#[derive(Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub module_path: Vec<String>,
    pub file: syn::File,
}

impl SourceUnit {
    pub fn parse(
        path: impl Into<PathBuf>,
        module_path: Vec<String>,
        text: &str,
    ) -> syn::Result<Self> {
        Ok(Self {
            path: path.into(),
            module_path,
            file: syn::parse_file(text)?,
        })
    }
}

/// Module path for a file given relative to the crate's source root, or
/// `None` when the file cannot be a module of the crate (binaries under
/// `bin/`, non-identifier names, non-Rust files).
#[must_use]
pub fn module_path_for(relative: &Path) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }

    let file = parts.pop()?;
    let stem = file.strip_suffix(".rs")?;
    if parts.first().is_some_and(|p| p == "bin") {
        return None;
    }

    let mut path = vec!["crate".to_string()];
    for part in &parts {
        if !is_ident(part) {
            return None;
        }
        path.push(part.clone());
    }

    match stem {
        "lib" | "main" if parts.is_empty() => {}
        "mod" if !parts.is_empty() => {}
        "mod" => return None,
        other if is_ident(other) => path.push(other.to_string()),
        _ => return None,
    }

    Some(path)
}

fn is_ident(s: &str) -> bool {
    syn::parse_str::<Ident>(s).is_ok()
}

/// Discover every type in `sources` implementing the plugin contract.
///
/// Output is sorted by qualified type name, whatever the order of `sources`
/// or of the declarations inside them.
pub fn discover_plugins(
    module_name: &str,
    sources: &[SourceUnit],
    contracts: &Contracts,
    diagnostics: &mut Diagnostics,
) -> Vec<CandidatePlugin> {
    let mut crawl = Crawl::default();
    for unit in sources {
        crawl.crawl_items(&unit.module_path, &unit.file.items);
    }

    // qualified name -> (plugin, service registrar)
    let mut found: BTreeMap<String, (bool, bool)> = BTreeMap::new();

    for site in &crawl.impls {
        let Some(self_ty) = crawl.resolve_self_type(site) else {
            continue;
        };

        let traits = crawl.candidates(&site.module, &site.trait_path);
        let is_plugin = traits.iter().any(|t| contracts.plugin.matches(t));
        let registrar = &contracts.service_registrar;
        let is_registrar = traits.iter().any(|t| registrar.matches(t));
        if !is_plugin && !is_registrar {
            continue;
        }

        let entry = found.entry(self_ty.join("::")).or_default();
        entry.0 |= is_plugin;
        entry.1 |= is_registrar;
    }

    let mut plugins = Vec::new();
    for (name, (is_plugin, is_registrar)) in found {
        if !is_plugin {
            diagnostics.note(
                DiagnosticKind::RegistrarWithoutPlugin,
                &name,
                format!(
                    "implements {} without {}; not registered",
                    contracts.service_registrar.name, contracts.plugin.name
                ),
            );
            continue;
        }

        plugins.push(CandidatePlugin {
            qualified_type_name: name,
            declaring_module_name: module_name.to_string(),
            has_service_registrar: is_registrar,
        });
    }

    plugins
}

///
/// PathRef
///

#[derive(Clone, Debug)]
struct PathRef {
    global: bool,
    segments: Vec<String>,
}

impl PathRef {
    fn from_path(path: &syn::Path) -> Self {
        Self {
            global: path.leading_colon.is_some(),
            segments: path.segments.iter().map(|s| s.ident.to_string()).collect(),
        }
    }
}

///
/// ModuleScope
///

#[derive(Default)]
struct ModuleScope {
    // name -> declared with generic parameters
    types: BTreeMap<String, bool>,
    aliases: BTreeMap<String, Type>,
    uses: BTreeMap<String, PathRef>,
    globs: Vec<PathRef>,
}

impl ModuleScope {
    fn defines(&self, name: &str) -> bool {
        self.types.contains_key(name) || self.aliases.contains_key(name)
    }
}

struct ImplSite {
    module: Vec<String>,
    trait_path: PathRef,
    self_ty: Type,
}

///
/// Crawl
///
/// Crate-wide symbol view: every module's declared types, aliases and
/// imports, plus every non-generic trait impl.
///

#[derive(Default)]
struct Crawl {
    modules: BTreeMap<Vec<String>, ModuleScope>,
    impls: Vec<ImplSite>,
}

impl Crawl {
    fn crawl_items(&mut self, module: &[String], items: &[Item]) {
        self.modules.entry(module.to_vec()).or_default();

        for item in items {
            if is_cfg_test(item_attrs(item)) {
                continue;
            }

            match item {
                Item::Struct(item) => self.declare(module, &item.ident, &item.generics),
                Item::Enum(item) => self.declare(module, &item.ident, &item.generics),
                Item::Union(item) => self.declare(module, &item.ident, &item.generics),
                Item::Type(item) if item.generics.params.is_empty() => {
                    self.scope(module)
                        .aliases
                        .insert(item.ident.to_string(), (*item.ty).clone());
                }
                Item::Use(item) => collect_use(&item.tree, Vec::new(), self.scope(module)),
                Item::Impl(item) => {
                    let Some((negative, path, _)) = &item.trait_ else {
                        continue;
                    };
                    if negative.is_some() || !item.generics.params.is_empty() {
                        continue;
                    }

                    self.impls.push(ImplSite {
                        module: module.to_vec(),
                        trait_path: PathRef::from_path(path),
                        self_ty: (*item.self_ty).clone(),
                    });
                }
                Item::Mod(item) => {
                    let mut child = module.to_vec();
                    child.push(item.ident.to_string());
                    self.modules.entry(child.clone()).or_default();

                    if let Some((_, items)) = &item.content {
                        self.crawl_items(&child, items);
                    }
                }
                _ => {}
            }
        }
    }

    fn scope(&mut self, module: &[String]) -> &mut ModuleScope {
        self.modules.entry(module.to_vec()).or_default()
    }

    fn declare(&mut self, module: &[String], ident: &Ident, generics: &syn::Generics) {
        self.scope(module)
            .types
            .insert(ident.to_string(), !generics.params.is_empty());
    }

    // candidates
    // every absolute path a reference may denote; glob imports can make a
    // bare name ambiguous, so all of them are returned
    fn candidates(&self, module: &[String], path: &PathRef) -> Vec<Vec<String>> {
        if path.global {
            return vec![path.segments.clone()];
        }

        let primary = self.resolve(module, &path.segments, 0);
        if primary != path.segments || path.segments.len() != 1 {
            return vec![primary];
        }

        let mut out = vec![primary];
        self.glob_candidates(module, &path.segments[0], 1, &mut out);

        out
    }

    // glob_candidates
    // globs chain: `use super::*` also sees what the parent glob-imported
    fn glob_candidates(
        &self,
        module: &[String],
        name: &str,
        depth: u8,
        out: &mut Vec<Vec<String>>,
    ) {
        if depth > MAX_RESOLVE_DEPTH {
            return;
        }
        let Some(scope) = self.modules.get(module) else {
            return;
        };

        for glob in &scope.globs {
            let mut base = if glob.global {
                glob.segments.clone()
            } else {
                self.resolve(module, &glob.segments, depth + 1)
            };

            match self.modules.get(&base) {
                Some(target) if target.defines(name) || target.uses.contains_key(name) => {
                    base.push(name.to_string());
                    out.push(self.follow(base, depth + 1));
                }
                Some(_) => self.glob_candidates(&base, name, depth + 1, out),
                None => {
                    base.push(name.to_string());
                    out.push(base);
                }
            }
        }
    }

    fn resolve(&self, module: &[String], segments: &[String], depth: u8) -> Vec<String> {
        let Some((first, rest)) = segments.split_first() else {
            return Vec::new();
        };
        if depth > MAX_RESOLVE_DEPTH {
            return segments.to_vec();
        }

        match first.as_str() {
            "crate" => return self.follow(segments.to_vec(), depth),
            "self" => {
                let mut full = module.to_vec();
                full.extend_from_slice(rest);
                return self.follow(full, depth);
            }
            "super" => {
                let mut base = module.to_vec();
                let mut rest = segments;
                while let Some((head, tail)) = rest.split_first() {
                    if head != "super" {
                        break;
                    }
                    if base.len() > 1 {
                        base.pop();
                    }
                    rest = tail;
                }
                base.extend_from_slice(rest);
                return self.follow(base, depth);
            }
            _ => {}
        }

        let scope = self.modules.get(module);

        if let Some(target) = scope.and_then(|s| s.uses.get(first)) {
            let self_referential = !target.global && target.segments == [first.clone()];
            if !self_referential {
                let mut full = if target.global {
                    target.segments.clone()
                } else {
                    self.resolve(module, &target.segments, depth + 1)
                };
                full.extend_from_slice(rest);

                return self.follow(full, depth + 1);
            }
        }

        let mut local = module.to_vec();
        local.push(first.clone());
        if scope.is_some_and(|s| s.defines(first)) || self.modules.contains_key(&local) {
            local.extend_from_slice(rest);
            return self.follow(local, depth);
        }

        segments.to_vec()
    }

    // follow
    // chase a `use` re-export when a crate path names an import rather than
    // an item
    fn follow(&self, full: Vec<String>, depth: u8) -> Vec<String> {
        if depth > MAX_RESOLVE_DEPTH || full.first().is_none_or(|f| f != "crate") {
            return full;
        }
        let Some((last, parent)) = full.split_last() else {
            return full;
        };
        let Some(scope) = self.modules.get(parent) else {
            return full;
        };
        if scope.defines(last) || self.modules.contains_key(&full) {
            return full;
        }

        match scope.uses.get(last) {
            Some(target) if target.global => target.segments.clone(),
            Some(target) => self.resolve(parent, &target.segments, depth + 1),
            None => full,
        }
    }

    fn resolve_self_type(&self, site: &ImplSite) -> Option<Vec<String>> {
        self.resolve_type(&site.module, &site.self_ty, 0)
    }

    // resolve_type
    // a self type resolves when it names a non-generic struct, enum or union
    // declared in this crate, possibly through a chain of type aliases
    fn resolve_type(&self, module: &[String], ty: &Type, depth: u8) -> Option<Vec<String>> {
        if depth > MAX_RESOLVE_DEPTH {
            return None;
        }
        let path = type_path(ty)?;

        for candidate in self.candidates(module, &path) {
            let Some((name, parent)) = candidate.split_last() else {
                continue;
            };
            let Some(scope) = self.modules.get(parent) else {
                continue;
            };

            if let Some(generic) = scope.types.get(name) {
                return (!generic).then_some(candidate);
            }
            if let Some(alias) = scope.aliases.get(name) {
                return self.resolve_type(parent, alias, depth + 1);
            }
        }

        None
    }
}

fn type_path(ty: &Type) -> Option<PathRef> {
    match ty {
        Type::Path(ty) if ty.qself.is_none() => {
            let generic = ty.path.segments.iter().any(|s| !s.arguments.is_none());

            (!generic).then(|| PathRef::from_path(&ty.path))
        }
        Type::Paren(ty) => type_path(&ty.elem),
        Type::Group(ty) => type_path(&ty.elem),
        _ => None,
    }
}

fn collect_use(tree: &UseTree, mut prefix: Vec<String>, scope: &mut ModuleScope) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            collect_use(&path.tree, prefix, scope);
        }
        UseTree::Name(name) => {
            if name.ident == "self" {
                if let Some(last) = prefix.last().cloned() {
                    scope.uses.insert(last, local_ref(prefix));
                }
            } else {
                let alias = name.ident.to_string();
                prefix.push(alias.clone());
                scope.uses.insert(alias, local_ref(prefix));
            }
        }
        UseTree::Rename(rename) => {
            if rename.rename == "_" {
                return;
            }
            if rename.ident != "self" {
                prefix.push(rename.ident.to_string());
            }
            let local = local_ref(prefix);
            scope.uses.insert(rename.rename.to_string(), local);
        }
        UseTree::Glob(_) => scope.globs.push(local_ref(prefix)),
        UseTree::Group(group) => {
            for item in &group.items {
                collect_use(item, prefix.clone(), scope);
            }
        }
    }
}

const fn local_ref(segments: Vec<String>) -> PathRef {
    PathRef {
        global: false,
        segments,
    }
}

fn item_attrs(item: &Item) -> &[Attribute] {
    match item {
        Item::Struct(item) => &item.attrs,
        Item::Enum(item) => &item.attrs,
        Item::Union(item) => &item.attrs,
        Item::Type(item) => &item.attrs,
        Item::Use(item) => &item.attrs,
        Item::Impl(item) => &item.attrs,
        Item::Mod(item) => &item.attrs,
        _ => &[],
    }
}

// test-only items never exist in the build that includes the registry
fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.meta
            .require_list()
            .is_ok_and(|list| list.path.is_ident("cfg") && list.tokens.to_string() == "test")
    })
}

///
/// TESTS
///
