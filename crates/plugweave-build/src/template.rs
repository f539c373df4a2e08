//! Template directive extraction.
//!
//! A template becomes a `CandidateComponent` only if it declares a route.
//! Everything else about it is derived, defaulted, or read from an optional
//! `@attribute [PluginComponent(...)]` directive.
//!
//! The component type name is guessed from the file path. The guess only
//! holds for layouts that follow the container folder convention; anything
//! else yields a name that does not match the real component type.

use crate::{
    diagnostic::{DiagnosticKind, Diagnostics},
    model::CandidateComponent,
    scan::{self, ArgValue, AttributeSpec},
};
use plugweave_config_build::TemplateConfig;
use plugweave_core::ComponentMetadata;
use std::path::{Component, Path, PathBuf};

/// Attribute names (last path segment) that carry component metadata.
pub const METADATA_ATTRIBUTES: &[&str] = &["PluginComponent", "PluginComponentAttribute"];

///
/// TemplateFile
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateFile {
    pub path: PathBuf,
    pub text: String,
}

impl TemplateFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

///
/// TemplateRules
///
/// Which files count as templates and how type names are guessed from
/// their paths.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateRules {
    pub extension: String,
    pub anchor_suffixes: Vec<String>,
    pub anchor_keywords: Vec<String>,
    pub container_folders: Vec<String>,
}

impl Default for TemplateRules {
    fn default() -> Self {
        Self::from(&TemplateConfig::default())
    }
}

impl From<&TemplateConfig> for TemplateRules {
    fn from(config: &TemplateConfig) -> Self {
        Self {
            extension: config.extension.clone(),
            anchor_suffixes: config.anchor_suffixes.clone(),
            anchor_keywords: config
                .anchor_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            container_folders: config.container_folders.clone(),
        }
    }
}

impl TemplateRules {
    #[must_use]
    pub fn is_template(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }

    // is_anchor
    // a segment that looks like a plugin module name
    fn is_anchor(&self, segment: &str) -> bool {
        let lower = segment.to_lowercase();
        let suffixed = |s: &String| segment.ends_with(s.as_str());
        let keyword = |k: &String| lower.contains(k.as_str());

        self.anchor_suffixes.iter().any(suffixed) || self.anchor_keywords.iter().any(keyword)
    }

    fn is_container(&self, segment: &str) -> bool {
        self.container_folders.iter().any(|c| c == segment)
    }
}

/// Extract components from every template in `files`, skipping files whose
/// extension does not match.
pub fn extract_components(
    files: &[TemplateFile],
    rules: &TemplateRules,
    diagnostics: &mut Diagnostics,
) -> Vec<CandidateComponent> {
    files
        .iter()
        .filter(|file| rules.is_template(&file.path))
        .filter_map(|file| extract_component(&file.path, &file.text, rules, diagnostics))
        .collect()
}

/// Extract the component declared by one template, if it declares a route.
pub fn extract_component(
    path: &Path,
    text: &str,
    rules: &TemplateRules,
    diagnostics: &mut Diagnostics,
) -> Option<CandidateComponent> {
    let location = path.display().to_string();
    let text = scan::mask_comments(text);

    let route = extract_route(&text, &location, diagnostics)?;
    let metadata = extract_metadata(&text, &location, diagnostics);

    let base = base_name(path);
    let display_name = metadata
        .display_name
        .unwrap_or_else(|| default_display_name(&base));

    Some(CandidateComponent {
        qualified_type_name: derive_type_name(path, rules),
        route,
        display_name,
        order: metadata.order,
        show_in_navigation: metadata.show_in_navigation,
    })
}

// extract_route
// the first @page directive decides; later ones are noted and ignored
fn extract_route(text: &str, location: &str, diagnostics: &mut Diagnostics) -> Option<String> {
    let offsets = scan::directive_offsets(text, "page");
    let (&first, later) = offsets.split_first()?;

    if !later.is_empty() {
        diagnostics.note(
            DiagnosticKind::IgnoredDirective,
            location,
            format!("{} additional @page directive(s) ignored", later.len()),
        );
    }

    match scan::parse_route(text, first) {
        Ok(route) => Some(route),
        Err(err) => {
            diagnostics.note(
                DiagnosticKind::MalformedDirective,
                location,
                format!("@page directive not usable: {err}"),
            );
            None
        }
    }
}

// extract_metadata
// the first @attribute list naming a metadata attribute wins
fn extract_metadata(
    text: &str,
    location: &str,
    diagnostics: &mut Diagnostics,
) -> ComponentMetadata {
    for offset in scan::directive_offsets(text, "attribute") {
        let attrs = match scan::parse_attributes(text, offset) {
            Ok(attrs) => attrs,
            Err(err) => {
                diagnostics.note(
                    DiagnosticKind::MalformedDirective,
                    location,
                    format!("@attribute directive skipped: {err}"),
                );
                continue;
            }
        };

        if let Some(attr) = attrs
            .iter()
            .find(|a| METADATA_ATTRIBUTES.contains(&a.name()))
        {
            return read_metadata(attr, location, diagnostics);
        }
    }

    ComponentMetadata::default()
}

// read_metadata
// keys are independent: a bad value defaults that one field only, and the
// first occurrence of a key wins
fn read_metadata(
    attr: &AttributeSpec,
    location: &str,
    diagnostics: &mut Diagnostics,
) -> ComponentMetadata {
    let mut meta = ComponentMetadata::default();
    let (mut name_set, mut order_set, mut nav_set) = (false, false, false);

    for arg in &attr.args {
        let Some(key) = arg.name.as_deref() else {
            continue;
        };

        match (key, &arg.value) {
            ("DisplayName", _) if name_set => {}
            ("DisplayName", ArgValue::Str(s)) if !s.is_empty() => {
                meta.display_name = Some(s.clone());
                name_set = true;
            }
            ("Order", _) if order_set => {}
            ("Order", ArgValue::Int(n)) if i32::try_from(*n).is_ok() => {
                meta.order = i32::try_from(*n).unwrap_or(meta.order);
                order_set = true;
            }
            ("ShowInNavigation", _) if nav_set => {}
            ("ShowInNavigation", ArgValue::Bool(b)) => {
                meta.show_in_navigation = *b;
                nav_set = true;
            }
            ("DisplayName" | "Order" | "ShowInNavigation", value) => {
                diagnostics.note(
                    DiagnosticKind::MalformedDirective,
                    location,
                    format!("{key} = {} is not usable; default kept", describe(value)),
                );
            }
            _ => {}
        }
    }

    meta
}

fn describe(value: &ArgValue) -> String {
    match value {
        ArgValue::Str(s) => format!("{s:?}"),
        ArgValue::Int(n) => n.to_string(),
        ArgValue::Bool(b) => b.to_string(),
        ArgValue::Other(raw) => raw.clone(),
    }
}

fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Guess a component's qualified type name from its path.
///
/// The last segment that looks like a plugin module name anchors the path;
/// container folders after it become namespace segments, and the file's base
/// name is the type name. Without an anchor, container folders anywhere in
/// the path are used; without those, the bare base name.
#[must_use]
pub fn derive_type_name(path: &Path, rules: &TemplateRules) -> String {
    let dirs: Vec<String> = path
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let anchor = dirs.iter().rposition(|segment| rules.is_anchor(segment));
    let (prefix, scanned) = match anchor {
        Some(i) => (Some(normalize_anchor(&dirs[i])), &dirs[i + 1..]),
        None => (None, &dirs[..]),
    };

    let mut segments: Vec<String> = prefix.into_iter().collect();
    segments.extend(scanned.iter().filter(|s| rules.is_container(s)).cloned());
    segments.push(base_name(path));

    segments.join("::")
}

// normalize_anchor
// crate-style: `acme-weather` -> `acme_weather`, `Acme.Weather` -> `Acme::Weather`
fn normalize_anchor(segment: &str) -> String {
    segment.replace('-', "_").replace('.', "::")
}

/// Default display name: a space before every uppercase character except
/// the first (`SamplePage` -> `Sample Page`, `ABC` -> `A B C`).
#[must_use]
pub fn default_display_name(base: &str) -> String {
    let mut out = String::with_capacity(base.len() + 4);

    for (i, c) in base.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }

    out
}

///
/// TESTS
///
