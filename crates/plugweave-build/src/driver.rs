//! File system side of a generation pass: gather inputs, run `generate`,
//! write the artifact.

use crate::{
    BuildError, CargoSink, Contracts, CratePaths, DiagnosticKind, DiagnosticSink, Diagnostics,
    GeneratedArtifact, ModuleInput, SourceUnit, TemplateFile, TemplateRules, discover, generate,
};
use plugweave_config_build::{CONFIG_FILE_NAME, PlugweaveConfig, load_config};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

///
/// BuildContext
///
/// Where a generation pass reads from and writes to.
///

#[derive(Clone, Debug)]
pub struct BuildContext {
    pub manifest_dir: PathBuf,
    pub out_dir: PathBuf,
    pub module_name: String,
    pub config: PlugweaveConfig,
    pub paths: CratePaths,
}

impl BuildContext {
    /// Context for the crate whose build script is running.
    pub fn from_env() -> Result<Self, BuildError> {
        let manifest_dir = env_var("CARGO_MANIFEST_DIR")?;
        let out_dir = env_var("OUT_DIR")?;
        let module_name = env_var("CARGO_PKG_NAME")?;

        let manifest_dir = PathBuf::from(manifest_dir);
        let config = load_config(&manifest_dir)?;

        Ok(Self {
            config,
            manifest_dir,
            out_dir: PathBuf::from(out_dir),
            module_name: module_name.replace('-', "_"),
            paths: CratePaths::new(),
        })
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(&self.config.output.file)
    }
}

fn env_var(name: &'static str) -> Result<String, BuildError> {
    std::env::var(name).map_err(|_| BuildError::Env(name))
}

///
/// BuildReport
///

#[derive(Debug)]
pub struct BuildReport {
    pub artifact: Option<GeneratedArtifact>,
    pub diagnostics: Diagnostics,

    /// Files and directories the result depends on, sorted.
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Build script entry point: run against the current crate and report to
/// cargo.
pub fn run_from_env() -> Result<BuildReport, BuildError> {
    let ctx = BuildContext::from_env()?;
    let sink = CargoSink::new(ctx.config.output.report_notes);

    run(&ctx, &sink)
}

/// Gather inputs, generate, report diagnostics to `sink` and write the
/// output file. The output is always written so that `start!` compiles even
/// when the crate declares no plugins.
pub fn run(ctx: &BuildContext, sink: &dyn DiagnosticSink) -> Result<BuildReport, BuildError> {
    let mut diagnostics = Diagnostics::new();
    let mut inputs = Vec::new();

    // cargo reruns on every build for a rerun path that does not exist
    let config_path = ctx.manifest_dir.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        inputs.push(config_path);
    }

    let source_root = ctx.manifest_dir.join(&ctx.config.discovery.source_dir);
    let template_root = ctx.manifest_dir.join(&ctx.config.templates.dir);
    let rules = TemplateRules::from(&ctx.config.templates);

    let mut input = ModuleInput::new(&ctx.module_name);
    input.sources = read_sources(&source_root, &mut inputs, &mut diagnostics)?;
    input.templates = read_templates(
        &template_root,
        &ctx.manifest_dir,
        &rules,
        &mut inputs,
        &mut diagnostics,
    )?;

    let artifact = generate(
        &[input],
        &Contracts::default(),
        &rules,
        &ctx.paths,
        &mut diagnostics,
    )
    .into_iter()
    .next();

    diagnostics.report(sink);

    let output = ctx.output_path();
    let text = match &artifact {
        Some(artifact) => artifact.source.clone(),
        None => format!(
            "// @generated by plugweave-build: no plugins in `{}`\n",
            ctx.module_name
        ),
    };
    write_if_changed(&output, &text)?;

    inputs.sort();
    inputs.dedup();

    Ok(BuildReport {
        artifact,
        diagnostics,
        inputs,
        output,
    })
}

// write_if_changed
// keeps the mtime stable so dependents are not rebuilt for nothing
fn write_if_changed(path: &Path, text: &str) -> Result<(), BuildError> {
    if fs::read_to_string(path).is_ok_and(|existing| existing == text) {
        return Ok(());
    }

    fs::write(path, text).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

///
/// SOURCES
///

fn read_sources(
    root: &Path,
    inputs: &mut Vec<PathBuf>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SourceUnit>, BuildError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    inputs.push(root.to_path_buf());

    let is_rust = |path: &Path| path.extension().is_some_and(|ext| ext == "rs");
    let files = walk(root, is_rust)?.files;

    // a library crate's module tree starts at lib.rs; main.rs is a binary
    let has_lib = root.join("lib.rs").is_file();

    let mut units = Vec::new();
    for path in files {
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        if has_lib && relative == Path::new("main.rs") {
            continue;
        }
        let Some(module_path) = discover::module_path_for(relative) else {
            continue;
        };

        inputs.push(path.clone());
        let location = path.display().to_string();

        let Some(text) = read_utf8(&path)? else {
            diagnostics.warn(
                DiagnosticKind::UnparsedSource,
                location,
                "skipped, not valid UTF-8",
            );
            continue;
        };

        match SourceUnit::parse(&path, module_path, &text) {
            Ok(unit) => units.push(unit),
            Err(err) => diagnostics.warn(
                DiagnosticKind::UnparsedSource,
                location,
                format!("skipped, does not parse: {err}"),
            ),
        }
    }

    Ok(units)
}

///
/// TEMPLATES
///

// read_templates
// every directory below the manifest root is a rerun input, so templates
// added to a new or existing folder are picked up
fn read_templates(
    root: &Path,
    manifest_dir: &Path,
    rules: &TemplateRules,
    inputs: &mut Vec<PathBuf>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<TemplateFile>, BuildError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let walked = walk(root, |path| rules.is_template(path))?;
    inputs.extend(walked.dirs.into_iter().filter(|dir| dir != manifest_dir));

    let mut templates = Vec::with_capacity(walked.files.len());
    for path in walked.files {
        inputs.push(path.clone());

        // type names are derived from the path below the template root
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

        let Some(text) = read_utf8(&path)? else {
            diagnostics.warn(
                DiagnosticKind::UnreadableTemplate,
                relative.display().to_string(),
                "skipped, not valid UTF-8",
            );
            continue;
        };

        templates.push(TemplateFile::new(relative, text));
    }

    Ok(templates)
}

///
/// FILES
///

#[derive(Debug, Default)]
struct Walk {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

// walk
// sorted by file name, links are not followed; hidden entries and target/
// below the root are pruned
fn walk(root: &Path, keep: impl Fn(&Path) -> bool) -> Result<Walk, BuildError> {
    let mut walk = Walk::default();

    let entries = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_pruned(entry));

    for entry in entries {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();

            BuildError::Read {
                path,
                source: err.into(),
            }
        })?;

        if entry.file_type().is_dir() {
            walk.dirs.push(entry.into_path());
        } else if entry.path().is_file() && keep(entry.path()) {
            walk.files.push(entry.into_path());
        }
    }

    Ok(walk)
}

fn is_pruned(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_none_or(|name| name.starts_with('.') || name == "target")
}

// read_utf8
// None when the file is readable but not UTF-8
fn read_utf8(path: &Path) -> Result<Option<String>, BuildError> {
    let bytes = fs::read(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(String::from_utf8(bytes).ok())
}

///
/// TESTS
///
