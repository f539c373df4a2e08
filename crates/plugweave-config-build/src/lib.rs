//! Build-time configuration for plugweave codegen.
//!
//! Read from an optional `plugweave.toml` next to the consuming crate's
//! `Cargo.toml`. Every key has a default, so a missing file is the same as an
//! empty one.

use serde::Deserialize;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// File name looked up in the manifest directory.
pub const CONFIG_FILE_NAME: &str = "plugweave.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config value `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

///
/// PlugweaveConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlugweaveConfig {
    pub discovery: DiscoveryConfig,
    pub templates: TemplateConfig,
    pub output: OutputConfig,
}

///
/// DiscoveryConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Root of the Rust sources, relative to the manifest directory.
    pub source_dir: PathBuf,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
        }
    }
}

///
/// TemplateConfig
///
/// Controls which files count as templates and how a component's type name
/// is guessed from its path.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    pub dir: PathBuf,
    pub extension: String,
    pub anchor_suffixes: Vec<String>,
    pub anchor_keywords: Vec<String>,
    pub container_folders: Vec<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            extension: "razor".to_string(),
            anchor_suffixes: vec![".Plugin".to_string()],
            anchor_keywords: vec!["plugin".to_string()],
            container_folders: ["Components", "Pages", "Shared", "Layout", "Views"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

///
/// OutputConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File name written under `OUT_DIR`.
    pub file: String,

    /// Also surface note-level diagnostics as cargo warnings.
    pub report_notes: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: "plugweave.rs".to_string(),
            report_notes: false,
        }
    }
}

impl PlugweaveConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validated()
    }

    // validated
    // normalizes the extension and rejects values codegen cannot use
    fn validated(mut self) -> Result<Self, ConfigError> {
        let ext = self.templates.extension.trim().trim_start_matches('.');
        if ext.is_empty() {
            return Err(ConfigError::Invalid {
                key: "templates.extension",
                message: "extension is empty".to_string(),
            });
        }
        self.templates.extension = ext.to_string();

        let file = Path::new(&self.output.file);
        if file.file_name().is_none() || file.components().count() != 1 {
            return Err(ConfigError::Invalid {
                key: "output.file",
                message: format!("'{}' must be a bare file name", self.output.file),
            });
        }

        Ok(self)
    }
}

/// Load `plugweave.toml` from `manifest_dir`, falling back to defaults when
/// the file does not exist.
pub fn load_config(manifest_dir: &Path) -> Result<PlugweaveConfig, ConfigError> {
    let path = manifest_dir.join(CONFIG_FILE_NAME);

    match fs::read_to_string(&path) {
        Ok(text) => PlugweaveConfig::from_toml_str(&text, &path),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(PlugweaveConfig::default()),
        Err(source) => Err(ConfigError::Read { path, source }),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<PlugweaveConfig, ConfigError> {
        PlugweaveConfig::from_toml_str(text, Path::new("plugweave.toml"))
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").expect("empty config should parse");

        assert_eq!(config, PlugweaveConfig::default());
        assert_eq!(config.templates.extension, "razor");
        assert_eq!(config.templates.container_folders.len(), 5);
        assert_eq!(config.output.file, "plugweave.rs");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
            [templates]
            extension = ".cshtml"
            container_folders = ["Widgets"]

            [output]
            report_notes = true
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.templates.extension, "cshtml");
        assert_eq!(config.templates.container_folders, vec!["Widgets"]);
        assert_eq!(config.templates.anchor_suffixes, vec![".Plugin"]);
        assert!(config.output.report_notes);
        assert_eq!(config.discovery.source_dir, PathBuf::from("src"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("[templates]\nextensions = \"razor\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            parse("[templates]\nextension = \" . \"\n"),
            Err(ConfigError::Invalid {
                key: "templates.extension",
                ..
            })
        ));
        assert!(matches!(
            parse("[output]\nfile = \"nested/out.rs\"\n"),
            Err(ConfigError::Invalid {
                key: "output.file",
                ..
            })
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).expect("missing file should not error");

        assert_eq!(config, PlugweaveConfig::default());
    }

    #[test]
    fn file_next_to_manifest_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(path, "[output]\nfile = \"registry.rs\"\n").unwrap();

        let config = load_config(dir.path()).expect("config should load");

        assert_eq!(config.output.file, "registry.rs");
        assert_eq!(config.templates.extension, "razor");
    }
}
