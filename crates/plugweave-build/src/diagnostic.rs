//! Low-severity findings threaded through a generation pass.
//!
//! Nothing here aborts the pass. Reporting is optional and injected by the
//! caller through a `DiagnosticSink`.

use std::fmt;

///
/// Severity
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Note,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Note => "note",
            Self::Warning => "warning",
        })
    }
}

///
/// DiagnosticKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DiagnosticKind {
    /// A directive was present but one of its values could not be read.
    MalformedDirective,

    /// A directive was present but superseded by an earlier one.
    IgnoredDirective,

    /// More than one plugin shares one module's component pool.
    AmbiguousOwnership,

    /// Components were found in a module that declares no plugin.
    OrphanComponents,

    /// A type implements the service registrar contract but not the plugin one.
    RegistrarWithoutPlugin,

    /// A source file could not be parsed and was skipped.
    UnparsedSource,

    /// A template file is not valid UTF-8 and was skipped.
    UnreadableTemplate,
}

///
/// Diagnostic
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.location, self.message)
    }
}

///
/// Diagnostics
///
/// Append-only list; order is the order findings were made.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(
        &mut self,
        kind: DiagnosticKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Severity::Note, kind, location.into(), message.into());
    }

    pub fn warn(
        &mut self,
        kind: DiagnosticKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Severity::Warning, kind, location.into(), message.into());
    }

    fn push(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        location: String,
        message: String,
    ) {
        self.items.push(Diagnostic {
            severity,
            kind,
            location,
            message,
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Warning)
    }

    /// Hand every diagnostic to `sink`, in order.
    pub fn report(&self, sink: &dyn DiagnosticSink) {
        for diagnostic in &self.items {
            sink.on_diagnostic(diagnostic);
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

///
/// DiagnosticSink
///

pub trait DiagnosticSink {
    fn on_diagnostic(&self, diagnostic: &Diagnostic);
}

///
/// CargoSink
///
/// Build-script sink: warnings become `cargo:warning=` lines, notes only
/// when `report_notes` is set.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CargoSink {
    pub report_notes: bool,
}

impl CargoSink {
    #[must_use]
    pub const fn new(report_notes: bool) -> Self {
        Self { report_notes }
    }

    #[must_use]
    pub fn render(&self, diagnostic: &Diagnostic) -> Option<String> {
        if diagnostic.severity == Severity::Note && !self.report_notes {
            return None;
        }

        // cargo reads one directive per line
        let text = diagnostic.to_string().replace(['\r', '\n'], " ");

        Some(format!("cargo:warning=plugweave {text}"))
    }
}

impl DiagnosticSink for CargoSink {
    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        if let Some(line) = self.render(diagnostic) {
            println!("{line}");
        }
    }
}

///
/// TESTS
///
