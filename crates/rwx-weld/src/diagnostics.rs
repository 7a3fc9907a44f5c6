//! Error types and diagnostics
//!
//! This module provides the error type shared by every pipeline stage and
//! the diagnostic collector used by the interface analyzer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for rwx-weld operations
pub type WeldResult<T> = Result<T, WeldError>;

/// Main error type for rwx-weld
#[derive(Debug, Error)]
pub enum WeldError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON declaration input could not be decoded
    #[error("Declaration input error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be decoded
    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed declaration data
    #[error("Extraction error in {item}: {message}")]
    Extract { item: String, message: String },

    /// A structural policy edit could not find its target
    #[error("Cannot find '{target}' for module '{module}' to {action}")]
    Resolution {
        module: String,
        target: String,
        action: String,
    },

    /// Custom declaration did not match the accepted grammar
    #[error("Unable to parse custom declaration [{decl}] for class {class}: {message} (at offset {offset})")]
    DeclParse {
        class: String,
        decl: String,
        message: String,
        offset: usize,
    },

    /// Hierarchy cannot be reduced the way the generator needs
    #[error("Hierarchy error for class {class}: {message}")]
    Hierarchy { class: String, message: String },

    /// No director owns the requested class
    #[error("Cannot determine director for class {0}")]
    MissingDirector(String),

    /// A class registry was built twice
    #[error("duplicate interface registry for class {0}")]
    DuplicateRegistry(String),

    /// A class registry was expected but never built
    #[error("missing preprocessed data for class {0}")]
    MissingRegistry(String),

    /// Interface analysis found inconsistencies
    #[error("Errors found generating for module {module} from package {package}:\n{}", .errors.join("\n"))]
    Consistency {
        module: String,
        package: String,
        errors: Vec<String>,
    },

    /// Invalid typemap definition
    #[error("Typemap error: {0}")]
    Typemap(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl WeldError {
    /// Create an extraction error
    pub fn extract(item: impl Into<String>, message: impl Into<String>) -> Self {
        WeldError::Extract {
            item: item.into(),
            message: message.into(),
        }
    }

    /// Create a resolution error
    pub fn resolution(
        module: impl Into<String>,
        target: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        WeldError::Resolution {
            module: module.into(),
            target: target.into(),
            action: action.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        WeldError::Config(message.into())
    }

    /// Create a hierarchy error
    pub fn hierarchy(class: impl Into<String>, message: impl Into<String>) -> Self {
        WeldError::Hierarchy {
            class: class.into(),
            message: message.into(),
        }
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Error - aborts generation of the module
    Error,
    /// Warning - generation continues
    Warning,
    /// Info - informational message
    Info,
}

impl DiagnosticSeverity {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "ERROR",
            DiagnosticSeverity::Warning => "WARNING",
            DiagnosticSeverity::Info => "INFO",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Message
    pub message: String,
    /// Class the diagnostic is about
    pub class: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            class: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Info, message)
    }

    /// Attach the class name
    pub fn for_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        format!("* {}: {}", self.severity.display(), self.message)
    }
}

/// Outcome of an interface analysis run for one module
#[derive(Debug, Default)]
pub struct AnalysisReport {
    diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate the diagnostics of one severity
    pub fn of(&self, severity: DiagnosticSeverity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }

    /// Get error count
    pub fn error_count(&self) -> usize {
        self.of(DiagnosticSeverity::Error).count()
    }

    /// Get warning count
    pub fn warning_count(&self) -> usize {
        self.of(DiagnosticSeverity::Warning).count()
    }

    /// Log warnings, then fail with every collected error if there is any
    pub fn into_result(self, module: &str, package: &str) -> WeldResult<AnalysisReport> {
        for warning in self.of(DiagnosticSeverity::Warning) {
            tracing::warn!(module = %module, "{}", warning.message);
        }
        if !self.has_errors() {
            return Ok(self);
        }
        let errors: Vec<String> = self
            .of(DiagnosticSeverity::Error)
            .map(|d| {
                tracing::error!(module = %module, "{}", d.message);
                d.format()
            })
            .collect();
        Err(WeldError::Consistency {
            module: module.to_string(),
            package: package.to_string(),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error() {
        let err = WeldError::resolution("wxFrame", "wxFrame::Foo", "set only_for [wxmsw]");
        assert!(err.to_string().contains("wxFrame::Foo"));
        assert!(err.to_string().contains("module 'wxFrame'"));
    }

    #[test]
    fn test_diagnostic_format() {
        let diag = Diagnostic::warning("Unnecessary override").for_class("wxFrame");
        assert_eq!(diag.class.as_deref(), Some("wxFrame"));
        assert_eq!(diag.format(), "* WARNING: Unnecessary override");
    }

    #[test]
    fn test_report_collects_all_errors() {
        let mut report = AnalysisReport::new();
        report.add(Diagnostic::error("first"));
        report.add(Diagnostic::warning("meh"));
        report.add(Diagnostic::error("second"));

        assert_eq!(report.error_count(), 2);
        assert_eq!(report.warning_count(), 1);

        match report.into_result("wxFrame", "Wx") {
            Err(WeldError::Consistency { errors, module, .. }) => {
                assert_eq!(module, "wxFrame");
                assert_eq!(errors.len(), 2);
                assert!(errors[1].contains("second"));
            }
            other => panic!("expected consistency error, got {:?}", other),
        }
    }

    #[test]
    fn test_report_without_errors_passes() {
        let mut report = AnalysisReport::new();
        report.add(Diagnostic::warning("only a warning"));
        let report = report.into_result("wxFrame", "Wx").unwrap();
        assert_eq!(report.warning_count(), 1);
    }
}
