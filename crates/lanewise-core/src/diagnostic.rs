//! Diagnostics reported while turning a table into a diagram.
//!
//! Lanewise tolerates imperfect tables: most problems (a dangling successor
//! reference, a gateway without a question) are reported as warnings and the
//! diagram is still produced. Only problems that make the table ambiguous,
//! such as duplicate ids, are errors.
//!
//! # Example
//!
//! ```
//! # use lanewise_core::diagnostic::{Diagnostic, DiagnosticCode};
//! let diag = Diagnostic::warning("successor `x` does not exist")
//!     .with_code(DiagnosticCode::W100)
//!     .with_step("task_1")
//!     .with_help("fix the reference or remove it");
//!
//! assert!(diag.severity().is_warning());
//! assert_eq!(diag.step(), Some("task_1"));
//! ```

use std::fmt;

use serde::Serialize;

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A fatal problem; generation stops.
    Error,

    /// An advisory problem; generation continues.
    Warning,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Codes for categorizing diagnostics.
///
/// - `E0xx` - Table errors
/// - `W1xx` - Table warnings
/// - `E3xx` - Export errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    // =========================================================================
    // Table Errors (E0xx)
    // =========================================================================
    /// Empty step id.
    E001,

    /// Duplicate step id.
    ///
    /// Two rows share the same id, so references to it are ambiguous.
    E002,

    // =========================================================================
    // Table Warnings (W1xx)
    // =========================================================================
    /// Dangling successor reference.
    ///
    /// A `next_on_yes`/`next_on_no` value names a step that does not exist.
    /// The transition is dropped from the diagram.
    W100,

    /// "No" branch on a step that is not a gateway. It is ignored.
    W101,

    /// Gateway without a condition.
    W102,

    /// Gateway with fewer than two branches.
    W103,

    /// No start event in the table.
    W104,

    /// No end event in the table.
    W105,

    /// Step not reachable from any start event.
    W106,

    /// End event with a successor. Layering never follows it.
    W107,

    // =========================================================================
    // Export Errors (E3xx)
    // =========================================================================
    /// A transition has no routed path, so no diagram edge was written for it.
    E300,
}

impl DiagnosticCode {
    /// Returns a short description of the code.
    pub fn description(self) -> &'static str {
        match self {
            DiagnosticCode::E001 => "empty step id",
            DiagnosticCode::E002 => "duplicate step id",
            DiagnosticCode::W100 => "dangling successor reference",
            DiagnosticCode::W101 => "\"no\" branch on a non-gateway step",
            DiagnosticCode::W102 => "gateway without condition",
            DiagnosticCode::W103 => "gateway with a single branch",
            DiagnosticCode::W104 => "missing start event",
            DiagnosticCode::W105 => "missing end event",
            DiagnosticCode::W106 => "unreachable step",
            DiagnosticCode::W107 => "successor on an end event",
            DiagnosticCode::E300 => "missing routed path",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single error or warning about the table or the generated diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<DiagnosticCode>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            step: None,
            help: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach the id of the step the diagnostic is about.
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<DiagnosticCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn step(&self) -> Option<&str> {
        self.step.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.severity, code, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }
        if let Some(step) = &self.step {
            write!(f, " (step `{step}`)")?;
        }
        Ok(())
    }
}
