//! Error adapter for converting [`LanewiseError`] to miette diagnostics.
//!
//! An [`LanewiseError::InvalidTable`] error carries one table diagnostic per
//! problem found; each is rendered as its own report. Every other error is
//! rendered as a single report.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, Severity as MietteSeverity};

use lanewise::{
    LanewiseError,
    diagnostic::{Diagnostic, Severity},
};

/// Adapter for a single table diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic) -> Self {
        Self { diag }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.diag.step() {
            Some(step) => write!(f, "{} (step `{step}`)", self.diag.message()),
            None => write!(f, "{}", self.diag.message()),
        }
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }
}

/// Adapter for [`LanewiseError`] variants without table diagnostics.
pub struct ErrorAdapter<'a>(pub &'a LanewiseError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            LanewiseError::Io(_) => "lanewise::io",
            LanewiseError::Table(_) => "lanewise::table",
            LanewiseError::EmptyTable => "lanewise::empty_table",
            LanewiseError::InvalidTable(_) => "lanewise::invalid_table",
            LanewiseError::Export(_) => "lanewise::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            LanewiseError::Table(_) => {
                "expected a JSON array of steps, or an object with a `rows` array"
            }
            LanewiseError::EmptyTable => "add at least one step to the table",
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A table diagnostic.
    Diagnostic(DiagnosticAdapter<'a>),
    /// Any other error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }
}

/// Convert a [`LanewiseError`] into a list of reportable errors.
///
/// [`LanewiseError::InvalidTable`] yields one [`Reportable`] per diagnostic;
/// other variants yield a single one.
pub fn to_reportables(err: &LanewiseError) -> Vec<Reportable<'_>> {
    match err {
        LanewiseError::InvalidTable(diagnostics) if !diagnostics.is_empty() => diagnostics
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use lanewise::diagnostic::DiagnosticCode;

    use super::*;

    #[test]
    fn test_invalid_table_yields_one_report_per_diagnostic() {
        let err = LanewiseError::InvalidTable(vec![
            Diagnostic::error("duplicate id `a`")
                .with_code(DiagnosticCode::E002)
                .with_step("a"),
            Diagnostic::error("empty id").with_code(DiagnosticCode::E001),
        ]);

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "duplicate id `a` (step `a`)");
        assert_eq!(reportables[1].to_string(), "empty id");
        let code = reportables[0].code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("E002"));
    }

    #[test]
    fn test_other_errors_yield_a_single_report() {
        let err = LanewiseError::EmptyTable;

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert!(e.to_string().contains("Nothing to lay out"));
                let code = e.code().map(|c| c.to_string());
                assert_eq!(code.as_deref(), Some("lanewise::empty_table"));
                assert!(e.help().is_some());
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_severity_is_forwarded() {
        let diag = Diagnostic::warning("gateway without condition")
            .with_code(DiagnosticCode::W102)
            .with_help("add the question the gateway decides");
        let adapter = DiagnosticAdapter::new(&diag);

        assert_eq!(adapter.severity(), Some(MietteSeverity::Warning));
        let help = adapter.help().map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("add the question the gateway decides"));
    }
}
