//! Diagnostics and the crate-wide error type.

use std::fmt;
use std::io;

use crate::location::Span;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DiagnosticKind {
    /// Malformed token (e.g. an unterminated comment).
    Lexical,
    /// Unexpected token for the current statement.
    Syntax,
    /// Well-formed statement with illegal content: redefinition, undefined
    /// name, arity mismatch, bad pattern character, unsuitable cell.
    Semantic,
    /// Incomplete network detected by `wrap_up`.
    Structural,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

/// One message raised while reading or validating a network.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// File name (or a placeholder for in-memory sources).
    pub source: String,
    pub span: Option<Span>,
    /// Short stable message code, e.g. `MLTDEF01`.
    pub label: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, source: &str, span: Option<Span>, label: &'static str, message: String) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            source: source.to_string(),
            span,
            label,
            message,
        }
    }

    pub fn warning(kind: DiagnosticKind, source: &str, span: Option<Span>, label: &'static str, message: String) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            source: source.to_string(),
            span,
            label,
            message,
        }
    }

    pub fn structural(message: String) -> Self {
        Self::error(DiagnosticKind::Structural, "", None, "STRUCT01", message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Emits this diagnostic through the `log` facade.
    pub(crate) fn log(&self) {
        match self.severity {
            Severity::Warning => log::warn!("{}", self),
            Severity::Error => log::error!("{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.source.is_empty() {
            write!(f, "{}:", self.source)?;
        }
        if let Some(span) = self.span {
            write!(f, "{}:", span)?;
        }
        if !self.source.is_empty() || self.span.is_some() {
            write!(f, " ")?;
        }
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{} [{}] {}", severity, self.label, self.message)
    }
}

#[derive(Debug)]
pub enum Error {
    /// File I/O error.
    Io(io::Error),
    /// The reader failed; carries every error diagnostic it raised.
    Parse(Vec<Diagnostic>),
    /// `wrap_up` found an incomplete network; one diagnostic per defect.
    Structural(Vec<Diagnostic>),
    /// A back end was handed a network that has not passed `wrap_up`.
    NotSane,
    /// A handler or back end rejected its input.
    Handler(String),
}

impl Error {
    /// All diagnostics attached to this error (empty for I/O and handler errors).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Parse(diags) | Error::Structural(diags) => diags,
            Error::Io(_) | Error::NotSane | Error::Handler(_) => &[],
        }
    }

    /// Returns `true` if some attached diagnostic carries the given label.
    pub fn has_label(&self, label: &str) -> bool {
        self.diagnostics().iter().any(|d| d.label == label)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Parse(diags) => {
                write!(f, "Parse error")?;
                if let Some(first) = diags.first() {
                    write!(f, ": {}", first)?;
                    if diags.len() > 1 {
                        write!(f, " (and {} more)", diags.len() - 1)?;
                    }
                }
                Ok(())
            }
            Error::Structural(diags) => {
                write!(f, "Network is not sane: {} defect(s)", diags.len())?;
                if let Some(first) = diags.first() {
                    write!(f, ", first: {}", first.message)?;
                }
                Ok(())
            }
            Error::NotSane => write!(f, "Network is not sane, call wrap_up() first"),
            Error::Handler(msg) => write!(f, "Handler error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Loc;
    use test_log::test;

    #[test]
    fn test_diagnostic_display() {
        let span = Span::point(Loc::new(4, 2));
        let d = Diagnostic::error(DiagnosticKind::Semantic, "a.blif", Some(span), "MLTDEF01", "x: Defined more than once.".into());
        assert_eq!(d.to_string(), "a.blif:4:2: error [MLTDEF01] x: Defined more than once.");
        let w = Diagnostic::warning(DiagnosticKind::Syntax, "", None, "SYN99", "ignored".into());
        assert_eq!(w.to_string(), "warning [SYN99] ignored");
        assert!(d.is_error());
        assert!(!w.is_error());
    }

    #[test]
    fn test_error_labels() {
        let err = Error::Parse(vec![Diagnostic::error(DiagnosticKind::Semantic, "", None, "UNDEF01", "y: Undefined.".into())]);
        assert!(err.has_label("UNDEF01"));
        assert!(!err.has_label("SYN01"));
        assert!(err.to_string().contains("UNDEF01"));
        let io = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(io.diagnostics().is_empty());
    }
}
