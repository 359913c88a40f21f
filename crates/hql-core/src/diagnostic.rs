//! Diagnostic types for structured error reporting.
//!
//! Every user-facing finding in the query pipeline (lexical, syntactic and
//! semantic failures, plus soft warnings such as unresolved references) can
//! be rendered as a [`Diagnostic`] carrying a stable [`DiagnosticCode`], a
//! [`Severity`], a human-readable message, the [`Span`] it refers to, and
//! supplementary notes. A [`DiagnosticReport`] collects them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// Stable codes for query diagnostics.
///
/// Error codes are prefixed `E_HQL_`, warning codes `W_HQL_`.
///
/// # Example
///
/// ```
/// use hql_core::DiagnosticCode;
///
/// let code = DiagnosticCode::UnknownField;
/// assert_eq!(format!("{code}"), "E_HQL_UNKNOWN_FIELD");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DiagnosticCode {
    /// A character outside the lexical alphabet.
    IllegalCharacter,
    /// A string literal without its closing quote.
    UnterminatedString,
    /// The query exceeds the configured byte limit.
    QueryTooLong,
    /// A token the grammar does not allow at this position.
    UnexpectedToken,
    /// A group, range or collection opened but never closed (or vice versa).
    UnbalancedGroup,
    /// Grouping or negation nested beyond the configured depth.
    NestingTooDeep,
    /// A field name the dialect does not declare.
    UnknownField,
    /// A bare value in a dialect without a default field.
    NoDefaultField,
    /// An operator the field's type does not permit.
    IncompatibleOperator,
    /// A value that cannot be coerced to the field's type.
    TypeMismatch,
    /// A range whose bounds select nothing.
    InvalidRange,
    /// The requested dialect is not registered.
    UnknownDialect,
    /// A string escape for a character that needs no escaping.
    UnnecessaryEscape,
    /// A reference value that matched nothing in the vocabulary.
    UnresolvedReference,
}

impl DiagnosticCode {
    /// Returns the stable textual form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IllegalCharacter => "E_HQL_ILLEGAL_CHARACTER",
            Self::UnterminatedString => "E_HQL_UNTERMINATED_STRING",
            Self::QueryTooLong => "E_HQL_QUERY_TOO_LONG",
            Self::UnexpectedToken => "E_HQL_UNEXPECTED_TOKEN",
            Self::UnbalancedGroup => "E_HQL_UNBALANCED_GROUP",
            Self::NestingTooDeep => "E_HQL_NESTING_TOO_DEEP",
            Self::UnknownField => "E_HQL_UNKNOWN_FIELD",
            Self::NoDefaultField => "E_HQL_NO_DEFAULT_FIELD",
            Self::IncompatibleOperator => "E_HQL_INCOMPATIBLE_OPERATOR",
            Self::TypeMismatch => "E_HQL_TYPE_MISMATCH",
            Self::InvalidRange => "E_HQL_INVALID_RANGE",
            Self::UnknownDialect => "E_HQL_UNKNOWN_DIALECT",
            Self::UnnecessaryEscape => "W_HQL_UNNECESSARY_ESCAPE",
            Self::UnresolvedReference => "W_HQL_UNRESOLVED_REFERENCE",
        }
    }

    /// Returns the severity this code is always reported with.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::UnnecessaryEscape | Self::UnresolvedReference => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Compilation cannot produce a predicate.
    Error,
    /// Compilation succeeded; the caller may surface the finding.
    Warning,
}

/// A single diagnostic entry.
///
/// # Example
///
/// ```
/// use hql_core::{Diagnostic, DiagnosticCode, Severity, Span};
///
/// let diag = Diagnostic::new(
///     DiagnosticCode::UnresolvedReference,
///     String::from("tag 'doesnotexist' matches nothing"),
///     Span::new(4, 16),
///     vec![],
/// );
/// assert_eq!(diag.severity(), Severity::Warning);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The stable code.
    code: DiagnosticCode,
    /// A human-readable description of the problem.
    message: String,
    /// The offending range of the query text.
    span: Span,
    /// Additional notes providing context or suggestions.
    notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub const fn new(code: DiagnosticCode, message: String, span: Span, notes: Vec<String>) -> Self {
        Self {
            code,
            message,
            span,
            notes,
        }
    }

    /// Returns the diagnostic code.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        self.code
    }

    /// Returns the severity implied by the code.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the source span.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the supplementary notes.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at {}..{}",
            self.code,
            self.message,
            self.span.start(),
            self.span.end()
        )
    }
}

/// Summarises the first diagnostic in a report for the `Display` impl.
fn diagnostic_summary(diagnostics: &[Diagnostic]) -> String {
    diagnostics.first().map_or_else(
        || String::from("empty diagnostic report"),
        |d| format!("{}: {}", d.code, d.message),
    )
}

/// A collection of diagnostics produced by one compilation.
///
/// Used as the error type when a compilation is turned into a `Result`.
///
/// # Example
///
/// ```
/// use hql_core::{Diagnostic, DiagnosticCode, DiagnosticReport, Span};
///
/// let report = DiagnosticReport::new(vec![Diagnostic::new(
///     DiagnosticCode::UnknownField,
///     String::from("unknown field 'bogus'"),
///     Span::new(0, 5),
///     vec![],
/// )]);
/// assert_eq!(report.to_string(), "E_HQL_UNKNOWN_FIELD: unknown field 'bogus'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", diagnostic_summary(&self.diagnostics))]
pub struct DiagnosticReport {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    /// Creates a report from a vector of diagnostics.
    #[must_use]
    pub const fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Returns the diagnostics in this report.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns the diagnostics with [`Severity::Error`].
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Error)
    }

    /// Returns `true` if the report contains no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}
