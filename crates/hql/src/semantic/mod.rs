//! Semantic analysis: checking a syntax tree against a dialect.
//!
//! [`analyze`] walks the syntax tree once. Field names are looked up in the
//! dialect, operators are checked against the field's whitelist, literal
//! values are coerced to the field's declared type and reference values are
//! resolved through the caller's [`VocabularyLookup`](hql_core::VocabularyLookup).
//!
//! Structural problems abort with a [`SemanticError`]. A reference that the
//! vocabulary does not know is *not* an error: it is kept as an unresolved
//! operand so both translators can still consume the tree.

mod analyzer;
mod coerce;

use hql_core::{Diagnostic, DiagnosticCode, Operator, Resolution, Span, ValueType};
use thiserror::Error;
use time::Date;

pub use analyzer::analyze;

/// A node of the semantic tree.
///
/// The shape mirrors the syntax tree it was built from, node for node, so
/// every semantic node keeps the span of its syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticNode {
    kind: SemanticKind,
    span: Span,
}

impl SemanticNode {
    /// Creates a node.
    #[must_use]
    pub const fn new(kind: SemanticKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the node variant.
    #[must_use]
    pub const fn kind(&self) -> &SemanticKind {
        &self.kind
    }

    /// Returns the covered range.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns every filter in the tree, in source order.
    #[must_use]
    pub fn filters(&self) -> Vec<&Filter> {
        let mut found = Vec::new();
        self.collect_filters(&mut found);
        found
    }

    fn collect_filters<'node>(&'node self, found: &mut Vec<&'node Filter>) {
        match &self.kind {
            SemanticKind::Filter(filter) => found.push(filter),
            SemanticKind::Not(child) | SemanticKind::Group(child) => child.collect_filters(found),
            SemanticKind::And(children) | SemanticKind::Or(children) => {
                for child in children {
                    child.collect_filters(found);
                }
            }
        }
    }
}

/// The variants of [`SemanticNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticKind {
    /// A checked field filter; bare values and flags become filters too.
    Filter(Filter),
    /// Negation.
    Not(Box<SemanticNode>),
    /// Conjunction; may be empty.
    And(Vec<SemanticNode>),
    /// Disjunction.
    Or(Vec<SemanticNode>),
    /// A parenthesised sub-expression.
    Group(Box<SemanticNode>),
}

/// A field filter bound to its dialect field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    field: String,
    value_type: ValueType,
    operator: Operator,
    name_span: Option<Span>,
    operator_span: Option<Span>,
    value: TypedValue,
    span: Span,
}

impl Filter {
    /// Creates a filter.
    #[must_use]
    pub const fn new(
        field: String,
        value_type: ValueType,
        operator: Operator,
        value: TypedValue,
        span: Span,
    ) -> Self {
        Self {
            field,
            value_type,
            operator,
            name_span: None,
            operator_span: None,
            value,
            span,
        }
    }

    /// Records where the field name and operator were written.
    #[must_use]
    pub const fn with_source(mut self, name_span: Option<Span>, operator_span: Option<Span>) -> Self {
        self.name_span = name_span;
        self.operator_span = operator_span;
        self
    }

    /// Returns the canonical field key, whatever alias was written.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the field's declared type.
    #[must_use]
    pub const fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Returns the operator. Bare values use `:`; flags use `=`.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the range of the written field name, if there is one.
    #[must_use]
    pub const fn name_span(&self) -> Option<Span> {
        self.name_span
    }

    /// Returns the range of the written operator, if there is one.
    #[must_use]
    pub const fn operator_span(&self) -> Option<Span> {
        self.operator_span
    }

    /// Returns the coerced value.
    #[must_use]
    pub const fn value(&self) -> &TypedValue {
        &self.value
    }

    /// Returns the range of the whole filter.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns every operand of the value, in source order.
    #[must_use]
    pub fn operands(&self) -> Vec<&Operand> {
        let mut found = Vec::new();
        self.value.collect_operands(&mut found);
        found
    }
}

/// A value coerced to its field's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// One operand.
    Single(Operand),
    /// Two bounds.
    Range(TypedRange),
    /// Members of a collection; matches when any member matches.
    Any(Vec<TypedValue>),
}

impl TypedValue {
    fn collect_operands<'value>(&'value self, found: &mut Vec<&'value Operand>) {
        match self {
            Self::Single(operand) => found.push(operand),
            Self::Range(range) => {
                found.push(&range.lower);
                found.push(&range.upper);
            }
            Self::Any(members) => {
                for member in members {
                    member.collect_operands(found);
                }
            }
        }
    }

    /// Returns every range inside the value.
    #[must_use]
    pub fn ranges(&self) -> Vec<&TypedRange> {
        match self {
            Self::Single(_) => Vec::new(),
            Self::Range(range) => vec![range],
            Self::Any(members) => members.iter().flat_map(Self::ranges).collect(),
        }
    }
}

/// A checked, non-empty range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedRange {
    lower: Operand,
    upper: Operand,
    lower_inclusive: bool,
    upper_inclusive: bool,
}

impl TypedRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(
        lower: Operand,
        upper: Operand,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Self {
        Self {
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        }
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn lower(&self) -> &Operand {
        &self.lower
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn upper(&self) -> &Operand {
        &self.upper
    }

    /// Returns `true` if the lower bound is included.
    #[must_use]
    pub const fn lower_inclusive(&self) -> bool {
        self.lower_inclusive
    }

    /// Returns `true` if the upper bound is included.
    #[must_use]
    pub const fn upper_inclusive(&self) -> bool {
        self.upper_inclusive
    }

    /// Returns the gap between the two bounds, where a dash sits.
    #[must_use]
    pub const fn gap(&self) -> Span {
        Span::new(self.lower.span.end(), self.upper.span.start())
    }
}

/// One coerced literal together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    text: String,
    value: ScalarValue,
    span: Span,
    exact: bool,
}

impl Operand {
    /// Creates an operand.
    #[must_use]
    pub const fn new(text: String, value: ScalarValue, span: Span, exact: bool) -> Self {
        Self {
            text,
            value,
            span,
            exact,
        }
    }

    /// Returns the literal text as written (strings decoded).
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the coerced value.
    #[must_use]
    pub const fn value(&self) -> &ScalarValue {
        &self.value
    }

    /// Returns the literal's range.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns `true` for a backtick literal.
    #[must_use]
    pub const fn is_exact(&self) -> bool {
        self.exact
    }

    /// Returns the resolution outcome for reference operands.
    #[must_use]
    pub const fn resolution(&self) -> Option<&Resolution> {
        match &self.value {
            ScalarValue::Reference(resolution) => Some(resolution),
            _ => None,
        }
    }
}

/// A literal coerced to a value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    /// Text for string fields.
    Text(String),
    /// A number; sizes are in bytes.
    Integer(i64),
    /// A calendar date.
    Date(Date),
    /// The canonical spelling of an enum value.
    Enum(String),
    /// A truth value.
    Boolean(bool),
    /// The vocabulary's answer for a reference field.
    Reference(Resolution),
}

/// A fatal semantic error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct SemanticError {
    span: Span,
    kind: SemanticErrorKind,
    notes: Vec<String>,
}

impl SemanticError {
    /// Creates an error.
    #[must_use]
    pub const fn new(span: Span, kind: SemanticErrorKind) -> Self {
        Self {
            span,
            kind,
            notes: Vec::new(),
        }
    }

    /// Attaches supplementary notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl IntoIterator<Item = String>) -> Self {
        self.notes.extend(notes);
        self
    }

    /// Returns the offending range.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> &SemanticErrorKind {
        &self.kind
    }

    /// Returns the supplementary notes.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Returns the stable diagnostic code.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self.kind {
            SemanticErrorKind::UnknownField { .. } => DiagnosticCode::UnknownField,
            SemanticErrorKind::NoDefaultField { .. } => DiagnosticCode::NoDefaultField,
            SemanticErrorKind::IncompatibleOperator { .. } => DiagnosticCode::IncompatibleOperator,
            SemanticErrorKind::TypeMismatch { .. } => DiagnosticCode::TypeMismatch,
            SemanticErrorKind::InvalidRange { .. } => DiagnosticCode::InvalidRange,
        }
    }

    /// Converts the error into a diagnostic.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(
            self.code(),
            self.kind.to_string(),
            self.span,
            self.notes.clone(),
        )
    }
}

/// Why semantic analysis failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticErrorKind {
    /// The field is not declared by the dialect.
    #[error("unknown field '{field}'")]
    UnknownField {
        /// The field name as written.
        field: String,
    },

    /// A bare value was given but the dialect has no default field.
    #[error("dialect '{dialect}' has no default field for bare values")]
    NoDefaultField {
        /// The dialect in use.
        dialect: String,
    },

    /// The operator is not permitted for the field.
    #[error("field '{field}' does not accept '{operator}'")]
    IncompatibleOperator {
        /// Canonical field key.
        field: String,
        /// The rejected operator.
        operator: Operator,
    },

    /// The value cannot be read as the field's type.
    #[error("field '{field}' expects {expected}, found {found}")]
    TypeMismatch {
        /// Canonical field key.
        field: String,
        /// What the field accepts.
        expected: String,
        /// What was written.
        found: String,
    },

    /// The range admits no value.
    #[error("range '{lower}' to '{upper}' for field '{field}' is empty")]
    InvalidRange {
        /// Canonical field key.
        field: String,
        /// The lower bound as written.
        lower: String,
        /// The upper bound as written.
        upper: String,
    },
}
