//! Syntax tree produced by the parser.
//!
//! The tree is purely syntactic: field names are kept as written and values
//! keep their raw shape (scalar, range or collection). Every node carries
//! the span of the source text it covers; a child's span always lies inside
//! its parent's and sibling spans never overlap.

use hql_core::{Operator, Span};
use serde::Serialize;

use crate::lexer::QuoteStyle;

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxNode {
    kind: SyntaxKind,
    span: Span,
}

impl SyntaxNode {
    /// Creates a node.
    #[must_use]
    pub const fn new(kind: SyntaxKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the node variant.
    #[must_use]
    pub const fn kind(&self) -> &SyntaxKind {
        &self.kind
    }

    /// Returns the covered range.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the direct children in source order.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match &self.kind {
            SyntaxKind::Literal(_) | SyntaxKind::FieldFilter(_) => Vec::new(),
            SyntaxKind::Not(child) | SyntaxKind::Group(child) => vec![child.as_ref()],
            SyntaxKind::And(children) | SyntaxKind::Or(children) => children.iter().collect(),
        }
    }
}

/// The variants of [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxKind {
    /// A bare value matched against the dialect's default field.
    Literal(Value),
    /// `field OP value`.
    FieldFilter(FieldFilter),
    /// Negation by `-`, `!` or `NOT`.
    Not(Box<SyntaxNode>),
    /// Two or more operands joined by juxtaposition, `AND` or `&`.
    And(Vec<SyntaxNode>),
    /// Two or more operands joined by `OR` or `|`.
    Or(Vec<SyntaxNode>),
    /// A parenthesised sub-expression.
    Group(Box<SyntaxNode>),
}

/// An explicit field filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFilter {
    field: String,
    field_span: Span,
    operator: Operator,
    operator_span: Span,
    value: Value,
}

impl FieldFilter {
    /// Creates a field filter.
    #[must_use]
    pub const fn new(
        field: String,
        field_span: Span,
        operator: Operator,
        operator_span: Span,
        value: Value,
    ) -> Self {
        Self {
            field,
            field_span,
            operator,
            operator_span,
            value,
        }
    }

    /// Returns the field name as written.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the range of the field name.
    #[must_use]
    pub const fn field_span(&self) -> Span {
        self.field_span
    }

    /// Returns the filter operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the range of the operator token.
    #[must_use]
    pub const fn operator_span(&self) -> Span {
        self.operator_span
    }

    /// Returns the value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

/// A value in one of its syntactic shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    shape: ValueShape,
    span: Span,
}

impl Value {
    /// Creates a value.
    #[must_use]
    pub const fn new(shape: ValueShape, span: Span) -> Self {
        Self { shape, span }
    }

    /// Returns the shape.
    #[must_use]
    pub const fn shape(&self) -> &ValueShape {
        &self.shape
    }

    /// Returns the covered range.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }
}

/// The shapes a value can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// A single word or string.
    Scalar(Scalar),
    /// Two bounds.
    Range(RangeValue),
    /// `{a, b, …}`; elements are scalars or ranges.
    Collection(Vec<Value>),
}

/// A single word or string literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scalar {
    text: String,
    quote: Option<QuoteStyle>,
    span: Span,
}

impl Scalar {
    /// Creates a scalar.
    #[must_use]
    pub const fn new(text: String, quote: Option<QuoteStyle>, span: Span) -> Self {
        Self { text, quote, span }
    }

    /// Returns the text: the word as written or the decoded string.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the quote style, or `None` for a bare word.
    #[must_use]
    pub const fn quote(&self) -> Option<QuoteStyle> {
        self.quote
    }

    /// Returns `true` for a quoted literal.
    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        self.quote.is_some()
    }

    /// Returns `true` for a backtick literal.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.quote.is_some_and(QuoteStyle::is_exact)
    }

    /// Returns the covered range, quotes included.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }
}

/// How a range was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeForm {
    /// `lo-hi`, both bounds inclusive.
    Dash,
    /// `[lo, hi]`, `(lo, hi)` or a mix.
    Bracket,
}

/// A two-sided range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeValue {
    lower: Scalar,
    upper: Scalar,
    lower_inclusive: bool,
    upper_inclusive: bool,
    form: RangeForm,
    dash_text: Option<String>,
}

impl RangeValue {
    /// Creates a dash range; `text` is the whole word as written.
    #[must_use]
    pub const fn dash(lower: Scalar, upper: Scalar, text: String) -> Self {
        Self {
            lower,
            upper,
            lower_inclusive: true,
            upper_inclusive: true,
            form: RangeForm::Dash,
            dash_text: Some(text),
        }
    }

    /// Creates a bracket range.
    #[must_use]
    pub const fn bracket(
        lower: Scalar,
        upper: Scalar,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Self {
        Self {
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
            form: RangeForm::Bracket,
            dash_text: None,
        }
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn lower(&self) -> &Scalar {
        &self.lower
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn upper(&self) -> &Scalar {
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

    /// Returns how the range was written.
    #[must_use]
    pub const fn form(&self) -> RangeForm {
        self.form
    }

    /// Returns the whole word of a dash range, for fields that read it as
    /// plain text. Bracket ranges have none.
    #[must_use]
    pub fn dash_text(&self) -> Option<&str> {
        self.dash_text.as_deref()
    }
}
