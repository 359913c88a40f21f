//! The backend-neutral predicate tree handed to the storage layer.
//!
//! Predicates are built through the folding constructors
//! [`Predicate::all`], [`Predicate::any`] and [`Predicate::negate`], which
//! keep trees minimal: nested conjunctions and disjunctions are flattened,
//! identity elements are dropped, absorbing elements collapse the node, and
//! double negation cancels.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::span::Span;

/// Relation between a field and a value in a leaf predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Strictly greater.
    Gt,
    /// Greater or equal.
    Ge,
    /// Strictly less.
    Lt,
    /// Less or equal.
    Le,
    /// Pattern match.
    Match,
}

impl Comparison {
    /// Returns the symbol used when rendering.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Match => "~",
        }
    }
}

/// A typed operand in a leaf predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateValue {
    /// A resolved vocabulary entity.
    Reference {
        /// Entity identifier.
        id: u64,
        /// Canonical name.
        canonical: String,
    },
    /// Free text.
    Text(String),
    /// A signed integer (sizes are in bytes).
    Integer(i64),
    /// A calendar date.
    Date(Date),
    /// A canonical enum value.
    Enum(String),
    /// A truth value.
    Boolean(bool),
}

impl fmt::Display for PredicateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference { id, canonical } => write!(f, "#{id}({canonical})"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Date(date) => write!(f, "{date}"),
            Self::Enum(value) => f.write_str(value),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// A leaf comparison between one field and one value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPredicate {
    field: String,
    comparison: Comparison,
    value: PredicateValue,
    span: Span,
}

impl FieldPredicate {
    /// Creates a leaf predicate.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        comparison: Comparison,
        value: PredicateValue,
        span: Span,
    ) -> Self {
        Self {
            field: field.into(),
            comparison,
            value,
            span,
        }
    }

    /// Returns the canonical field key.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the comparison.
    #[must_use]
    pub const fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Returns the operand.
    #[must_use]
    pub const fn value(&self) -> &PredicateValue {
        &self.value
    }

    /// Returns the span of the filter this leaf was lowered from.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }
}

/// A boolean filter tree.
///
/// Source provenance lives on the leaves: every [`FieldPredicate`] keeps the
/// span of the filter it was lowered from. Folding merges and removes
/// composite nodes, so `Not`, `And` and `Or` carry no span of their own;
/// [`Predicate::span`] derives one from the leaves beneath them.
///
/// # Example
///
/// ```
/// use hql_core::Predicate;
///
/// assert_eq!(Predicate::all([]), Predicate::Always);
/// assert_eq!(Predicate::any([]), Predicate::Never);
/// assert_eq!(Predicate::Always.negate(), Predicate::Never);
/// assert_eq!(
///     Predicate::all([Predicate::Always, Predicate::Never]),
///     Predicate::Never
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every row.
    Always,
    /// Matches no row.
    Never,
    /// A single field comparison.
    Field(FieldPredicate),
    /// Negation.
    Not(Box<Predicate>),
    /// Conjunction of two or more children.
    And(Vec<Predicate>),
    /// Disjunction of two or more children.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Builds a folded conjunction.
    #[must_use]
    pub fn all(children: impl IntoIterator<Item = Self>) -> Self {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Self::Always => {}
                Self::Never => return Self::Never,
                Self::And(grandchildren) => flat.extend(grandchildren),
                other => flat.push(other),
            }
        }
        Self::collapse(flat, Self::Always, Self::And)
    }

    /// Builds a folded disjunction.
    #[must_use]
    pub fn any(children: impl IntoIterator<Item = Self>) -> Self {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Self::Never => {}
                Self::Always => return Self::Always,
                Self::Or(grandchildren) => flat.extend(grandchildren),
                other => flat.push(other),
            }
        }
        Self::collapse(flat, Self::Never, Self::Or)
    }

    /// Builds a folded negation.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Always => Self::Never,
            Self::Never => Self::Always,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    fn collapse(mut flat: Vec<Self>, empty: Self, build: fn(Vec<Self>) -> Self) -> Self {
        match flat.len() {
            0 => empty,
            1 => flat.pop().unwrap_or(empty),
            _ => build(flat),
        }
    }

    /// Returns the smallest source range covering every leaf, or `None`
    /// for a constant.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Always | Self::Never => None,
            Self::Field(leaf) => Some(leaf.span),
            Self::Not(inner) => inner.span(),
            Self::And(children) | Self::Or(children) => {
                children.iter().filter_map(Self::span).reduce(Span::cover)
            }
        }
    }

    /// Returns `true` for [`Predicate::Always`].
    #[must_use]
    pub const fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }

    /// Returns `true` for [`Predicate::Never`].
    #[must_use]
    pub const fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("ALWAYS"),
            Self::Never => f.write_str("NEVER"),
            Self::Field(leaf) => write!(
                f,
                "{} {} {}",
                leaf.field,
                leaf.comparison.symbol(),
                leaf.value
            ),
            Self::Not(inner) => write!(f, "NOT {inner}"),
            Self::And(children) => write_joined(f, children, " AND "),
            Self::Or(children) => write_joined(f, children, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Predicate], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    for (position, child) in children.iter().enumerate() {
        if position > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}
