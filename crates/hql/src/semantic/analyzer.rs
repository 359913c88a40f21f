//! The syntax tree walk.

use std::cmp::Ordering;

use hql_core::{Dialect, FieldSpec, Operator, Span, ValueType, VocabularyLookup};
use hql_syntax::{FieldFilter, RangeValue, Scalar, SyntaxKind, SyntaxNode, Value, ValueShape};
use tracing::debug;

use super::coerce::{compare, coerce, expectation};
use super::{
    Filter, Operand, ScalarValue, SemanticError, SemanticErrorKind, SemanticKind, SemanticNode,
    TypedRange, TypedValue,
};

const SEMANTIC_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::semantic");

/// Checks `root` against `dialect` and resolves references through
/// `vocabulary`.
///
/// # Errors
///
/// Returns the first [`SemanticError`] found in source order: an unknown
/// field, an operator the field does not permit, a value that cannot be read
/// as the field's type, an empty range, or a bare value in a dialect without
/// a default field. Unresolved references are not errors.
///
/// # Example
///
/// ```
/// use hql::{DialectRegistry, MemoryVocabulary, ReferenceKind, analyze, parse, tokenize};
///
/// let registry = DialectRegistry::builtin()?;
/// let dialect = registry.get("illust").expect("built-in dialect");
/// let mut vocabulary = MemoryVocabulary::new();
/// vocabulary.insert(ReferenceKind::Tag, 1, "landscape");
///
/// let stream = tokenize("tag:landscape width>=1920")?;
/// let tree = parse(stream.tokens())?;
/// let semantic = analyze(&tree, dialect, &vocabulary)?;
/// assert_eq!(semantic.filters().len(), 2);
///
/// let stream = tokenize("bogus:1")?;
/// let tree = parse(stream.tokens())?;
/// assert!(analyze(&tree, dialect, &vocabulary).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn analyze<V>(
    root: &SyntaxNode,
    dialect: &Dialect,
    vocabulary: &V,
) -> Result<SemanticNode, SemanticError>
where
    V: VocabularyLookup + ?Sized,
{
    let analyzer = Analyzer {
        dialect,
        vocabulary,
    };
    let semantic = analyzer.node(root)?;
    debug!(
        target: SEMANTIC_TARGET,
        dialect = dialect.name(),
        filters = semantic.filters().len(),
        "analysed query"
    );
    Ok(semantic)
}

struct Analyzer<'a, V: ?Sized> {
    dialect: &'a Dialect,
    vocabulary: &'a V,
}

impl<V> Analyzer<'_, V>
where
    V: VocabularyLookup + ?Sized,
{
    fn node(&self, node: &SyntaxNode) -> Result<SemanticNode, SemanticError> {
        let span = node.span();
        let kind = match node.kind() {
            SyntaxKind::Literal(value) => SemanticKind::Filter(self.literal(value, span)?),
            SyntaxKind::FieldFilter(filter) => {
                SemanticKind::Filter(self.field_filter(filter, span)?)
            }
            SyntaxKind::Not(child) => SemanticKind::Not(Box::new(self.node(child)?)),
            SyntaxKind::Group(child) => SemanticKind::Group(Box::new(self.node(child)?)),
            SyntaxKind::And(children) => SemanticKind::And(self.nodes(children)?),
            SyntaxKind::Or(children) => SemanticKind::Or(self.nodes(children)?),
        };
        Ok(SemanticNode::new(kind, span))
    }

    fn nodes(&self, children: &[SyntaxNode]) -> Result<Vec<SemanticNode>, SemanticError> {
        children.iter().map(|child| self.node(child)).collect()
    }

    fn literal(&self, value: &Value, span: Span) -> Result<Filter, SemanticError> {
        if let ValueShape::Scalar(scalar) = value.shape()
            && !scalar.is_quoted()
            && let Some(flag) = self.dialect.flag_field(scalar.text())
        {
            let Some(operator) = [Operator::Eq, Operator::Colon]
                .into_iter()
                .find(|candidate| flag.allows(*candidate))
            else {
                return Err(incompatible(flag, Operator::Eq, scalar.span()));
            };
            let operand = Operand::new(
                scalar.text().to_owned(),
                ScalarValue::Boolean(true),
                scalar.span(),
                false,
            );
            let filter = Filter::new(
                flag.key().to_owned(),
                ValueType::Boolean,
                operator,
                TypedValue::Single(operand),
                span,
            );
            return Ok(filter.with_source(Some(scalar.span()), None));
        }

        let Some(spec) = self.dialect.default_field() else {
            return Err(SemanticError::new(
                span,
                SemanticErrorKind::NoDefaultField {
                    dialect: self.dialect.name().to_owned(),
                },
            ));
        };
        let typed = self.value(spec, Operator::Colon, value, value.span())?;
        Ok(Filter::new(
            spec.key().to_owned(),
            spec.value_type().clone(),
            Operator::Colon,
            typed,
            span,
        ))
    }

    fn field_filter(&self, filter: &FieldFilter, span: Span) -> Result<Filter, SemanticError> {
        let Some(spec) = self.dialect.field(filter.field()) else {
            let known: Vec<&str> = self.dialect.fields().iter().map(FieldSpec::key).collect();
            return Err(SemanticError::new(
                filter.field_span(),
                SemanticErrorKind::UnknownField {
                    field: filter.field().to_owned(),
                },
            )
            .with_notes([format!("known fields: {}", known.join(", "))]));
        };
        let operator = filter.operator();
        if !spec.allows(operator) {
            return Err(incompatible(spec, operator, filter.operator_span()));
        }
        let typed = self.value(spec, operator, filter.value(), filter.operator_span())?;
        let checked = Filter::new(
            spec.key().to_owned(),
            spec.value_type().clone(),
            operator,
            typed,
            span,
        );
        Ok(checked.with_source(Some(filter.field_span()), Some(filter.operator_span())))
    }

    /// Coerces a value of any shape. `operator_span` is blamed when the
    /// shape does not fit the operator.
    fn value(
        &self,
        spec: &FieldSpec,
        operator: Operator,
        value: &Value,
        operator_span: Span,
    ) -> Result<TypedValue, SemanticError> {
        match value.shape() {
            ValueShape::Scalar(scalar) => self.scalar(spec, scalar).map(TypedValue::Single),
            ValueShape::Range(range) => self.range(spec, operator, range, value.span(), operator_span),
            ValueShape::Collection(members) => {
                if !spec.is_multi_valued() {
                    return Err(mismatch_with(
                        spec,
                        String::from("a single value"),
                        String::from("a collection"),
                        value.span(),
                    ));
                }
                if !matches!(operator, Operator::Colon | Operator::Eq | Operator::Ne) {
                    return Err(incompatible(spec, operator, operator_span));
                }
                members
                    .iter()
                    .map(|member| self.value(spec, operator, member, operator_span))
                    .collect::<Result<Vec<_>, _>>()
                    .map(TypedValue::Any)
            }
        }
    }

    fn range(
        &self,
        spec: &FieldSpec,
        operator: Operator,
        range: &RangeValue,
        span: Span,
        operator_span: Span,
    ) -> Result<TypedValue, SemanticError> {
        let value_type = spec.value_type();
        if !value_type.accepts_ranges() {
            // `2020-2021` is a perfectly good tag name.
            if value_type.reads_dash_range_as_text()
                && let Some(text) = range.dash_text()
            {
                let scalar = Scalar::new(text.to_owned(), None, span);
                return self.scalar(spec, &scalar).map(TypedValue::Single);
            }
            return Err(mismatch(spec, &range_text(range), span));
        }
        if !spec.allows(Operator::Range) {
            return Err(incompatible(spec, Operator::Range, span));
        }
        if !matches!(operator, Operator::Colon | Operator::Eq) {
            return Err(incompatible(spec, operator, operator_span));
        }

        let lower = self.scalar(spec, range.lower())?;
        let upper = self.scalar(spec, range.upper())?;
        let empty = match compare(lower.value(), upper.value()) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => !(range.lower_inclusive() && range.upper_inclusive()),
            Some(Ordering::Less) | None => false,
        };
        if empty {
            return Err(SemanticError::new(
                span,
                SemanticErrorKind::InvalidRange {
                    field: spec.key().to_owned(),
                    lower: lower.text().to_owned(),
                    upper: upper.text().to_owned(),
                },
            ));
        }
        Ok(TypedValue::Range(TypedRange::new(
            lower,
            upper,
            range.lower_inclusive(),
            range.upper_inclusive(),
        )))
    }

    fn scalar(&self, spec: &FieldSpec, scalar: &Scalar) -> Result<Operand, SemanticError> {
        let value = coerce(spec.value_type(), scalar.text(), self.vocabulary)
            .ok_or_else(|| mismatch(spec, scalar.text(), scalar.span()))?;
        Ok(Operand::new(
            scalar.text().to_owned(),
            value,
            scalar.span(),
            scalar.is_exact(),
        ))
    }
}

fn incompatible(spec: &FieldSpec, operator: Operator, span: Span) -> SemanticError {
    let allowed: Vec<&str> = spec.operators().iter().copied().map(Operator::symbol).collect();
    SemanticError::new(
        span,
        SemanticErrorKind::IncompatibleOperator {
            field: spec.key().to_owned(),
            operator,
        },
    )
    .with_notes([format!("allowed operators: {}", allowed.join(" "))])
}

fn mismatch(spec: &FieldSpec, found: &str, span: Span) -> SemanticError {
    mismatch_with(spec, expectation(spec.value_type()), format!("'{found}'"), span)
}

fn mismatch_with(spec: &FieldSpec, expected: String, found: String, span: Span) -> SemanticError {
    SemanticError::new(
        span,
        SemanticErrorKind::TypeMismatch {
            field: spec.key().to_owned(),
            expected,
            found,
        },
    )
}

fn range_text(range: &RangeValue) -> String {
    range.dash_text().map_or_else(
        || {
            let open = if range.lower_inclusive() { '[' } else { '(' };
            let close = if range.upper_inclusive() { ']' } else { ')' };
            format!(
                "{open}{}, {}{close}",
                range.lower().text(),
                range.upper().text()
            )
        },
        str::to_owned,
    )
}
