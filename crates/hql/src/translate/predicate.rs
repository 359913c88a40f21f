//! Lowering a semantic tree into a predicate tree.

use hql_core::{Comparison, FieldPredicate, Operator, Predicate, PredicateValue, Resolution, ValueType};

use crate::semantic::{Filter, Operand, ScalarValue, SemanticKind, SemanticNode, TypedValue};

/// Lowers a semantic tree into a folded predicate.
///
/// Lowering is total: every semantic tree has a predicate. Unresolved
/// references become [`Predicate::Never`] (or [`Predicate::Always`] under
/// `!=`), ranges become a conjunction of two bounds, and collections become
/// a disjunction of their members. Groups add no node of their own.
///
/// # Example
///
/// ```
/// use hql::{Compiler, CompilerConfig, DialectRegistry, MemoryVocabulary, Predicate};
///
/// let compiler = Compiler::new(DialectRegistry::builtin()?, CompilerConfig::default());
/// let output = compiler.compile("tag:unknown", "illust", &MemoryVocabulary::new());
/// assert_eq!(output.predicate(), Some(&Predicate::Never));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn lower(node: &SemanticNode) -> Predicate {
    match node.kind() {
        SemanticKind::Filter(filter) => lower_filter(filter),
        SemanticKind::Not(child) => lower(child).negate(),
        SemanticKind::Group(child) => lower(child),
        SemanticKind::And(children) => Predicate::all(children.iter().map(lower)),
        SemanticKind::Or(children) => Predicate::any(children.iter().map(lower)),
    }
}

fn lower_filter(filter: &Filter) -> Predicate {
    match filter.value() {
        // `tag!={a, b}` excludes every member.
        TypedValue::Any(members) if filter.operator() == Operator::Ne => Predicate::any(
            members
                .iter()
                .map(|member| lower_value(filter, Operator::Eq, member)),
        )
        .negate(),
        value => lower_value(filter, filter.operator(), value),
    }
}

fn lower_value(filter: &Filter, operator: Operator, value: &TypedValue) -> Predicate {
    match value {
        TypedValue::Single(operand) => leaf(
            filter,
            comparison(operator, filter.value_type(), operand),
            operand,
        ),
        TypedValue::Range(range) => {
            let lower_bound = if range.lower_inclusive() {
                Comparison::Ge
            } else {
                Comparison::Gt
            };
            let upper_bound = if range.upper_inclusive() {
                Comparison::Le
            } else {
                Comparison::Lt
            };
            Predicate::all([
                leaf(filter, lower_bound, range.lower()),
                leaf(filter, upper_bound, range.upper()),
            ])
        }
        TypedValue::Any(members) => Predicate::any(
            members
                .iter()
                .map(|member| lower_value(filter, operator, member)),
        ),
    }
}

/// `:` on free text is a pattern match unless the literal is exact.
const fn comparison(operator: Operator, value_type: &ValueType, operand: &Operand) -> Comparison {
    match operator {
        Operator::Colon if matches!(value_type, ValueType::String) && !operand.is_exact() => {
            Comparison::Match
        }
        Operator::Eq | Operator::Colon | Operator::Range => Comparison::Eq,
        Operator::Ne => Comparison::Ne,
        Operator::Gt => Comparison::Gt,
        Operator::Ge => Comparison::Ge,
        Operator::Lt => Comparison::Lt,
        Operator::Le => Comparison::Le,
        Operator::Match => Comparison::Match,
    }
}

fn leaf(filter: &Filter, comparison: Comparison, operand: &Operand) -> Predicate {
    let value = match operand.value() {
        ScalarValue::Reference(Resolution::Unresolved) => {
            return if comparison == Comparison::Ne {
                Predicate::Never.negate()
            } else {
                Predicate::Never
            };
        }
        ScalarValue::Reference(Resolution::Resolved(reference)) => PredicateValue::Reference {
            id: reference.id(),
            canonical: reference.canonical().to_owned(),
        },
        ScalarValue::Text(text) => PredicateValue::Text(text.clone()),
        ScalarValue::Integer(number) => PredicateValue::Integer(*number),
        ScalarValue::Date(date) => PredicateValue::Date(*date),
        ScalarValue::Enum(name) => PredicateValue::Enum(name.clone()),
        ScalarValue::Boolean(flag) => PredicateValue::Boolean(*flag),
    };
    Predicate::Field(FieldPredicate::new(
        filter.field(),
        comparison,
        value,
        filter.span(),
    ))
}
