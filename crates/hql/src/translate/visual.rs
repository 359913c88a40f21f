//! Highlight spans for the query box.

use hql_core::{CompilerConfig, Operator, Resolution, Span, VisualKind, VisualSpan};
use hql_syntax::{Punct, Token, TokenKind};

use crate::semantic::{Filter, SemanticNode};

/// Classifies every token of a compiled query.
///
/// Tokens are walked in source order; adjacent tokens of the same kind are
/// merged, so `sci-fi` is one span. Inside a filter the field name is
/// [`VisualKind::FieldName`], the operator and a range dash are
/// [`VisualKind::Operator`], reference values are resolved or unresolved,
/// and everything else is [`VisualKind::Structural`]. Between filters,
/// parentheses are structural and connectives are operators.
#[must_use]
pub fn annotate(tokens: &[Token], root: &SemanticNode) -> Vec<VisualSpan> {
    let filters = root.filters();
    let mut spans = Vec::new();
    for token in tokens.iter().filter(|token| !token.is_eof()) {
        let kind = filters
            .iter()
            .find(|filter| filter.span().contains(token.span()))
            .map_or_else(|| connective(token), |filter| classify(token, filter));
        push_merged(&mut spans, VisualSpan::new(kind, token.span()));
    }
    spans
}

/// Classifies tokens without a semantic tree.
///
/// Used when lexing succeeded but a later stage failed, so the input can
/// still be coloured: operators and connectives against everything else.
#[must_use]
pub fn annotate_lexical(tokens: &[Token], config: &CompilerConfig) -> Vec<VisualSpan> {
    let mut spans = Vec::new();
    for token in tokens.iter().filter(|token| !token.is_eof()) {
        let kind = match token.kind() {
            TokenKind::Operator(_)
            | TokenKind::Punctuation(Punct::Ampersand | Punct::Pipe | Punct::Bang) => {
                VisualKind::Operator
            }
            TokenKind::Identifier if is_keyword(token.raw(), config) => VisualKind::Operator,
            _ => VisualKind::Structural,
        };
        push_merged(&mut spans, VisualSpan::new(kind, token.span()));
    }
    spans
}

fn classify(token: &Token, filter: &Filter) -> VisualKind {
    let span = token.span();
    if filter.name_span().is_some_and(|name| name.contains(span)) {
        return VisualKind::FieldName;
    }
    if filter.operator_span() == Some(span) {
        return VisualKind::Operator;
    }
    let reference = filter
        .operands()
        .into_iter()
        .filter(|operand| operand.span().contains(span))
        .find_map(|operand| operand.resolution());
    if let Some(resolution) = reference {
        return match resolution {
            Resolution::Resolved(_) => VisualKind::ValueResolved,
            Resolution::Unresolved => VisualKind::ValueUnresolved,
        };
    }
    let is_dash = token.kind() == TokenKind::Operator(Operator::Range)
        && filter
            .value()
            .ranges()
            .iter()
            .any(|range| range.gap().contains(span));
    if is_dash {
        VisualKind::Operator
    } else {
        VisualKind::Structural
    }
}

const fn connective(token: &Token) -> VisualKind {
    match token.kind() {
        TokenKind::Punctuation(Punct::LParen | Punct::RParen) => VisualKind::Structural,
        _ => VisualKind::Operator,
    }
}

fn is_keyword(word: &str, config: &CompilerConfig) -> bool {
    ["AND", "OR", "NOT"].iter().any(|keyword| {
        word == *keyword || (config.case_insensitive_keywords() && word.eq_ignore_ascii_case(keyword))
    })
}

fn push_merged(spans: &mut Vec<VisualSpan>, next: VisualSpan) {
    if let Some(last) = spans.last_mut()
        && last.kind() == next.kind()
        && last.end() == next.start()
    {
        *last = VisualSpan::new(last.kind(), Span::new(last.start(), next.end()));
        return;
    }
    spans.push(next);
}
