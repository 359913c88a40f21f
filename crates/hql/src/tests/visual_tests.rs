//! Tests for highlight spans.

use rstest::rstest;

use super::support::analyse;
use crate::{CompilerConfig, Span, VisualKind, VisualSpan, annotate, annotate_lexical, tokenize};

fn rendered(spans: &[VisualSpan]) -> Vec<(VisualKind, usize, usize)> {
    spans
        .iter()
        .map(|span| (span.kind(), span.start(), span.end()))
        .collect()
}

fn annotated(text: &str) -> Vec<(VisualKind, usize, usize)> {
    let semantic = analyse(text, "illust").expect("query should analyse");
    let stream = tokenize(text).expect("query should lex");
    rendered(&annotate(stream.tokens(), &semantic))
}

#[test]
fn filter_parts_get_their_own_kinds() {
    assert_eq!(
        annotated("tag:landscape"),
        [
            (VisualKind::FieldName, 0, 3),
            (VisualKind::Operator, 3, 4),
            (VisualKind::ValueResolved, 4, 13),
        ]
    );
}

#[test]
fn unresolved_values_are_marked() {
    assert_eq!(
        annotated("author:nobody"),
        [
            (VisualKind::FieldName, 0, 6),
            (VisualKind::Operator, 6, 7),
            (VisualKind::ValueUnresolved, 7, 13),
        ]
    );
}

#[test]
fn compound_values_merge_into_one_span() {
    assert_eq!(
        annotated("sci-fi"),
        [(VisualKind::ValueResolved, 0, 6)]
    );
}

#[test]
fn compound_field_names_merge_into_one_span() {
    assert_eq!(
        annotated("order-time>=2020-01-01"),
        [
            (VisualKind::FieldName, 0, 10),
            (VisualKind::Operator, 10, 12),
            (VisualKind::Structural, 12, 22),
        ]
    );
}

#[test]
fn range_dash_is_an_operator() {
    assert_eq!(
        annotated("score:4-5"),
        [
            (VisualKind::FieldName, 0, 5),
            (VisualKind::Operator, 5, 6),
            (VisualKind::Structural, 6, 7),
            (VisualKind::Operator, 7, 8),
            (VisualKind::Structural, 8, 9),
        ]
    );
}

#[test]
fn connectives_and_parentheses_between_filters() {
    assert_eq!(
        annotated("(landscape OR nothing) -fav"),
        [
            (VisualKind::Structural, 0, 1),
            (VisualKind::ValueResolved, 1, 10),
            (VisualKind::Operator, 11, 13),
            (VisualKind::ValueUnresolved, 14, 21),
            (VisualKind::Structural, 21, 22),
            (VisualKind::Operator, 23, 24),
            (VisualKind::FieldName, 24, 27),
        ]
    );
}

#[test]
fn collection_members_are_marked_one_by_one() {
    assert_eq!(
        annotated("tag:{sketch,nobody}"),
        [
            (VisualKind::FieldName, 0, 3),
            (VisualKind::Operator, 3, 4),
            (VisualKind::Structural, 4, 5),
            (VisualKind::ValueResolved, 5, 11),
            (VisualKind::Structural, 11, 12),
            (VisualKind::ValueUnresolved, 12, 18),
            (VisualKind::Structural, 18, 19),
        ]
    );
}

#[rstest]
#[case("tag:landscape -tag:sketch width>=1920")]
#[case("landscape sketch OR scenery // trailing comment")]
#[case("  ext:{png, gif}   score:[1, 3) ")]
#[case("desc:\"a \\\"quoted\\\" phrase\" fav")]
fn spans_tile_the_tokens(#[case] text: &str) {
    let semantic = analyse(text, "illust").expect("query should analyse");
    let stream = tokenize(text).expect("query should lex");
    let spans = annotate(stream.tokens(), &semantic);

    for pair in spans.windows(2) {
        let [left, right] = pair else {
            panic!("windows(2) yields pairs");
        };
        assert!(left.end() <= right.start(), "{left:?} overlaps {right:?}");
    }
    for token in stream.tokens().iter().filter(|token| !token.is_eof()) {
        let covering = spans
            .iter()
            .filter(|span| span.span().contains(token.span()))
            .count();
        assert_eq!(covering, 1, "token {token:?} must be covered exactly once");
    }
    for span in &spans {
        let gap_free = stream
            .tokens()
            .iter()
            .any(|token| token.span().start() == span.start());
        assert!(gap_free, "{span:?} must start at a token");
    }
}

#[test]
fn lexical_fallback_separates_operators() {
    let stream = tokenize("bogus:1 AND -x").expect("query should lex");
    assert_eq!(
        rendered(&annotate_lexical(stream.tokens(), &CompilerConfig::default())),
        [
            (VisualKind::Structural, 0, 5),
            (VisualKind::Operator, 5, 6),
            (VisualKind::Structural, 6, 7),
            (VisualKind::Operator, 8, 11),
            (VisualKind::Operator, 12, 13),
            (VisualKind::Structural, 13, 14),
        ]
    );
}

#[test]
fn lexical_fallback_honours_keyword_case() {
    let stream = tokenize("a or b").expect("query should lex");
    let strict = annotate_lexical(stream.tokens(), &CompilerConfig::default());
    assert!(strict.iter().all(|span| span.kind() == VisualKind::Structural));

    let relaxed = CompilerConfig::default().with_case_insensitive_keywords(true);
    let spans = annotate_lexical(stream.tokens(), &relaxed);
    assert!(spans.contains(&VisualSpan::new(VisualKind::Operator, Span::new(2, 4))));
}
