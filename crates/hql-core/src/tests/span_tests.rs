//! Tests for [`Span`].

use rstest::rstest;

use crate::Span;

#[test]
fn reversed_bounds_are_normalised() {
    let span = Span::new(9, 4);
    assert_eq!(span.start(), 4);
    assert_eq!(span.end(), 9);
}

#[test]
fn empty_span_has_zero_length() {
    let span = Span::empty(3);
    assert!(span.is_empty());
    assert_eq!(span.len(), 0);
}

#[rstest]
#[case::inside(Span::new(0, 10), Span::new(2, 5), true)]
#[case::equal(Span::new(2, 5), Span::new(2, 5), true)]
#[case::spills_right(Span::new(0, 4), Span::new(2, 5), false)]
#[case::empty_at_end(Span::new(0, 4), Span::empty(4), true)]
fn containment(#[case] outer: Span, #[case] inner: Span, #[case] expected: bool) {
    assert_eq!(outer.contains(inner), expected);
}

#[rstest]
#[case::disjoint(Span::new(0, 2), Span::new(2, 4), false)]
#[case::shared_byte(Span::new(0, 3), Span::new(2, 4), true)]
#[case::empty(Span::empty(1), Span::new(0, 4), false)]
fn overlap(#[case] left: Span, #[case] right: Span, #[case] expected: bool) {
    assert_eq!(left.overlaps(right), expected);
    assert_eq!(right.overlaps(left), expected);
}

#[test]
fn cover_spans_both_inputs() {
    assert_eq!(Span::new(4, 6).cover(Span::new(1, 2)), Span::new(1, 6));
}

#[test]
fn slice_rejects_non_boundary_offsets() {
    let text = "tag:初音";
    assert_eq!(Span::new(4, 7).slice(text), Some("初"));
    assert_eq!(Span::new(4, 5).slice(text), None);
    assert_eq!(Span::new(4, 40).slice(text), None);
}

#[test]
fn span_serialises_with_named_offsets() {
    let json = serde_json::to_string(&Span::new(1, 3)).expect("serialize span");
    assert_eq!(json, r#"{"start":1,"end":3}"#);
}
