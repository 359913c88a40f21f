//! Tests for predicate lowering.

use rstest::rstest;

use super::support::analyse;
use crate::{Comparison, Predicate, PredicateValue, Span, lower};

fn lowered(text: &str) -> Predicate {
    lower(&analyse(text, "illust").expect("query should analyse"))
}

#[rstest]
#[case::reference("tag:landscape", "tag = #1(landscape)")]
#[case::alias_of_reference("scenery", "tag = #1(landscape)")]
#[case::negation("tag:landscape -tag:sketch", "(tag = #1(landscape) AND NOT tag = #2(sketch))")]
#[case::implicit_and_binds_tighter(
    "landscape sketch OR scenery",
    "((tag = #1(landscape) AND tag = #2(sketch)) OR tag = #1(landscape))"
)]
#[case::group_is_transparent("(landscape)", "tag = #1(landscape)")]
#[case::double_negation("NOT NOT landscape", "tag = #1(landscape)")]
#[case::dash_range("width:100-200", "(width >= 100 AND width <= 200)")]
#[case::open_range("width:(100, 200)", "(width > 100 AND width < 200)")]
#[case::ordering("score>=4", "score >= 4")]
#[case::collection("ext:{png, gif}", "(extension = png OR extension = gif)")]
#[case::excluded_collection("ext!={png, gif}", "NOT (extension = png OR extension = gif)")]
#[case::colon_on_text_matches("desc:sunset", "description ~ \"sunset\"")]
#[case::backtick_is_exact("desc:`sunset`", "description = \"sunset\"")]
#[case::equals_is_exact("desc=\"sunset\"", "description = \"sunset\"")]
#[case::flag("fav", "favorite = true")]
#[case::date("created:2020-01-01", "create-time = 2020-01-01")]
fn lowers_to_expected_predicate(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(lowered(text).to_string(), expected);
}

#[rstest]
#[case::empty_group("()", Predicate::Always)]
#[case::unresolved("tag:doesnotexist", Predicate::Never)]
#[case::unresolved_excluded("tag!=doesnotexist", Predicate::Always)]
#[case::negated_unresolved("-tag:doesnotexist", Predicate::Always)]
#[case::unresolved_in_conjunction("landscape doesnotexist", Predicate::Never)]
#[case::all_members_unresolved("tag:{nothing, nobody}", Predicate::Never)]
fn folds_constants(#[case] text: &str, #[case] expected: Predicate) {
    assert_eq!(lowered(text), expected);
}

#[test]
fn unresolved_alternatives_drop_out() {
    assert_eq!(
        lowered("landscape OR doesnotexist").to_string(),
        "tag = #1(landscape)"
    );
}

#[test]
fn leaves_carry_their_filter_span() {
    let Predicate::And(children) = lowered("fav tag:sketch") else {
        panic!("expected a conjunction");
    };
    let Some(Predicate::Field(leaf)) = children.get(1) else {
        panic!("expected a leaf");
    };
    assert_eq!(leaf.span(), Span::new(4, 14));
    assert_eq!(leaf.comparison(), Comparison::Eq);
    assert_eq!(
        leaf.value(),
        &PredicateValue::Reference {
            id: 2,
            canonical: String::from("sketch"),
        }
    );
}

#[test]
fn sizes_lower_to_byte_counts() {
    assert_eq!(lowered("size<2KB").to_string(), "filesize < 2048");
}

#[test]
fn composite_predicates_trace_back_to_the_query() {
    let predicate = lowered("landscape -tag:sketch");
    assert_eq!(predicate.span(), Some(Span::new(0, 21)));
    let Predicate::And(children) = &predicate else {
        panic!("expected a conjunction");
    };
    assert_eq!(children.get(1).and_then(Predicate::span), Some(Span::new(11, 21)));
}
