//! End-to-end tests for `hql` through its public API.
//!
//! These exercise the compile entry point over whole queries and check the
//! properties every compilation must keep, whatever the input.

use insta::assert_snapshot;
use rstest::{fixture, rstest};

use hql::{
    Compiler, CompilerConfig, DiagnosticCode, DialectRegistry, MemoryVocabulary, Predicate,
    ReferenceKind, VisualKind, VisualSpan, tokenize,
};

/// Fixture providing a compiler over the built-in dialects.
#[fixture]
fn compiler() -> Compiler {
    let registry = DialectRegistry::builtin().unwrap_or_else(|err| panic!("registry: {err}"));
    Compiler::new(registry, CompilerConfig::default())
}

fn library() -> MemoryVocabulary {
    let mut vocabulary = MemoryVocabulary::new();
    vocabulary.insert(ReferenceKind::Tag, 1, "landscape");
    vocabulary.insert(ReferenceKind::Tag, 2, "sketch");
    vocabulary.insert(ReferenceKind::Author, 20, "alice");
    vocabulary
}

const QUERIES: [&str; 8] = [
    "tag:landscape -tag:sketch width>=1920 (fav OR score:4-5)",
    "landscape sketch OR nothing",
    "author:{alice, bob} ext!={gif, webm}",
    "created:[2020-01-01, 2021-01-01) size<1.5MB",
    "NOT (desc~\"sun*\" | tagme) & id:[1, 100]",
    "  landscape   // a comment",
    "()",
    "bogus:1 OR tag:landscape",
];

// =============================================================================
// Happy Path: Predicates
// =============================================================================

#[rstest]
fn compiles_a_realistic_query(compiler: Compiler) {
    let output = compiler.compile(
        "tag:landscape -tag:sketch width>=1920 (fav OR score:4-5)",
        "illust",
        &library(),
    );
    let predicate = output
        .predicate()
        .unwrap_or_else(|| panic!("errors: {:?}", output.errors()));
    assert_snapshot!(
        predicate.to_string(),
        @"(tag = #1(landscape) AND NOT tag = #2(sketch) AND width >= 1920 AND (favorite = true OR (score >= 4 AND score <= 5)))"
    );
}

#[rstest]
fn compiles_against_the_album_dialect(compiler: Compiler) {
    let output = compiler.compile("\"summer trip\" count>10", "album", &library());
    assert_snapshot!(
        output.predicate().map(ToString::to_string).unwrap_or_default(),
        @r#"(title ~ "summer trip" AND count > 10)"#
    );
}

#[rstest]
fn empty_group_matches_everything(compiler: Compiler) {
    let output = compiler.compile("()", "illust", &library());
    assert_eq!(output.predicate(), Some(&Predicate::Always));
    assert!(output.warnings().is_empty());
}

#[rstest]
fn unresolved_tags_match_nothing(compiler: Compiler) {
    let output = compiler.compile("tag:doesnotexist", "illust", &library());
    assert_eq!(output.predicate(), Some(&Predicate::Never));
    assert!(output.errors().is_empty());
    assert_eq!(output.warnings().len(), 1);
}

#[rstest]
fn implicit_conjunction_binds_tighter_than_or(compiler: Compiler) {
    let grouped = compiler.compile("(landscape sketch) OR alice", "illust", &library());
    let bare = compiler.compile("landscape sketch OR alice", "illust", &library());
    assert_eq!(grouped.predicate(), bare.predicate());
}

// =============================================================================
// Unhappy Path: Diagnostics
// =============================================================================

#[rstest]
#[case("bogusfield:foo", DiagnosticCode::UnknownField)]
#[case("width:100-50", DiagnosticCode::InvalidRange)]
#[case("tag:", DiagnosticCode::UnexpectedToken)]
#[case("(landscape", DiagnosticCode::UnbalancedGroup)]
#[case("tag:'open", DiagnosticCode::UnterminatedString)]
fn rejected_queries_carry_a_stable_code(
    compiler: Compiler,
    #[case] text: &str,
    #[case] code: DiagnosticCode,
) {
    let report = compiler
        .compile(text, "illust", &library())
        .into_result()
        .err()
        .unwrap_or_else(|| panic!("'{text}' should not compile"));
    let first = report
        .diagnostics()
        .first()
        .unwrap_or_else(|| panic!("report should not be empty"));
    assert_eq!(first.code(), code);
}

// =============================================================================
// Properties
// =============================================================================

fn assert_tiles(text: &str, spans: &[VisualSpan]) {
    let stream = tokenize(text).unwrap_or_else(|err| panic!("tokenize: {err}"));
    for pair in spans.windows(2) {
        let [left, right] = pair else {
            panic!("windows(2) yields pairs");
        };
        assert!(left.end() <= right.start(), "{left:?} overlaps {right:?} in '{text}'");
    }
    for token in stream.tokens().iter().filter(|token| !token.is_eof()) {
        let covering = spans
            .iter()
            .filter(|span| span.span().contains(token.span()))
            .count();
        assert_eq!(covering, 1, "{token:?} in '{text}'");
    }
}

#[rstest]
fn spans_tile_every_query(compiler: Compiler) {
    for text in QUERIES {
        let output = compiler.compile(text, "illust", &library());
        assert_tiles(text, output.spans());
    }
}

#[rstest]
fn compilation_is_idempotent(compiler: Compiler) {
    for text in QUERIES {
        assert_eq!(
            compiler.compile(text, "illust", &library()),
            compiler.compile(text, "illust", &library()),
            "'{text}'"
        );
    }
}

#[rstest]
fn a_larger_vocabulary_never_unresolves_a_span(compiler: Compiler) {
    let small = library();
    let mut large = library();
    large.insert(ReferenceKind::Tag, 3, "nothing");
    large.insert(ReferenceKind::Author, 21, "bob");

    for text in QUERIES {
        let before = compiler.compile(text, "illust", &small);
        let after = compiler.compile(text, "illust", &large);
        for resolved in before
            .spans()
            .iter()
            .filter(|span| span.kind() == VisualKind::ValueResolved)
        {
            let still_resolved = after.spans().iter().any(|span| {
                span.kind() == VisualKind::ValueResolved && span.span().contains(resolved.span())
            });
            assert!(still_resolved, "{resolved:?} in '{text}'");
        }
    }
}

// =============================================================================
// Serialisation
// =============================================================================

#[rstest]
fn outputs_serialise_for_the_ui(compiler: Compiler) {
    let output = compiler.compile("tag:landscape", "illust", &library());
    let first = output
        .spans()
        .first()
        .unwrap_or_else(|| panic!("spans should not be empty"));
    let json = serde_json::to_value(first).unwrap_or_else(|err| panic!("serialise: {err}"));
    assert_eq!(json.get("kind"), Some(&serde_json::json!("field_name")));

    let predicate = serde_json::to_value(output.predicate())
        .unwrap_or_else(|err| panic!("serialise: {err}"));
    assert!(predicate.get("field").is_some(), "{predicate}");
}
