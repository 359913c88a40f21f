//! Behaviour-driven tests for `hql_core` types.

use std::str::FromStr;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::{
    Dialect, DialectDescriptor, DialectError, MemoryVocabulary, Predicate, ReferenceKind,
    Resolution, VocabularyLookup,
};

// ---------------------------------------------------------------------------
// Typed wrappers for Gherkin step parameters
// ---------------------------------------------------------------------------

/// A quoted string value from a Gherkin feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QuotedString(String);

impl FromStr for QuotedString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim_matches('"').to_owned()))
    }
}

impl QuotedString {
    fn as_str(&self) -> &str {
        &self.0
    }
}

fn reference_kind(name: &str) -> ReferenceKind {
    match name {
        "tag" => ReferenceKind::Tag,
        "topic" => ReferenceKind::Topic,
        "author" => ReferenceKind::Author,
        "collection" => ReferenceKind::Collection,
        "annotation" => ReferenceKind::Annotation,
        other => panic!("unknown reference kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    document: Option<String>,
    dialect: Option<Result<Dialect, DialectError>>,
    vocabulary: MemoryVocabulary,
    resolution: Option<Resolution>,
    predicate: Option<Predicate>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a dialect document {json}")]
fn given_document(world: &mut TestWorld, json: String) {
    world.document = Some(json.trim_matches('\'').to_owned());
}

#[given("a {kind} named {name} with id {id}")]
fn given_entity(world: &mut TestWorld, kind: QuotedString, name: QuotedString, id: u64) {
    world
        .vocabulary
        .insert(reference_kind(kind.as_str()), id, name.as_str());
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the dialect is built")]
fn when_dialect_built(world: &mut TestWorld) {
    let json = world.document.as_ref().expect("document should be set");
    let descriptor: DialectDescriptor = serde_json::from_str(json).expect("descriptor json");
    world.dialect = Some(Dialect::try_from(descriptor));
}

#[when("the {kind} {name} is resolved")]
fn when_resolved(world: &mut TestWorld, kind: QuotedString, name: QuotedString) {
    world.resolution = Some(
        world
            .vocabulary
            .resolve(reference_kind(kind.as_str()), name.as_str()),
    );
}

#[when("an empty conjunction is negated")]
fn when_empty_conjunction_negated(world: &mut TestWorld) {
    world.predicate = Some(Predicate::all([]).negate());
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("field {name} resolves to key {key}")]
fn then_field_key(world: &mut TestWorld, name: QuotedString, key: QuotedString) {
    let dialect = world
        .dialect
        .as_ref()
        .expect("dialect should be built")
        .as_ref()
        .expect("dialect should be valid");
    assert_eq!(
        dialect.field(name.as_str()).map(crate::FieldSpec::key),
        Some(key.as_str())
    );
}

#[then("building fails with {snippet}")]
fn then_build_fails(world: &mut TestWorld, snippet: QuotedString) {
    let result = world.dialect.as_ref().expect("dialect should be built");
    let err = result.as_ref().expect_err("dialect should be invalid");
    assert!(
        err.to_string().contains(snippet.as_str()),
        "expected '{}' in '{err}'",
        snippet.as_str()
    );
}

#[then("the canonical name is {name}")]
fn then_canonical(world: &mut TestWorld, name: QuotedString) {
    let resolution = world.resolution.as_ref().expect("resolution should be set");
    assert_eq!(
        resolution.as_resolved().map(crate::ResolvedRef::canonical),
        Some(name.as_str())
    );
}

#[then("the name is unresolved")]
fn then_unresolved(world: &mut TestWorld) {
    assert_eq!(world.resolution, Some(Resolution::Unresolved));
}

#[then("the predicate is never")]
fn then_never(world: &mut TestWorld) {
    assert_eq!(world.predicate, Some(Predicate::Never));
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/hql_core.feature")]
fn hql_core_behaviour(world: TestWorld) {
    let _ = world;
}
