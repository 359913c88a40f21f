//! Behaviour-driven tests for the `hql` compile entry point.

use std::str::FromStr;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{builtin_registry, sample_vocabulary};
use crate::{CompileOutput, Compiler, CompilerConfig};

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

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    compiler: Option<Compiler>,
    output: Option<CompileOutput>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

impl TestWorld {
    fn output(&self) -> &CompileOutput {
        self.output.as_ref().expect("query should be compiled")
    }
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a compiler with the built-in dialects")]
fn given_builtin_compiler(world: &mut TestWorld) {
    world.compiler = Some(Compiler::new(builtin_registry(), CompilerConfig::default()));
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("{query} is compiled for dialect {dialect}")]
fn when_compiled(world: &mut TestWorld, query: QuotedString, dialect: QuotedString) {
    let compiler = world.compiler.as_ref().expect("compiler should be set");
    world.output = Some(compiler.compile(query.as_str(), dialect.as_str(), &sample_vocabulary()));
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the predicate is {expected}")]
fn then_predicate_is(world: &mut TestWorld, expected: QuotedString) {
    let output = world.output();
    assert!(output.errors().is_empty(), "{:?}", output.errors());
    let rendered = output.predicate().map(ToString::to_string);
    assert_eq!(rendered.as_deref(), Some(expected.as_str()));
}

#[then("compilation fails with code {code}")]
fn then_compilation_fails(world: &mut TestWorld, code: QuotedString) {
    let output = world.output();
    assert!(output.predicate().is_none());
    let first = output.errors().first().expect("at least one error");
    let actual_code = format!("{}", first.code());
    assert_eq!(
        actual_code,
        code.as_str(),
        "expected code '{}', got '{actual_code}'",
        code.as_str()
    );
}

#[then("there are {count} warnings")]
fn then_warning_count(world: &mut TestWorld, count: usize) {
    assert_eq!(world.output().warnings().len(), count);
}

#[then("highlighting still covers the query")]
fn then_spans_present(world: &mut TestWorld) {
    assert!(!world.output().spans().is_empty());
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/hql_compile.feature")]
fn hql_compile_behaviour(world: TestWorld) {
    let _ = world;
}
