//! Behaviour-driven tests for the lexer and parser.

use std::str::FromStr;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::{LexError, ParseError, SyntaxKind, SyntaxNode, TokenStream, parse, tokenize};

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

#[derive(Default)]
struct TestWorld {
    query: Option<String>,
    tokens: Option<Result<TokenStream, LexError>>,
    tree: Option<Result<SyntaxNode, ParseError>>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

fn shape(node: &SyntaxNode) -> String {
    let children = |head: &str, nodes: &[SyntaxNode]| {
        let inner: Vec<String> = nodes.iter().map(shape).collect();
        format!("{head}({})", inner.join(", "))
    };
    match node.kind() {
        SyntaxKind::Literal(_) => String::from("literal"),
        SyntaxKind::FieldFilter(filter) => format!("filter {}", filter.field()),
        SyntaxKind::Not(child) => format!("not({})", shape(child)),
        SyntaxKind::Group(child) => format!("group({})", shape(child)),
        SyntaxKind::And(nodes) => children("and", nodes),
        SyntaxKind::Or(nodes) => children("or", nodes),
    }
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("the query {text}")]
fn given_query(world: &mut TestWorld, text: QuotedString) {
    world.query = Some(text.as_str().to_owned());
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the query is tokenized")]
fn when_tokenized(world: &mut TestWorld) {
    let query = world.query.as_deref().expect("query should be set");
    world.tokens = Some(tokenize(query));
}

#[when("the query is parsed")]
fn when_parsed(world: &mut TestWorld) {
    let query = world.query.as_deref().expect("query should be set");
    let stream = tokenize(query).expect("query should tokenize");
    world.tree = Some(parse(stream.tokens()));
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("there are {count} tokens before the end")]
fn then_token_count(world: &mut TestWorld, count: usize) {
    let stream = world
        .tokens
        .as_ref()
        .expect("tokens should be set")
        .as_ref()
        .expect("tokenize should succeed");
    assert_eq!(stream.tokens().len(), count + 1);
}

#[then("tokenizing fails with {message}")]
fn then_lex_fails(world: &mut TestWorld, message: QuotedString) {
    let result = world.tokens.as_ref().expect("tokens should be set");
    let err = result.as_ref().expect_err("tokenize should fail");
    assert_eq!(err.to_string(), message.as_str());
}

#[then("the tree shape is {expected}")]
fn then_tree_shape(world: &mut TestWorld, expected: QuotedString) {
    let tree = world
        .tree
        .as_ref()
        .expect("tree should be set")
        .as_ref()
        .expect("parse should succeed");
    assert_eq!(shape(tree), expected.as_str());
}

#[then("parsing fails with {message}")]
fn then_parse_fails(world: &mut TestWorld, message: QuotedString) {
    let result = world.tree.as_ref().expect("tree should be set");
    let err = result.as_ref().expect_err("parse should fail");
    assert_eq!(err.to_string(), message.as_str());
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/hql_syntax.feature")]
fn hql_syntax_behaviour(world: TestWorld) {
    let _ = world;
}
