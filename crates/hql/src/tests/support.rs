//! Fixtures shared by the unit tests.

use rstest::fixture;

use crate::{
    Compiler, CompilerConfig, DialectRegistry, MemoryVocabulary, ReferenceKind, SemanticError,
    SemanticNode, analyze, parse, tokenize,
};

pub(super) fn builtin_registry() -> DialectRegistry {
    DialectRegistry::builtin().expect("built-in dialects should validate")
}

/// A small library: a few tags, one topic, one author, one annotation.
pub(super) fn sample_vocabulary() -> MemoryVocabulary {
    let mut vocabulary = MemoryVocabulary::new();
    vocabulary.insert(ReferenceKind::Tag, 1, "landscape");
    vocabulary.insert_alias(ReferenceKind::Tag, "scenery", 1);
    vocabulary.insert(ReferenceKind::Tag, 2, "sketch");
    vocabulary.insert(ReferenceKind::Tag, 3, "sci-fi");
    vocabulary.insert(ReferenceKind::Tag, 4, "2020-2021");
    vocabulary.insert(ReferenceKind::Topic, 10, "Touhou Project");
    vocabulary.insert_alias(ReferenceKind::Topic, "touhou", 10);
    vocabulary.insert(ReferenceKind::Author, 20, "alice");
    vocabulary.insert(ReferenceKind::Annotation, 30, "wip");
    vocabulary
}

#[fixture]
pub(super) fn vocabulary() -> MemoryVocabulary {
    sample_vocabulary()
}

#[fixture]
pub(super) fn compiler() -> Compiler {
    Compiler::new(builtin_registry(), CompilerConfig::default())
}

/// Runs the first three stages against a built-in dialect.
pub(super) fn analyse(text: &str, dialect: &str) -> Result<SemanticNode, SemanticError> {
    let registry = builtin_registry();
    let found = registry.get(dialect).expect("dialect should be built in");
    let stream = tokenize(text).expect("query should lex");
    let tree = parse(stream.tokens()).expect("query should parse");
    analyze(&tree, found, &sample_vocabulary())
}
