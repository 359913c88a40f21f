//! Query compiler for the media library's search box.
//!
//! `hql` turns a search expression such as
//! `tag:landscape -tag:sketch width>=1920 (fav OR score:4-5)` into two
//! artifacts: a backend-neutral [`Predicate`] tree for the storage layer,
//! and a list of [`VisualSpan`]s for syntax highlighting. The pipeline has
//! four stages:
//!
//! 1. [`tokenize`] turns text into tokens with exact byte spans.
//! 2. [`parse`] builds a purely syntactic tree.
//! 3. [`analyze`] checks the tree against a [`Dialect`] and resolves
//!    references through a [`VocabularyLookup`].
//! 4. [`lower`] and [`annotate`] both consume the one semantic tree.
//!
//! [`Compiler::compile`] runs all four against a dialect chosen by name
//! from a [`DialectRegistry`].
//!
//! # Core types
//!
//! - [`Compiler`]: the entry point
//! - [`CompileOutput`]: predicate, spans, errors and warnings
//! - [`DialectRegistry`]: named dialects, four of them built in
//! - [`SemanticNode`]: the checked tree shared by both translators
//!
//! # Example
//!
//! ```
//! use hql::{Compiler, CompilerConfig, DialectRegistry, MemoryVocabulary, Predicate};
//!
//! let compiler = Compiler::new(DialectRegistry::builtin()?, CompilerConfig::default());
//! let vocabulary = MemoryVocabulary::new();
//!
//! let output = compiler.compile("()", "illust", &vocabulary);
//! assert_eq!(output.predicate(), Some(&Predicate::Always));
//!
//! let output = compiler.compile("bogus:1", "illust", &vocabulary);
//! assert!(output.predicate().is_none());
//! assert_eq!(output.errors().len(), 1);
//! # Ok::<(), hql::DialectError>(())
//! ```

mod compiler;
mod registry;
mod semantic;
mod translate;

pub use compiler::{CompileError, CompileOutput, CompiledQuery, Compiler};
pub use registry::DialectRegistry;
pub use semantic::{
    Filter, Operand, ScalarValue, SemanticError, SemanticErrorKind, SemanticKind, SemanticNode,
    TypedRange, TypedValue, analyze,
};
pub use translate::{annotate, annotate_lexical, lower};

// Re-export the stable types of the lower crates.
pub use hql_core::{
    Comparison, CompilerConfig, Diagnostic, DiagnosticCode, DiagnosticReport, Dialect,
    DialectError, FieldPredicate, FieldSpec, MemoryVocabulary, Operator, Predicate,
    PredicateValue, ReferenceKind, Resolution, ResolvedRef, Severity, Span, ValueType, VisualKind,
    VisualSpan, VocabularyLookup,
};
pub use hql_syntax::{LexError, ParseError, Token, TokenStream, parse, tokenize};

#[cfg(test)]
mod tests;
