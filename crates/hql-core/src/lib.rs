//! Core data model for the hedge query language compiler.
//!
//! This crate holds the types shared by every stage of the pipeline:
//! source spans, diagnostics, dialect descriptors, the vocabulary lookup
//! capability, and the two compilation outputs (the predicate tree and the
//! visual span list). It contains no pipeline logic; the `hql_syntax` crate
//! lexes and parses, and the `hql` facade analyses, translates and exposes
//! the single compile entry point.
//!
//! # Core types
//!
//! - [`Span`]: byte ranges into the query text
//! - [`Diagnostic`] and [`DiagnosticReport`]: structured error reporting
//! - [`Dialect`] and [`FieldSpec`]: recognised fields per entity
//! - [`VocabularyLookup`] and [`MemoryVocabulary`]: name resolution
//! - [`Predicate`]: the executable filter tree
//! - [`VisualSpan`]: highlight regions for the UI
//! - [`CompilerConfig`]: safety limits
//!
//! # Example
//!
//! ```
//! use hql_core::{Predicate, Span};
//!
//! let span = Span::new(0, 8);
//! assert_eq!(span.len(), 8);
//! assert!(Predicate::all([]).is_always());
//! ```

mod config;
mod diagnostic;
mod dialect;
mod predicate;
mod span;
mod visual;
mod vocabulary;

pub use config::CompilerConfig;
pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticReport, Severity};
pub use dialect::{
    Dialect, DialectDescriptor, DialectError, FieldDescriptor, FieldSpec, Operator,
    OperatorParseError, ReferenceKind, ValueType, ValueTypeName,
};
pub use predicate::{Comparison, FieldPredicate, Predicate, PredicateValue};
pub use span::Span;
pub use visual::{VisualKind, VisualSpan};
pub use vocabulary::{MemoryVocabulary, Resolution, ResolvedRef, VocabularyLookup};

#[cfg(test)]
mod tests;
