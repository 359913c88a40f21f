//! The single compile entry point.
//!
//! [`Compiler::compile`] runs the whole pipeline for one query: tokenize,
//! parse, analyse against the named dialect, then lower and annotate the
//! one semantic tree. The first fatal error of any stage stops the
//! pipeline; vocabulary misses only add warnings.

use hql_core::{
    CompilerConfig, Diagnostic, DiagnosticCode, DiagnosticReport, Operator, Predicate, Span,
    ValueType, VisualSpan, VocabularyLookup,
};
use hql_syntax::{LexError, ParseError, Token, parse_with, tokenize_with};
use thiserror::Error;
use tracing::debug;

use crate::registry::DialectRegistry;
use crate::semantic::{Filter, SemanticError, SemanticKind, SemanticNode, analyze};
use crate::translate::{annotate, annotate_lexical, lower};

const COMPILE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::compile");

/// Compiles query text into predicates and highlight spans.
///
/// A compiler owns its dialects and configuration and holds no other state,
/// so one instance can serve concurrent compilations from many threads.
///
/// # Example
///
/// ```
/// use hql::{Compiler, CompilerConfig, DialectRegistry, MemoryVocabulary, ReferenceKind};
///
/// let compiler = Compiler::new(DialectRegistry::builtin()?, CompilerConfig::default());
/// let mut vocabulary = MemoryVocabulary::new();
/// vocabulary.insert(ReferenceKind::Tag, 7, "landscape");
///
/// let output = compiler.compile("tag:landscape width>=1920", "illust", &vocabulary);
/// assert!(output.errors().is_empty());
/// assert_eq!(
///     output.predicate().map(ToString::to_string).as_deref(),
///     Some("(tag = #7(landscape) AND width >= 1920)")
/// );
/// # Ok::<(), hql::DialectError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: DialectRegistry,
    config: CompilerConfig,
}

impl Compiler {
    /// Creates a compiler.
    #[must_use]
    pub const fn new(registry: DialectRegistry, config: CompilerConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the dialect registry.
    #[must_use]
    pub const fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles `text` against the dialect called `dialect_name`.
    ///
    /// Never fails outright: errors are reported inside the output. When
    /// `errors` is non-empty the predicate is absent; the spans are a
    /// lexical colouring if lexing succeeded and empty otherwise.
    pub fn compile<V>(&self, text: &str, dialect_name: &str, vocabulary: &V) -> CompileOutput
    where
        V: VocabularyLookup + ?Sized,
    {
        let stream = match tokenize_with(text, &self.config) {
            Ok(stream) => stream,
            Err(error) => return self.reject(text, dialect_name, &[], error.into(), Vec::new()),
        };
        let (tokens, mut warnings) = stream.into_parts();

        let Some(dialect) = self.registry.get(dialect_name) else {
            let error = CompileError::UnknownDialect {
                name: dialect_name.to_owned(),
                span: Span::new(0, text.len()),
            };
            return self.reject(text, dialect_name, &tokens, error, warnings);
        };
        let tree = match parse_with(&tokens, &self.config) {
            Ok(tree) => tree,
            Err(error) => return self.reject(text, dialect_name, &tokens, error.into(), warnings),
        };
        let semantic = match analyze(&tree, dialect, vocabulary) {
            Ok(semantic) => semantic,
            Err(error) => return self.reject(text, dialect_name, &tokens, error.into(), warnings),
        };

        warnings.extend(unresolved_warnings(&semantic));
        let predicate = lower(&semantic);
        let spans = annotate(&tokens, &semantic);
        debug!(
            target: COMPILE_TARGET,
            dialect = dialect_name,
            bytes = text.len(),
            tokens = tokens.len(),
            warnings = warnings.len(),
            "compiled query"
        );
        CompileOutput {
            predicate: Some(predicate),
            spans,
            errors: Vec::new(),
            warnings,
        }
    }

    fn reject(
        &self,
        text: &str,
        dialect_name: &str,
        tokens: &[Token],
        error: CompileError,
        warnings: Vec<Diagnostic>,
    ) -> CompileOutput {
        debug!(
            target: COMPILE_TARGET,
            dialect = dialect_name,
            bytes = text.len(),
            tokens = tokens.len(),
            code = %error.code(),
            "rejected query"
        );
        CompileOutput {
            predicate: None,
            spans: annotate_lexical(tokens, &self.config),
            errors: vec![error],
            warnings,
        }
    }
}

fn unresolved_warnings(semantic: &SemanticNode) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    collect_unresolved(semantic, false, &mut found);
    found
}

/// Walks filters in source order. `negated` tracks whether the enclosing
/// prefixes flip the filter, so the note says what the miss does to the
/// result.
fn collect_unresolved(node: &SemanticNode, negated: bool, found: &mut Vec<Diagnostic>) {
    match node.kind() {
        SemanticKind::Filter(filter) => {
            let excluding = negated != (filter.operator() == Operator::Ne);
            unresolved_operands(filter, excluding, found);
        }
        SemanticKind::Not(child) => collect_unresolved(child, !negated, found),
        SemanticKind::Group(child) => collect_unresolved(child, negated, found),
        SemanticKind::And(children) | SemanticKind::Or(children) => {
            for child in children {
                collect_unresolved(child, negated, found);
            }
        }
    }
}

fn unresolved_operands(filter: &Filter, excluding: bool, found: &mut Vec<Diagnostic>) {
    let ValueType::Reference(kind) = filter.value_type() else {
        return;
    };
    let note = if excluding {
        "the filter excludes nothing"
    } else {
        "the filter matches nothing"
    };
    for operand in filter.operands() {
        if operand.resolution().is_some_and(|resolution| !resolution.is_resolved()) {
            found.push(Diagnostic::new(
                DiagnosticCode::UnresolvedReference,
                format!("no {kind} matches '{}'", operand.text()),
                operand.span(),
                vec![String::from(note)],
            ));
        }
    }
}

/// The result of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    predicate: Option<Predicate>,
    spans: Vec<VisualSpan>,
    errors: Vec<CompileError>,
    warnings: Vec<Diagnostic>,
}

impl CompileOutput {
    /// Returns the predicate, absent when compilation failed.
    #[must_use]
    pub const fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Returns the highlight spans in source order.
    #[must_use]
    pub fn spans(&self) -> &[VisualSpan] {
        &self.spans
    }

    /// Returns the fatal errors; at most one per compilation.
    #[must_use]
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// Returns the soft warnings.
    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Returns `true` if a predicate was produced.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && self.predicate.is_some()
    }

    /// Separates a successful compilation from a failed one.
    ///
    /// # Errors
    ///
    /// Returns a [`DiagnosticReport`] holding the errors followed by the
    /// warnings when compilation failed.
    pub fn into_result(self) -> Result<CompiledQuery, DiagnosticReport> {
        match self.predicate {
            Some(predicate) if self.errors.is_empty() => Ok(CompiledQuery {
                predicate,
                spans: self.spans,
                warnings: self.warnings,
            }),
            _ => {
                let mut diagnostics: Vec<Diagnostic> =
                    self.errors.iter().map(CompileError::to_diagnostic).collect();
                diagnostics.extend(self.warnings);
                Err(DiagnosticReport::new(diagnostics))
            }
        }
    }
}

/// A successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    predicate: Predicate,
    spans: Vec<VisualSpan>,
    warnings: Vec<Diagnostic>,
}

impl CompiledQuery {
    /// Returns the predicate.
    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Returns the highlight spans.
    #[must_use]
    pub fn spans(&self) -> &[VisualSpan] {
        &self.spans
    }

    /// Returns the soft warnings.
    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Consumes the query, returning the predicate.
    #[must_use]
    pub fn into_predicate(self) -> Predicate {
        self.predicate
    }
}

/// A fatal error from any pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The text could not be tokenized.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The tokens do not form a query.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The query does not fit the dialect.
    #[error(transparent)]
    Semantic(#[from] SemanticError),

    /// No dialect has the requested name.
    #[error("unknown dialect '{name}'")]
    UnknownDialect {
        /// The requested name.
        name: String,
        /// The whole input.
        span: Span,
    },
}

impl CompileError {
    /// Returns the offending range.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Lex(error) => error.span(),
            Self::Parse(error) => error.span(),
            Self::Semantic(error) => error.span(),
            Self::UnknownDialect { span, .. } => *span,
        }
    }

    /// Returns the stable diagnostic code.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self {
            Self::Lex(error) => error.code(),
            Self::Parse(error) => error.code(),
            Self::Semantic(error) => error.code(),
            Self::UnknownDialect { .. } => DiagnosticCode::UnknownDialect,
        }
    }

    /// Converts the error into a diagnostic.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Lex(error) => error.to_diagnostic(),
            Self::Parse(error) => error.to_diagnostic(),
            Self::Semantic(error) => error.to_diagnostic(),
            Self::UnknownDialect { span, .. } => {
                Diagnostic::new(self.code(), self.to_string(), *span, Vec::new())
            }
        }
    }
}
