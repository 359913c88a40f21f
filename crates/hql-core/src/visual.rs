//! Highlight spans for interactive rendering of a query.

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// How a region of the query should be coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualKind {
    /// Part of a field name.
    FieldName,
    /// A filter operator or boolean connective.
    Operator,
    /// A reference value that resolved.
    ValueResolved,
    /// A reference value that matched nothing.
    ValueUnresolved,
    /// Anything else: plain values, grouping punctuation.
    Structural,
}

/// One highlighted region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualSpan {
    kind: VisualKind,
    span: Span,
}

impl VisualSpan {
    /// Creates a visual span.
    #[must_use]
    pub const fn new(kind: VisualKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the highlight kind.
    #[must_use]
    pub const fn kind(&self) -> VisualKind {
        self.kind
    }

    /// Returns the covered range.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.span.start()
    }

    /// Returns the end offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.span.end()
    }
}
