//! Lexer and parser for the hedge query language.
//!
//! Two stages of the query pipeline live here:
//!
//! - [`tokenize`] turns raw text into a [`TokenStream`] of typed tokens with
//!   exact byte spans, plus soft warnings.
//! - [`parse`] turns the tokens into a [`SyntaxNode`] tree.
//!
//! Both stages are purely syntactic. Field names are not checked against a
//! dialect and values are not coerced; that happens in semantic analysis.
//!
//! # Example
//!
//! ```
//! use hql_syntax::{SyntaxKind, parse, tokenize};
//!
//! let stream = tokenize("tag:landscape width>=1920")?;
//! let root = parse(stream.tokens())?;
//! assert!(matches!(root.kind(), SyntaxKind::And(children) if children.len() == 2));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod lexer;
mod parser;
mod syntax;

pub use lexer::{
    LexError, LexErrorReason, Punct, QuoteStyle, Token, TokenKind, TokenStream, tokenize,
    tokenize_with,
};
pub use parser::{Expected, ParseError, ParseErrorReason, parse, parse_with};
pub use syntax::{
    FieldFilter, RangeForm, RangeValue, Scalar, SyntaxKind, SyntaxNode, Value, ValueShape,
};

#[cfg(test)]
mod tests;
