//! Recursive-descent parser from tokens to a [`SyntaxNode`].
//!
//! Precedence, lowest first: `OR`/`|`, then `AND`/`&`/juxtaposition, then
//! prefix negation (`-`, `!`, `NOT`), then groups and filters. Chains of the
//! same connective fold into one flat node. The parser never consults a
//! dialect, so an unknown field name is not a parse error.

use std::fmt;

use hql_core::{CompilerConfig, Diagnostic, DiagnosticCode, Operator, Span};
use thiserror::Error;

use crate::lexer::{Punct, Token, TokenKind};
use crate::syntax::{FieldFilter, RangeValue, Scalar, SyntaxKind, SyntaxNode, Value, ValueShape};

/// What the parser would have accepted where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
    /// The start of an operand: a word, string, group, collection or prefix.
    Operand,
    /// A filter value.
    Value,
    /// A single word or string.
    Scalar,
    /// A specific punctuation character.
    Punctuation(Punct),
    /// Nothing more.
    EndOfInput,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand => f.write_str("an operand"),
            Self::Value => f.write_str("a value"),
            Self::Scalar => f.write_str("a word or string"),
            Self::Punctuation(punct) => write!(f, "'{}'", punct.as_char()),
            Self::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// Why parsing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorReason {
    /// A token the grammar does not allow here.
    #[error("unexpected token")]
    UnexpectedToken,
    /// A group, range or collection left open, or a stray closer.
    #[error("unbalanced grouping")]
    UnbalancedGroup,
    /// Groups and negations nested beyond the configured limit.
    #[error("nesting deeper than {limit}")]
    NestingTooDeep {
        /// The configured limit.
        limit: usize,
    },
}

/// A fatal syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_parse_error(self))]
pub struct ParseError {
    span: Span,
    expected: Vec<Expected>,
    found: TokenKind,
    reason: ParseErrorReason,
}

fn render_parse_error(error: &ParseError) -> String {
    let expected = error
        .expected
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ");
    if expected.is_empty() {
        format!("{}, found {}", error.reason, error.found)
    } else {
        format!("{}: expected {expected}, found {}", error.reason, error.found)
    }
}

impl ParseError {
    /// Returns the range of the offending token.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the alternatives the parser would have accepted.
    #[must_use]
    pub fn expected(&self) -> &[Expected] {
        &self.expected
    }

    /// Returns the kind of the offending token.
    #[must_use]
    pub const fn found(&self) -> TokenKind {
        self.found
    }

    /// Returns the failure reason.
    #[must_use]
    pub const fn reason(&self) -> ParseErrorReason {
        self.reason
    }

    /// Returns the stable diagnostic code.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self.reason {
            ParseErrorReason::UnexpectedToken => DiagnosticCode::UnexpectedToken,
            ParseErrorReason::UnbalancedGroup => DiagnosticCode::UnbalancedGroup,
            ParseErrorReason::NestingTooDeep { .. } => DiagnosticCode::NestingTooDeep,
        }
    }

    /// Renders the error as a diagnostic.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code(), self.to_string(), self.span, vec![])
    }
}

/// Parses a token sequence with the default configuration.
///
/// # Errors
///
/// Returns a [`ParseError`] for an unexpected token, unbalanced grouping or
/// nesting beyond the default limit.
///
/// # Example
///
/// ```
/// use hql_syntax::{SyntaxKind, parse, tokenize};
///
/// let stream = tokenize("a b OR c")?;
/// let root = parse(stream.tokens())?;
/// assert!(matches!(root.kind(), SyntaxKind::Or(children) if children.len() == 2));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse(tokens: &[Token]) -> Result<SyntaxNode, ParseError> {
    parse_with(tokens, &CompilerConfig::default())
}

/// Parses a token sequence under `config`.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_with(tokens: &[Token], config: &CompilerConfig) -> Result<SyntaxNode, ParseError> {
    let end = tokens.last().map_or(0, |token| token.span().end());
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        open_groups: 0,
        end,
        config,
    };
    if parser.peek().is_none() {
        return Ok(SyntaxNode::new(SyntaxKind::And(Vec::new()), Span::new(0, end)));
    }
    let root = parser.parse_or()?;
    if parser.peek().is_some() {
        let reason = if parser.at_punct(Punct::RParen) {
            ParseErrorReason::UnbalancedGroup
        } else {
            ParseErrorReason::UnexpectedToken
        };
        return Err(parser.error(reason, vec![Expected::EndOfInput]));
    }
    Ok(root)
}

/// A compound word: adjacent identifier and number tokens joined by `.` or
/// `-`, optionally signed.
struct Word {
    text: String,
    span: Span,
    inner_dashes: Vec<usize>,
}

impl Word {
    fn scalar(self) -> Scalar {
        Scalar::new(self.text, None, self.span)
    }

    /// Returns the value this word denotes: a dash range when it has
    /// exactly one inner dash between two numeric halves.
    fn into_value(self) -> Value {
        let span = self.span;
        if let [dash] = self.inner_dashes.as_slice() {
            let halves = (self.text.get(..*dash), self.text.get(dash + 1..));
            if let (Some(lower), Some(upper)) = halves
                && starts_numeric(lower)
                && starts_numeric(upper)
            {
                let split = span.start() + dash;
                let range = RangeValue::dash(
                    Scalar::new(lower.to_owned(), None, Span::new(span.start(), split)),
                    Scalar::new(upper.to_owned(), None, Span::new(split + 1, span.end())),
                    self.text.clone(),
                );
                return Value::new(ValueShape::Range(range), span);
            }
        }
        Value::new(ValueShape::Scalar(self.scalar()), span)
    }
}

fn starts_numeric(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}

const fn is_word_piece(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier | TokenKind::Number)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Nesting of groups and negations, bounded by the configured limit.
    depth: usize,
    /// Parentheses opened and not yet closed.
    open_groups: usize,
    end: usize,
    config: &'t CompilerConfig,
}

impl<'t> Parser<'t> {
    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    fn peek(&self) -> Option<&'t Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens
            .get(self.pos + offset)
            .filter(|token| !token.is_eof())
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn at_punct(&self, punct: Punct) -> bool {
        self.peek()
            .is_some_and(|token| token.kind() == TokenKind::Punctuation(punct))
    }

    fn is_keyword(&self, token: &Token, keyword: &str) -> bool {
        token.kind() == TokenKind::Identifier
            && (token.raw() == keyword
                || (self.config.case_insensitive_keywords()
                    && token.raw().eq_ignore_ascii_case(keyword)))
    }

    fn error(&self, reason: ParseErrorReason, expected: Vec<Expected>) -> ParseError {
        let (span, found) = self.peek().map_or((Span::empty(self.end), TokenKind::Eof), |token| {
            (token.span(), token.kind())
        });
        ParseError {
            span,
            expected,
            found,
            reason,
        }
    }

    /// Reports a missing closer: unbalanced at end of input, unexpected
    /// otherwise.
    fn missing_closer(&self, expected: Vec<Expected>) -> ParseError {
        let reason = if self.peek().is_none() {
            ParseErrorReason::UnbalancedGroup
        } else {
            ParseErrorReason::UnexpectedToken
        };
        self.error(reason, expected)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        let limit = self.config.max_nesting_depth();
        if self.depth >= limit {
            return Err(self.error(ParseErrorReason::NestingTooDeep { limit }, Vec::new()));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Boolean structure
    // -----------------------------------------------------------------------

    fn parse_or(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut operands = vec![self.parse_and()?];
        while self.consume_connective(Punct::Pipe, "OR") {
            operands.push(self.parse_and()?);
        }
        Ok(fold(operands, SyntaxKind::Or))
    }

    fn parse_and(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut operands = vec![self.parse_unary()?];
        loop {
            if self.consume_connective(Punct::Ampersand, "AND") || self.starts_operand() {
                operands.push(self.parse_unary()?);
                continue;
            }
            break;
        }
        Ok(fold(operands, SyntaxKind::And))
    }

    fn consume_connective(&mut self, punct: Punct, keyword: &str) -> bool {
        let matched = self.peek().is_some_and(|token| {
            token.kind() == TokenKind::Punctuation(punct) || self.is_keyword(token, keyword)
        });
        if matched {
            self.advance();
        }
        matched
    }

    fn starts_operand(&self) -> bool {
        let Some(token) = self.peek() else {
            return false;
        };
        match token.kind() {
            TokenKind::Identifier => {
                !self.is_keyword(token, "AND") && !self.is_keyword(token, "OR")
            }
            TokenKind::Number
            | TokenKind::String(_)
            | TokenKind::Operator(Operator::Range)
            | TokenKind::Punctuation(Punct::LParen | Punct::LBrace | Punct::Bang) => true,
            TokenKind::Operator(_) | TokenKind::Punctuation(_) | TokenKind::Eof => false,
        }
    }

    fn parse_unary(&mut self) -> Result<SyntaxNode, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error(ParseErrorReason::UnexpectedToken, vec![Expected::Operand]));
        };
        let negation = matches!(
            token.kind(),
            TokenKind::Operator(Operator::Range) | TokenKind::Punctuation(Punct::Bang)
        ) || self.is_keyword(token, "NOT");
        if !negation {
            return self.parse_primary();
        }

        self.enter()?;
        self.advance();
        let operand = self.parse_unary();
        self.leave();
        let child = operand?;
        let span = token.span().cover(child.span());
        Ok(SyntaxNode::new(SyntaxKind::Not(Box::new(child)), span))
    }

    fn parse_primary(&mut self) -> Result<SyntaxNode, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error(ParseErrorReason::UnexpectedToken, vec![Expected::Operand]));
        };
        match token.kind() {
            TokenKind::Punctuation(Punct::LParen) => self.parse_group(token),
            TokenKind::Punctuation(Punct::RParen) if self.open_groups == 0 => {
                Err(self.error(ParseErrorReason::UnbalancedGroup, vec![Expected::Operand]))
            }
            TokenKind::Punctuation(Punct::LBrace) => {
                let value = self.parse_collection()?;
                Ok(literal(value))
            }
            TokenKind::String(_) => {
                let value = self.parse_element()?;
                Ok(literal(value))
            }
            TokenKind::Identifier
                if !self.is_keyword(token, "AND") && !self.is_keyword(token, "OR") =>
            {
                self.parse_word_operand()
            }
            TokenKind::Number => self.parse_word_operand(),
            _ => Err(self.error(ParseErrorReason::UnexpectedToken, vec![Expected::Operand])),
        }
    }

    fn parse_group(&mut self, open: &Token) -> Result<SyntaxNode, ParseError> {
        self.enter()?;
        self.advance();
        self.open_groups += 1;
        let inner = if self.at_punct(Punct::RParen) {
            let after_open = open.span().end();
            let before_close = self.peek().map_or(after_open, |close| close.span().start());
            SyntaxNode::new(SyntaxKind::And(Vec::new()), Span::new(after_open, before_close))
        } else {
            self.parse_or()?
        };
        if !self.at_punct(Punct::RParen) {
            return Err(self.missing_closer(vec![Expected::Punctuation(Punct::RParen)]));
        }
        let close_end = self.advance().map_or(self.end, |close| close.span().end());
        self.open_groups = self.open_groups.saturating_sub(1);
        self.leave();
        let span = Span::new(open.span().start(), close_end);
        Ok(SyntaxNode::new(SyntaxKind::Group(Box::new(inner)), span))
    }

    // -----------------------------------------------------------------------
    // Filters and values
    // -----------------------------------------------------------------------

    fn parse_word_operand(&mut self) -> Result<SyntaxNode, ParseError> {
        let word = self.parse_word(false)?;
        let filter_op = self.peek().and_then(|token| match token.kind() {
            TokenKind::Operator(op) if op.is_filter_operator() => Some((op, token.span())),
            _ => None,
        });
        let Some((operator, operator_span)) = filter_op else {
            return Ok(literal(word.into_value()));
        };
        self.advance();
        let value = self.parse_filter_value()?;
        let span = word.span.cover(value.span());
        let filter = FieldFilter::new(word.text, word.span, operator, operator_span, value);
        Ok(SyntaxNode::new(SyntaxKind::FieldFilter(filter), span))
    }

    fn parse_filter_value(&mut self) -> Result<Value, ParseError> {
        match self.peek().map(Token::kind) {
            Some(TokenKind::Punctuation(Punct::LBracket | Punct::LParen)) => {
                self.parse_bracket_range()
            }
            Some(TokenKind::Punctuation(Punct::LBrace)) => self.parse_collection(),
            _ => self.parse_element(),
        }
    }

    /// Parses a collection member or a plain filter value: a string, or a
    /// word that may turn out to be a dash range.
    fn parse_element(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some(token) if matches!(token.kind(), TokenKind::String(_)) => {
                let scalar = self.parse_string(token);
                Ok(Value::new(ValueShape::Scalar(scalar), token.span()))
            }
            _ => Ok(self.parse_word(true)?.into_value()),
        }
    }

    fn parse_string(&mut self, token: &Token) -> Scalar {
        self.advance();
        let quote = match token.kind() {
            TokenKind::String(style) => Some(style),
            _ => None,
        };
        Scalar::new(token.value().to_owned(), quote, token.span())
    }

    fn parse_collection(&mut self) -> Result<Value, ParseError> {
        let start = self.advance().map_or(self.end, |open| open.span().start());
        let mut items = Vec::new();
        loop {
            let item = match self.peek().map(Token::kind) {
                Some(TokenKind::Punctuation(Punct::LBrace)) => {
                    return Err(self.error(ParseErrorReason::UnexpectedToken, vec![Expected::Value]));
                }
                Some(TokenKind::Punctuation(Punct::LBracket | Punct::LParen)) => {
                    self.parse_bracket_range()?
                }
                _ => self.parse_element()?,
            };
            items.push(item);
            if self.at_punct(Punct::Comma) {
                self.advance();
                continue;
            }
            if self.at_punct(Punct::RBrace) {
                break;
            }
            return Err(self.missing_closer(vec![
                Expected::Punctuation(Punct::Comma),
                Expected::Punctuation(Punct::RBrace),
            ]));
        }
        let end = self.advance().map_or(self.end, |close| close.span().end());
        Ok(Value::new(ValueShape::Collection(items), Span::new(start, end)))
    }

    fn parse_bracket_range(&mut self) -> Result<Value, ParseError> {
        let Some(open) = self.advance() else {
            return Err(self.error(ParseErrorReason::UnexpectedToken, vec![Expected::Value]));
        };
        let lower_inclusive = open.kind() == TokenKind::Punctuation(Punct::LBracket);
        let lower = self.parse_bound()?;
        if !self.at_punct(Punct::Comma) {
            return Err(self.missing_closer(vec![Expected::Punctuation(Punct::Comma)]));
        }
        self.advance();
        let upper = self.parse_bound()?;
        let upper_inclusive = match self.peek().map(Token::kind) {
            Some(TokenKind::Punctuation(Punct::RBracket)) => true,
            Some(TokenKind::Punctuation(Punct::RParen)) => false,
            _ => {
                return Err(self.missing_closer(vec![
                    Expected::Punctuation(Punct::RBracket),
                    Expected::Punctuation(Punct::RParen),
                ]));
            }
        };
        let end = self.advance().map_or(self.end, |close| close.span().end());
        let range = RangeValue::bracket(lower, upper, lower_inclusive, upper_inclusive);
        Ok(Value::new(
            ValueShape::Range(range),
            Span::new(open.span().start(), end),
        ))
    }

    fn parse_bound(&mut self) -> Result<Scalar, ParseError> {
        match self.peek() {
            Some(token) if matches!(token.kind(), TokenKind::String(_)) => {
                Ok(self.parse_string(token))
            }
            _ => Ok(self
                .parse_word(true)
                .map_err(|mut error| {
                    error.expected = vec![Expected::Scalar];
                    error
                })?
                .scalar()),
        }
    }

    /// Parses a compound word. With `signed`, a `-` directly before a number
    /// is kept as a sign.
    fn parse_word(&mut self, signed: bool) -> Result<Word, ParseError> {
        let mut text = String::new();
        let mut start = None;
        if signed
            && let (Some(sign), Some(digits)) = (self.peek(), self.peek_at(1))
            && sign.kind() == TokenKind::Operator(Operator::Range)
            && digits.kind() == TokenKind::Number
            && sign.span().end() == digits.span().start()
        {
            self.advance();
            text.push('-');
            start = Some(sign.span().start());
        }

        let Some(first) = self.peek().filter(|token| is_word_piece(token.kind())) else {
            return Err(self.error(ParseErrorReason::UnexpectedToken, vec![Expected::Value]));
        };
        self.advance();
        text.push_str(first.raw());
        let mut end = first.span().end();
        let mut inner_dashes = Vec::new();

        while let Some(next) = self.peek().filter(|token| token.span().start() == end) {
            if is_word_piece(next.kind()) {
                self.advance();
                text.push_str(next.raw());
                end = next.span().end();
                continue;
            }
            let joiner = matches!(
                next.kind(),
                TokenKind::Punctuation(Punct::Dot) | TokenKind::Operator(Operator::Range)
            );
            let Some(piece) = self.peek_at(1).filter(|piece| {
                joiner && is_word_piece(piece.kind()) && piece.span().start() == next.span().end()
            }) else {
                break;
            };
            if next.kind() == TokenKind::Operator(Operator::Range) {
                inner_dashes.push(text.len());
            }
            self.advance();
            self.advance();
            text.push_str(next.raw());
            text.push_str(piece.raw());
            end = piece.span().end();
        }

        let span = Span::new(start.unwrap_or_else(|| first.span().start()), end);
        Ok(Word {
            text,
            span,
            inner_dashes,
        })
    }
}

fn literal(value: Value) -> SyntaxNode {
    let span = value.span();
    SyntaxNode::new(SyntaxKind::Literal(value), span)
}

fn fold(mut operands: Vec<SyntaxNode>, build: fn(Vec<SyntaxNode>) -> SyntaxKind) -> SyntaxNode {
    if operands.len() == 1
        && let Some(only) = operands.pop()
    {
        return only;
    }
    let span = match (operands.first(), operands.last()) {
        (Some(first), Some(last)) => first.span().cover(last.span()),
        _ => Span::empty(0),
    };
    SyntaxNode::new(build(operands), span)
}
