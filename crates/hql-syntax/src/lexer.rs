//! Tokenisation of raw query text.
//!
//! The lexer is a single linear pass with at most two characters of
//! lookahead. Whitespace and `//` comments are discarded, but every token
//! keeps exact UTF-8 byte offsets so later stages can point back into the
//! original text.

use std::fmt;

use hql_core::{CompilerConfig, Diagnostic, DiagnosticCode, Operator, Span};
use serde::Serialize;
use thiserror::Error;

/// The delimiter of a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// `"…"`.
    Double,
    /// `'…'`.
    Single,
    /// `` `…` ``: an exact literal, never pattern-matched.
    Backtick,
}

impl QuoteStyle {
    const fn from_char(c: char) -> Option<Self> {
        match c {
            '"' => Some(Self::Double),
            '\'' => Some(Self::Single),
            '`' => Some(Self::Backtick),
            _ => None,
        }
    }

    /// Returns `true` for backtick literals.
    #[must_use]
    pub const fn is_exact(self) -> bool {
        matches!(self, Self::Backtick)
    }
}

impl fmt::Display for QuoteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Double => "double-quoted",
            Self::Single => "single-quoted",
            Self::Backtick => "backtick",
        })
    }
}

/// Grouping, separator and connective punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Punct {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `&`
    Ampersand,
    /// `|`
    Pipe,
    /// `!`
    Bang,
}

impl Punct {
    const fn from_char(c: char) -> Option<Self> {
        match c {
            '(' => Some(Self::LParen),
            ')' => Some(Self::RParen),
            '[' => Some(Self::LBracket),
            ']' => Some(Self::RBracket),
            '{' => Some(Self::LBrace),
            '}' => Some(Self::RBrace),
            ',' => Some(Self::Comma),
            '.' => Some(Self::Dot),
            '&' => Some(Self::Ampersand),
            '|' => Some(Self::Pipe),
            _ => None,
        }
    }

    /// Returns the punctuation character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::LParen => '(',
            Self::RParen => ')',
            Self::LBracket => '[',
            Self::RBracket => ']',
            Self::LBrace => '{',
            Self::RBrace => '}',
            Self::Comma => ',',
            Self::Dot => '.',
            Self::Ampersand => '&',
            Self::Pipe => '|',
            Self::Bang => '!',
        }
    }
}

/// The lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A word: letters, digits and the identifier symbols `_ * ? + # '`.
    Identifier,
    /// An unsigned integer or decimal.
    Number,
    /// A quoted string literal.
    String(QuoteStyle),
    /// A relational or range operator.
    Operator(Operator),
    /// Punctuation.
    Punctuation(Punct),
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier => f.write_str("identifier"),
            Self::Number => f.write_str("number"),
            Self::String(style) => write!(f, "{style} string"),
            Self::Operator(op) => write!(f, "'{op}'"),
            Self::Punctuation(punct) => write!(f, "'{}'", punct.as_char()),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

/// A single token with its source range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    kind: TokenKind,
    raw: String,
    value: String,
    span: Span,
}

impl Token {
    fn new(kind: TokenKind, raw: &str, span: Span) -> Self {
        Self {
            kind,
            raw: raw.to_owned(),
            value: raw.to_owned(),
            span,
        }
    }

    /// Returns the token kind.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the source text of the token, quotes and escapes included.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the decoded text: string contents without quotes and with
    /// escapes applied, or the raw text for every other kind.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the source range.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns `true` for [`TokenKind::Eof`].
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// The output of a successful tokenisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
    warnings: Vec<Diagnostic>,
}

impl TokenStream {
    /// Returns the tokens, always terminated by an end-of-input token.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns soft findings such as unnecessary escapes.
    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Splits the stream into tokens and warnings.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Token>, Vec<Diagnostic>) {
        (self.tokens, self.warnings)
    }
}

/// Why tokenisation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorReason {
    /// A character outside the lexical alphabet.
    #[error("illegal character '{0}'")]
    IllegalCharacter(char),

    /// A string literal was still open at end of input.
    #[error("unterminated {quote} string")]
    UnterminatedString {
        /// The opening delimiter.
        quote: QuoteStyle,
    },

    /// The query is longer than the configured limit.
    #[error("query exceeds {limit} bytes")]
    InputTooLong {
        /// The configured byte limit.
        limit: usize,
    },
}

/// A fatal lexical error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{reason} at byte {}", self.span.start())]
pub struct LexError {
    span: Span,
    reason: LexErrorReason,
}

impl LexError {
    /// Returns the offending range.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the byte offset where the error starts.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.span.start()
    }

    /// Returns the failure reason.
    #[must_use]
    pub const fn reason(&self) -> LexErrorReason {
        self.reason
    }

    /// Returns the stable diagnostic code.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self.reason {
            LexErrorReason::IllegalCharacter(_) => DiagnosticCode::IllegalCharacter,
            LexErrorReason::UnterminatedString { .. } => DiagnosticCode::UnterminatedString,
            LexErrorReason::InputTooLong { .. } => DiagnosticCode::QueryTooLong,
        }
    }

    /// Renders the error as a diagnostic.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code(), self.reason.to_string(), self.span, vec![])
    }
}

/// Tokenises `text` with the default configuration.
///
/// # Errors
///
/// Returns a [`LexError`] for an illegal character, an unterminated string,
/// or input longer than the default byte limit.
///
/// # Example
///
/// ```
/// use hql_syntax::{TokenKind, tokenize};
///
/// let stream = tokenize("tag:sky")?;
/// let kinds: Vec<_> = stream.tokens().iter().map(|t| t.kind()).collect();
/// assert_eq!(kinds.len(), 4);
/// assert_eq!(kinds.last(), Some(&TokenKind::Eof));
/// # Ok::<(), hql_syntax::LexError>(())
/// ```
pub fn tokenize(text: &str) -> Result<TokenStream, LexError> {
    tokenize_with(text, &CompilerConfig::default())
}

/// Tokenises `text` under `config`.
///
/// # Errors
///
/// See [`tokenize`].
pub fn tokenize_with(text: &str, config: &CompilerConfig) -> Result<TokenStream, LexError> {
    let limit = config.max_query_bytes();
    if text.len() > limit {
        let cut = (0..=limit)
            .rev()
            .find(|&offset| text.is_char_boundary(offset))
            .unwrap_or(0);
        return Err(LexError {
            span: Span::new(cut, text.len()),
            reason: LexErrorReason::InputTooLong { limit },
        });
    }
    Lexer::new(text).run()
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '*' | '?')
}

fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || matches!(c, '+' | '#' | '\'')
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    warnings: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            tokens: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, keep: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&keep) {
            self.bump();
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let raw = self.text.get(start..self.pos).unwrap_or_default();
        self.tokens
            .push(Token::new(kind, raw, Span::new(start, self.pos)));
    }

    fn run(mut self) -> Result<TokenStream, LexError> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if c == '/' && self.peek_second() == Some('/') {
                self.eat_while(|next| next != '\n');
                continue;
            }
            if let Some(quote) = QuoteStyle::from_char(c) {
                self.string(quote)?;
                continue;
            }
            if let Some(punct) = Punct::from_char(c) {
                self.bump();
                self.push(TokenKind::Punctuation(punct), start);
                continue;
            }
            if c.is_ascii_digit() {
                self.number();
                self.push(TokenKind::Number, start);
                continue;
            }
            if is_identifier_start(c) {
                self.eat_while(is_identifier_continue);
                self.push(TokenKind::Identifier, start);
                continue;
            }
            let kind = self.operator(c).ok_or_else(|| LexError {
                span: Span::new(start, start + c.len_utf8()),
                reason: LexErrorReason::IllegalCharacter(c),
            })?;
            self.push(kind, start);
        }

        let end = self.text.len();
        self.tokens
            .push(Token::new(TokenKind::Eof, "", Span::empty(end)));
        Ok(TokenStream {
            tokens: self.tokens,
            warnings: self.warnings,
        })
    }

    fn number(&mut self) {
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
    }

    /// Consumes an operator starting with `c`, or nothing if `c` starts none.
    fn operator(&mut self, c: char) -> Option<TokenKind> {
        let followed_by_eq = self.peek_second() == Some('=');
        let (kind, width) = match c {
            '!' if followed_by_eq => (TokenKind::Operator(Operator::Ne), 2),
            '!' => (TokenKind::Punctuation(Punct::Bang), 1),
            '>' if followed_by_eq => (TokenKind::Operator(Operator::Ge), 2),
            '>' => (TokenKind::Operator(Operator::Gt), 1),
            '<' if followed_by_eq => (TokenKind::Operator(Operator::Le), 2),
            '<' => (TokenKind::Operator(Operator::Lt), 1),
            '=' => (TokenKind::Operator(Operator::Eq), 1),
            ':' => (TokenKind::Operator(Operator::Colon), 1),
            '~' => (TokenKind::Operator(Operator::Match), 1),
            '-' => (TokenKind::Operator(Operator::Range), 1),
            _ => return None,
        };
        self.pos += width;
        Some(kind)
    }

    fn string(&mut self, quote: QuoteStyle) -> Result<(), LexError> {
        let start = self.pos;
        let closing = self.bump();
        let mut value = String::new();
        loop {
            let at = self.pos;
            match self.bump() {
                None => {
                    return Err(LexError {
                        span: Span::new(start, self.pos),
                        reason: LexErrorReason::UnterminatedString { quote },
                    });
                }
                Some(c) if Some(c) == closing => break,
                Some('\\') => {
                    let Some(escaped) = self.bump() else {
                        continue;
                    };
                    value.push(self.unescape(escaped, Span::new(at, self.pos)));
                }
                Some(c) => value.push(c),
            }
        }
        let raw = self.text.get(start..self.pos).unwrap_or_default();
        self.tokens.push(Token {
            kind: TokenKind::String(quote),
            raw: raw.to_owned(),
            value,
            span: Span::new(start, self.pos),
        });
        Ok(())
    }

    fn unescape(&mut self, escaped: char, span: Span) -> char {
        match escaped {
            '\\' | '"' | '\'' | '`' => escaped,
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            other => {
                self.warnings.push(Diagnostic::new(
                    DiagnosticCode::UnnecessaryEscape,
                    format!("unnecessary escape of '{other}'"),
                    span,
                    vec![],
                ));
                other
            }
        }
    }
}
