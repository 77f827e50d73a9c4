//! Lexer (tokenizer) for COOL source code
//!
//! Pulls characters one at a time from any `Iterator<Item = char>` and hands
//! out [`Token`]s on demand. Nothing is tokenised ahead of the parser: the
//! lexer keeps a single character of lookahead on top of its source.
//!
//! Bad input never stops the lexer. Unknown characters, unterminated strings
//! and unterminated comments become [`TokenKind::Error`] tokens whose literal
//! describes the problem, and scanning resumes right after them.

use super::ast::SourceLocation;
use rustc_hash::FxHashMap;
use std::fmt;
use std::str::Chars;
use std::sync::LazyLock;

/// Lexical categories.
///
/// `Display` renders the upper-case name used in diagnostics
/// (`RBRACE`, `OBJECTID`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Error,

    // Keywords
    Class,
    If,
    Else,
    Fi,
    Then,
    While,
    Loop,
    Pool,
    Case,
    Esac,
    New,
    IsVoid,
    Not,

    // Identifiers
    TypeId,
    ObjectId,

    // Literals
    IntConst,
    StrConst,
    BoolConst,

    // Operators
    Assign, // <-
    Lt,     // <
    Le,     // <=
    Eq,     // =
    Plus,   // +
    Minus,  // -
    Times,  // *
    Divide, // /
    Tilde,  // ~

    // Punctuation
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }
    Semi,   // ;
    Colon,  // :
    Comma,  // ,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Error => "ERROR",
            TokenKind::Class => "CLASS",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Fi => "FI",
            TokenKind::Then => "THEN",
            TokenKind::While => "WHILE",
            TokenKind::Loop => "LOOP",
            TokenKind::Pool => "POOL",
            TokenKind::Case => "CASE",
            TokenKind::Esac => "ESAC",
            TokenKind::New => "NEW",
            TokenKind::IsVoid => "ISVOID",
            TokenKind::Not => "NOT",
            TokenKind::TypeId => "TYPEID",
            TokenKind::ObjectId => "OBJECTID",
            TokenKind::IntConst => "INT_CONST",
            TokenKind::StrConst => "STR_CONST",
            TokenKind::BoolConst => "BOOL_CONST",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Lt => "LT",
            TokenKind::Le => "LE",
            TokenKind::Eq => "EQ",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Tilde => "TILDE",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::Semi => "SEMI",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reserved words, matched against the exact identifier text.
static KEYWORDS: LazyLock<FxHashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    [
        ("class", TokenKind::Class),
        ("if", TokenKind::If),
        ("else", TokenKind::Else),
        ("fi", TokenKind::Fi),
        ("then", TokenKind::Then),
        ("while", TokenKind::While),
        ("loop", TokenKind::Loop),
        ("pool", TokenKind::Pool),
        ("case", TokenKind::Case),
        ("esac", TokenKind::Esac),
        ("new", TokenKind::New),
        ("isvoid", TokenKind::IsVoid),
        ("not", TokenKind::Not),
        ("true", TokenKind::BoolConst),
        ("false", TokenKind::BoolConst),
    ]
    .into_iter()
    .collect()
});

/// A lexical token.
///
/// `literal` holds the source text for keywords, identifiers, integers and
/// operators, the decoded body for string constants, the message for
/// [`TokenKind::Error`] and the empty string for [`TokenKind::Eof`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            literal: literal.into(),
            location,
        }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::new(TokenKind::Eof, "", location)
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Pull-based lexer for COOL source code
pub struct Lexer<I: Iterator<Item = char>> {
    chars: I,
    current: Option<char>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<Chars<'a>> {
    /// Create a new lexer for the given source string.
    pub fn new(input: &'a str) -> Self {
        Self::from_chars(input.chars())
    }
}

impl<I: Iterator<Item = char>> Lexer<I> {
    /// Create a lexer over an arbitrary character source.
    pub fn from_chars(chars: impl IntoIterator<IntoIter = I>) -> Self {
        let mut chars = chars.into_iter();
        let current = chars.next();
        Self {
            chars,
            current,
            line: 1,
            column: 1,
        }
    }

    /// Produce the next token.
    ///
    /// Once the input is exhausted every call returns an EOF token.
    pub fn next_token(&mut self) -> Token {
        let token = self.scan();
        tracing::trace!(
            kind = %token.kind,
            line = token.location.line,
            column = token.location.column,
            "token"
        );
        token
    }

    fn scan(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let loc = self.current_location();
            let Some(ch) = self.advance() else {
                return Token::eof(loc);
            };

            return match ch {
                '"' => self.string_literal(loc),

                '0'..='9' => self.integer_literal(ch, loc),

                'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch, loc),

                '/' => {
                    if self.peek() == Some('/') {
                        self.skip_line_comment();
                        continue;
                    }
                    Token::new(TokenKind::Divide, "/", loc)
                }
                '(' => {
                    if self.peek() == Some('*') {
                        self.advance();
                        match self.skip_block_comment(loc) {
                            Some(error) => error,
                            None => continue,
                        }
                    } else {
                        Token::new(TokenKind::LParen, "(", loc)
                    }
                }
                '*' => {
                    if self.peek() == Some(')') {
                        self.advance();
                        Token::new(TokenKind::Error, "Unmatched *)", loc)
                    } else {
                        Token::new(TokenKind::Times, "*", loc)
                    }
                }
                '<' => {
                    if self.peek() == Some('-') {
                        self.advance();
                        Token::new(TokenKind::Assign, "<-", loc)
                    } else if self.peek() == Some('=') {
                        self.advance();
                        Token::new(TokenKind::Le, "<=", loc)
                    } else {
                        Token::new(TokenKind::Lt, "<", loc)
                    }
                }
                '=' => Token::new(TokenKind::Eq, "=", loc),
                '+' => Token::new(TokenKind::Plus, "+", loc),
                '-' => Token::new(TokenKind::Minus, "-", loc),
                '~' => Token::new(TokenKind::Tilde, "~", loc),
                ')' => Token::new(TokenKind::RParen, ")", loc),
                '{' => Token::new(TokenKind::LBrace, "{", loc),
                '}' => Token::new(TokenKind::RBrace, "}", loc),
                ';' => Token::new(TokenKind::Semi, ";", loc),
                ':' => Token::new(TokenKind::Colon, ":", loc),
                ',' => Token::new(TokenKind::Comma, ",", loc),

                _ => Token::new(
                    TokenKind::Error,
                    format!("Unexpected character: {}", ch),
                    loc,
                ),
            };
        }
    }

    /// Parse string literal, decoding escapes. The opening quote is consumed.
    fn string_literal(&mut self, loc: SourceLocation) -> Token {
        let mut string = String::new();
        let mut has_null = false;

        loop {
            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Error, "EOF in string constant", loc);
            };

            match ch {
                '"' => break,
                '\n' => {
                    return Token::new(TokenKind::Error, "Unterminated string constant", loc);
                }
                '\0' => has_null = true,
                '\\' => {
                    let Some(escaped) = self.advance() else {
                        return Token::new(TokenKind::Error, "EOF in string constant", loc);
                    };
                    let unescaped = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        '\0' => {
                            has_null = true;
                            continue;
                        }
                        other => other,
                    };
                    string.push(unescaped);
                }
                _ => string.push(ch),
            }
        }

        if has_null {
            return Token::new(TokenKind::Error, "String contains null character", loc);
        }

        Token::new(TokenKind::StrConst, string, loc)
    }

    /// Integer literals keep their text; conversion happens in the parser.
    fn integer_literal(&mut self, first_digit: char, loc: SourceLocation) -> Token {
        let mut digits = String::new();
        digits.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(TokenKind::IntConst, digits, loc)
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match KEYWORDS.get(ident.as_str()) {
            Some(&kind) => kind,
            None if first_char.is_ascii_uppercase() => TokenKind::TypeId,
            None => TokenKind::ObjectId,
        };

        Token::new(kind, ident, loc)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    /// Skip a `//` comment up to, but not including, the newline.
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip a `(* ... *)` comment whose opener is already consumed.
    /// Comments nest. Returns an error token if the input ends first.
    fn skip_block_comment(&mut self, start: SourceLocation) -> Option<Token> {
        let mut depth = 1usize;

        while depth > 0 {
            match self.advance() {
                None => return Some(Token::new(TokenKind::Error, "EOF in comment", start)),
                Some('(') if self.peek() == Some('*') => {
                    self.advance();
                    depth += 1;
                }
                Some('*') if self.peek() == Some(')') => {
                    self.advance();
                    depth -= 1;
                }
                Some(_) => {}
            }
        }

        None
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current?;
        self.current = self.chars.next();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Yields every token before EOF.
impl<I: Iterator<Item = char>> Iterator for Lexer<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (!token.is(TokenKind::Eof)).then_some(token)
    }
}
