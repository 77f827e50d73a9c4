//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including diagnostics, configuration, cursor helpers, and the main parse
//! entry point.
//!
//! # Parser Architecture
//!
//! The Parser is a recursive descent parser with a two-token window:
//! - This module: Parser struct, cursor helpers, recovery, and coordination
//! - `declarations`: classes, methods, attributes, and formals
//! - `expressions`: expressions with a precedence ladder for operators
//!
//! Every production is entered with `current` on its first token and returns
//! with `current` on its last token. Productions report failure by returning
//! `None` after recording a [`Diagnostic`]; the parser itself never panics.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use std::mem;
use std::str::Chars;
use thiserror::Error;

/// What went wrong, without position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    /// The lexer produced an error token.
    #[error("{0}")]
    Lexical(String),

    #[error("expected `{expected}`, got `{found}`")]
    UnexpectedToken { expected: TokenKind, found: TokenKind },

    #[error("expected expression, got `{found}`")]
    ExpectedExpression { found: TokenKind },

    #[error("comparison operator `{operator}` is non-associative")]
    NonAssociative { operator: String },

    #[error("{construct} expressions are not supported")]
    Unsupported { construct: &'static str },

    #[error("could not parse {literal:?} as a 64-bit integer")]
    InvalidInteger { literal: String },

    #[error("expression nesting is too deep (maximum {limit} levels)")]
    NestingTooDeep { limit: usize },
}

/// A positioned parse or lex error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_file}:{}:{}: {kind}", .location.line, .location.column)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: SourceLocation,
    pub source_file: String,
}

/// Parser settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Copied into every [`Class`] and [`Diagnostic`].
    pub source_file: String,
    /// Skip to the next feature or class after an error instead of stopping.
    pub recovery: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            source_file: "<input>".to_string(),
            recovery: true,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = source_file.into();
        self
    }

    pub fn with_recovery(mut self, recovery: bool) -> Self {
        self.recovery = recovery;
        self
    }
}

/// Maximum expression nesting before the parser gives up on an expression.
///
/// Every level costs several stack frames (one per precedence level), so
/// inputs like `((((...))))` or `not not not ...` would otherwise overflow
/// the stack.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Recursive descent parser for COOL
pub struct Parser<I: Iterator<Item = char>> {
    lexer: Lexer<I>,
    pub(crate) current: Token,
    pub(crate) peek: Token,
    diagnostics: Vec<Diagnostic>,
    pub(crate) config: ParserConfig,
    /// `{` minus `}` seen up to and including `current`.
    pub(crate) brace_depth: isize,
    nesting_depth: usize,
}

impl<'a> Parser<Chars<'a>> {
    pub fn new(source: &'a str) -> Self {
        Self::with_config(source, ParserConfig::default())
    }

    pub fn with_config(source: &'a str, config: ParserConfig) -> Self {
        Self::from_lexer(Lexer::new(source), config)
    }
}

impl<I: Iterator<Item = char>> Parser<I> {
    pub fn from_lexer(lexer: Lexer<I>, config: ParserConfig) -> Self {
        let placeholder = Token::eof(SourceLocation::default());
        let mut parser = Self {
            lexer,
            current: placeholder.clone(),
            peek: placeholder,
            diagnostics: Vec::new(),
            config,
            brace_depth: 0,
            nesting_depth: 0,
        };

        // Fill both slots of the window.
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Parse the whole translation unit.
    ///
    /// Always returns a program; it holds every class that parsed cleanly.
    /// The diagnostics list is empty exactly when the input was well formed.
    pub fn parse_program(mut self) -> (Program, Vec<Diagnostic>) {
        let span = tracing::debug_span!("parse_program", file = %self.config.source_file);
        let _enter = span.enter();

        let mut program = Program::new();

        while !self.cur_is(TokenKind::Eof) {
            let class = if self.cur_is(TokenKind::Class) {
                self.parse_class()
            } else {
                self.error_at_current(DiagnosticKind::UnexpectedToken {
                    expected: TokenKind::Class,
                    found: self.current.kind,
                });
                None
            };

            match class {
                Some(class) => program.classes.push(class),
                None if self.config.recovery => self.synchronize_class(),
                None => break,
            }

            self.next_token();
        }

        tracing::debug!(
            classes = program.classes.len(),
            diagnostics = self.diagnostics.len(),
            "parse finished"
        );

        (program, self.diagnostics)
    }

    // ===== Cursor =====

    /// Shift the window by one token. Error tokens are reported and skipped,
    /// so productions only ever see well-formed tokens.
    pub(crate) fn next_token(&mut self) {
        let next = loop {
            let token = self.lexer.next_token();
            if !token.is(TokenKind::Error) {
                break token;
            }
            let location = token.location;
            self.push_diagnostic(DiagnosticKind::Lexical(token.literal), location);
        };
        self.current = mem::replace(&mut self.peek, next);

        match self.current.kind {
            TokenKind::LBrace => self.brace_depth += 1,
            TokenKind::RBrace => self.brace_depth -= 1,
            _ => {}
        }
    }

    pub(crate) fn cur_is(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    pub(crate) fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    /// Advance if `peek` is `kind`, otherwise record a diagnostic and stay put.
    pub(crate) fn expect_and_advance(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_is(kind) {
            self.next_token();
            Some(())
        } else {
            self.peek_error(kind);
            None
        }
    }

    /// Check that `current` is `kind` without moving.
    pub(crate) fn expect_current(&mut self, kind: TokenKind) -> Option<()> {
        if self.cur_is(kind) {
            Some(())
        } else {
            self.error_at_current(DiagnosticKind::UnexpectedToken {
                expected: kind,
                found: self.current.kind,
            });
            None
        }
    }

    // ===== Nesting =====

    /// Enter one level of expression nesting. Past [`MAX_NESTING_DEPTH`] this
    /// records a diagnostic at `current` and returns `None`; otherwise every
    /// call must be paired with [`Parser::leave_nesting`].
    pub(crate) fn enter_nesting(&mut self) -> Option<()> {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            self.error_at_current(DiagnosticKind::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
            return None;
        }
        self.nesting_depth += 1;
        Some(())
    }

    pub(crate) fn leave_nesting(&mut self) {
        debug_assert!(self.nesting_depth > 0, "leave_nesting without enter_nesting");
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    // ===== Diagnostics =====

    fn peek_error(&mut self, expected: TokenKind) {
        let found = self.peek.kind;
        let location = self.peek.location;
        self.push_diagnostic(DiagnosticKind::UnexpectedToken { expected, found }, location);
    }

    pub(crate) fn error_at_current(&mut self, kind: DiagnosticKind) {
        let location = self.current.location;
        self.push_diagnostic(kind, location);
    }

    fn push_diagnostic(&mut self, kind: DiagnosticKind, location: SourceLocation) {
        let diagnostic = Diagnostic {
            kind,
            location,
            source_file: self.config.source_file.clone(),
        };
        tracing::debug!(%diagnostic, "diagnostic recorded");
        self.diagnostics.push(diagnostic);
    }

    // ===== Recovery =====

    /// Skip the rest of a malformed feature of a class whose body sits at
    /// `class_depth`. Stops on a `;` at class depth that is followed by the
    /// start of another feature or by the closing brace, on the class's own
    /// closing brace (which is then `current`), or when the next token is
    /// `class` or EOF.
    pub(crate) fn synchronize_feature(&mut self, class_depth: isize) {
        let mut skipped = 0usize;

        loop {
            if self.brace_depth < class_depth {
                break;
            }
            if self.peek_is(TokenKind::Eof) || self.peek_is(TokenKind::Class) {
                break;
            }
            if self.cur_is(TokenKind::Semi)
                && self.brace_depth == class_depth
                && (self.peek_is(TokenKind::ObjectId) || self.peek_is(TokenKind::RBrace))
            {
                break;
            }

            self.next_token();
            skipped += 1;
        }

        tracing::debug!(skipped, "resynchronized after malformed feature");
    }

    /// Skip to just before the next `class` keyword or EOF.
    pub(crate) fn synchronize_class(&mut self) {
        let mut skipped = 0usize;
        while !self.peek_is(TokenKind::Class) && !self.peek_is(TokenKind::Eof) {
            self.next_token();
            skipped += 1;
        }
        tracing::debug!(skipped, "resynchronized after malformed class");
    }
}
