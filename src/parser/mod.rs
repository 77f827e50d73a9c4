//! COOL source code parser
//!
//! This module transforms COOL source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), diagnostics and parser settings
//! - [`ast`]: AST node definitions
//!
//! # Supported COOL Subset
//!
//! - Classes with attributes and methods; no inheritance
//! - Expressions: literals, identifiers, assignment, arithmetic, comparison,
//!   `not`, `~`, `isvoid`, `if`, `while`, blocks, `new`, parentheses
//! - No dispatch, `let` or `case`
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with a precedence ladder for binary
//! operators. No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;


pub use ast::{Node, Program, SourceLocation};
pub use lexer::{Lexer, Token, TokenKind};
pub use parse::{Diagnostic, DiagnosticKind, Parser, ParserConfig, MAX_NESTING_DEPTH};

/// Parse `source` with the default [`ParserConfig`].
pub fn parse(source: &str) -> (Program, Vec<Diagnostic>) {
    Parser::new(source).parse_program()
}
