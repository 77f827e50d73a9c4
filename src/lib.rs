//! # Introduction
//!
//! `cool_front` is the front end of a compiler for a COOL-family teaching
//! language. It turns source text into a typed syntax tree and a list of
//! positioned diagnostics; semantic analysis and code generation live
//! elsewhere.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST (+ Diagnostics)
//! ```
//!
//! 1. [`parser::lexer`] pulls characters on demand and produces tokens with
//!    1-based line/column positions. Malformed input becomes error tokens.
//! 2. [`parser::parse`] drives a recursive descent parser over a two-token
//!    window, recovering from errors at feature and class boundaries.
//! 3. [`parser::ast`] holds the tree: program → classes → features →
//!    expressions, each node keeping the token that introduced it.
//!
//! ```
//! let (program, diagnostics) = cool_front::parser::parse("class Main { x : Int <- 1 + 2; };");
//! assert!(diagnostics.is_empty());
//! assert_eq!(program.classes[0].name.value, "Main");
//! ```
//!
//! Logging goes through [`tracing`]; install a subscriber to see token and
//! recovery events.

pub mod parser;
