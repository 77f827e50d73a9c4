//! Declaration parsing implementation
//!
//! This module handles the declaration layer of COOL programs:
//!
//! - Class definitions: `class Name { features };`
//! - Methods: `name(formals) : Type { expr };`
//! - Attributes: `name : Type [<- expr];`
//! - Formal parameters: `name : Type`
//!
//! # Grammar
//!
//! ```text
//! class     ::= "class" TYPEID "{" feature* "}" ";"
//! feature   ::= method | attribute
//! method    ::= OBJECTID "(" [formal ("," formal)*] ")" ":" TYPEID "{" expr "}" ";"
//! attribute ::= OBJECTID ":" TYPEID ["<-" expr] ";"
//! formal    ::= OBJECTID ":" TYPEID
//! ```
//!
//! A feature is a method exactly when the token after its name is `(`.
//! Class inheritance (`inherits`) is not part of this grammar.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl<I: Iterator<Item = char>> Parser<I> {
    /// Parse a class definition; `current` is the `class` keyword.
    pub(crate) fn parse_class(&mut self) -> Option<Class> {
        let token = self.current.clone();

        self.expect_and_advance(TokenKind::TypeId)?;
        let name = TypeIdentifier::from_token(self.current.clone());

        self.expect_and_advance(TokenKind::LBrace)?;
        let class_depth = self.brace_depth;

        let mut features = Vec::new();
        while !self.peek_is(TokenKind::RBrace)
            && !self.peek_is(TokenKind::Eof)
            && !self.peek_is(TokenKind::Class)
        {
            self.next_token();
            match self.parse_feature() {
                Some(feature) => features.push(feature),
                None if self.config.recovery => {
                    self.synchronize_feature(class_depth);
                    if self.brace_depth < class_depth {
                        // Recovery stopped on the class's own `}`.
                        break;
                    }
                }
                None => return None,
            }
        }

        if self.brace_depth >= class_depth {
            self.expect_and_advance(TokenKind::RBrace)?;
        }
        self.expect_and_advance(TokenKind::Semi)?;

        Some(Class {
            token,
            name,
            features,
            source_file: self.config.source_file.clone(),
        })
    }

    /// Parse a feature; `current` is its name.
    pub(crate) fn parse_feature(&mut self) -> Option<Feature> {
        self.expect_current(TokenKind::ObjectId)?;

        if self.peek_is(TokenKind::LParen) {
            self.parse_method().map(Feature::Method)
        } else {
            self.parse_attribute().map(Feature::Attribute)
        }
    }

    /// Parse method: name(formals) : Type { body };
    fn parse_method(&mut self) -> Option<Method> {
        let token = self.current.clone();
        let name = ObjectIdentifier::from_token(self.current.clone());

        self.expect_and_advance(TokenKind::LParen)?;

        let formals = if self.peek_is(TokenKind::RParen) {
            Vec::new()
        } else {
            self.next_token();
            self.parse_formals()?
        };

        self.expect_and_advance(TokenKind::RParen)?;
        self.expect_and_advance(TokenKind::Colon)?;
        self.expect_and_advance(TokenKind::TypeId)?;
        let return_type = TypeIdentifier::from_token(self.current.clone());

        self.expect_and_advance(TokenKind::LBrace)?;
        self.next_token();
        let body = self.parse_expression()?;

        self.expect_and_advance(TokenKind::RBrace)?;
        self.expect_and_advance(TokenKind::Semi)?;

        Some(Method {
            token,
            name,
            formals,
            return_type,
            body,
        })
    }

    /// Parse attribute: name : Type [<- init];
    fn parse_attribute(&mut self) -> Option<Attribute> {
        let token = self.current.clone();
        let name = ObjectIdentifier::from_token(self.current.clone());

        self.expect_and_advance(TokenKind::Colon)?;
        self.expect_and_advance(TokenKind::TypeId)?;
        let decl_type = TypeIdentifier::from_token(self.current.clone());

        let init = if self.peek_is(TokenKind::Assign) {
            self.next_token();
            self.next_token();
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_and_advance(TokenKind::Semi)?;

        Some(Attribute {
            token,
            name,
            decl_type,
            init,
        })
    }

    /// Parse a comma-separated formal list; `current` is the first name.
    fn parse_formals(&mut self) -> Option<Vec<Formal>> {
        let mut formals = Vec::new();

        loop {
            formals.push(self.parse_formal()?);

            if !self.peek_is(TokenKind::Comma) {
                break;
            }
            self.next_token(); // consume ','
            self.next_token();
        }

        Some(formals)
    }

    /// Parse formal: name : Type
    fn parse_formal(&mut self) -> Option<Formal> {
        self.expect_current(TokenKind::ObjectId)?;
        let token = self.current.clone();
        let name = ObjectIdentifier::from_token(self.current.clone());

        self.expect_and_advance(TokenKind::Colon)?;
        self.expect_and_advance(TokenKind::TypeId)?;
        let decl_type = TypeIdentifier::from_token(self.current.clone());

        Some(Formal {
            token,
            name,
            decl_type,
        })
    }
}
