//! Expression parsing implementation
//!
//! This module handles parsing of COOL expressions using a precedence ladder
//! for operators and recursive descent for everything else.
//!
//! # Supported Expressions
//!
//! - Literals: integers, strings, booleans
//! - Identifiers and assignment (`x <- expr`)
//! - Arithmetic: `+ - * /`, comparison: `< <= =`
//! - Unary: `~`, `isvoid`, `not`
//! - `if c then a else b fi`, `while c loop body pool`
//! - Blocks `{ e1; e2; }`, `new Type`, parenthesised expressions
//!
//! # Precedence
//!
//! Highest to lowest, as in the COOL reference manual:
//!
//! ```text
//! ~  isvoid
//! *  /          left-associative
//! +  -          left-associative
//! <  <=  =      non-associative
//! not
//! <-            right-associative
//! ```
//!
//! Dispatch (`.` and `@`), `let` and `case` are not parsed.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{DiagnosticKind, Parser};

impl<I: Iterator<Item = char>> Parser<I> {
    /// Parse expression (top-level entry point)
    ///
    /// Every nested expression comes back through here or through
    /// `parse_unary`, so those two carry the nesting guard.
    pub(crate) fn parse_expression(&mut self) -> Option<Expression> {
        self.enter_nesting()?;
        let expr = self.parse_expression_unguarded();
        self.leave_nesting();
        expr
    }

    fn parse_expression_unguarded(&mut self) -> Option<Expression> {
        match self.current.kind {
            TokenKind::ObjectId if self.peek_is(TokenKind::Assign) => self.parse_assignment(),
            TokenKind::Not => {
                let token = self.current.clone();
                self.next_token();
                let operand = self.parse_expression()?;
                Some(Expression::Unary {
                    token,
                    operator: UnaryOperator::Not,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_comparison(),
        }
    }

    /// Parse assignment: name <- expr
    fn parse_assignment(&mut self) -> Option<Expression> {
        let target = ObjectIdentifier::from_token(self.current.clone());

        self.expect_and_advance(TokenKind::Assign)?;
        let token = self.current.clone();

        self.next_token();
        let value = self.parse_expression()?;

        Some(Expression::Assignment {
            token,
            target,
            value: Box::new(value),
        })
    }

    /// Parse comparison (< <= =). A second comparison in a row is an error.
    fn parse_comparison(&mut self) -> Option<Expression> {
        let left = self.parse_additive()?;

        let Some(operator) = self.peek_comparison() else {
            return Some(left);
        };

        self.next_token();
        let token = self.current.clone();
        self.next_token();
        let right = self.parse_additive()?;

        if self.peek_comparison().is_some() {
            let operator = self.peek.literal.clone();
            self.next_token();
            self.error_at_current(DiagnosticKind::NonAssociative { operator });
            return None;
        }

        Some(Expression::Binary {
            token,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn peek_comparison(&self) -> Option<BinaryOperator> {
        match self.peek.kind {
            TokenKind::Lt => Some(BinaryOperator::Lt),
            TokenKind::Le => Some(BinaryOperator::Le),
            TokenKind::Eq => Some(BinaryOperator::Eq),
            _ => None,
        }
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Option<Expression> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let operator = match self.peek.kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };

            self.next_token();
            let token = self.current.clone();
            self.next_token();
            let right = self.parse_multiplicative()?;

            left = Expression::Binary {
                token,
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Some(left)
    }

    /// Parse multiplicative (* /)
    fn parse_multiplicative(&mut self) -> Option<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let operator = match self.peek.kind {
                TokenKind::Times => BinaryOperator::Mul,
                TokenKind::Divide => BinaryOperator::Div,
                _ => break,
            };

            self.next_token();
            let token = self.current.clone();
            self.next_token();
            let right = self.parse_unary()?;

            left = Expression::Binary {
                token,
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Some(left)
    }

    /// Parse unary (~ isvoid)
    fn parse_unary(&mut self) -> Option<Expression> {
        let operator = match self.current.kind {
            TokenKind::Tilde => UnaryOperator::Complement,
            TokenKind::IsVoid => UnaryOperator::IsVoid,
            _ => return self.parse_primary(),
        };

        let token = self.current.clone();
        self.next_token();

        self.enter_nesting()?;
        let operand = self.parse_unary();
        self.leave_nesting();

        Some(Expression::Unary {
            token,
            operator,
            operand: Box::new(operand?),
        })
    }

    /// Parse primary expressions: literals, identifiers, and keyword forms
    fn parse_primary(&mut self) -> Option<Expression> {
        match self.current.kind {
            TokenKind::IntConst => self.parse_integer_literal(),
            TokenKind::StrConst => Some(Expression::StringLiteral {
                token: self.current.clone(),
                value: self.current.literal.clone(),
            }),
            TokenKind::BoolConst => Some(Expression::BooleanLiteral {
                token: self.current.clone(),
                value: self.current.literal == "true",
            }),
            // Low-precedence forms in operand position extend as far right as
            // possible, e.g. `1 + x <- 2` is `1 + (x <- 2)`.
            TokenKind::ObjectId if self.peek_is(TokenKind::Assign) => self.parse_expression(),
            TokenKind::Not => self.parse_expression(),
            TokenKind::ObjectId => Some(Expression::Identifier(ObjectIdentifier::from_token(
                self.current.clone(),
            ))),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::While => self.parse_while_expression(),
            TokenKind::LBrace => self.parse_block_expression(),
            TokenKind::New => self.parse_new_expression(),
            TokenKind::LParen => {
                self.next_token();
                let expr = self.parse_expression()?;
                self.expect_and_advance(TokenKind::RParen)?;
                Some(expr)
            }
            TokenKind::Case => {
                self.error_at_current(DiagnosticKind::Unsupported { construct: "case" });
                None
            }
            found => {
                self.error_at_current(DiagnosticKind::ExpectedExpression { found });
                None
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral { token, value }),
            Err(_) => {
                self.error_at_current(DiagnosticKind::InvalidInteger {
                    literal: token.literal,
                });
                None
            }
        }
    }

    /// Parse if expression: if cond then expr else expr fi
    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        self.next_token();
        let condition = self.parse_expression()?;

        self.expect_and_advance(TokenKind::Then)?;
        self.next_token();
        let consequence = self.parse_expression()?;

        self.expect_and_advance(TokenKind::Else)?;
        self.next_token();
        let alternative = self.parse_expression()?;

        self.expect_and_advance(TokenKind::Fi)?;

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative: Box::new(alternative),
        })
    }

    /// Parse while expression: while cond loop body pool
    fn parse_while_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        self.next_token();
        let condition = self.parse_expression()?;

        self.expect_and_advance(TokenKind::Loop)?;
        self.next_token();
        let body = self.parse_expression()?;

        self.expect_and_advance(TokenKind::Pool)?;

        Some(Expression::While {
            token,
            condition: Box::new(condition),
            body: Box::new(body),
        })
    }

    /// Parse block: { expr; expr; ... } with at least one expression
    fn parse_block_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let mut body = Vec::new();

        loop {
            self.next_token();
            body.push(self.parse_expression()?);
            self.expect_and_advance(TokenKind::Semi)?;

            if self.peek_is(TokenKind::RBrace) {
                self.next_token();
                break;
            }
        }

        Some(Expression::Block { token, body })
    }

    /// Parse object creation: new Type
    fn parse_new_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        self.expect_and_advance(TokenKind::TypeId)?;
        let type_name = TypeIdentifier::from_token(self.current.clone());

        Some(Expression::New { token, type_name })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::{DiagnosticKind, Parser, MAX_NESTING_DEPTH};

    /// Parse `source` as the body of a method and return it.
    fn parse_body(source: &str) -> Result<Expression, Vec<DiagnosticKind>> {
        let program_text = format!("class A {{ f() : Object {{ {} }}; }};", source);
        let (mut program, diagnostics) = Parser::new(&program_text).parse_program();
        if !diagnostics.is_empty() {
            return Err(diagnostics.into_iter().map(|d| d.kind).collect());
        }
        match program.classes.remove(0).features.remove(0) {
            Feature::Method(method) => Ok(method.body),
            other => panic!("Expected method, got {:?}", other),
        }
    }

    fn render(source: &str) -> String {
        match parse_body(source) {
            Ok(expr) => expr.to_string(),
            Err(diagnostics) => panic!("{:?} failed to parse: {:?}", source, diagnostics),
        }
    }

    #[test]
    fn test_literals() {
        assert!(matches!(
            parse_body("42"),
            Ok(Expression::IntegerLiteral { value: 42, .. })
        ));
        assert!(matches!(
            parse_body("true"),
            Ok(Expression::BooleanLiteral { value: true, .. })
        ));
        assert!(matches!(
            parse_body("false"),
            Ok(Expression::BooleanLiteral { value: false, .. })
        ));
        match parse_body(r#""hi\n""#) {
            Ok(Expression::StringLiteral { value, .. }) => assert_eq!(value, "hi\n"),
            other => panic!("Expected string literal, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_overflow() {
        assert_eq!(
            parse_body("99999999999999999999"),
            Err(vec![DiagnosticKind::InvalidInteger {
                literal: "99999999999999999999".to_string()
            }])
        );
        assert!(matches!(
            parse_body("9223372036854775807"),
            Ok(Expression::IntegerLiteral { value: i64::MAX, .. })
        ));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(render("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(render("1 * 2 + 3"), "((1 * 2) + 3)");
        assert_eq!(render("a - b - c"), "((a - b) - c)");
        assert_eq!(render("a / b * c"), "((a / b) * c)");
        assert_eq!(render("a + b < c * d"), "((a + b) < (c * d))");
        assert_eq!(render("(1 + 2) * 3"), "((1 + 2) * 3)");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(render("~a + b"), "((~ a) + b)");
        assert_eq!(render("isvoid x"), "(isvoid x)");
        assert_eq!(render("~~a"), "(~ (~ a))");
        assert_eq!(render("not a < b"), "(not (a < b))");
        assert_eq!(render("not not a"), "(not (not a))");
    }

    #[test]
    fn test_comparison_is_non_associative() {
        assert_eq!(
            parse_body("a < b < c"),
            Err(vec![DiagnosticKind::NonAssociative {
                operator: "<".to_string()
            }])
        );
        assert_eq!(render("a = b"), "(a = b)");
        assert_eq!(render("a <= b"), "(a <= b)");
    }

    #[test]
    fn test_assignment() {
        match parse_body("x <- y <- 1 + 2") {
            Ok(Expression::Assignment { target, value, .. }) => {
                assert_eq!(target.value, "x");
                assert_eq!(value.to_string(), "y <- (1 + 2)");
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
        assert_eq!(render("1 + x <- 2"), "(1 + x <- 2)");
    }

    #[test]
    fn test_if_expression() {
        match parse_body("if a < b then a else b fi") {
            Ok(Expression::If {
                condition,
                consequence,
                alternative,
                ..
            }) => {
                assert_eq!(condition.to_string(), "(a < b)");
                assert_eq!(consequence.to_string(), "a");
                assert_eq!(alternative.to_string(), "b");
            }
            other => panic!("Expected if expression, got {:?}", other),
        }
    }

    #[test]
    fn test_if_requires_else() {
        assert_eq!(
            parse_body("if a then b then c fi"),
            Err(vec![DiagnosticKind::UnexpectedToken {
                expected: crate::parser::lexer::TokenKind::Else,
                found: crate::parser::lexer::TokenKind::Then,
            }])
        );
    }

    #[test]
    fn test_while_expression() {
        assert_eq!(
            render("while i < 10 loop i <- i + 1 pool"),
            "while (i < 10) loop i <- (i + 1) pool"
        );
    }

    #[test]
    fn test_block_expression() {
        match parse_body("{ x <- 1; x; }") {
            Ok(Expression::Block { body, .. }) => {
                assert_eq!(body.len(), 2);
                assert!(matches!(body[0], Expression::Assignment { .. }));
                assert!(matches!(body[1], Expression::Identifier(_)));
            }
            other => panic!("Expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_block_is_an_error() {
        assert!(parse_body("{ }").is_err());
    }

    #[test]
    fn test_new_expression() {
        match parse_body("new Counter") {
            Ok(Expression::New { type_name, .. }) => assert_eq!(type_name.value, "Counter"),
            other => panic!("Expected new expression, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_control_flow() {
        assert_eq!(
            render("while not done loop { if x = 0 then done <- true else x <- x - 1 fi; } pool"),
            "while (not done) loop { if (x = 0) then done <- true else x <- (x - 1) fi; } pool"
        );
    }

    #[test]
    fn test_case_is_unsupported() {
        assert_eq!(
            parse_body("case x of esac"),
            Err(vec![DiagnosticKind::Unsupported { construct: "case" }])
        );
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            parse_body("1 +"),
            Err(vec![DiagnosticKind::ExpectedExpression {
                found: crate::parser::lexer::TokenKind::RBrace
            }])
        );
    }

    #[test]
    fn test_operator_tokens_are_kept() {
        match parse_body("a\n  * b") {
            Ok(expr @ Expression::Binary { .. }) => {
                assert_eq!(expr.token_literal(), "*");
                assert_eq!(expr.location().line, 2);
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let source = format!("{}1{}", "(".repeat(30), ")".repeat(30));
        assert_eq!(render(&source), "1");
        assert_eq!(render(&format!("{}x", "~".repeat(30))).matches('~').count(), 30);
    }

    #[test]
    fn test_deep_nesting_is_rejected_without_overflow() {
        let too_deep = DiagnosticKind::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
        };
        let depth = 100_000;

        let parens = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_body(&parens), Err(vec![too_deep.clone()]));

        let nots = format!("{}x", "not ".repeat(depth));
        assert_eq!(parse_body(&nots), Err(vec![too_deep.clone()]));

        let complements = format!("{}x", "~".repeat(depth));
        assert_eq!(parse_body(&complements), Err(vec![too_deep.clone()]));

        let ifs = format!("{}x{}", "if c then ".repeat(depth), " else y fi".repeat(depth));
        assert_eq!(parse_body(&ifs), Err(vec![too_deep]));
    }
}
